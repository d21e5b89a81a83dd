//! In-memory acquisition fixtures shared by the I/O tests.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::params::{Param, ParamList};
use crate::spectrum::{DetailLevel, SignalArrays};

use super::provider::{
    AcquisitionProvider, CollectionInfo, ProviderError, ScanCoordinates, ScanInfo,
};
use super::source::SourceCollection;

pub(crate) struct MockScan {
    pub number: usize,
    pub local_id: String,
    pub ms_level: u8,
    pub params: ParamList,
    pub arrays: SignalArrays,
}

impl MockScan {
    pub fn new(number: usize, ms_level: u8) -> Self {
        let params = vec![
            Param::new_key_value("RetentionTime", format!("{}", number as f64 * 0.5)),
            Param::new_key_value("Polarity", "+"),
            Param::new_key_value("SummedIntensities", "1250"),
        ];
        let mzs = vec![100.0, 100.25, 100.5, 100.75, 101.0];
        let intensities = vec![2.0, 9.0, 20.0, 9.5, 2.5];
        Self {
            number,
            local_id: number.to_string(),
            ms_level,
            params,
            arrays: SignalArrays::new(mzs, intensities),
        }
    }

    pub fn with_local_id<I: Into<String>>(mut self, local_id: I) -> Self {
        self.local_id = local_id.into();
        self
    }

    pub fn with_params(mut self, params: ParamList) -> Self {
        self.params = params;
        self
    }
}

pub(crate) enum MockSourceData {
    /// The source exposes its scans directly
    Direct(Vec<MockScan>),
    /// The source nests its scans under acquisition collections
    Collections(Vec<Vec<MockScan>>),
}

/// An [`AcquisitionProvider`] over in-memory fixtures that counts how many
/// times each vendor call was made.
pub(crate) struct MockProvider {
    sources: Vec<MockSourceData>,
    pub collection_calls: AtomicUsize,
    pub scan_calls: AtomicUsize,
    pub parameter_calls: AtomicUsize,
    pub sample_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(sources: Vec<MockSourceData>) -> Self {
        Self {
            sources,
            collection_calls: AtomicUsize::new(0),
            scan_calls: AtomicUsize::new(0),
            parameter_calls: AtomicUsize::new(0),
            sample_calls: AtomicUsize::new(0),
        }
    }

    pub fn enumeration_calls(&self) -> usize {
        self.collection_calls.load(Ordering::SeqCst) + self.scan_calls.load(Ordering::SeqCst)
    }

    fn missing(context: &'static str, at: ScanCoordinates) -> ProviderError {
        ProviderError::vendor(
            context,
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no scan at {at:?} in the fixture"),
            ),
        )
    }

    fn scan_at(&self, context: &'static str, at: ScanCoordinates) -> Result<&MockScan, ProviderError> {
        let source = self
            .sources
            .get(at.source)
            .ok_or_else(|| Self::missing(context, at))?;
        let scan = match (source, at.collection) {
            (MockSourceData::Direct(scans), None) => scans.get(at.scan),
            (MockSourceData::Collections(collections), Some(collection)) => {
                collections.get(collection).and_then(|c| c.get(at.scan))
            }
            _ => None,
        };
        scan.ok_or_else(|| Self::missing(context, at))
    }
}

impl AcquisitionProvider for MockProvider {
    fn collections(&self, source: usize) -> Result<Vec<CollectionInfo>, ProviderError> {
        self.collection_calls.fetch_add(1, Ordering::SeqCst);
        match self.sources.get(source) {
            Some(MockSourceData::Direct(_)) => Ok(Vec::new()),
            Some(MockSourceData::Collections(collections)) => Ok((0..collections.len())
                .map(|i| CollectionInfo::new(format!("collection-{i}")))
                .collect()),
            None => Err(ProviderError::vendor(
                "collections",
                io::Error::new(io::ErrorKind::NotFound, format!("no source {source}")),
            )),
        }
    }

    fn scans(
        &self,
        source: usize,
        collection: Option<usize>,
    ) -> Result<Vec<ScanInfo>, ProviderError> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        let scans = match (self.sources.get(source), collection) {
            (Some(MockSourceData::Direct(scans)), None) => scans,
            (Some(MockSourceData::Collections(collections)), Some(collection)) => collections
                .get(collection)
                .ok_or_else(|| {
                    ProviderError::vendor(
                        "scans",
                        io::Error::new(
                            io::ErrorKind::NotFound,
                            format!("no collection {collection} in source {source}"),
                        ),
                    )
                })?,
            _ => {
                return Err(ProviderError::vendor(
                    "scans",
                    io::Error::new(io::ErrorKind::NotFound, format!("no source {source}")),
                ))
            }
        };
        Ok(scans
            .iter()
            .map(|s| ScanInfo::new(s.number, s.local_id.clone(), s.ms_level))
            .collect())
    }

    fn parameters(&self, at: ScanCoordinates) -> Result<ParamList, ProviderError> {
        self.parameter_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scan_at("parameters", at)?.params.clone())
    }

    fn samples(
        &self,
        at: ScanCoordinates,
        _detail_level: DetailLevel,
    ) -> Result<SignalArrays, ProviderError> {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scan_at("samples", at)?.arrays.clone())
    }
}

/// Source descriptors matching [`two_source_fixture`]
pub(crate) fn fixture_sources() -> Vec<SourceCollection> {
    ["a_run", "b_run"]
        .iter()
        .map(|label| SourceCollection {
            path: PathBuf::from(format!("{label}.d")),
            label: label.to_string(),
        })
        .collect()
}

/// A flat source of three MS1 scans followed by a source of two collections
/// holding two fragmentation scans each.
pub(crate) fn two_source_fixture() -> MockProvider {
    let direct = MockSourceData::Direct(vec![
        MockScan::new(1, 1),
        MockScan::new(2, 1),
        MockScan::new(3, 1),
    ]);
    let nested = MockSourceData::Collections(vec![
        vec![
            MockScan::new(1, 2).with_local_id("c0s1"),
            MockScan::new(2, 2).with_local_id("c0s2"),
        ],
        vec![
            MockScan::new(1, 2).with_local_id("c1s1"),
            MockScan::new(2, 2).with_local_id("c1s2"),
        ],
    ]);
    MockProvider::new(vec![direct, nested])
}
