//! Assembling progressively detailed spectrum records from the vendor layer,
//! addressed by dense ordinal or native ID.

use std::path::Path;
use std::sync::OnceLock;

use parking_lot::Mutex;
use thiserror::Error;

use crate::params::ParamList;
use crate::spectrum::{
    DetailLevel, ScanPolarity, SignalContinuity, Spectrum, SpectrumDescription,
};

use super::cache::{ParameterCacheMap, ParameterNotFoundError};
use super::index::{IndexBuildError, OutOfRange, SpectrumIndex};
use super::provider::{AcquisitionProvider, ProviderError, SignalCentroider};
use super::source::{resolve_sources, ConfigurationError, SourceCollection};

/// The canonical name of the scan start time parameter
pub const RETENTION_TIME_PARAMETER: &str = "RetentionTime";
/// The canonical name of the scan polarity parameter
pub const POLARITY_PARAMETER: &str = "Polarity";

/// Alternative spellings some instrument methods report, bound to the
/// canonical names requested here
const DEFAULT_PARAMETER_ALIASES: &[(&str, &str)] = &[
    ("ScanTime", RETENTION_TIME_PARAMETER),
    ("IonPolarity", POLARITY_PARAMETER),
];

/// Errors that may occur when materializing a spectrum record
#[derive(Debug, Error)]
pub enum SpectrumAccessError {
    /// An error resolving a spectrum by its native ID
    #[error("The requested spectrum native ID {0} was not found")]
    SpectrumIdNotFound(String),
    /// The requested ordinal lies beyond the end of the index
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
    /// The one-time index construction failed on first access
    #[error(transparent)]
    IndexBuild(#[from] IndexBuildError),
    /// The vendor layer or a collaborator behind it failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// A parameter the materializer requires was absent from the live list
    #[error(transparent)]
    ParameterNotFound(#[from] ParameterNotFoundError),
}

/**
A randomly addressable reader over the spectra of a multi-source dataset.

The spectrum index is built exactly once, lazily, on the first access, and
is immutable afterwards. Materializations of distinct ordinals may proceed
fully in parallel from `&self`; only two materializations first-touching the
same acquisition-level parameter bucket serialize against each other.
*/
pub struct SpectrumReader<P: AcquisitionProvider> {
    sources: Vec<SourceCollection>,
    provider: P,
    centroider: Option<Box<dyn SignalCentroider>>,
    index: OnceLock<SpectrumIndex>,
    build_lock: Mutex<()>,
    parameter_caches: ParameterCacheMap,
    /// The detail level used by the convenience accessors and iteration
    pub detail_level: DetailLevel,
}

impl<P: AcquisitionProvider> SpectrumReader<P> {
    /// Resolve the source units beneath `root` and construct a reader over
    /// them. No vendor enumeration happens until the index is first used.
    pub fn new<T: AsRef<Path>>(root: T, provider: P) -> Result<Self, ConfigurationError> {
        let sources = resolve_sources(root.as_ref())?;
        Ok(Self::with_sources(sources, provider))
    }

    /// Construct a reader over an already resolved source list
    pub fn with_sources(sources: Vec<SourceCollection>, provider: P) -> Self {
        let mut parameter_caches = ParameterCacheMap::new();
        for (alternative, canonical) in DEFAULT_PARAMETER_ALIASES {
            parameter_caches.register_alias(*alternative, *canonical);
        }
        Self {
            sources,
            provider,
            centroider: None,
            index: OnceLock::new(),
            build_lock: Mutex::new(()),
            parameter_caches,
            detail_level: DetailLevel::default(),
        }
    }

    /// Attach the external centroiding collaborator
    pub fn with_centroider(mut self, centroider: Box<dyn SignalCentroider>) -> Self {
        self.centroider = Some(centroider);
        self
    }

    /// Bind an additional alternative parameter spelling. Call before
    /// materialization begins; buckets already populated are unaffected.
    pub fn with_parameter_alias<A: Into<String>, C: Into<String>>(
        mut self,
        alternative: A,
        canonical: C,
    ) -> Self {
        self.parameter_caches.register_alias(alternative, canonical);
        self
    }

    /// The source units this reader addresses, in ordinal order
    pub fn sources(&self) -> &[SourceCollection] {
        &self.sources
    }

    /// The spectrum index, built on first use under a single-writer lock
    /// and read without synchronization afterwards
    pub fn index(&self) -> Result<&SpectrumIndex, SpectrumAccessError> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let _build = self.build_lock.lock();
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let built = SpectrumIndex::build(&self.sources, &self.provider)?;
        Ok(self.index.get_or_init(move || built))
    }

    /// The number of spectra in the dataset. May trigger the index build.
    pub fn len(&self) -> Result<usize, SpectrumAccessError> {
        Ok(self.index()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, SpectrumAccessError> {
        Ok(self.index()?.is_empty())
    }

    /// Materialize the spectrum at `ordinal` to the requested depth
    pub fn spectrum(
        &self,
        ordinal: usize,
        detail_level: DetailLevel,
    ) -> Result<Spectrum, SpectrumAccessError> {
        self.spectrum_with_centroiding(ordinal, detail_level, &[])
    }

    /**
    Materialize the spectrum at `ordinal`, routing profile data through the
    centroiding collaborator when the spectrum's acquisition level is a
    member of `levels_to_centroid`.
    */
    pub fn spectrum_with_centroiding(
        &self,
        ordinal: usize,
        detail_level: DetailLevel,
        levels_to_centroid: &[u8],
    ) -> Result<Spectrum, SpectrumAccessError> {
        let index = self.index()?;
        let entry = index.identity(ordinal)?;

        let mut description = SpectrumDescription {
            id: entry.native_id.clone(),
            index: entry.ordinal,
            ms_level: entry.ms_level,
            ..Default::default()
        };
        if detail_level == DetailLevel::InstantMetadata {
            return Ok(Spectrum::new(description, None));
        }

        let at = entry.coordinates();
        let params = self.provider.parameters(at)?;
        self.populate_metadata(&mut description, &params)?;
        if detail_level >= DetailLevel::FullMetadata {
            description.params = params;
        }
        if detail_level < DetailLevel::FullData {
            return Ok(Spectrum::new(description, None));
        }

        let arrays = self.provider.samples(at, detail_level)?;
        description.signal_continuity = SignalContinuity::Profile;
        let arrays = if levels_to_centroid.contains(&entry.ms_level) {
            match &self.centroider {
                Some(centroider) => {
                    let reduced = centroider.centroid(&arrays.mzs, &arrays.intensities)?;
                    description.signal_continuity = SignalContinuity::Centroid;
                    reduced
                }
                None => {
                    log::warn!(
                        "centroiding was requested for MS level {} but no centroider is configured; \
                         attaching profile data for {}",
                        entry.ms_level,
                        description.id
                    );
                    arrays
                }
            }
        } else {
            arrays
        };
        Ok(Spectrum::new(description, Some(arrays)))
    }

    /// Resolve a native ID and materialize its spectrum at the reader's
    /// default detail level
    pub fn get_spectrum_by_id(&self, id: &str) -> Result<Spectrum, SpectrumAccessError> {
        let index = self.index()?;
        match index.find(id) {
            Some(ordinal) => self.spectrum(ordinal, self.detail_level),
            None => Err(SpectrumAccessError::SpectrumIdNotFound(id.to_string())),
        }
    }

    /// Materialize the spectrum at `index` at the reader's default detail
    /// level
    pub fn get_spectrum_by_index(&self, index: usize) -> Result<Spectrum, SpectrumAccessError> {
        self.spectrum(index, self.detail_level)
    }

    /// Iterate over every spectrum at the reader's default detail level
    pub fn iter(&self) -> SpectrumIter<'_, P> {
        SpectrumIter {
            reader: self,
            ordinal: 0,
            failed: false,
        }
    }

    fn populate_metadata(
        &self,
        description: &mut SpectrumDescription,
        params: &ParamList,
    ) -> Result<(), SpectrumAccessError> {
        let time =
            self.parameter_caches
                .get(description.ms_level, RETENTION_TIME_PARAMETER, params)?;
        match time.parse::<f64>() {
            Ok(time) => description.start_time = time,
            Err(_) => log::warn!(
                "spectrum {} reports an unparseable retention time {time:?}",
                description.id
            ),
        }

        let polarity = self
            .parameter_caches
            .get(description.ms_level, POLARITY_PARAMETER, params)?;
        description.polarity = match polarity.as_str() {
            "+" | "positive" | "Positive" => ScanPolarity::Positive,
            "-" | "negative" | "Negative" => ScanPolarity::Negative,
            other => {
                log::warn!(
                    "spectrum {} reports an unrecognized polarity {other:?}",
                    description.id
                );
                ScanPolarity::Unknown
            }
        };
        Ok(())
    }
}

/// An iterator draining a [`SpectrumReader`] in ordinal order
pub struct SpectrumIter<'a, P: AcquisitionProvider> {
    reader: &'a SpectrumReader<P>,
    ordinal: usize,
    failed: bool,
}

impl<P: AcquisitionProvider> Iterator for SpectrumIter<'_, P> {
    type Item = Result<Spectrum, SpectrumAccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.index() {
            Ok(index) => {
                if self.ordinal >= index.len() {
                    return None;
                }
                let item = self
                    .reader
                    .spectrum(self.ordinal, self.reader.detail_level);
                self.ordinal += 1;
                Some(item)
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<'a, P: AcquisitionProvider> IntoIterator for &'a SpectrumReader<P> {
    type Item = Result<Spectrum, SpectrumAccessError>;
    type IntoIter = SpectrumIter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
