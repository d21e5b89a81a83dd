//! The dense ordinal table of spectrum identities over a multi-source
//! dataset, and the native-ID lookup built alongside it.

use std::fmt::{self, Display};
use std::str::FromStr;

#[allow(unused)]
use std::io::prelude::*;

use indexmap::map::{Iter, Keys};
use indexmap::IndexMap;
use thiserror::Error;

use super::provider::{AcquisitionProvider, ProviderError, ScanCoordinates};
use super::source::{ConfigurationError, SourceCollection, ID_SEPARATOR};

/**
The externally visible textual identifier of a spectrum, distinct from its
dense ordinal.

Two forms exist: `scan=<integer>` names a spectrum its source exposes
directly, `file=<sourceLabel>::<localId>` names a spectrum scoped to a
nested acquisition collection. [`Display`] produces the exact text and
[`FromStr`] parses it back; neither component of the `file=` form may
contain the `::` separator itself.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeId {
    Scan(usize),
    File {
        source_label: String,
        local_id: String,
    },
}

/// Errors from parsing a native ID string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeIdParseError {
    #[error("native ID {0:?} does not begin with a recognized form prefix")]
    UnknownForm(String),
    #[error("native ID {0:?} does not carry an integral scan number")]
    BadScanNumber(String),
    #[error("native ID {0:?} is not of the form file=<label>::<localId>")]
    MalformedFileForm(String),
}

impl Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan(number) => write!(f, "scan={number}"),
            Self::File {
                source_label,
                local_id,
            } => write!(f, "file={source_label}{ID_SEPARATOR}{local_id}"),
        }
    }
}

impl FromStr for NativeId {
    type Err = NativeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(number) = s.strip_prefix("scan=") {
            let number = number
                .parse()
                .map_err(|_| NativeIdParseError::BadScanNumber(s.to_string()))?;
            Ok(Self::Scan(number))
        } else if let Some(rest) = s.strip_prefix("file=") {
            match rest.split_once(ID_SEPARATOR) {
                Some((label, local_id))
                    if !label.is_empty()
                        && !local_id.is_empty()
                        && !local_id.contains(ID_SEPARATOR) =>
                {
                    Ok(Self::File {
                        source_label: label.to_string(),
                        local_id: local_id.to_string(),
                    })
                }
                _ => Err(NativeIdParseError::MalformedFileForm(s.to_string())),
            }
        } else {
            Err(NativeIdParseError::UnknownForm(s.to_string()))
        }
    }
}

/**
An ordered mapping from native ID text to the dense ordinal of the spectrum
it names.

A wrapper around [`indexmap::IndexMap`].
*/
#[derive(Default, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NativeIdIndex {
    /// The name of the index. There may potentially be more than one
    /// index per dataset
    pub name: String,

    /// The mapping from ID to ordinal, ordered by occurrence
    #[cfg_attr(feature = "serde", serde(with = "indexmap::map::serde_seq"))]
    pub ordinals: IndexMap<Box<str>, usize>,

    /// Whether the index has been initialized explicitly or not, as
    /// it may be initially empty or read as empty.
    pub init: bool,
}

impl NativeIdIndex {
    pub fn new(name: String) -> NativeIdIndex {
        NativeIdIndex {
            name,
            ..Default::default()
        }
    }

    /// Get the ordinal registered for the specified ID
    #[inline]
    pub fn get(&self, id: &str) -> Option<usize> {
        self.ordinals.get(id).copied()
    }

    /// Get the associated ID and ordinal for the specified position
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<(&str, usize)> {
        self.ordinals.get_index(index).map(|(k, v)| (&**k, *v))
    }

    /// Insert `id` into the index with an ordinal value
    #[inline]
    pub fn insert<T: Into<Box<str>>>(&mut self, id: T, ordinal: usize) -> Option<usize> {
        self.ordinals.insert(id.into(), ordinal)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    pub fn keys(&self) -> Keys<'_, Box<str>, usize> {
        self.ordinals.keys()
    }

    /// Iterate over the IDs and ordinals
    pub fn iter(&self) -> Iter<'_, Box<str>, usize> {
        self.ordinals.iter()
    }

    /// Check if the ID is in the index
    #[inline]
    pub fn contains_key(&self, id: &str) -> bool {
        self.ordinals.contains_key(id)
    }

    #[cfg(feature = "serde")]
    /// Write the index out in JSON format to `writer`
    pub fn to_writer<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }

    #[cfg(feature = "serde")]
    /// Read an index in JSON format from `reader`
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

/**
The identity of one spectrum in the index: its dense ordinal, its native ID,
and where it lives in the (source, collection, scan) coordinate space.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexEntry {
    pub ordinal: usize,
    pub native_id: String,
    pub source: usize,
    /// `None` marks a spectrum its source exposes directly rather than
    /// through a nested acquisition collection
    pub collection: Option<usize>,
    pub scan: usize,
    /// The acquisition level, reported by the vendor at enumeration time.
    /// Keys the parameter cache bucket for this spectrum.
    pub ms_level: u8,
}

impl IndexEntry {
    /// The coordinates that key vendor calls for this spectrum
    pub fn coordinates(&self) -> ScanCoordinates {
        ScanCoordinates {
            source: self.source,
            collection: self.collection,
            scan: self.scan,
        }
    }
}

/// The requested ordinal lies beyond the end of the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("spectrum ordinal {ordinal} is out of range for an index of {len} entries")]
pub struct OutOfRange {
    pub ordinal: usize,
    pub len: usize,
}

/// Errors that may occur while constructing a [`SpectrumIndex`]
#[derive(Debug, Error)]
pub enum IndexBuildError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/**
The dense, zero-based ordinal table of every spectrum in a dataset, together
with the native-ID lookup registered during construction.

An index is built exactly once from the resolver's source ordering and the
provider's collection and scan enumeration order. Once built it is immutable
and safe for unsynchronized concurrent reads.
*/
#[derive(Debug, Default, Clone)]
pub struct SpectrumIndex {
    entries: Vec<IndexEntry>,
    by_native_id: NativeIdIndex,
}

impl SpectrumIndex {
    /// Enumerate `sources` through `provider` and register every spectrum
    /// in source, then collection, then scan order.
    pub fn build<P: AcquisitionProvider + ?Sized>(
        sources: &[SourceCollection],
        provider: &P,
    ) -> Result<Self, IndexBuildError> {
        let mut this = Self {
            entries: Vec::new(),
            by_native_id: NativeIdIndex::new("spectrum".to_string()),
        };

        for (source, unit) in sources.iter().enumerate() {
            if unit.label.contains(ID_SEPARATOR) {
                return Err(ConfigurationError::ReservedSeparator(unit.label.clone()).into());
            }
            let collections = provider.collections(source)?;
            if collections.is_empty() {
                for (scan, info) in provider.scans(source, None)?.into_iter().enumerate() {
                    let native_id = NativeId::Scan(info.number).to_string();
                    this.push_entry(native_id, source, None, scan, info.ms_level)?;
                }
            } else {
                for collection in 0..collections.len() {
                    for (scan, info) in provider
                        .scans(source, Some(collection))?
                        .into_iter()
                        .enumerate()
                    {
                        if info.local_id.contains(ID_SEPARATOR) {
                            return Err(
                                ConfigurationError::ReservedSeparator(info.local_id).into()
                            );
                        }
                        let native_id = NativeId::File {
                            source_label: unit.label.clone(),
                            local_id: info.local_id,
                        }
                        .to_string();
                        this.push_entry(native_id, source, Some(collection), scan, info.ms_level)?;
                    }
                }
            }
        }

        this.by_native_id.init = true;
        log::debug!(
            "indexed {} spectra across {} source unit(s)",
            this.len(),
            sources.len()
        );
        Ok(this)
    }

    fn push_entry(
        &mut self,
        native_id: String,
        source: usize,
        collection: Option<usize>,
        scan: usize,
        ms_level: u8,
    ) -> Result<(), IndexBuildError> {
        let ordinal = self.entries.len();
        if self.by_native_id.insert(native_id.as_str(), ordinal).is_some() {
            return Err(ConfigurationError::DuplicateNativeId(native_id).into());
        }
        self.entries.push(IndexEntry {
            ordinal,
            native_id,
            source,
            collection,
            scan,
            ms_level,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `ordinal`
    pub fn identity(&self, ordinal: usize) -> Result<&IndexEntry, OutOfRange> {
        self.entries.get(ordinal).ok_or(OutOfRange {
            ordinal,
            len: self.entries.len(),
        })
    }

    /// Resolve a native ID to its ordinal
    #[inline]
    pub fn find(&self, native_id: &str) -> Option<usize> {
        self.by_native_id.get(native_id)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn native_ids(&self) -> &NativeIdIndex {
        &self.by_native_id
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexEntry> {
        self.entries.iter()
    }
}
