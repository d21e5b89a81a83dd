//! Turning raw instrument acquisitions into randomly addressable,
//! progressively detailed spectrum records.
//!
//! Source units are discovered once, the spectrum index over them is built
//! once on first access, and every materialization afterwards flows index →
//! parameter cache → vendor provider → (optional centroiding) → record.

pub mod cache;
pub mod index;
pub mod provider;
pub mod reader;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::io::cache::{ParameterCache, ParameterCacheMap, ParameterNotFoundError};
pub use crate::io::index::{
    IndexBuildError, IndexEntry, NativeId, NativeIdIndex, NativeIdParseError, OutOfRange,
    SpectrumIndex,
};
pub use crate::io::provider::{
    AcquisitionProvider, CollectionInfo, ProviderError, ScanCoordinates, ScanInfo,
    SignalCentroider, UnavailableProvider,
};
pub use crate::io::reader::{
    SpectrumAccessError, SpectrumIter, SpectrumReader, POLARITY_PARAMETER,
    RETENTION_TIME_PARAMETER,
};
pub use crate::io::source::{
    resolve_sources, resolve_sources_with_markers, ConfigurationError, SourceCollection,
    DEFAULT_SOURCE_MARKERS, ID_SEPARATOR,
};
