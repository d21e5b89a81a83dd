//! Capability traits over the vendor data layer and the external centroiding
//! collaborator.
//!
//! Whether a concrete vendor backend is present is a configuration-time
//! decision: a reader wired to [`UnavailableProvider`] fails every call with
//! [`ProviderError::Unavailable`] instead of being compiled out.

use std::error::Error;

use thiserror::Error;

use crate::params::ParamList;
use crate::spectrum::{DetailLevel, SignalArrays};

/// The (source, collection, scan) coordinates that key every vendor call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanCoordinates {
    pub source: usize,
    /// `None` addresses a scan exposed directly by the source
    pub collection: Option<usize>,
    pub scan: usize,
}

/// One nested acquisition collection within a source unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
}

impl CollectionInfo {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self { name: name.into() }
    }
}

/// The enumeration-time identity of one scan, as the vendor reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanInfo {
    /// The vendor scan number, used by the `scan=<integer>` native ID form
    pub number: usize,
    /// The vendor-local identifier within the owning collection, used by the
    /// `file=<label>::<localId>` native ID form
    pub local_id: String,
    /// The acquisition level this scan was recorded at
    pub ms_level: u8,
}

impl ScanInfo {
    pub fn new<I: Into<String>>(number: usize, local_id: I, ms_level: u8) -> Self {
        Self {
            number,
            local_id: local_id.into(),
            ms_level,
        }
    }
}

/// Errors surfaced from the vendor layer or a collaborator behind it.
///
/// Failures are carried opaquely with the operation that tripped them and are
/// never reinterpreted on the way up.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No vendor backend was configured for this dataset
    #[error("no acquisition provider is available for this dataset")]
    Unavailable,
    /// An opaque failure inside the vendor layer
    #[error("vendor call {context} failed: {source}")]
    Vendor {
        context: &'static str,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ProviderError {
    /// Wrap a vendor failure with the name of the call that produced it
    pub fn vendor<E: Error + Send + Sync + 'static>(context: &'static str, source: E) -> Self {
        Self::Vendor {
            context,
            source: Box::new(source),
        }
    }
}

/**
The boundary capability set consumed from the vendor data layer.

Enumeration order is authoritative: ordinal assignment in the spectrum index
follows the order these methods report collections and scans in. Calls are
synchronous and fail fast; timeouts, if needed, are layered by the caller.
*/
pub trait AcquisitionProvider: Send + Sync {
    /// The nested acquisition collections of `source`, in vendor order. An
    /// empty list means the source exposes its scans directly.
    fn collections(&self, source: usize) -> Result<Vec<CollectionInfo>, ProviderError>;

    /// The scans of one collection (or of the source itself when `collection`
    /// is `None`), in vendor acquisition order.
    fn scans(
        &self,
        source: usize,
        collection: Option<usize>,
    ) -> Result<Vec<ScanInfo>, ProviderError>;

    /// The ordered live parameter list of one scan. This is the expensive
    /// call the parameter cache amortizes.
    fn parameters(&self, at: ScanCoordinates) -> Result<ParamList, ProviderError>;

    /// The raw sample arrays of one scan at the requested detail level
    fn samples(
        &self,
        at: ScanCoordinates,
        detail_level: DetailLevel,
    ) -> Result<SignalArrays, ProviderError>;
}

/// The null vendor capability, selected when no backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProvider;

impl AcquisitionProvider for UnavailableProvider {
    fn collections(&self, _source: usize) -> Result<Vec<CollectionInfo>, ProviderError> {
        Err(ProviderError::Unavailable)
    }

    fn scans(
        &self,
        _source: usize,
        _collection: Option<usize>,
    ) -> Result<Vec<ScanInfo>, ProviderError> {
        Err(ProviderError::Unavailable)
    }

    fn parameters(&self, _at: ScanCoordinates) -> Result<ParamList, ProviderError> {
        Err(ProviderError::Unavailable)
    }

    fn samples(
        &self,
        _at: ScanCoordinates,
        _detail_level: DetailLevel,
    ) -> Result<SignalArrays, ProviderError> {
        Err(ProviderError::Unavailable)
    }
}

/**
The external centroiding collaborator: reduces a continuous profile to a
sparse set of peak-apex samples.

The materializer orchestrates calls to this trait but never implements the
reduction itself.
*/
pub trait SignalCentroider: Send + Sync {
    fn centroid(&self, mzs: &[f64], intensities: &[f32]) -> Result<SignalArrays, ProviderError>;
}
