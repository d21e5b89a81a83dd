//! `mzaccess` turns raw instrument acquisitions that may span several source
//! files and nested sub-collections into randomly addressable, progressively
//! detailed spectrum records, and refines peak apex estimates from magnitude
//! samples with a closed-form Lorentzian fit.

pub mod io;
pub mod params;
pub mod peaks;
pub mod prelude;
pub mod spectrum;

pub use crate::io::{
    AcquisitionProvider, NativeId, SignalCentroider, SourceCollection, SpectrumAccessError,
    SpectrumIndex, SpectrumReader,
};

pub use crate::params::{Param, ParamList};

pub use crate::peaks::{LorentzianFitError, MagnitudeLorentzian};

pub use crate::spectrum::{
    DetailLevel, ScanPolarity, SignalArrays, SignalContinuity, Spectrum, SpectrumDescription,
};
