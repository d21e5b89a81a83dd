//! A prelude of the traits needed to use readers and providers generically.

pub use crate::io::provider::{AcquisitionProvider, SignalCentroider};
pub use crate::params::ParamDescribed;
