//! Peak-shape models derived from magnitude samples.

pub mod lorentzian;

pub use lorentzian::{LorentzianFitError, MagnitudeLorentzian};
