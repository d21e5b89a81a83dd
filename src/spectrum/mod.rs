//! The spectrum record produced by materialization, and the enumerations that
//! describe how deeply it has been populated.

use crate::params::{ParamDescribed, ParamList};

/**
The requested depth of spectrum population, from identity fields only up to
full sample arrays.

The levels are totally ordered and each level's record is a strict superset
of the fields populated at the level below it.
*/
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetailLevel {
    /// Identity fields alone: native ID, ordinal, and acquisition level
    InstantMetadata = 0,
    /// Adds the cheap per-scan metadata resolved through the parameter cache
    FastMetadata = 1,
    /// Adds the complete live parameter list
    FullMetadata = 2,
    /// Adds the raw (or centroided) sample arrays
    #[default]
    FullData = 3,
}

/**
Describes the polarity of a mass spectrum. A spectrum is either `Positive` (1+),
`Negative` (-1) or `Unknown` (0). The `Unknown` state is the default.
*/
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanPolarity {
    Unknown = 0,
    Positive = 1,
    Negative = -1,
}

impl Default for ScanPolarity {
    fn default() -> ScanPolarity {
        ScanPolarity::Unknown
    }
}

/**
Describes the representation of the signal attached to a spectrum record.

The `Unknown` option is retained for records materialized without sample data.
*/
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalContinuity {
    Unknown = 0,
    Centroid = 3,
    Profile = 5,
}

impl Default for SignalContinuity {
    fn default() -> SignalContinuity {
        SignalContinuity::Unknown
    }
}

/// A pair of parallel m/z and intensity arrays for one spectrum
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalArrays {
    pub mzs: Vec<f64>,
    pub intensities: Vec<f32>,
}

impl SignalArrays {
    pub fn new(mzs: Vec<f64>, intensities: Vec<f32>) -> Self {
        Self { mzs, intensities }
    }

    pub fn len(&self) -> usize {
        self.mzs.len().min(self.intensities.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over (m/z, intensity) points
    pub fn iter(&self) -> impl Iterator<Item = (f64, f32)> + '_ {
        self.mzs.iter().copied().zip(self.intensities.iter().copied())
    }
}

/**
The set of descriptive metadata that give context for how a mass spectrum was
acquired within a particular run.
*/
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrumDescription {
    /// The native ID text for this spectrum
    pub id: String,
    /// The dense ordinal of this spectrum within its index
    pub index: usize,
    pub ms_level: u8,

    pub polarity: ScanPolarity,
    pub signal_continuity: SignalContinuity,
    /// The retention time at which the scan began, in whatever unit the
    /// vendor reports it
    pub start_time: f64,

    pub params: ParamList,
}

impl ParamDescribed for SpectrumDescription {
    fn params(&self) -> &ParamList {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamList {
        &mut self.params
    }
}

/**
A progressively populated spectrum record.

Which fields beyond the identity triple are populated depends upon the
[`DetailLevel`] the record was materialized at; `arrays` is only present at
[`DetailLevel::FullData`].
*/
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spectrum {
    pub description: SpectrumDescription,
    pub arrays: Option<SignalArrays>,
}

impl Spectrum {
    pub fn new(description: SpectrumDescription, arrays: Option<SignalArrays>) -> Self {
        Self {
            description,
            arrays,
        }
    }

    /// The native identifier of this spectrum
    pub fn id(&self) -> &str {
        &self.description.id
    }

    /// The dense ordinal of this spectrum
    pub fn index(&self) -> usize {
        self.description.index
    }

    pub fn ms_level(&self) -> u8 {
        self.description.ms_level
    }

    pub fn polarity(&self) -> ScanPolarity {
        self.description.polarity
    }

    pub fn signal_continuity(&self) -> SignalContinuity {
        self.description.signal_continuity
    }

    pub fn start_time(&self) -> f64 {
        self.description.start_time
    }

    pub fn raw_arrays(&self) -> Option<&SignalArrays> {
        self.arrays.as_ref()
    }
}

impl ParamDescribed for Spectrum {
    fn params(&self) -> &ParamList {
        self.description.params()
    }

    fn params_mut(&mut self) -> &mut ParamList {
        self.description.params_mut()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::Param;

    #[test]
    fn test_detail_level_ordering() {
        assert!(DetailLevel::InstantMetadata < DetailLevel::FastMetadata);
        assert!(DetailLevel::FastMetadata < DetailLevel::FullMetadata);
        assert!(DetailLevel::FullMetadata < DetailLevel::FullData);
        assert_eq!(DetailLevel::default(), DetailLevel::FullData);
    }

    #[test]
    fn test_signal_arrays() {
        let arrays = SignalArrays::new(vec![100.0, 200.0, 300.0], vec![1.0, 5.0, 2.0]);
        assert_eq!(arrays.len(), 3);
        let points: Vec<_> = arrays.iter().collect();
        assert_eq!(points[1], (200.0, 5.0));
        assert!(SignalArrays::default().is_empty());
    }

    #[test]
    fn test_spectrum_accessors() {
        let mut description = SpectrumDescription {
            id: "scan=5".to_string(),
            index: 4,
            ms_level: 1,
            ..Default::default()
        };
        description.add_param(Param::new_key_value("RetentionTime", "1.5"));

        let spectrum = Spectrum::new(description, None);
        assert_eq!(spectrum.id(), "scan=5");
        assert_eq!(spectrum.index(), 4);
        assert_eq!(spectrum.ms_level(), 1);
        assert_eq!(spectrum.polarity(), ScanPolarity::Unknown);
        assert_eq!(spectrum.signal_continuity(), SignalContinuity::Unknown);
        assert!(spectrum.raw_arrays().is_none());
        assert!(spectrum.get_param_by_name("RetentionTime").is_some());
    }
}
