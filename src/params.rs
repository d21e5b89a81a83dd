use std::str;

/**
A single named acquisition parameter as reported by the vendor layer.

Vendor parameter lists are ordered sequences of loosely typed (name, value)
pairs whose layout is only stable within one acquisition level, so values are
carried as text and coerced on demand.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: String,
    pub value: String,
}

impl Param {
    pub fn new() -> Param {
        Param {
            ..Default::default()
        }
    }

    pub fn new_key_value<N: Into<String>, V: Into<String>>(name: N, value: V) -> Param {
        Param {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse the textual value into `T`
    pub fn coerce<T: str::FromStr>(&self) -> Result<T, T::Err> {
        self.value.parse::<T>()
    }
}

/// The ordered live parameter list of one spectrum
pub type ParamList = Vec<Param>;

/// A type with a live parameter list attached to it
pub trait ParamDescribed {
    fn params(&self) -> &ParamList;
    fn params_mut(&mut self) -> &mut ParamList;

    fn add_param(&mut self, param: Param) {
        self.params_mut().push(param);
    }

    fn get_param_by_name(&self, name: &str) -> Option<&Param> {
        self.params().iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_coerce() {
        let param = Param::new_key_value("RetentionTime", "12.25");
        let value: f64 = param.coerce().unwrap();
        assert!((value - 12.25).abs() < 1e-9);
        assert!(param.coerce::<u8>().is_err());
    }

    #[test]
    fn test_key_value() {
        let param = Param::new_key_value("Polarity", "+");
        assert_eq!(param.name, "Polarity");
        assert_eq!(param.value, "+");
        assert_eq!(Param::new(), Param::default());
    }
}
