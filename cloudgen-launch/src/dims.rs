//! Layer width lists written as `512-512-512`.

use crate::LaunchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hidden layer widths of a network stack, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dims(Vec<u32>);

impl Dims {
    pub fn new(widths: Vec<u32>) -> Result<Self, LaunchError> {
        if widths.is_empty() || widths.contains(&0) {
            let text = widths.iter().map(u32::to_string).collect::<Vec<_>>().join("-");
            return Err(LaunchError::InvalidDims(text));
        }
        Ok(Self(widths))
    }

    pub fn widths(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for Dims {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let widths = s
            .split('-')
            .map(|w| w.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| LaunchError::InvalidDims(s.to_string()))?;
        Self::new(widths).map_err(|_| LaunchError::InvalidDims(s.to_string()))
    }
}

impl TryFrom<String> for Dims {
    type Error = LaunchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dims> for String {
    fn from(dims: Dims) -> Self {
        dims.to_string()
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.widths().iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{w}")?;
        }
        Ok(())
    }
}
