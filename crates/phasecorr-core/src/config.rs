use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::consts::DEFAULT_OVERLAP_RATIO;
use crate::error::RegistrationError;

/// Options for [`phase_cross_correlation`](crate::phase_cross_correlation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Images are registered to within `1 / upsample_factor` of a pixel.
    pub upsample_factor: usize,
    /// Whether the inputs are images or their Fourier transforms.
    pub space: Space,
    /// Resolve the periodic shift ambiguity in real space.
    pub disambiguate: bool,
    pub return_error: ReturnError,
    /// Minimum overlap ratio between masked images. Only used with masks.
    pub overlap_ratio: f64,
    pub normalization: Normalization,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            upsample_factor: 1,
            space: Space::Real,
            disambiguate: false,
            return_error: ReturnError::Enabled,
            overlap_ratio: DEFAULT_OVERLAP_RATIO,
            normalization: Normalization::Phase,
        }
    }
}

/// Domain of the registration inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Space {
    /// Images are transformed before correlation.
    #[default]
    Real,
    /// Inputs are already Fourier transforms.
    Fourier,
}

impl FromStr for Space {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "real" => Ok(Self::Real),
            "fourier" => Ok(Self::Fourier),
            _ => Err(RegistrationError::InvalidSpace(s.to_string())),
        }
    }
}

impl TryFrom<String> for Space {
    type Error = RegistrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Space> for String {
    fn from(space: Space) -> Self {
        space.to_string()
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Fourier => write!(f, "fourier"),
        }
    }
}

/// Normalization applied to the cross-power spectrum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Normalization {
    /// Divide by the spectrum magnitude (classic phase correlation).
    #[default]
    Phase,
    /// Plain cross-correlation; more robust to noise.
    None,
}

impl FromStr for Normalization {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phase" => Ok(Self::Phase),
            "none" => Ok(Self::None),
            _ => Err(RegistrationError::InvalidNormalization(s.to_string())),
        }
    }
}

impl TryFrom<String> for Normalization {
    type Error = RegistrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Normalization> for String {
    fn from(normalization: Normalization) -> Self {
        normalization.to_string()
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phase => write!(f, "phase"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Which outputs accompany the shift.
///
/// Serialized as `true`, `false` or `"always"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReturnError {
    /// Error and phase difference are computed, except on the masked path
    /// where only the shift is returned.
    #[default]
    Enabled,
    /// Metrics are always present; the masked path reports them as NaN.
    Always,
    /// Legacy shift-only output.
    Disabled,
}

impl ReturnError {
    pub fn wants_metrics(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl FromStr for ReturnError {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self::Enabled),
            "false" => Ok(Self::Disabled),
            "always" => Ok(Self::Always),
            _ => Err(RegistrationError::InvalidReturnError(s.to_string())),
        }
    }
}

impl fmt::Display for ReturnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "true"),
            Self::Always => write!(f, "always"),
            Self::Disabled => write!(f, "false"),
        }
    }
}

impl Serialize for ReturnError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Enabled => serializer.serialize_bool(true),
            Self::Disabled => serializer.serialize_bool(false),
            Self::Always => serializer.serialize_str("always"),
        }
    }
}

impl<'de> Deserialize<'de> for ReturnError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReturnErrorVisitor;

        impl Visitor<'_> for ReturnErrorVisitor {
            type Value = ReturnError;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a boolean or \"always\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<ReturnError, E> {
                Ok(if v {
                    ReturnError::Enabled
                } else {
                    ReturnError::Disabled
                })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ReturnError, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ReturnErrorVisitor)
    }
}
