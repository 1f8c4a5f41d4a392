use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type of `RandParamGen::new`.
pub type Result<T> = std::result::Result<T, RandErr>;

/// Error returned when a `RandParamGen` distribution can't be built from the given
/// hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub enum RandErr {
    /// A negative or non-finite standard deviation.
    Deviation(f32),
    /// Rejected by the distribution itself (an empty uniform range, ...).
    Distribution(String),
}

impl From<NormalError> for RandErr {
    fn from(value: NormalError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl From<UniformError> for RandErr {
    fn from(value: UniformError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl Display for RandErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deviation(std_dev) => {
                write!(f, "invalid standard deviation {std_dev}, expected a finite value >= 0")
            }
            Self::Distribution(e) => write!(f, "invalid parameter distribution: {e}"),
        }
    }
}

impl Error for RandErr {}
