use std::{
    error::Error,
    fmt::{self, Display},
};

/// The specific result type for size checks inside the storage module.
pub type Result<T> = std::result::Result<T, SizeMismatchErr>;

/// Error returned by the `ParameterStore` and its shards whenever a gradient or an
/// output buffer doesn't have the same length as the parameters it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeMismatchErr {
    pub got: usize,
    pub expected: usize,
}

impl Display for SizeMismatchErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { got, expected } = self;
        write!(
            f,
            "parameter buffer length mismatch: got {got}, expected {expected}"
        )
    }
}

impl Error for SizeMismatchErr {}
