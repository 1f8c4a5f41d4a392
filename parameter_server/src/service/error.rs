use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::{initialization::RandErr, storage::SizeMismatchErr};

/// The result type of the global network service.
pub type Result<T> = std::result::Result<T, PsErr>;

/// Failures of building, updating or reading the global network.
#[derive(Debug, Clone)]
pub enum PsErr {
    /// A gradient or output buffer didn't match one of the networks.
    SizeMismatch {
        network: &'static str,
        source: SizeMismatchErr,
    },
    /// The initial parameters couldn't be generated.
    Init(RandErr),
    /// The aggregator is gone, no more pushes can be applied.
    Disconnected,
}

impl Display for PsErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PsErr::SizeMismatch { network, source } => write!(f, "{network} network: {source}"),
            PsErr::Init(e) => write!(f, "failed to initialize global parameters: {e}"),
            PsErr::Disconnected => f.write_str("the global network aggregator has shut down"),
        }
    }
}

impl Error for PsErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PsErr::SizeMismatch { source, .. } => Some(source),
            PsErr::Init(e) => Some(e),
            PsErr::Disconnected => None,
        }
    }
}

impl From<RandErr> for PsErr {
    fn from(value: RandErr) -> Self {
        Self::Init(value)
    }
}

impl PsErr {
    pub(crate) fn actor(source: SizeMismatchErr) -> Self {
        Self::SizeMismatch {
            network: "actor",
            source,
        }
    }

    pub(crate) fn critic(source: SizeMismatchErr) -> Self {
        Self::SizeMismatch {
            network: "critic",
            source,
        }
    }
}
