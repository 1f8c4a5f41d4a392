use std::{error::Error, fmt, io};

use machine_learning::MlErr;
use ndarray::ShapeError;
use parameter_server::PsErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Worker runtime failures.
#[derive(Debug)]
pub enum WorkerErr {
    Ml(MlErr),
    Ps(PsErr),
    Io(io::Error),
    EmptyMemory,
    RowWidthMismatch {
        got: usize,
        expected: usize,
    },
    ObservationDimMismatch {
        got: usize,
        expected: usize,
    },
    ActionDimMismatch {
        got: usize,
        expected: usize,
    },
    UnknownEnv(String),
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Ml(e) => write!(f, "local network error: {e}"),
            WorkerErr::Ps(e) => write!(f, "global network error: {e}"),
            WorkerErr::Io(e) => write!(f, "io error: {e}"),
            WorkerErr::EmptyMemory => f.write_str("cannot sample from an empty memory"),
            WorkerErr::RowWidthMismatch { got, expected } => {
                write!(f, "transition row width mismatch: got {got}, expected {expected}")
            }
            WorkerErr::ObservationDimMismatch { got, expected } => {
                write!(f, "observation dimension mismatch: got {got}, expected {expected}")
            }
            WorkerErr::ActionDimMismatch { got, expected } => {
                write!(f, "action dimension mismatch: got {got}, expected {expected}")
            }
            WorkerErr::UnknownEnv(game) => write!(f, "unknown environment {game:?}"),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Ml(e) => Some(e),
            WorkerErr::Ps(e) => Some(e),
            WorkerErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for WorkerErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}

impl From<ShapeError> for WorkerErr {
    fn from(value: ShapeError) -> Self {
        Self::Ml(value.into())
    }
}

impl From<PsErr> for WorkerErr {
    fn from(value: PsErr) -> Self {
        Self::Ps(value)
    }
}

impl From<io::Error> for WorkerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
