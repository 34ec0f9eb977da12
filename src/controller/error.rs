use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::backend::BackendError;
use crate::utils::media::ProbeError;

/// Failure of a key-driven action. Reported on the status line.
#[derive(Debug)]
pub enum ActionError {
    /// The action does not apply to the current selection; nothing was sent.
    Rejected(String),
    Backend(BackendError),
    Io(io::Error),
    Probe(ProbeError),
}

impl ActionError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ActionError::Rejected(message.into())
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Rejected(message) => write!(f, "{message}"),
            ActionError::Backend(err) => write!(f, "{err}"),
            ActionError::Io(err) => write!(f, "{err}"),
            ActionError::Probe(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for ActionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ActionError::Rejected(_) => None,
            ActionError::Backend(err) => Some(err),
            ActionError::Io(err) => Some(err),
            ActionError::Probe(err) => Some(err),
        }
    }
}

impl From<BackendError> for ActionError {
    fn from(err: BackendError) -> Self {
        ActionError::Backend(err)
    }
}

impl From<io::Error> for ActionError {
    fn from(err: io::Error) -> Self {
        ActionError::Io(err)
    }
}

impl From<ProbeError> for ActionError {
    fn from(err: ProbeError) -> Self {
        ActionError::Probe(err)
    }
}

pub type ActionResult<T = ()> = Result<T, ActionError>;
