use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// The trigger command could not be spawned at all.
    Spawn,
    /// The trigger command ran and reported failure.
    CommandFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub kind: DispatchErrorKind,
    pub message: String,
}

impl DispatchError {
    pub fn new(kind: DispatchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DispatchError {}

pub fn spawn_failed(message: impl Into<String>) -> DispatchError {
    DispatchError::new(DispatchErrorKind::Spawn, message)
}

pub fn command_failed(message: impl Into<String>) -> DispatchError {
    DispatchError::new(DispatchErrorKind::CommandFailed, message)
}
