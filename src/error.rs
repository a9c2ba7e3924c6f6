use thiserror::Error;

/// Raised when a wizard is built from a step list that cannot form `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("wizard needs at least one step")]
    NoSteps,
    #[error("step at position {expected} has ordinal {found}")]
    OrdinalMismatch { expected: usize, found: usize },
}

impl ConfigurationError {
    pub fn code(&self) -> &'static str {
        "internal"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("path {path:?} does not resolve to a node")]
    InvalidPath { path: Vec<usize> },
    #[error("node at {path:?} has no action named {action:?}")]
    UnknownAction { path: Vec<usize>, action: String },
    #[error("duplicate sibling name {name:?}")]
    DuplicateName { name: String },
}

impl PermissionError {
    /// Machine code used in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "invalid_path",
            Self::UnknownAction { .. } => "unknown_action",
            Self::DuplicateName { .. } => "duplicate_name",
        }
    }
}
