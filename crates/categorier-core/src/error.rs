//! Error types for Categorier

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    #[error("node already exists: {name}")]
    AlreadyExists { name: String },

    #[error("cycle: {candidate} is already on the opposite side of {node}")]
    Cycle { node: String, candidate: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse category of an [`Error`], for callers that only need to decide
/// how to report a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Cycle,
    Validation,
    Storage,
}

impl Error {
    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    pub fn node_not_found(name: impl Into<String>) -> Self {
        Self::not_found("node", name)
    }

    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    pub fn cycle(node: impl Into<String>, candidate: impl Into<String>) -> Self {
        Self::Cycle {
            node: node.into(),
            candidate: candidate.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Cycle { .. } => ErrorKind::Cycle,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(_) | Self::Io(_) | Self::Yaml(_) => ErrorKind::Storage,
        }
    }
}
