//! Structural errors. Numerical failures live in [`crate::core::solve`] and
//! [`crate::simulation`]; physical implausibility is never an error, only a
//! validation diagnostic.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The selected modules' dependency graph contains a cycle through
    /// `module`. `path` lists the modules on the cycle in traversal order.
    #[error("dependency cycle through module `{module}`: {}", path.join(" -> "))]
    DependencyCycle { module: String, path: Vec<String> },

    #[error("unknown module `{0}`")]
    UnknownModule(String),

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
