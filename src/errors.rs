//! Crate-wide error type.
//!
//! Schedule building is total and never fails; errors only arise at the
//! edges (reading configuration, strict topology checks).

use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum FlowlineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid topology: {}", join_messages(.0))]
    InvalidTopology(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, FlowlineError>;

impl From<Vec<ValidationError>> for FlowlineError {
    fn from(errors: Vec<ValidationError>) -> Self {
        FlowlineError::InvalidTopology(errors)
    }
}
