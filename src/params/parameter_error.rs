use thiserror::Error;

use crate::params::ParameterType;

/// UI input that cannot be read as the declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter value '{raw}' is not a valid {expected}")]
pub struct ParameterError {
    pub expected: ParameterType,
    pub raw: String,
}

impl ParameterError {
    pub fn new(expected: ParameterType, raw: &str) -> Self {
        Self { expected, raw: raw.to_string() }
    }
}
