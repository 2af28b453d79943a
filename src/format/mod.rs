pub mod identifier;
pub use identifier::*;

pub mod literal;
pub use literal::*;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
}
