pub mod parse_error;
pub use parse_error::*;

pub mod template_mask;
pub use template_mask::*;

pub mod translation_context;
pub use translation_context::*;

pub mod resolvers;
pub use resolvers::*;

pub mod query_translator;
pub use query_translator::*;
