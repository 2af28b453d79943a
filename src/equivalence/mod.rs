pub mod value_normalizer;
pub use value_normalizer::*;

pub mod query_comparer;
pub use query_comparer::*;
