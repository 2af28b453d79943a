pub mod sql_builder;
pub use sql_builder::*;

pub mod fragments;
pub use fragments::*;
