pub mod operators;
pub use operators::*;

pub mod join;
pub use join::*;

pub mod selected_columns;
pub use selected_columns::*;

pub mod query_table;
pub use query_table::*;

pub mod filter;
pub use filter::*;

pub mod order_by;
pub use order_by::*;

pub mod aggregate;
pub use aggregate::*;

pub mod limit;
pub use limit::*;

pub mod subquery;
pub use subquery::*;

pub mod parsed_query;
pub use parsed_query::*;

pub mod state_error;
pub use state_error::*;

pub mod visual_state;
pub use visual_state::*;
