pub mod column_resolver;
pub use column_resolver::*;

pub mod literal_resolver;
pub use literal_resolver::*;

pub mod aggregate_resolver;
pub use aggregate_resolver::*;

pub mod wildcard_resolver;
pub use wildcard_resolver::*;

pub mod table_resolver;
pub use table_resolver::*;

pub mod join_resolver;
pub use join_resolver::*;

pub mod projection_resolver;
pub use projection_resolver::*;

pub mod predicate_resolver;
pub use predicate_resolver::*;

pub mod having_resolver;
pub use having_resolver::*;

pub mod group_by_resolver;
pub use group_by_resolver::*;

pub mod order_by_resolver;
pub use order_by_resolver::*;

pub mod limit_offset_resolver;
pub use limit_offset_resolver::*;

pub mod cte_resolver;
pub use cte_resolver::*;
