pub mod sync_outcome;
pub use sync_outcome::*;

pub mod query_sync;
pub use query_sync::*;
