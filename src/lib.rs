pub mod config;
pub use config::{EngineConfig, SqlDialect};

pub mod format;

pub mod schema;
pub use schema::{NoSchema, SchemaDict, SchemaProvider};

pub mod model;
pub use model::{ParsedQuery, VisualQueryState};

pub mod parser;
pub use parser::{ParseError, QueryTranslator};

pub mod builder;
pub use builder::SqlBuilder;

pub mod equivalence;
pub use equivalence::QueryComparer;

pub mod params;
pub use params::{ParamScanner, ParamSubstitutor, ParamValue};

pub mod sync;
pub use sync::{QuerySync, SyncOutcome};
