pub mod parameter_error;
pub use parameter_error::*;

pub mod param_value;
pub use param_value::*;

pub mod param_scanner;
pub use param_scanner::*;

pub mod param_substitutor;
pub use param_substitutor::*;
