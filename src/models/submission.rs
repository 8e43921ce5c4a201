pub mod queries;
pub mod types;
pub mod validate;

pub use queries::*;
pub use types::*;
pub use validate::{ValidationError, validate};
