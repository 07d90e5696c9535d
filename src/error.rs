pub use crate::types::DuckHunterError;

pub type Result<T> = std::result::Result<T, DuckHunterError>;
