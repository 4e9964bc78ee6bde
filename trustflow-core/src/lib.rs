pub mod error;
pub mod money;

pub use error::EngineError;
pub use money::Money;

pub type EngineResult<T> = Result<T, EngineError>;
