pub mod audit;
pub mod cache;
pub mod embedding;
pub mod error;
pub mod rule;

pub use error::DomainError;
