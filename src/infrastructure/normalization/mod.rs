//! Vendor rule normalization

mod engine;
mod providers;

pub use engine::{NormalizationEngine, NormalizationOutput};
