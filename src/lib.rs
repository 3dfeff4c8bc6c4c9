pub mod asset_store;
pub mod codegen;
pub mod color;
pub mod dsl;
pub mod error;
pub mod texture_cache;

pub use codegen::{TranspileOptions, TranspileReport, transpile};
pub use error::{Result, TranspileError};
