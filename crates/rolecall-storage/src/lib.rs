//! Storage abstraction for rolecall.
//!
//! Backend crates (e.g., rolecall-store-memory) implement the [`Store`] trait so
//! `rolecall-engine` doesn't depend on any specific storage engine.

use thiserror::Error;

mod store;
mod types;

pub use store::*;
pub use types::*;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}
