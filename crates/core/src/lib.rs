//! # lvgen Core
//!
//! Core types, traits, and error handling for lvgen.
//!
//! This crate provides the foundational building blocks used throughout
//! the generator, including:
//!
//! - **Types**: target field types, form widgets, query operators, artifact
//!   kinds and pipeline stages
//! - **Records**: rows exchanged with the schema and menu stores
//! - **Traits**: `Validatable` plus the `SchemaStore` and `MenuStore` collaborators
//! - **Errors**: unified error handling with `GenError` and `GenResult`
//!

pub mod error;
pub mod records;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ErrorKind, GenError, GenResult, ResultExt};
pub use records::{MenuKind, MenuRecord, RawColumn, TableInfo};
pub use traits::{MenuStore, SchemaStore, Validatable};
pub use types::{
    ArtifactKind, FormWidget, QueryMode, QueryOperator, RunState, Stage, TargetType,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
