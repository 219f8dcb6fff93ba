//! Core traits for lvgen
//!
//! `Validatable` is implemented by configuration types that must be checked
//! before they flow downstream. `SchemaStore` and `MenuStore` are the two
//! external collaborators of the generation pipeline; both are injected
//! explicitly so the pipeline can be built and tested against in-memory fakes.

use async_trait::async_trait;

use crate::error::GenResult;
use crate::records::{MenuRecord, RawColumn, TableInfo};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return a configuration error if the state is invalid.
pub trait Validatable {
    /// Validate the current state of the object
    fn validate(&self) -> GenResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// SchemaStore Trait
// ============================================================================

/// Read-only access to table/column metadata equivalent to an information
/// schema.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// All base tables of `database`, ordered by name.
    async fn tables(&self, database: &str) -> GenResult<Vec<TableInfo>>;

    /// Columns of one table, ordered by ordinal position.
    async fn columns(&self, database: &str, table: &str) -> GenResult<Vec<RawColumn>>;
}

// ============================================================================
// MenuStore Trait
// ============================================================================

/// Navigation-menu store. The generator creates one entry per successful run;
/// `delete` exists only so a failed run can compensate its own insert.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Insert a menu record and return its new identifier.
    async fn create(&self, record: &MenuRecord) -> GenResult<u64>;

    /// Remove a record previously returned by [`MenuStore::create`].
    async fn delete(&self, id: u64) -> GenResult<()>;
}
