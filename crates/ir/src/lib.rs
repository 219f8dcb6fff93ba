//! # lvgen IR
//!
//! The generation model for lvgen.
//!
//! This crate holds the data that flows between the pipeline stages and the
//! pure logic that produces it:
//!
//! - **Column model**: [`ColumnInfo`], raw metadata plus inferred attributes
//! - **Inference Engine**: type, widget and filter inference from raw columns
//! - **Naming**: module, package and struct names derived from table names
//! - **Config**: [`GenerateConfig`], [`GenerateRequest`], [`GenerateResult`]
//! - **Config Builder**: overrides, live-schema reconciliation and module
//!   uniqueness
//!

pub mod builder;
pub mod column;
pub mod config;
pub mod inference;
pub mod naming;

pub use builder::{ColumnOverride, ConfigBuilder, ModuleRegistry, reconcile};
pub use column::ColumnInfo;
pub use config::{GenerateConfig, GenerateRequest, GenerateResult};
pub use inference::{
    AUTO_FIELDS, InferenceEngine, QueryFieldRules, SOFT_DELETE_COLUMN, infer_widget,
    is_auto_field, map_type,
};
pub use naming::{ModuleNames, NamingRules, singularize};

// Records exchanged with the collaborators are part of the model too.
pub use lvgen_core::{RawColumn, TableInfo};
