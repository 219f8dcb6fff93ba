//! # lvgen Codegen
//!
//! The generation pipeline for lvgen.
//!
//! This crate turns one database table into a module of a Go (gin/gorm)
//! backend plus a Vue (Naive UI) frontend, and wires that module into the
//! existing project.
//!
//! ## Stages
//!
//! - **Introspection**: table and column metadata through a [`SchemaStore`](lvgen_core::SchemaStore)
//! - **Rendering**: six artifacts from named minijinja templates
//! - **File Synthesis**: canonical paths, existence guard, idempotent directories
//! - **Router Patching**: structural splice of the module's route group
//! - **Menu Registration**: one navigation entry through a [`MenuStore`](lvgen_core::MenuStore)
//! - **Journal**: committed side effects and their reverse-order compensation
//!

// ============================================================================
// Modules
// ============================================================================

pub mod context;
pub mod generator;
pub mod introspect;
pub mod journal;
pub mod layout;
pub mod menu;
pub mod render;
pub mod router;
pub mod synth;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use context::{ColumnContext, RenderContext};
pub use generator::{GenerateFailure, Generator, RollbackPolicy, render_offline};
pub use introspect::{DEFAULT_QUERY_TIMEOUT, Introspector, database_name_from_dsn};
pub use journal::{CompensationReport, Journal, JournalEntry};
pub use layout::{DEFAULT_ROUTER_FILE, ProjectLayout};
pub use menu::{DEFAULT_MENU_TIMEOUT, MenuRegistrar, menu_record};
pub use render::{RenderedModule, Renderer};
pub use router::{PatchOutcome, RouteGroup, RouterFile, RouterPatcher};
pub use synth::{FileSynthesizer, WrittenFile};
pub use templates::TemplateSet;
