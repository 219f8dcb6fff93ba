//! Column definitions enriched with generation attributes
//!
//! A `ColumnInfo` is a [`RawColumn`] plus everything the renderer needs to
//! emit a field for it: target field name and type, wire name, form widget,
//! query operator and the query/list/form flags.

use lvgen_core::{FormWidget, QueryOperator, RawColumn, TargetType};
use serde::{Deserialize, Serialize};

use crate::inference::is_auto_field;

// ============================================================================
// ColumnInfo
// ============================================================================

/// A table column and the attributes inferred (or overridden) for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    // ── raw metadata ─────────────────────────────────────────────────────
    /// Database column name
    pub column_name: String,

    /// Declared data type
    pub raw_type: String,

    /// Column comment, used as the human label
    #[serde(default)]
    pub comment: String,

    pub nullable: bool,

    /// Index flag (`PRI`, `UNI`, `MUL`, …)
    #[serde(default)]
    pub key_flag: String,

    #[serde(default)]
    pub extra: String,

    // ── inferred ─────────────────────────────────────────────────────────
    /// Entity member name (UpperCamelCase)
    pub field_name: String,

    pub target_type: TargetType,

    /// JSON / query-string name (lowerCamelCase)
    pub wire_field: String,

    pub form_widget: FormWidget,

    #[serde(default)]
    pub query_operator: QueryOperator,

    /// Column becomes a list filter
    pub is_query: bool,

    /// Column is shown in the list table
    pub is_list: bool,

    /// Column is editable in the form
    pub is_form: bool,
}

impl ColumnInfo {
    /// Raw metadata view of this column.
    pub fn raw(&self) -> RawColumn {
        RawColumn {
            name: self.column_name.clone(),
            raw_type: self.raw_type.clone(),
            comment: self.comment.clone(),
            nullable: self.nullable,
            key_flag: self.key_flag.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Whether the column is managed by the persistence layer
    /// (`id`, `created_at`, `updated_at`, `deleted_at`).
    pub fn is_auto(&self) -> bool {
        is_auto_field(&self.column_name)
    }

    pub fn is_unique(&self) -> bool {
        self.key_flag.eq_ignore_ascii_case("UNI")
    }

    /// Label shown in forms and tables: the comment, or the field name.
    pub fn label(&self) -> &str {
        if self.comment.is_empty() {
            &self.field_name
        } else {
            &self.comment
        }
    }

    /// Auto-managed columns never appear in the emitted field set, whatever
    /// a caller asked for.
    pub fn enforce_auto_rule(&mut self) {
        if self.is_auto() {
            self.is_query = false;
            self.is_list = false;
            self.is_form = false;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
