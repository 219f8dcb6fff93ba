//! # Render Context
//!
//! The serializable view of a [`GenerateConfig`] that templates bind to.
//! Everything a template needs is precomputed here so the templates stay
//! declarative: the column subsets (query/form/list), the route names, and
//! whether the entity needs the `time` import.

use lvgen_core::TargetType;
use lvgen_ir::{ColumnInfo, GenerateConfig};
use serde::Serialize;

/// One column as seen by the templates.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnContext {
    pub column_name: String,
    pub comment: String,
    /// Comment, or the field name when the comment is empty
    pub label: String,
    pub field_name: String,
    pub wire_field: String,
    /// Serialized [`TargetType`] key (`int`, `timestamp`, …)
    pub target_type: TargetType,
    pub form_widget: &'static str,
    pub query_operator: &'static str,
    pub key_flag: String,
    pub nullable: bool,
    pub is_auto: bool,
    pub is_query: bool,
    pub is_list: bool,
    pub is_form: bool,
}

impl From<&ColumnInfo> for ColumnContext {
    fn from(column: &ColumnInfo) -> Self {
        Self {
            column_name: column.column_name.clone(),
            comment: column.comment.clone(),
            label: column.label().to_string(),
            field_name: column.field_name.clone(),
            wire_field: column.wire_field.clone(),
            target_type: column.target_type,
            form_widget: column.form_widget.as_str(),
            query_operator: column.query_operator.as_str(),
            key_flag: column.key_flag.clone(),
            nullable: column.nullable,
            is_auto: column.is_auto(),
            is_query: column.is_query,
            is_list: column.is_list,
            is_form: column.is_form,
        }
    }
}

/// Top-level template context for one module.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub table_name: String,
    pub table_comment: String,
    /// Table comment, or the struct name when the comment is empty
    pub title: String,
    pub module_name: String,
    pub package_name: String,
    pub struct_name: String,
    pub has_soft_delete: bool,
    /// Entity declares at least one `time.Time` member
    pub needs_time_import: bool,
    /// JSON key of the primary key (`ID` from the embedded base, else `id`)
    pub id_key: &'static str,
    pub route_group: String,
    pub route_path: String,
    /// Every column in ordinal order, auto columns included
    pub columns: Vec<ColumnContext>,
    pub query_columns: Vec<ColumnContext>,
    pub form_columns: Vec<ColumnContext>,
    pub list_columns: Vec<ColumnContext>,
}

impl RenderContext {
    pub fn from_config(config: &GenerateConfig) -> Self {
        let temporal_field = config.emitted_columns().any(|c| c.target_type.is_temporal());

        Self {
            table_name: config.table_name.clone(),
            table_comment: config.table_comment.clone(),
            title: config.display_title().to_string(),
            module_name: config.module_name.clone(),
            package_name: config.package_name.clone(),
            struct_name: config.struct_name.clone(),
            has_soft_delete: config.has_soft_delete,
            // The explicit created/updated pair is always time.Time.
            needs_time_import: temporal_field || !config.has_soft_delete,
            id_key: if config.has_soft_delete { "ID" } else { "id" },
            route_group: config.route_group_ident(),
            route_path: config.route_path(),
            columns: collect(config.columns.iter()),
            query_columns: collect(config.query_columns()),
            form_columns: collect(config.form_columns()),
            list_columns: collect(config.list_columns()),
        }
    }
}

fn collect<'a>(columns: impl Iterator<Item = &'a ColumnInfo>) -> Vec<ColumnContext> {
    columns.map(ColumnContext::from).collect()
}

// ============================================================================
// Tests
// ============================================================================
