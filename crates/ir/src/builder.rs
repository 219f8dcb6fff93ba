//! # Config Builder
//!
//! Combines a table choice, inferred columns, caller overrides and naming
//! into a finalized [`GenerateConfig`]. Also home of the two checks that run
//! against live state before rendering:
//!
//! - [`reconcile`] lines a caller-supplied config up with the live schema
//!   (column existence, ordinal order, soft-delete detection).
//! - [`ModuleRegistry`] rejects a module name already owned by another table.

use lvgen_core::{FormWidget, GenError, GenResult, QueryOperator, TableInfo, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::column::ColumnInfo;
use crate::config::GenerateConfig;
use crate::inference::SOFT_DELETE_COLUMN;
use crate::naming::{ModuleNames, NamingRules};

// ============================================================================
// ColumnOverride
// ============================================================================

/// Caller adjustments to one column's inferred attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnOverride {
    pub is_query: Option<bool>,
    pub is_list: Option<bool>,
    pub is_form: Option<bool>,
    pub query_operator: Option<QueryOperator>,
    pub form_widget: Option<FormWidget>,
}

impl ColumnOverride {
    fn apply(&self, column: &mut ColumnInfo) {
        if let Some(v) = self.is_query {
            column.is_query = v;
        }
        if let Some(v) = self.is_list {
            column.is_list = v;
        }
        if let Some(v) = self.is_form {
            column.is_form = v;
        }
        if let Some(op) = self.query_operator {
            column.query_operator = op;
        }
        if let Some(widget) = self.form_widget {
            column.form_widget = widget;
        }
    }
}

// ============================================================================
// ConfigBuilder
// ============================================================================

/// Builder for [`GenerateConfig`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    table: TableInfo,
    columns: Vec<ColumnInfo>,
    naming: NamingRules,
    module_name: Option<String>,
    package_name: Option<String>,
    struct_name: Option<String>,
    table_comment: Option<String>,
    overrides: BTreeMap<String, ColumnOverride>,
}

impl ConfigBuilder {
    /// Start from a table and its inferred columns (ordinal order).
    pub fn new(table: TableInfo, columns: Vec<ColumnInfo>) -> Self {
        Self {
            table,
            columns,
            naming: NamingRules::default(),
            module_name: None,
            package_name: None,
            struct_name: None,
            table_comment: None,
            overrides: BTreeMap::new(),
        }
    }

    pub fn naming(mut self, naming: NamingRules) -> Self {
        self.naming = naming;
        self
    }

    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    pub fn package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    pub fn struct_name(mut self, name: impl Into<String>) -> Self {
        self.struct_name = Some(name.into());
        self
    }

    pub fn table_comment(mut self, comment: impl Into<String>) -> Self {
        self.table_comment = Some(comment.into());
        self
    }

    pub fn override_column(mut self, column: impl Into<String>, ov: ColumnOverride) -> Self {
        self.overrides.insert(column.into(), ov);
        self
    }

    /// Finalize the configuration.
    ///
    /// # Errors
    ///
    /// `GenError::Config` for an override naming an unknown column, for
    /// invalid derived or supplied names, or for duplicate columns.
    pub fn build(self) -> GenResult<GenerateConfig> {
        let derived = ModuleNames::derive(&self.table.name, &self.naming)?;

        let mut columns = self.columns;
        for (name, ov) in &self.overrides {
            let column = columns
                .iter_mut()
                .find(|c| &c.column_name == name)
                .ok_or_else(|| {
                    GenError::config(format!(
                        "override for unknown column '{}' in table '{}'",
                        name, self.table.name
                    ))
                })?;
            ov.apply(column);
        }
        for column in &mut columns {
            column.enforce_auto_rule();
        }

        let config = GenerateConfig {
            has_soft_delete: has_soft_delete_column(&columns),
            table_comment: self.table_comment.unwrap_or(self.table.comment),
            module_name: self.module_name.unwrap_or(derived.module_name),
            package_name: self.package_name.unwrap_or(derived.package_name),
            struct_name: self.struct_name.unwrap_or(derived.struct_name),
            table_name: self.table.name,
            columns,
        };
        config.validate()?;
        Ok(config)
    }
}

fn has_soft_delete_column(columns: &[ColumnInfo]) -> bool {
    columns.iter().any(|c| c.column_name == SOFT_DELETE_COLUMN)
}

// ============================================================================
// Reconciliation with the live schema
// ============================================================================

/// Align a caller-supplied config with the live columns of its table.
///
/// - An empty column list is replaced by the live (inferred) columns.
/// - Every requested column must exist in the live table.
/// - Columns are reordered to live ordinal position.
/// - `has_soft_delete` is recomputed from the live table, never trusted.
/// - Auto columns lose any query/list/form flag a caller set.
pub fn reconcile(mut config: GenerateConfig, live: &[ColumnInfo]) -> GenResult<GenerateConfig> {
    if live.is_empty() {
        return Err(GenError::config(format!(
            "table '{}' has no columns or does not exist",
            config.table_name
        )));
    }

    if config.columns.is_empty() {
        config.columns = live.to_vec();
    } else {
        let position = |name: &str| live.iter().position(|c| c.column_name == name);
        for column in &config.columns {
            if position(&column.column_name).is_none() {
                return Err(GenError::config(format!(
                    "column '{}' does not exist in table '{}'",
                    column.column_name, config.table_name
                )));
            }
        }
        config
            .columns
            .sort_by_key(|c| position(&c.column_name).unwrap_or(usize::MAX));
    }

    for column in &mut config.columns {
        column.enforce_auto_rule();
    }
    config.has_soft_delete = has_soft_delete_column(live);
    config.validate()?;
    Ok(config)
}

// ============================================================================
// ModuleRegistry
// ============================================================================

/// Modules already present in the target project, keyed by module name,
/// with the table each was generated from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: impl Into<String>, table: impl Into<String>) {
        self.modules.insert(module.into(), table.into());
    }

    pub fn table_for(&self, module: &str) -> Option<&str> {
        self.modules.get(module).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// A module name may be reused only by the table that already owns it.
    pub fn ensure_available(&self, config: &GenerateConfig) -> GenResult<()> {
        match self.table_for(&config.module_name) {
            Some(owner) if owner != config.table_name => Err(GenError::config(format!(
                "module '{}' is already generated for table '{}'",
                config.module_name, owner
            ))),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
