//! Generation configuration, request and result types
//!
//! A [`GenerateConfig`] is everything the renderer and the file guard need
//! for one module. [`GenerateRequest`] adds the menu and overwrite options of
//! a full run; [`GenerateResult`] is returned once when the run ends.

use lvgen_core::{GenError, GenResult, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::column::ColumnInfo;
use crate::naming::{is_identifier, is_table_name};

// ============================================================================
// GenerateConfig
// ============================================================================

/// Finalized configuration for one generated module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    pub table_name: String,

    #[serde(default)]
    pub table_comment: String,

    /// Module identifier, e.g. `article`
    pub module_name: String,

    /// Package (route prefix / directory), e.g. `blog`
    pub package_name: String,

    /// Entity type name, e.g. `Article`
    pub struct_name: String,

    /// Table carries a `deleted_at` column; deletes are reversible
    #[serde(default)]
    pub has_soft_delete: bool,

    /// Columns in table ordinal order
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

impl GenerateConfig {
    /// Columns that make it into the emitted field set (no auto columns).
    pub fn emitted_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| !c.is_auto())
    }

    pub fn query_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.emitted_columns().filter(|c| c.is_query)
    }

    pub fn form_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.emitted_columns().filter(|c| c.is_form)
    }

    pub fn list_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.emitted_columns().filter(|c| c.is_list)
    }

    /// Identifier of the route group variable, e.g. `articleGroup`.
    pub fn route_group_ident(&self) -> String {
        format!("{}Group", self.module_name)
    }

    /// Relative route group path, e.g. `blog/article`.
    pub fn route_path(&self) -> String {
        format!("{}/{}", self.package_name, self.module_name)
    }

    /// Browser route of the generated view, e.g. `/blog/article`.
    pub fn menu_path(&self) -> String {
        format!("/{}", self.route_path())
    }

    /// Human title: the table comment, or the struct name when empty.
    pub fn display_title(&self) -> &str {
        if self.table_comment.trim().is_empty() {
            &self.struct_name
        } else {
            &self.table_comment
        }
    }
}

impl Validatable for GenerateConfig {
    fn validate(&self) -> GenResult<()> {
        if !is_table_name(&self.table_name) {
            return Err(GenError::config(format!(
                "invalid table name '{}'",
                self.table_name
            )));
        }

        for (label, value) in [
            ("module name", &self.module_name),
            ("package name", &self.package_name),
            ("struct name", &self.struct_name),
        ] {
            if !is_identifier(value) {
                return Err(GenError::config(format!(
                    "invalid {} '{}': expected an ASCII letter followed by letters or digits",
                    label, value
                )));
            }
        }

        if !self.struct_name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(GenError::config(format!(
                "struct name '{}' must start with an uppercase letter",
                self.struct_name
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.column_name.as_str()) {
                return Err(GenError::config(format!(
                    "duplicate column '{}' in table '{}'",
                    column.column_name, self.table_name
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// GenerateRequest
// ============================================================================

/// A full generation run: config plus menu placement and overwrite policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub config: GenerateConfig,

    /// Parent navigation entry (0 = top level)
    #[serde(default)]
    pub parent_menu_id: u64,

    #[serde(default)]
    pub menu_icon: String,

    /// Replace existing artifact files instead of failing
    #[serde(default)]
    pub overwrite_allowed: bool,
}

impl GenerateRequest {
    pub fn new(config: GenerateConfig) -> Self {
        Self {
            config,
            parent_menu_id: 0,
            menu_icon: String::new(),
            overwrite_allowed: false,
        }
    }

    pub fn with_parent_menu(mut self, parent_menu_id: u64) -> Self {
        self.parent_menu_id = parent_menu_id;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.menu_icon = icon.into();
        self
    }

    pub fn allow_overwrite(mut self) -> Self {
        self.overwrite_allowed = true;
        self
    }
}

// ============================================================================
// GenerateResult
// ============================================================================

/// Outcome of one run. On failure it holds whatever was written before the
/// failing stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResult {
    /// Files written (and the router file, if it was modified), in order
    pub written_paths: Vec<PathBuf>,

    /// The router file gained a new route group
    pub router_updated: bool,

    /// Identifier of the created navigation entry
    pub menu_id: Option<u64>,

    pub success: bool,

    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferenceEngine;
    use lvgen_core::RawColumn;

    fn article_config() -> GenerateConfig {
        let engine = InferenceEngine::default();
        GenerateConfig {
            table_name: "lv_articles".into(),
            table_comment: "Articles".into(),
            module_name: "article".into(),
            package_name: "blog".into(),
            struct_name: "Article".into(),
            has_soft_delete: true,
            columns: engine.infer_all(&[
                RawColumn::new("id", "bigint"),
                RawColumn::new("title", "varchar"),
                RawColumn::new("content", "text"),
                RawColumn::new("deleted_at", "datetime"),
            ]),
        }
    }

    #[test]
    fn test_derived_paths() {
        let config = article_config();
        assert_eq!(config.route_group_ident(), "articleGroup");
        assert_eq!(config.route_path(), "blog/article");
        assert_eq!(config.menu_path(), "/blog/article");
        assert_eq!(config.display_title(), "Articles");
    }

    #[test]
    fn test_emitted_columns_skip_auto_fields() {
        let config = article_config();
        let names: Vec<_> = config.emitted_columns().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, vec!["title", "content"]);
        let query: Vec<_> = config.query_columns().map(|c| c.column_name.as_str()).collect();
        assert_eq!(query, vec!["title"]);
    }

    #[test]
    fn test_validation() {
        assert!(article_config().is_valid());

        let mut config = article_config();
        config.module_name = "my-article".into();
        assert!(config.validate().is_err());

        let mut config = article_config();
        config.struct_name = "article".into();
        assert!(config.validate().is_err());

        let mut config = article_config();
        let dup = config.columns[1].clone();
        config.columns.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_title_falls_back() {
        let mut config = article_config();
        config.table_comment = "  ".into();
        assert_eq!(config.display_title(), "Article");
    }

    #[test]
    fn test_request_serde_flattens_config() {
        let request = GenerateRequest::new(article_config())
            .with_parent_menu(3)
            .with_icon("DocumentText")
            .allow_overwrite();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["table_name"], "lv_articles");
        assert_eq!(json["parent_menu_id"], 3);

        let back: GenerateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }
}
