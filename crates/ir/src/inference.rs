//! # Inference Engine
//!
//! Pure, deterministic mapping from raw column metadata to generation
//! attributes. No I/O happens here; the same [`RawColumn`] always yields the
//! same [`ColumnInfo`] for a given set of [`QueryFieldRules`].
//!
//! | Attribute     | Rule                                                        |
//! |---------------|-------------------------------------------------------------|
//! | `target_type` | integer family (wide if `big`), float family, bool, date/time, else text |
//! | `form_widget` | name has `content`/`desc`/`remark` → long text; numeric → number; temporal → date |
//! | `is_query`    | [`QueryFieldRules`] match, never for auto columns           |
//! | `is_list`     | every non-auto column                                       |
//! | `is_form`     | every non-auto column                                       |

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use lvgen_core::{FormWidget, QueryOperator, RawColumn, TargetType};
use serde::{Deserialize, Serialize};

use crate::column::ColumnInfo;

// ============================================================================
// Auto-managed columns
// ============================================================================

/// Columns maintained by the persistence layer itself.
pub const AUTO_FIELDS: [&str; 4] = ["id", "created_at", "updated_at", "deleted_at"];

/// Name of the soft-delete marker column.
pub const SOFT_DELETE_COLUMN: &str = "deleted_at";

pub fn is_auto_field(column_name: &str) -> bool {
    AUTO_FIELDS.contains(&column_name)
}

// ============================================================================
// Type mapping
// ============================================================================

const INTEGER_FAMILY: [&str; 9] = [
    "tinyint",
    "smallint",
    "mediumint",
    "int",
    "integer",
    "bigint",
    "serial",
    "smallserial",
    "bigserial",
];

const FLOAT_FAMILY: [&str; 5] = ["float", "double", "decimal", "numeric", "real"];

const TEMPORAL_FAMILY: [&str; 5] = ["date", "datetime", "timestamp", "time", "year"];

/// Map a declared column type to the entity field type.
///
/// Only the base type name counts: width, precision and modifiers such as
/// `unsigned` are ignored (`int(11) unsigned` is an `int`).
pub fn map_type(raw_type: &str) -> TargetType {
    let lowered = raw_type.trim().to_ascii_lowercase();
    let base = lowered
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    if INTEGER_FAMILY.contains(&base) {
        if base.contains("big") {
            TargetType::Int64
        } else {
            TargetType::Int
        }
    } else if FLOAT_FAMILY.contains(&base) || base.starts_with("double") {
        TargetType::Float64
    } else if base.contains("bool") {
        TargetType::Bool
    } else if TEMPORAL_FAMILY.contains(&base) || base.starts_with("timestamp") {
        TargetType::Timestamp
    } else {
        TargetType::Text
    }
}

/// Pick the edit-form widget for a column.
pub fn infer_widget(column_name: &str, target: TargetType) -> FormWidget {
    let name = column_name.to_ascii_lowercase();
    if ["content", "desc", "remark"].iter().any(|k| name.contains(k)) {
        FormWidget::LongText
    } else if target.is_numeric() {
        FormWidget::Number
    } else if target.is_temporal() {
        FormWidget::Date
    } else {
        FormWidget::Text
    }
}

// ============================================================================
// Query field rules
// ============================================================================

/// Allow/deny lists deciding which columns become list filters.
///
/// The defaults reproduce the classic heuristic: `name`, `title`, `status`,
/// or anything containing `name`. `deny` always wins, so accidental matches
/// such as `username` can be switched off without losing the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFieldRules {
    /// Column names matched exactly
    pub exact: Vec<String>,
    /// Substrings matched anywhere in the column name
    pub contains: Vec<String>,
    /// Column names never used as filters
    pub deny: Vec<String>,
}

impl Default for QueryFieldRules {
    fn default() -> Self {
        Self {
            exact: vec!["name".into(), "title".into(), "status".into()],
            contains: vec!["name".into()],
            deny: Vec::new(),
        }
    }
}

impl QueryFieldRules {
    pub fn is_query_field(&self, column_name: &str) -> bool {
        if self.deny.iter().any(|d| d == column_name) {
            return false;
        }
        self.exact.iter().any(|e| e == column_name)
            || self
                .contains
                .iter()
                .any(|c| !c.is_empty() && column_name.contains(c.as_str()))
    }
}

// ============================================================================
// InferenceEngine
// ============================================================================

/// Stateless column inference, parameterised only by its query rules.
#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    rules: QueryFieldRules,
}

impl InferenceEngine {
    pub fn new(rules: QueryFieldRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &QueryFieldRules {
        &self.rules
    }

    /// Infer generation attributes for one column.
    pub fn infer(&self, raw: &RawColumn) -> ColumnInfo {
        let target_type = map_type(&raw.raw_type);
        let auto = is_auto_field(&raw.name);

        ColumnInfo {
            column_name: raw.name.clone(),
            raw_type: raw.raw_type.clone(),
            comment: raw.comment.clone(),
            nullable: raw.nullable,
            key_flag: raw.key_flag.clone(),
            extra: raw.extra.clone(),
            field_name: raw.name.to_upper_camel_case(),
            target_type,
            wire_field: raw.name.to_lower_camel_case(),
            form_widget: infer_widget(&raw.name, target_type),
            query_operator: QueryOperator::Eq,
            is_query: !auto && self.rules.is_query_field(&raw.name),
            is_list: !auto,
            is_form: !auto,
        }
    }

    /// Infer every column, preserving input (ordinal) order.
    pub fn infer_all(&self, raws: &[RawColumn]) -> Vec<ColumnInfo> {
        raws.iter().map(|raw| self.infer(raw)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
