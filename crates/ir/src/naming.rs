//! Naming derivation for generated modules
//!
//! `module_name`, `package_name` and `struct_name` are pure functions of the
//! table name and the [`NamingRules`]:
//!
//! ```text
//! lv_articles     → package "biz",  module "article",  struct "Article"
//! lv_blog_posts   → package "blog", module "post",     struct "Post"
//! lv_shop_order_items → package "shop", module "orderItem", struct "OrderItem"
//! ```

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use lvgen_core::{GenError, GenResult};
use serde::{Deserialize, Serialize};

/// Settings that steer name derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingRules {
    /// Prefix stripped from table names before deriving anything
    pub table_prefix: String,
    /// Package used when the table name has a single segment
    pub default_package: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            table_prefix: "lv_".into(),
            default_package: "biz".into(),
        }
    }
}

/// The three derived names of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNames {
    pub module_name: String,
    pub package_name: String,
    pub struct_name: String,
}

impl ModuleNames {
    /// Derive names from a table name.
    pub fn derive(table_name: &str, rules: &NamingRules) -> GenResult<Self> {
        if !is_table_name(table_name) {
            return Err(GenError::config(format!(
                "invalid table name '{}': expected letters, digits and underscores",
                table_name
            )));
        }

        let stripped = table_name
            .strip_prefix(rules.table_prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(table_name);

        let segments: Vec<String> = stripped
            .split('_')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .collect();

        let (package_name, mut words) = match segments.split_first() {
            Some((first, rest)) if !rest.is_empty() => (first.clone(), rest.to_vec()),
            _ => (rules.default_package.clone(), segments.clone()),
        };

        if let Some(last) = words.last_mut() {
            *last = singularize(last);
        }
        let joined = words.join("_");

        Ok(Self {
            module_name: joined.to_lower_camel_case(),
            package_name,
            struct_name: joined.to_upper_camel_case(),
        })
    }
}

/// Naive English singular form, good enough for table names.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    for suffix in ["sses", "xes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

/// Letters, digits and underscores, not starting with a digit.
pub fn is_table_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An identifier usable as a Go variable/package segment: ASCII letter first,
/// then letters and digits.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric())
}

// ============================================================================
// Tests
// ============================================================================
