//! # Template assets
//!
//! One named template per [`ArtifactKind`]. The built-in assets are compiled
//! into the binary; any of them can be replaced by a file of the same name in
//! a template directory (`entity.go.jinja`, `view.vue.jinja`, …).
//!
//! Helpers available inside every template:
//!
//! | Name            | Kind     | Result                                             |
//! |-----------------|----------|----------------------------------------------------|
//! | `upper_camel`   | filter   | `cover_image` → `CoverImage`                       |
//! | `lower_camel`   | filter   | `cover_image` → `coverImage`                       |
//! | `snake`         | filter   | `CoverImage` → `cover_image`                       |
//! | `go_type`       | filter   | target type key → Go type (`timestamp` → `time.Time`) |
//! | `is_auto_field` | function | column is maintained by the persistence layer      |
//! | `default_value` | function | form default literal for a target type             |
//! | `query_op`      | function | SQL comparison for a query operator                |
//! | `query_value`   | function | bound value, wrapped in `%` for substring matches  |
//! | `gorm_tag`      | function | `column:…;comment:…;unique` tag body               |
//! | `line_comment`  | function | ` // comment`, or nothing for an empty comment     |

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use lvgen_core::{ArtifactKind, GenError, GenResult, QueryMode, QueryOperator, ResultExt, TargetType};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Built-in assets
// ============================================================================

const ENTITY_TEMPLATE: &str = include_str!("../templates/entity.go.jinja");
const SERVICE_TEMPLATE: &str = include_str!("../templates/service.go.jinja");
const HANDLER_TEMPLATE: &str = include_str!("../templates/handler.go.jinja");
const ROUTES_TEMPLATE: &str = include_str!("../templates/routes.go.jinja");
const VIEW_TEMPLATE: &str = include_str!("../templates/view.vue.jinja");
const API_CLIENT_TEMPLATE: &str = include_str!("../templates/api_client.ts.jinja");

fn builtin_source(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Entity => ENTITY_TEMPLATE,
        ArtifactKind::Service => SERVICE_TEMPLATE,
        ArtifactKind::Handler => HANDLER_TEMPLATE,
        ArtifactKind::Routes => ROUTES_TEMPLATE,
        ArtifactKind::View => VIEW_TEMPLATE,
        ArtifactKind::ApiClient => API_CLIENT_TEMPLATE,
    }
}

// ============================================================================
// TemplateSet
// ============================================================================

/// Template source for every artifact kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    sources: BTreeMap<ArtifactKind, String>,
    overridden: Vec<ArtifactKind>,
}

impl TemplateSet {
    /// The compiled-in templates.
    pub fn builtin() -> Self {
        Self {
            sources: ArtifactKind::ALL
                .iter()
                .map(|kind| (*kind, builtin_source(*kind).to_string()))
                .collect(),
            overridden: Vec::new(),
        }
    }

    /// Built-in templates, with each one replaced by `dir/<template name>`
    /// when such a file exists.
    pub fn with_overrides_from(dir: &Path) -> GenResult<Self> {
        let mut set = Self::builtin();
        if !dir.is_dir() {
            return Err(GenError::config(format!(
                "template directory '{}' does not exist",
                dir.display()
            )));
        }

        for kind in ArtifactKind::ALL {
            let path = dir.join(kind.template_name());
            if !path.is_file() {
                continue;
            }
            let source = std::fs::read_to_string(&path).read_context(&path)?;
            tracing::debug!(artifact = %kind, path = %path.display(), "template override loaded");
            set = set.with_template(kind, source);
        }
        Ok(set)
    }

    /// Replace the template of one artifact kind.
    pub fn with_template(mut self, kind: ArtifactKind, source: impl Into<String>) -> Self {
        self.sources.insert(kind, source.into());
        if !self.overridden.contains(&kind) {
            self.overridden.push(kind);
        }
        self
    }

    pub fn source(&self, kind: ArtifactKind) -> &str {
        self.sources
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| builtin_source(kind))
    }

    pub fn is_overridden(&self, kind: ArtifactKind) -> bool {
        self.overridden.contains(&kind)
    }

    /// Compile every template into a rendering environment.
    ///
    /// # Errors
    ///
    /// `GenError::Template` naming the first artifact whose template does not
    /// parse.
    pub fn compile(&self) -> GenResult<Environment<'static>> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        register_helpers(&mut env);

        for kind in ArtifactKind::ALL {
            env.add_template_owned(kind.template_name(), self.source(kind).to_string())
                .map_err(|e| GenError::template(kind.key(), e.to_string()))?;
        }
        Ok(env)
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn register_helpers(env: &mut Environment<'static>) {
    env.add_filter("upper_camel", upper_camel);
    env.add_filter("lower_camel", lower_camel);
    env.add_filter("snake", snake);
    env.add_filter("go_type", go_type);

    env.add_function("is_auto_field", is_auto_field);
    env.add_function("default_value", default_value);
    env.add_function("query_op", query_op);
    env.add_function("query_value", query_value);
    env.add_function("gorm_tag", gorm_tag);
    env.add_function("line_comment", line_comment);
}

fn upper_camel(value: String) -> String {
    value.to_upper_camel_case()
}

fn lower_camel(value: String) -> String {
    value.to_lower_camel_case()
}

fn snake(value: String) -> String {
    value.to_snake_case()
}

fn parse_target_type(key: &str) -> Result<TargetType, minijinja::Error> {
    serde_json::from_value(serde_json::Value::String(key.to_string())).map_err(|_| {
        minijinja::Error::new(
            minijinja::ErrorKind::InvalidOperation,
            format!("unknown target type '{}'", key),
        )
    })
}

fn parse_operator(key: &str) -> Result<QueryOperator, minijinja::Error> {
    QueryOperator::parse(key).ok_or_else(|| {
        minijinja::Error::new(
            minijinja::ErrorKind::InvalidOperation,
            format!("unknown query operator '{}'", key),
        )
    })
}

fn go_type(target_type: String) -> Result<String, minijinja::Error> {
    Ok(parse_target_type(&target_type)?.go_type().to_string())
}

fn is_auto_field(column_name: String) -> bool {
    lvgen_ir::is_auto_field(&column_name)
}

fn default_value(target_type: String) -> Result<String, minijinja::Error> {
    Ok(parse_target_type(&target_type)?.default_literal().to_string())
}

fn query_op(operator: String) -> Result<String, minijinja::Error> {
    Ok(parse_operator(&operator)?.sql().to_string())
}

fn query_value(wire_field: String, operator: String) -> Result<String, minijinja::Error> {
    Ok(match parse_operator(&operator)?.mode() {
        QueryMode::Substring => format!("\"%\"+{}+\"%\"", wire_field),
        QueryMode::Equality | QueryMode::Range => wire_field,
    })
}

fn gorm_tag(column_name: String, comment: String, key_flag: String) -> String {
    let mut parts = vec![format!("column:{}", column_name)];
    if !comment.is_empty() {
        parts.push(format!("comment:{}", comment.replace(['"', '`', ';'], " ")));
    }
    if key_flag.eq_ignore_ascii_case("UNI") {
        parts.push("unique".to_string());
    }
    parts.join(";")
}

fn line_comment(comment: String) -> String {
    let comment = comment.lines().next().unwrap_or_default().trim();
    if comment.is_empty() {
        String::new()
    } else {
        format!(" // {}", comment)
    }
}

// ============================================================================
// Tests
// ============================================================================
