//! Core types used throughout lvgen
//!
//! Small closed vocabularies shared by the IR, the renderer and the pipeline:
//! target field types, form widgets, query operators, artifact kinds and the
//! pipeline's stage/state names.

use serde::{Deserialize, Serialize};

// ============================================================================
// Target Types
// ============================================================================

/// Field type of a generated entity member, inferred from the raw column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Narrow integer
    Int,
    /// Wide integer (`bigint`)
    Int64,
    /// Floating point (`float`, `double`, `decimal`)
    Float64,
    Bool,
    /// Date/time family
    Timestamp,
    /// Everything else
    Text,
}

impl TargetType {
    /// Go spelling of the type, as emitted into entity sources.
    pub fn go_type(&self) -> &'static str {
        match self {
            TargetType::Int => "int",
            TargetType::Int64 => "int64",
            TargetType::Float64 => "float64",
            TargetType::Bool => "bool",
            TargetType::Timestamp => "time.Time",
            TargetType::Text => "string",
        }
    }

    /// Literal used to initialise a browser-side form field of this type.
    pub fn default_literal(&self) -> &'static str {
        match self {
            TargetType::Int | TargetType::Int64 | TargetType::Float64 => "0",
            TargetType::Bool => "false",
            TargetType::Timestamp => "null",
            TargetType::Text => "''",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TargetType::Int | TargetType::Int64 | TargetType::Float64
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, TargetType::Timestamp)
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.go_type())
    }
}

// ============================================================================
// Form Widgets
// ============================================================================

/// Input control used for a column in the generated edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormWidget {
    Text,
    LongText,
    Number,
    Date,
}

impl FormWidget {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormWidget::Text => "text",
            FormWidget::LongText => "long-text",
            FormWidget::Number => "number",
            FormWidget::Date => "date",
        }
    }
}

// ============================================================================
// Query Operators
// ============================================================================

/// How a filterable column is compared against its query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOperator {
    #[default]
    Eq,
    Like,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// The three query modes an operator can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Equality,
    Substring,
    Range,
}

impl QueryOperator {
    pub fn mode(&self) -> QueryMode {
        match self {
            QueryOperator::Eq => QueryMode::Equality,
            QueryOperator::Like => QueryMode::Substring,
            QueryOperator::Gt | QueryOperator::Gte | QueryOperator::Lt | QueryOperator::Lte => {
                QueryMode::Range
            }
        }
    }

    /// SQL comparison token placed between the column and its placeholder.
    pub fn sql(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "=",
            QueryOperator::Like => "LIKE",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "eq",
            QueryOperator::Like => "like",
            QueryOperator::Gt => "gt",
            QueryOperator::Gte => "gte",
            QueryOperator::Lt => "lt",
            QueryOperator::Lte => "lte",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(QueryOperator::Eq),
            "like" => Some(QueryOperator::Like),
            "gt" => Some(QueryOperator::Gt),
            "gte" => Some(QueryOperator::Gte),
            "lt" => Some(QueryOperator::Lt),
            "lte" => Some(QueryOperator::Lte),
            _ => None,
        }
    }
}

// ============================================================================
// Artifact Kinds
// ============================================================================

/// One of the six source units rendered for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Entity,
    Service,
    Handler,
    Routes,
    View,
    ApiClient,
}

impl ArtifactKind {
    /// All kinds, in rendering and writing order.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Entity,
        ArtifactKind::Service,
        ArtifactKind::Handler,
        ArtifactKind::Routes,
        ArtifactKind::View,
        ArtifactKind::ApiClient,
    ];

    /// Stable key used in preview maps and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            ArtifactKind::Entity => "entity",
            ArtifactKind::Service => "service",
            ArtifactKind::Handler => "handler",
            ArtifactKind::Routes => "routes",
            ArtifactKind::View => "view",
            ArtifactKind::ApiClient => "api_client",
        }
    }

    /// File name of the template asset that renders this kind.
    pub fn template_name(&self) -> &'static str {
        match self {
            ArtifactKind::Entity => "entity.go.jinja",
            ArtifactKind::Service => "service.go.jinja",
            ArtifactKind::Handler => "handler.go.jinja",
            ArtifactKind::Routes => "routes.go.jinja",
            ArtifactKind::View => "view.vue.jinja",
            ArtifactKind::ApiClient => "api_client.ts.jinja",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// Pipeline Stages
// ============================================================================

/// A unit of work in one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FetchSchema,
    InferColumns,
    BuildConfig,
    Render,
    WriteFiles,
    PatchRouter,
    RegisterMenu,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FetchSchema => "fetch schema",
            Stage::InferColumns => "infer columns",
            Stage::BuildConfig => "build config",
            Stage::Render => "render",
            Stage::WriteFiles => "write files",
            Stage::PatchRouter => "patch router",
            Stage::RegisterMenu => "register menu",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single generation run.
///
/// ```text
/// Idle → SchemaFetched → ColumnsInferred → ConfigBuilt → ArtifactsRendered
///      → FilesWritten → RouterPatched → MenuRegistered → Done
/// ```
///
/// Any stage failure moves to `Failed(stage)`; nothing advances after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    SchemaFetched,
    ColumnsInferred,
    ConfigBuilt,
    ArtifactsRendered,
    FilesWritten,
    RouterPatched,
    MenuRegistered,
    Done,
    Failed(Stage),
}

impl RunState {
    /// The stage that moves a run out of this state, if any.
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            RunState::Idle => Some(Stage::FetchSchema),
            RunState::SchemaFetched => Some(Stage::InferColumns),
            RunState::ColumnsInferred => Some(Stage::BuildConfig),
            RunState::ConfigBuilt => Some(Stage::Render),
            RunState::ArtifactsRendered => Some(Stage::WriteFiles),
            RunState::FilesWritten => Some(Stage::PatchRouter),
            RunState::RouterPatched => Some(Stage::RegisterMenu),
            RunState::MenuRegistered | RunState::Done | RunState::Failed(_) => None,
        }
    }

    /// State reached once `stage` completes successfully.
    pub fn after(stage: Stage) -> RunState {
        match stage {
            Stage::FetchSchema => RunState::SchemaFetched,
            Stage::InferColumns => RunState::ColumnsInferred,
            Stage::BuildConfig => RunState::ConfigBuilt,
            Stage::Render => RunState::ArtifactsRendered,
            Stage::WriteFiles => RunState::FilesWritten,
            Stage::PatchRouter => RunState::RouterPatched,
            Stage::RegisterMenu => RunState::MenuRegistered,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_type_spelling() {
        assert_eq!(TargetType::Int64.go_type(), "int64");
        assert_eq!(TargetType::Timestamp.to_string(), "time.Time");
        assert_eq!(TargetType::Text.default_literal(), "''");
        assert_eq!(TargetType::Timestamp.default_literal(), "null");
        assert_eq!(TargetType::Bool.default_literal(), "false");
        assert!(TargetType::Float64.is_numeric());
        assert!(!TargetType::Bool.is_numeric());
    }

    #[test]
    fn test_query_operator_modes() {
        assert_eq!(QueryOperator::default(), QueryOperator::Eq);
        assert_eq!(QueryOperator::Like.mode(), QueryMode::Substring);
        assert_eq!(QueryOperator::Gte.mode(), QueryMode::Range);
        assert_eq!(QueryOperator::Lte.sql(), "<=");
        assert_eq!(QueryOperator::parse("gt"), Some(QueryOperator::Gt));
        assert_eq!(QueryOperator::parse("between"), None);
    }

    #[test]
    fn test_artifact_kind_keys() {
        for kind in ArtifactKind::ALL {
            assert_eq!(ArtifactKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ArtifactKind::ApiClient.template_name(), "api_client.ts.jinja");
    }

    #[test]
    fn test_run_state_walks_every_stage() {
        let mut state = RunState::Idle;
        let mut stages = Vec::new();
        while let Some(stage) = state.next_stage() {
            stages.push(stage);
            state = RunState::after(stage);
        }
        assert_eq!(state, RunState::MenuRegistered);
        assert_eq!(stages.len(), 7);
        assert_eq!(stages.first(), Some(&Stage::FetchSchema));
        assert_eq!(stages.last(), Some(&Stage::RegisterMenu));
    }

    #[test]
    fn test_failed_state_is_terminal() {
        let state = RunState::Failed(Stage::PatchRouter);
        assert!(state.is_terminal());
        assert_eq!(state.next_stage(), None);
    }
}
