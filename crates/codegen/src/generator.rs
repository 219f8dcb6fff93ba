//! # Generation Pipeline
//!
//! The `Generator` drives one table through every stage and owns the run's
//! state machine and commit journal.
//!
//! ## Pipeline
//!
//! ```text
//! GenerateRequest
//!         │
//!         ├──► Introspector::list_columns()     Idle → SchemaFetched
//!         ├──► InferenceEngine::infer_all()     → ColumnsInferred
//!         ├──► reconcile() + module uniqueness  → ConfigBuilt
//!         ├──► Renderer::render()               → ArtifactsRendered
//!         ├──► FileSynthesizer::write() × 5     → FilesWritten
//!         ├──► RouterPatcher::patch()           → RouterPatched
//!         ├──► MenuRegistrar::register()        → MenuRegistered
//!         ▼
//!   GenerateResult                              → Done
//! ```
//!
//! The first failing stage moves the run to `Failed(stage)`; nothing after
//! it executes. Under [`RollbackPolicy::Compensate`], the default, the
//! journal is then undone newest first. [`RollbackPolicy::Keep`] restores the
//! plain behaviour of leaving partial output on disk; earlier side effects
//! stay in place and are reported through the partial result.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let generator = Generator::new(introspector, layout, registrar)?;
//! let config = generator.builder_for("lv_articles").await?.build()?;
//!
//! match generator.generate(GenerateRequest::new(config)).await {
//!     Ok(result) => println!("{}", result.message),
//!     Err(failure) => eprintln!("{} ({:?})", failure, failure.partial.written_paths),
//! }
//! ```

use lvgen_core::{ArtifactKind, GenError, GenResult, RunState, Stage, TableInfo};
use lvgen_ir::{
    ColumnInfo, ConfigBuilder, GenerateConfig, GenerateRequest, GenerateResult, InferenceEngine,
    NamingRules, reconcile,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Instrument;

use crate::introspect::Introspector;
use crate::journal::{Journal, JournalEntry};
use crate::layout::ProjectLayout;
use crate::menu::{MenuRegistrar, menu_record};
use crate::render::{RenderedModule, Renderer};
use crate::router::{PatchOutcome, RouterPatcher};
use crate::synth::FileSynthesizer;

// ============================================================================
// Policy and failure
// ============================================================================

/// What happens to committed side effects when a later stage fails.
///
/// Defaults to `Compensate`. Settings spell it `rollback = "keep"` and the
/// CLI `--keep-partial`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackPolicy {
    /// Undo the journal in reverse order.
    #[default]
    Compensate,
    /// Leave everything on disk for the operator.
    Keep,
}

/// A run that stopped before `Done`.
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct GenerateFailure {
    /// The stage that failed
    pub stage: Stage,
    #[source]
    pub error: GenError,
    /// What had been committed when the stage failed
    pub partial: GenerateResult,
    /// True when every journaled side effect was undone
    pub rolled_back: bool,
    /// Journal entries that could not be undone
    pub compensation_failures: Vec<String>,
}

impl GenerateFailure {
    pub fn kind(&self) -> lvgen_core::ErrorKind {
        self.error.kind()
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Runs the generation pipeline against one project.
///
/// A failed run rolls back its own side effects unless the generator was
/// built `with_rollback(RollbackPolicy::Keep)`.
#[derive(Debug, Clone)]
pub struct Generator {
    introspector: Introspector,
    inference: InferenceEngine,
    naming: NamingRules,
    renderer: Renderer,
    layout: ProjectLayout,
    menus: MenuRegistrar,
    rollback: RollbackPolicy,
}

impl Generator {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Generator with the compiled-in templates and default rules.
    pub fn new(introspector: Introspector, layout: ProjectLayout, menus: MenuRegistrar) -> GenResult<Self> {
        Ok(Self {
            introspector,
            inference: InferenceEngine::default(),
            naming: NamingRules::default(),
            renderer: Renderer::builtin()?,
            layout,
            menus,
            rollback: RollbackPolicy::default(),
        })
    }

    pub fn with_inference(mut self, inference: InferenceEngine) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_naming(mut self, naming: NamingRules) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_rollback(mut self, rollback: RollbackPolicy) -> Self {
        self.rollback = rollback;
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn rollback(&self) -> RollbackPolicy {
        self.rollback
    }

    // ====================================================================
    // Read-only operations
    // ====================================================================

    pub async fn list_tables(&self) -> GenResult<Vec<TableInfo>> {
        self.introspector.list_tables().await
    }

    /// Live columns of a table with inferred attributes.
    pub async fn list_columns(&self, table: &str) -> GenResult<Vec<ColumnInfo>> {
        let raw = self.introspector.list_columns(table).await?;
        Ok(self.inference.infer_all(&raw))
    }

    /// A config builder seeded with the live table and its inferred columns.
    pub async fn builder_for(&self, table: &str) -> GenResult<ConfigBuilder> {
        let info = self.introspector.table(table).await?;
        let columns = self.list_columns(table).await?;
        Ok(ConfigBuilder::new(info, columns).naming(self.naming.clone()))
    }

    /// Render every artifact without writing anything. The config is
    /// reconciled against the live table first, exactly as `generate` does.
    pub async fn preview(&self, config: GenerateConfig) -> GenResult<RenderedModule> {
        let live = self.list_columns(&config.table_name).await?;
        let config = reconcile(config, &live)?;
        self.renderer.render(&config)
    }

    /// Render a config with no database at hand. The config's own columns
    /// stand in for the live table.
    pub fn preview_offline(&self, config: GenerateConfig) -> GenResult<RenderedModule> {
        render_offline(&self.renderer, config)
    }

    // ====================================================================
    // Generation
    // ====================================================================

    /// Run the full pipeline for one request.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResult, GenerateFailure> {
        let span = tracing::info_span!(
            "generate",
            table = %request.config.table_name,
            module = %request.config.module_name,
        );
        let mut run = Run::default();

        let outcome = self.execute(request, &mut run).instrument(span.clone()).await;
        match outcome {
            Ok(()) => {
                run.state = RunState::Done;
                Ok(run.result)
            }
            Err(error) => self.fail(run, error).instrument(span).await,
        }
    }

    async fn execute(&self, request: GenerateRequest, run: &mut Run) -> GenResult<()> {
        let raw = self.introspector.list_columns(&request.config.table_name).await?;
        run.advance();
        tracing::info!(columns = raw.len(), "schema fetched");

        let live = self.inference.infer_all(&raw);
        run.advance();
        tracing::info!(
            query = live.iter().filter(|c| c.is_query).count(),
            form = live.iter().filter(|c| c.is_form).count(),
            "columns inferred",
        );

        let config = reconcile(request.config.clone(), &live)?;
        let registry = self.layout.scan_modules()?;
        registry.ensure_available(&config)?;
        if registry.table_for(&config.module_name).is_some() {
            tracing::warn!(
                module = %config.module_name,
                "module was generated before; menu entries are not deduplicated",
            );
        }
        let request = GenerateRequest { config, ..request };
        let config = &request.config;
        run.advance();
        tracing::info!(
            soft_delete = config.has_soft_delete,
            columns = config.columns.len(),
            "config built",
        );

        let rendered = self.renderer.render(config)?;
        run.advance();
        tracing::info!(bytes = rendered.total_bytes(), "artifacts rendered");

        let synth = FileSynthesizer::new(request.overwrite_allowed);
        for (kind, path) in self.layout.planned_files(config) {
            let content = artifact(&rendered, kind)?;
            let written = synth.write(&path, content)?;
            tracing::debug!(
                artifact = %kind,
                path = %path.display(),
                created = written.was_created(),
                "file written",
            );
            run.result.written_paths.push(path);
            run.journal.record(written);
        }
        run.advance();
        tracing::info!(files = run.result.written_paths.len(), "files written");

        let patcher = RouterPatcher::new(self.layout.router_file());
        match patcher.patch(config, artifact(&rendered, ArtifactKind::Routes)?)? {
            PatchOutcome::Patched { original, patched } => {
                run.journal.record(JournalEntry::RouterPatched {
                    path: patcher.path().to_path_buf(),
                    original,
                    patched,
                });
                run.result.router_updated = true;
                run.result.written_paths.push(patcher.path().to_path_buf());
            }
            PatchOutcome::AlreadyRegistered => {}
        }
        run.advance();
        tracing::info!(updated = run.result.router_updated, "router patched");

        let id = self.menus.register(&menu_record(&request)).await?;
        run.journal.record(JournalEntry::MenuCreated { id });
        run.result.menu_id = Some(id);
        run.advance();

        run.result.success = true;
        run.result.message = format!(
            "generated module '{}' from '{}' ({} files, menu #{})",
            config.module_name,
            config.table_name,
            run.result.written_paths.len(),
            id,
        );
        tracing::info!(menu_id = id, "generation complete");
        Ok(())
    }

    async fn fail(&self, mut run: Run, error: GenError) -> Result<GenerateResult, GenerateFailure> {
        let stage = run.current_stage();
        run.state = RunState::Failed(stage);
        run.result.success = false;
        run.result.message = error.to_string();
        tracing::warn!(
            %stage,
            kind = error.kind().as_str(),
            error = %error,
            committed = run.journal.len(),
            "generation failed",
        );

        let mut failure = GenerateFailure {
            stage,
            error,
            partial: run.result,
            rolled_back: false,
            compensation_failures: Vec::new(),
        };

        if self.rollback == RollbackPolicy::Compensate && !run.journal.is_empty() {
            let report = run.journal.compensate(&self.menus).await;
            tracing::warn!(
                undone = report.undone,
                failed = report.failures.len(),
                "side effects compensated",
            );
            failure.rolled_back = report.is_complete();
            failure.compensation_failures = report.failures;
        }

        Err(failure)
    }
}

/// Render without any live schema; shared by the offline CLI mode.
pub fn render_offline(renderer: &Renderer, config: GenerateConfig) -> GenResult<RenderedModule> {
    let own = config.columns.clone();
    renderer.render(&reconcile(config, &own)?)
}

fn artifact(rendered: &RenderedModule, kind: ArtifactKind) -> GenResult<&str> {
    rendered
        .get(kind)
        .ok_or_else(|| GenError::template(kind.key(), "artifact was not rendered"))
}

// ============================================================================
// Run state
// ============================================================================

#[derive(Debug)]
struct Run {
    state: RunState,
    journal: Journal,
    result: GenerateResult,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            state: RunState::Idle,
            journal: Journal::new(),
            result: GenerateResult::default(),
        }
    }
}

impl Run {
    fn advance(&mut self) {
        if let Some(stage) = self.state.next_stage() {
            self.state = RunState::after(stage);
        }
    }

    // Errors are only raised while a stage is in progress.
    fn current_stage(&self) -> Stage {
        self.state.next_stage().unwrap_or(Stage::RegisterMenu)
    }
}

// ============================================================================
// Tests
// ============================================================================
