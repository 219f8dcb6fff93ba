//! # Project Layout
//!
//! Canonical artifact paths inside the target project, derived purely from a
//! module's names:
//!
//! ```text
//! <backend>/internal/model/<module>.go
//! <backend>/internal/service/<module>.go
//! <backend>/internal/api/v1/<module>.go
//! <backend>/internal/router/router.go          (patched, never written)
//! <frontend>/src/views/<package>/<module>/index.vue
//! <frontend>/src/api/<package>/<module>.ts
//! ```

use lvgen_core::{ArtifactKind, GenResult, ResultExt};
use lvgen_ir::{GenerateConfig, ModuleRegistry};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Router file location relative to the backend root.
pub const DEFAULT_ROUTER_FILE: &str = "internal/router/router.go";

/// Roots of the backend and frontend projects plus the router source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    backend_root: PathBuf,
    frontend_root: PathBuf,
    router_file: PathBuf,
}

impl ProjectLayout {
    pub fn new(backend_root: impl Into<PathBuf>, frontend_root: impl Into<PathBuf>) -> Self {
        let backend_root = backend_root.into();
        Self {
            router_file: backend_root.join(DEFAULT_ROUTER_FILE),
            backend_root,
            frontend_root: frontend_root.into(),
        }
    }

    /// Use a different router file; relative paths resolve against the
    /// backend root.
    pub fn with_router_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.router_file = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.backend_root.join(path)
        };
        self
    }

    pub fn backend_root(&self) -> &Path {
        &self.backend_root
    }

    pub fn frontend_root(&self) -> &Path {
        &self.frontend_root
    }

    pub fn router_file(&self) -> &Path {
        &self.router_file
    }

    pub fn entity_dir(&self) -> PathBuf {
        self.backend_root.join("internal").join("model")
    }

    /// Where an artifact is written. The route snippet has no file of its
    /// own; it is spliced into [`ProjectLayout::router_file`].
    pub fn artifact_path(&self, kind: ArtifactKind, config: &GenerateConfig) -> Option<PathBuf> {
        let module = &config.module_name;
        let package = &config.package_name;
        let internal = self.backend_root.join("internal");
        match kind {
            ArtifactKind::Entity => Some(internal.join("model").join(format!("{module}.go"))),
            ArtifactKind::Service => Some(internal.join("service").join(format!("{module}.go"))),
            ArtifactKind::Handler => Some(
                internal
                    .join("api")
                    .join("v1")
                    .join(format!("{module}.go")),
            ),
            ArtifactKind::Routes => None,
            ArtifactKind::View => Some(
                self.frontend_root
                    .join("src")
                    .join("views")
                    .join(package)
                    .join(module)
                    .join("index.vue"),
            ),
            ArtifactKind::ApiClient => Some(
                self.frontend_root
                    .join("src")
                    .join("api")
                    .join(package)
                    .join(format!("{module}.ts")),
            ),
        }
    }

    /// Every written artifact with its path, in write order.
    pub fn planned_files(&self, config: &GenerateConfig) -> Vec<(ArtifactKind, PathBuf)> {
        ArtifactKind::ALL
            .iter()
            .filter_map(|kind| self.artifact_path(*kind, config).map(|p| (*kind, p)))
            .collect()
    }

    /// Discover already-generated modules by reading the `TableName()` of
    /// every entity source. A missing entity directory means no modules.
    pub fn scan_modules(&self) -> GenResult<ModuleRegistry> {
        let mut registry = ModuleRegistry::new();
        let dir = self.entity_dir();
        if !dir.is_dir() {
            return Ok(registry);
        }

        let table_name = Regex::new(
            r#"func\s*\(\s*(?:\w+\s+)?\*?\w+\s*\)\s*TableName\s*\(\s*\)\s*string\s*\{\s*return\s+"([^"]+)""#,
        )
        .with_context("entity scan")?;

        for entry in WalkDir::new(&dir).max_depth(1).sort_by_file_name() {
            let entry = entry.read_context(&dir)?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "go") {
                continue;
            }
            let Some(module) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            // Only the ASCII TableName() body matters; stray bytes elsewhere are tolerated.
            let bytes = std::fs::read(path).read_context(path)?;
            let source = String::from_utf8_lossy(&bytes);
            if let Some(caps) = table_name.captures(&source) {
                registry.insert(module, &caps[1]);
            }
        }

        tracing::debug!(dir = %dir.display(), modules = registry.len(), "existing modules scanned");
        Ok(registry)
    }
}

// ============================================================================
// Tests
// ============================================================================
