//! # Menu Registrar
//!
//! Creates the navigation entry of a generated module through the injected
//! [`MenuStore`].

use lvgen_core::{GenError, GenResult, MenuKind, MenuRecord, MenuStore, Stage};
use lvgen_ir::GenerateRequest;
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for one menu store call.
pub const DEFAULT_MENU_TIMEOUT: Duration = Duration::from_secs(10);

/// The page entry for a generated module.
pub fn menu_record(request: &GenerateRequest) -> MenuRecord {
    let config = &request.config;
    MenuRecord {
        parent_id: request.parent_menu_id,
        title: config.display_title().to_string(),
        path: config.menu_path(),
        name: config.struct_name.clone(),
        component: format!("{}/index.vue", config.menu_path()),
        icon: request.menu_icon.clone(),
        sort: 0,
        kind: MenuKind::Page,
        permission: String::new(),
        hidden: false,
        keep_alive: true,
    }
}

/// Registers (and, for compensation, removes) menu entries.
#[derive(Clone)]
pub struct MenuRegistrar {
    store: Arc<dyn MenuStore>,
    timeout: Duration,
}

impl std::fmt::Debug for MenuRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuRegistrar")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MenuRegistrar {
    pub fn new(store: Arc<dyn MenuStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_MENU_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create the entry and return its identifier.
    pub async fn register(&self, record: &MenuRecord) -> GenResult<u64> {
        let id = self.bounded(self.store.create(record)).await?;
        tracing::info!(menu_id = id, path = %record.path, parent = record.parent_id, "menu registered");
        Ok(id)
    }

    /// Delete an entry created by [`MenuRegistrar::register`].
    pub async fn remove(&self, id: u64) -> GenResult<()> {
        self.bounded(self.store.delete(id)).await?;
        tracing::info!(menu_id = id, "menu entry removed");
        Ok(())
    }

    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = GenResult<T>>,
    ) -> GenResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e @ GenError::MenuRegistration(_))) => Err(e),
            Ok(Err(e)) => Err(GenError::menu(e.to_string())),
            Err(_) => Err(GenError::Timeout {
                stage: Stage::RegisterMenu,
                after: self.timeout,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
