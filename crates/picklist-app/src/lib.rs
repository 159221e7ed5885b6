use anyhow::{Context, Result, anyhow, bail};
use picklist_core::config::{PicklistConfig, load_config, resolve_config_path};
use picklist_core::ingest::load_tasks;
use picklist_core::record::PickingTask;
use picklist_core::title_store::TitleStore;

pub mod session;

pub use session::{ChangeEvent, PersistResolution, PickingSession, ScanOutcome, StatusUpdate};

/// Resolves, loads, and validates the config, with operator-facing messages
/// for the missing and invalid cases.
pub fn ensure_config_ready() -> Result<PicklistConfig> {
    let config_path = resolve_config_path().context("failed to resolve config path")?;

    if !config_path.exists() {
        bail!(
            "missing config at {}\nCreate ~/.config/picklist/config.toml and see README.md for setup instructions.",
            config_path.display()
        );
    }

    load_config(&config_path).map_err(|error| {
        anyhow!(
            "invalid config at {}: {error}\nFix the config and retry. See README.md for setup instructions.",
            config_path.display()
        )
    })
}

pub struct App<'a> {
    pub store: &'a dyn TitleStore,
}

impl<'a> App<'a> {
    pub fn new(store: &'a dyn TitleStore) -> Self {
        Self { store }
    }

    /// Fetches the title export and returns it as a coordinate-ordered task list.
    pub fn load(&self) -> Result<Vec<PickingTask>> {
        Ok(load_tasks(self.store)?)
    }

    /// Writes a single status change back to the title store.
    pub fn persist(&self, update: &StatusUpdate) -> Result<()> {
        self.store
            .update_status(&update.barcode, update.status)
            .with_context(|| format!("failed to persist status for barcode '{}'", update.barcode))
    }
}
