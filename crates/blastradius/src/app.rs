//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that opens the configured graph store
//! and provides a context for executing CLI commands.
//!
//! # Example
//!
//! ```no_run
//! use blastradius::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     // Execute commands using app...
//!     Ok(())
//! }
//! ```

use crate::commands::init::{BLASTRADIUS_DIR_NAME, CONFIG_FILE_NAME, find_blastradius_root};
use crate::config::BlastradiusConfig;
use crate::error::{ConfigError, Result};
use crate::storage::{GraphStore, create_store};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application context for CLI operations.
///
/// The store is opened from the workspace configuration on creation and
/// lent to each operation; nothing holds it globally.
pub struct App {
    /// The store backend (trait object for polymorphism)
    store: Box<dyn GraphStore>,

    /// Path to the `.blastradius` directory
    blastradius_dir: PathBuf,

    /// Backend name from configuration
    backend: &'static str,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("blastradius_dir", &self.blastradius_dir)
            .field("backend", &self.backend)
            .field("store", &"<dyn GraphStore>")
            .finish()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for `.blastradius/`, loads the
    /// configuration and opens the store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No workspace is found in the directory tree
    /// - Configuration cannot be loaded
    /// - The store cannot be opened
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_blastradius_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let blastradius_dir = root_dir.join(BLASTRADIUS_DIR_NAME);
        let config = BlastradiusConfig::load(&blastradius_dir.join(CONFIG_FILE_NAME)).await?;

        let backend = config.to_backend(&root_dir)?;
        let name = backend.name();
        debug!(backend = name, root = %root_dir.display(), "Opening graph store");
        let store = create_store(backend).await?;

        Ok(Self {
            store,
            blastradius_dir,
            backend: name,
        })
    }

    /// Get a mutable reference to the store.
    pub fn store_mut(&mut self) -> &mut dyn GraphStore {
        self.store.as_mut()
    }

    /// Get an immutable reference to the store.
    #[must_use]
    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    /// Name of the configured backend.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Get the path to the `.blastradius` directory.
    #[must_use]
    pub fn blastradius_dir(&self) -> &Path {
        &self.blastradius_dir
    }

    /// Save store state to persistent storage.
    ///
    /// This should be called after any mutating operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub async fn save(&self) -> Result<()> {
        Ok(self.store.save().await?)
    }
}
