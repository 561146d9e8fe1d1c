//! Implementation of the `init` command.
//!
//! This module handles initialization of a new blastradius workspace, creating
//! the `.blastradius/` directory with configuration and an empty graph file.

use crate::config::BlastradiusConfig;
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the workspace directory
pub const BLASTRADIUS_DIR_NAME: &str = ".blastradius";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the graph data file
pub const GRAPH_FILE_NAME: &str = "graph.jsonl";

/// Backend written by `init` when none is given
pub const DEFAULT_BACKEND: &str = "jsonl";

/// Maximum directory depth to traverse when searching for the workspace root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created `.blastradius` directory
    pub blastradius_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created graph file
    pub graph_file: PathBuf,
    /// Backend written to the config
    pub backend: String,
}

/// Initialize a new workspace in the given directory.
///
/// # Errors
///
/// Returns an error if:
/// - The `.blastradius/` directory already exists
/// - The backend name is unknown
/// - File system operations fail
pub async fn init(base_dir: &Path, backend: Option<&str>) -> Result<InitResult> {
    let backend = backend.unwrap_or(DEFAULT_BACKEND).trim();
    if !matches!(backend, "memory" | "jsonl" | "neo4j") {
        return Err(ConfigError::UnknownBackend(backend.to_string()).into());
    }

    let blastradius_dir = base_dir.join(BLASTRADIUS_DIR_NAME);
    if blastradius_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(blastradius_dir).into());
    }

    fs::create_dir_all(&blastradius_dir).await?;

    let config_file = blastradius_dir.join(CONFIG_FILE_NAME);
    BlastradiusConfig::new(backend).save(&config_file).await?;

    let graph_file = blastradius_dir.join(GRAPH_FILE_NAME);
    fs::write(&graph_file, "").await?;

    Ok(InitResult {
        blastradius_dir,
        config_file,
        graph_file,
        backend: backend.to_string(),
    })
}

/// Check if a directory has been initialized.
///
/// Returns `true` if the `.blastradius/` directory exists.
#[must_use]
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(BLASTRADIUS_DIR_NAME).exists()
}

/// Find the workspace root by searching up the directory tree.
///
/// Returns the directory containing `.blastradius/`, or `None` if none is
/// found within [`MAX_TRAVERSAL_DEPTH`] levels.
#[must_use]
pub fn find_blastradius_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(BLASTRADIUS_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_directory_structure() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None).await.unwrap();

        assert!(result.blastradius_dir.exists());
        assert!(result.config_file.exists());
        assert!(result.graph_file.exists());
        assert_eq!(result.backend, DEFAULT_BACKEND);
    }

    #[rstest]
    #[case::memory("memory")]
    #[case::jsonl("jsonl")]
    #[case::neo4j("neo4j")]
    #[tokio::test]
    async fn test_init_writes_backend(#[case] backend: &str) {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), Some(backend)).await.unwrap();

        let config = BlastradiusConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config.store.backend, backend);
    }

    #[tokio::test]
    async fn test_init_rejects_unknown_backend() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), Some("sqlite")).await;

        assert!(result.is_err());
        assert!(!is_initialized(temp_dir.path()));
    }

    #[tokio::test]
    async fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();

        init(temp_dir.path(), None).await.unwrap();
        let result = init(temp_dir.path(), None).await;

        let err_msg = result.unwrap_err().to_string().to_lowercase();
        assert!(err_msg.contains("already initialized"));
    }

    #[tokio::test]
    async fn test_init_creates_empty_graph_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None).await.unwrap();

        let content = tokio::fs::read_to_string(&result.graph_file).await.unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_is_initialized_false() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!is_initialized(temp_dir.path()));
    }

    #[test]
    fn test_find_root_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join(BLASTRADIUS_DIR_NAME)).unwrap();
        let sub_dir = temp_dir.path().join("sub").join("nested");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let found = find_blastradius_root(&sub_dir);
        assert_eq!(found, Some(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_root_not_found() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_blastradius_root(temp_dir.path()).is_none());
    }
}
