use crate::config::SyncConfig;
use std::path::PathBuf;

/// ProjectScannerAgent checks whether the repository ships a Node.js client
pub struct ProjectScannerAgent<'a> {
    config: &'a SyncConfig,
}

impl<'a> ProjectScannerAgent<'a> {
    pub fn new(config: &'a SyncConfig) -> Self {
        Self { config }
    }

    /// Returns the client layout, or `None` when the client directory is absent.
    pub fn locate_client(&self) -> Option<ClientInfo> {
        let client_path = self.config.repo_root.join(&self.config.client_dir);
        if !client_path.is_dir() {
            log::debug!("No client directory at {}", client_path.display());
            return None;
        }

        let hjson_path = client_path.join(&self.config.hjson_name);
        Some(ClientInfo {
            has_hjson: hjson_path.is_file(),
            manifest_rel_path: self.config.manifest_rel_path(),
            client_path,
            hjson_path,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub client_path: PathBuf,
    pub hjson_path: PathBuf,
    /// Manifest path relative to the repository root, as passed to git.
    pub manifest_rel_path: PathBuf,
    pub has_hjson: bool,
}
