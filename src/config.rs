use std::env;
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "OUTREACH_GITHUB_TOKEN";
pub const BRANCH_ENV: &str = "CIRCLE_BRANCH";

/// Fixed settings of the sync job. Paths are relative to the repository root.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub repo_root: PathBuf,
    pub client_dir: PathBuf,
    pub manifest_name: String,
    pub hjson_name: String,
    pub remote: String,
    pub git_user_name: String,
    pub git_user_email: String,
    pub netrc_machine: String,
    pub netrc_login: String,
}

impl SyncConfig {
    pub fn new<P: AsRef<Path>, C: AsRef<Path>>(repo_root: P, client_dir: C) -> Self {
        Self {
            repo_root: repo_root.as_ref().to_path_buf(),
            client_dir: client_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Manifest path relative to the repository root, as passed to git.
    pub fn manifest_rel_path(&self) -> PathBuf {
        self.client_dir.join(&self.manifest_name)
    }

    pub fn hjson_rel_path(&self) -> PathBuf {
        self.client_dir.join(&self.hjson_name)
    }

    pub fn commit_message(&self) -> String {
        format!(
            "chore: sync {}",
            self.hjson_rel_path().to_string_lossy().replace('\\', "/")
        )
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            client_dir: PathBuf::from("api/clients/node"),
            manifest_name: "package.json".to_string(),
            hjson_name: "package.hjson".to_string(),
            remote: "origin".to_string(),
            git_user_name: "Outreach CI".to_string(),
            git_user_email: "outreach-ci@users.noreply.github.com".to_string(),
            netrc_machine: "github.com".to_string(),
            netrc_login: "outreach-ci".to_string(),
        }
    }
}

/// Values taken from the CI environment, read once at startup.
#[derive(Clone, Default)]
pub struct RunContext {
    pub token: Option<String>,
    pub branch: Option<String>,
    pub home_dir: Option<PathBuf>,
}

impl RunContext {
    pub fn from_env() -> Self {
        Self {
            token: non_empty_var(TOKEN_ENV),
            branch: non_empty_var(BRANCH_ENV),
            home_dir: dirs::home_dir(),
        }
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("branch", &self.branch)
            .field("home_dir", &self.home_dir)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
