use crate::error::{Result, SyncError};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes a `.netrc` so that `git push` over HTTPS can authenticate.
pub struct NetrcWriter {
    netrc_path: PathBuf,
}

impl NetrcWriter {
    pub fn in_home<P: AsRef<Path>>(home_dir: P) -> Self {
        Self {
            netrc_path: home_dir.as_ref().join(".netrc"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.netrc_path
    }

    /// A netrc entry is whitespace separated, so the token must be a single word.
    pub fn check_token(token: &str) -> Result<()> {
        if token.contains(char::is_whitespace) {
            return Err(SyncError::Credentials(
                "token must not contain whitespace".to_string(),
            ));
        }
        Ok(())
    }

    /// Overwrites the file with a single machine entry, readable by the owner only.
    pub fn write(&self, machine: &str, login: &str, token: &str) -> Result<()> {
        Self::check_token(token)?;

        let entry = format!("machine {machine} login {login} password {token}");
        fs::write(&self.netrc_path, entry).map_err(|e| {
            SyncError::Credentials(format!("{}: {e}", self.netrc_path.display()))
        })?;

        self.restrict_permissions()
    }

    #[cfg(unix)]
    fn restrict_permissions(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(&self.netrc_path, fs::Permissions::from_mode(0o600)).map_err(|e| {
            SyncError::Credentials(format!(
                "Failed to restrict permissions on {}: {e}",
                self.netrc_path.display()
            ))
        })
    }

    #[cfg(not(unix))]
    fn restrict_permissions(&self) -> Result<()> {
        log::warn!(
            "Cannot restrict permissions on {} on this platform",
            self.netrc_path.display()
        );
        Ok(())
    }
}
