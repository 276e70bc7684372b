//! Guards for paths that come from the command line.
//!
//! `--path` becomes the working directory of every git command and the root
//! under which `package.hjson` is rewritten, all as the CI user. A typo or a
//! hostile job config pointing it at a system tree would otherwise let the job
//! commit there or overwrite files it happens to have write access to.

use crate::error::{Result, SyncError};
use std::path::{Path, PathBuf};

/// Trees a repository checkout never lives in.
const SYSTEM_DIRS: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

pub struct PathValidator;

impl PathValidator {
    /// Canonicalises a repository root and refuses system directories.
    pub fn validate_project_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            SyncError::ProjectValidation(format!("Invalid path '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(SyncError::ProjectValidation(format!(
                "Path '{}' is not a directory",
                canonical.display()
            )));
        }

        if let Some(system_dir) = Self::system_dir_containing(path, &canonical) {
            return Err(SyncError::ProjectValidation(format!(
                "Refusing to sync inside system directory '{system_dir}'"
            )));
        }

        Ok(canonical)
    }

    /// Ensures an existing file resides inside `base_dir` once symlinks are resolved.
    ///
    /// Absolute file arguments handed to git must not escape the repository,
    /// or `git add` could stage a symlinked file from elsewhere on the runner.
    pub fn validate_file_path(
        file_path: impl AsRef<Path>,
        base_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let file_path = file_path.as_ref();
        let base_dir = base_dir.as_ref();

        let canonical_file = file_path.canonicalize().map_err(|e| {
            SyncError::ProjectValidation(format!(
                "Invalid file path '{}': {e}",
                file_path.display()
            ))
        })?;

        let canonical_base = base_dir.canonicalize().map_err(|e| {
            SyncError::ProjectValidation(format!(
                "Invalid base directory '{}': {e}",
                base_dir.display()
            ))
        })?;

        if !canonical_file.starts_with(&canonical_base) {
            return Err(SyncError::ProjectValidation(format!(
                "'{}' is outside '{}'",
                file_path.display(),
                canonical_base.display()
            )));
        }

        Ok(canonical_file)
    }

    // Checks the path as given and as resolved, since `/etc` may itself be a
    // symlink (macOS points it at `/private/etc`).
    fn system_dir_containing(raw: &Path, canonical: &Path) -> Option<&'static str> {
        SYSTEM_DIRS.iter().copied().find(|dir| {
            let dir = Path::new(dir);
            raw.starts_with(dir)
                || canonical.starts_with(dir)
                || dir
                    .canonicalize()
                    .is_ok_and(|resolved| canonical.starts_with(resolved))
        })
    }
}
