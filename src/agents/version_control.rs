use crate::error::{Result, SyncError};
use crate::utils::path_validator::PathValidator;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// The git operations the sync job depends on.
///
/// Mutating calls return the command's trimmed stdout so callers can echo it.
pub trait VersionControl {
    /// Zero-context diff of `file` in the `HEAD` commit, without the commit header.
    fn diff_added_lines(&self, file: &Path) -> Result<String>;

    fn configure_identity(&self, name: &str, email: &str) -> Result<Vec<String>>;

    fn stage(&self, file: &Path) -> Result<String>;

    fn commit(&self, message: &str) -> Result<String>;

    /// Pushes `HEAD` to `branch` on `remote`.
    fn push(&self, remote: &str, branch: &str) -> Result<String>;
}

/// Rejects branch names that git would read as an option or split into several arguments.
pub fn check_branch_name(branch: &str) -> Result<()> {
    if branch.starts_with('-') || branch.contains(char::is_whitespace) {
        return Err(SyncError::GitOperation(format!(
            "Refusing to push to suspicious branch name '{branch}'"
        )));
    }
    Ok(())
}

/// GitAgent shells out to the `git` binary with hardened input validation.
pub struct GitAgent {
    project_path: PathBuf,
}

impl GitAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Result<Self> {
        let project_path = Self::validate_git_path(project_path.as_ref())?;
        Ok(Self { project_path })
    }

    fn run_git(&self, args: &[&str]) -> Result<Output> {
        log::debug!("Running git {}", args.join(" "));
        Command::new("git")
            .current_dir(&self.project_path)
            .args(args)
            .output()
            .map_err(|e| {
                SyncError::GitOperation(format!(
                    "Failed to execute git command '{}': {e}",
                    args.join(" ")
                ))
            })
    }

    fn run_checked(&self, args: &[&str], command: &str) -> Result<String> {
        let output = self.run_git(args)?;
        Self::ensure_success(&output, command)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn ensure_success(output: &Output, command: &str) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        Err(SyncError::GitOperation(format!(
            "{} failed: {}",
            command,
            String::from_utf8_lossy(&output.stderr)
        )))
    }

    fn validate_git_path(path: &Path) -> Result<PathBuf> {
        let dangerous = [';', '|', '&', '$', '`', '\n', '\r'];
        let path_str = path.to_string_lossy();
        if let Some(ch) = dangerous.iter().find(|c| path_str.contains(**c)) {
            return Err(SyncError::GitOperation(format!(
                "Path contains dangerous character: '{}'",
                ch
            )));
        }

        PathValidator::validate_project_path(path)
            .map_err(|err| SyncError::GitOperation(format!("Invalid Git path: {}", err)))
    }

    fn path_arg(&self, file: &Path) -> Result<String> {
        let relative = if file.is_absolute() {
            let canonical = PathValidator::validate_file_path(file, &self.project_path)
                .map_err(|err| {
                    SyncError::GitOperation(format!("Refusing to use unsafe path: {err}"))
                })?;
            canonical
                .strip_prefix(&self.project_path)
                .map(Path::to_path_buf)
                .unwrap_or(canonical)
        } else {
            file.to_path_buf()
        };

        Ok(relative.to_string_lossy().replace('\\', "/"))
    }
}

impl VersionControl for GitAgent {
    fn diff_added_lines(&self, file: &Path) -> Result<String> {
        let file = self.path_arg(file)?;
        let output = self.run_git(&[
            "show",
            "--pretty=format:",
            "--unified=0",
            "HEAD",
            "--",
            &file,
        ])?;
        Self::ensure_success(&output, "git show")?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn configure_identity(&self, name: &str, email: &str) -> Result<Vec<String>> {
        Ok(vec![
            self.run_checked(&["config", "user.name", name], "git config user.name")?,
            self.run_checked(&["config", "user.email", email], "git config user.email")?,
        ])
    }

    fn stage(&self, file: &Path) -> Result<String> {
        let file = self.path_arg(file)?;
        self.run_checked(&["add", "--", &file], "git add")
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.run_checked(&["commit", "-m", message], "git commit")
    }

    fn push(&self, remote: &str, branch: &str) -> Result<String> {
        check_branch_name(branch)?;

        let refspec = format!("HEAD:{branch}");
        self.run_checked(&["push", remote, &refspec], "git push")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rejects_dangerous_paths() {
        let dir = tempdir().unwrap();
        let dangerous = dir.path().join("sub;dir");
        fs::create_dir_all(&dangerous).unwrap();
        assert!(GitAgent::new(dangerous).is_err());
    }

    #[test]
    fn rejects_missing_directory() {
        let dir = tempdir().unwrap();
        assert!(GitAgent::new(dir.path().join("absent")).is_err());
    }

    #[test]
    fn relative_file_arguments_pass_through() {
        let dir = tempdir().unwrap();
        let agent = GitAgent::new(dir.path()).unwrap();
        assert_eq!(
            agent
                .path_arg(Path::new("api/clients/node/package.json"))
                .unwrap(),
            "api/clients/node/package.json"
        );
    }

    #[test]
    fn absolute_file_arguments_become_relative() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("api");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("package.hjson"), "{}").unwrap();

        let agent = GitAgent::new(dir.path()).unwrap();
        assert_eq!(
            agent.path_arg(&nested.join("package.hjson")).unwrap(),
            "api/package.hjson"
        );
    }

    #[test]
    fn absolute_file_outside_repository_is_rejected() {
        let repo = tempdir().unwrap();
        let other = tempdir().unwrap();
        let outside = other.path().join("package.hjson");
        fs::write(&outside, "{}").unwrap();

        let agent = GitAgent::new(repo.path()).unwrap();
        assert!(agent.path_arg(&outside).is_err());
    }

    #[test]
    fn branch_names_with_whitespace_are_rejected() {
        assert!(check_branch_name("feature/bump").is_ok());
        assert!(check_branch_name("main; rm").is_err());
        assert!(check_branch_name("-f").is_err());
    }

    #[test]
    fn push_rejects_option_like_branch() {
        let dir = tempdir().unwrap();
        let agent = GitAgent::new(dir.path()).unwrap();
        assert!(matches!(
            agent.push("origin", "--force"),
            Err(SyncError::GitOperation(_))
        ));
    }
}
