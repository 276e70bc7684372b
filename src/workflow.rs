use crate::agents::{
    AppliedChange, GitAgent, ManifestEditor, NetrcWriter, ProjectScannerAgent, VersionControl,
    check_branch_name, extract_added_dependency_line, parse_dependency_change,
};
use crate::config::{RunContext, SyncConfig};
use crate::error::{Result, SyncError};
use colored::Colorize;

/// How a sync run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    ClientMissing,
    NoAddedLine,
    NoDependencyChange,
    /// The file was rewritten but nothing was committed.
    MissingToken(AppliedChange),
    Pushed {
        change: AppliedChange,
        branch: String,
    },
}

/// Execute the sync workflow against the git checkout at `config.repo_root`
pub fn execute_sync(config: &SyncConfig, context: &RunContext) -> Result<SyncOutcome> {
    let git = GitAgent::new(&config.repo_root)?;
    run_sync(config, context, &git)
}

pub fn run_sync(
    config: &SyncConfig,
    context: &RunContext,
    vcs: &dyn VersionControl,
) -> Result<SyncOutcome> {
    log::debug!("Starting sync with {context:?}");

    // Step 1: Locate the client package
    let scanner = ProjectScannerAgent::new(config);
    let client = match scanner.locate_client() {
        Some(client) => client,
        None => {
            println!("{}", "No Node.js gRPC client found, exiting".yellow());
            return Ok(SyncOutcome::ClientMissing);
        }
    };

    log::debug!("Found client at {}", client.client_path.display());

    if !client.has_hjson {
        return Err(SyncError::ProjectValidation(format!(
            "{} not found",
            client.hjson_path.display()
        )));
    }

    // Step 2: Find the dependency bump in the last manifest commit
    let diff = vcs.diff_added_lines(&client.manifest_rel_path)?;
    let added = match extract_added_dependency_line(&diff) {
        Some(line) => line,
        None => {
            println!("{}", "Could not find a line that was added".yellow());
            return Ok(SyncOutcome::NoAddedLine);
        }
    };
    println!("added {}", added.dimmed());

    let change = match parse_dependency_change(added)? {
        Some(change) => change,
        None => {
            println!("{}", "No changed dependency found, exiting".yellow());
            return Ok(SyncOutcome::NoDependencyChange);
        }
    };
    log::debug!("Parsed dependency change {change}");

    // Step 3: Mirror it into package.hjson
    let editor = ManifestEditor::new(&client.hjson_path);
    let applied = editor.sync_dependency(&change)?;
    println!(
        "Changing {} from {} to {} ({})",
        applied.name.bright_cyan(),
        applied.old_version,
        applied.new_version.green(),
        applied.bump()
    );

    // Step 4: Commit and push
    let token = match context.token.as_deref() {
        Some(token) => token,
        None => {
            println!("{}", "No GitHub token found".yellow());
            return Ok(SyncOutcome::MissingToken(applied));
        }
    };
    let branch = context.branch.as_deref().ok_or(SyncError::MissingBranch)?;

    // Everything that can refuse the push is checked before a commit exists.
    check_branch_name(branch)?;
    NetrcWriter::check_token(token)?;
    let home_dir = context.home_dir.as_ref().ok_or_else(|| {
        SyncError::Credentials("could not determine the home directory".to_string())
    })?;

    println!("{}", "Committing to git".cyan());
    for output in vcs.configure_identity(&config.git_user_name, &config.git_user_email)? {
        echo(&output);
    }
    echo(&vcs.stage(editor.path())?);
    echo(&vcs.commit(&config.commit_message())?);

    let netrc = NetrcWriter::in_home(home_dir);
    netrc.write(&config.netrc_machine, &config.netrc_login, token)?;
    log::debug!("Wrote credentials to {}", netrc.path().display());

    println!("Pushing commit to {}", branch.bright_cyan());
    echo(&vcs.push(&config.remote, branch)?);
    println!("{}", "✓ package.hjson synced".green());

    Ok(SyncOutcome::Pushed {
        change: applied,
        branch: branch.to_string(),
    })
}

fn echo(output: &str) {
    if !output.is_empty() {
        println!("{output}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::{TempDir, tempdir};

    const HJSON: &str = r#"{
  # Edit this file, then regenerate package.json
  "name": "@getoutreach/localizer",
  "dependencies": {
    "leftpad": "1.0.0",
  },
  "devDependencies": {
    "typescript": "4.2.3",
  },
}
"#;

    const DIFF: &str = "\n--- a/api/clients/node/package.json\n+++ b/api/clients/node/package.json\n@@ -5 +5 @@\n-    \"leftpad\": \"1.0.0\",\n+    \"leftpad\": \"1.2.3\",\n";

    /// Records every call instead of touching a repository.
    struct RecordingVcs {
        diff: String,
        calls: RefCell<Vec<String>>,
    }

    impl RecordingVcs {
        fn new(diff: &str) -> Self {
            Self {
                diff: diff.to_string(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl VersionControl for RecordingVcs {
        fn diff_added_lines(&self, file: &Path) -> Result<String> {
            self.record(format!("diff {}", file.display()));
            Ok(self.diff.clone())
        }

        fn configure_identity(&self, name: &str, email: &str) -> Result<Vec<String>> {
            self.record(format!("config {name} <{email}>"));
            Ok(Vec::new())
        }

        fn stage(&self, file: &Path) -> Result<String> {
            let name = file.file_name().unwrap_or_default().to_string_lossy();
            self.record(format!("add {name}"));
            Ok(String::new())
        }

        fn commit(&self, message: &str) -> Result<String> {
            self.record(format!("commit {message}"));
            Ok("[main abc1234] sync".to_string())
        }

        fn push(&self, remote: &str, branch: &str) -> Result<String> {
            self.record(format!("push {remote} {branch}"));
            Ok(String::new())
        }
    }

    struct Fixture {
        repo: TempDir,
        home: TempDir,
        config: SyncConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let repo = tempdir().unwrap();
            let client = repo.path().join("api/clients/node");
            fs::create_dir_all(&client).unwrap();
            fs::write(client.join("package.hjson"), HJSON).unwrap();

            let config = SyncConfig::new(repo.path(), "api/clients/node");
            Self {
                repo,
                home: tempdir().unwrap(),
                config,
            }
        }

        fn hjson_path(&self) -> PathBuf {
            self.repo.path().join("api/clients/node/package.hjson")
        }

        fn hjson(&self) -> String {
            fs::read_to_string(self.hjson_path()).unwrap()
        }

        fn context(&self, token: Option<&str>, branch: Option<&str>) -> RunContext {
            RunContext {
                token: token.map(str::to_string),
                branch: branch.map(str::to_string),
                home_dir: Some(self.home.path().to_path_buf()),
            }
        }
    }

    #[test]
    fn missing_client_is_a_clean_exit() {
        let repo = tempdir().unwrap();
        let config = SyncConfig::new(repo.path(), "api/clients/node");
        let vcs = RecordingVcs::new(DIFF);

        let outcome = run_sync(&config, &RunContext::default(), &vcs).unwrap();
        assert_eq!(outcome, SyncOutcome::ClientMissing);
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn missing_hjson_is_an_error() {
        let fixture = Fixture::new();
        fs::remove_file(fixture.hjson_path()).unwrap();
        let vcs = RecordingVcs::new(DIFF);

        let err = run_sync(&fixture.config, &fixture.context(None, None), &vcs).unwrap_err();
        assert!(matches!(err, SyncError::ProjectValidation(_)));
    }

    #[test]
    fn diff_without_added_lines_changes_nothing() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new("--- a/package.json\n+++ b/package.json\n");

        let outcome = run_sync(&fixture.config, &fixture.context(Some("t"), Some("main")), &vcs)
            .unwrap();

        assert_eq!(outcome, SyncOutcome::NoAddedLine);
        assert_eq!(fixture.hjson(), HJSON);
        assert_eq!(vcs.calls(), vec!["diff api/clients/node/package.json"]);
    }

    #[test]
    fn unparsable_added_line_changes_nothing() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new("+  \"scripts\": {\n");

        let outcome = run_sync(&fixture.config, &fixture.context(Some("t"), Some("main")), &vcs)
            .unwrap();

        assert_eq!(outcome, SyncOutcome::NoDependencyChange);
        assert_eq!(fixture.hjson(), HJSON);
        assert_eq!(vcs.calls().len(), 1);
    }

    #[test]
    fn syncs_commits_and_pushes() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new(DIFF);

        let outcome = run_sync(
            &fixture.config,
            &fixture.context(Some("secret"), Some("feature/bump")),
            &vcs,
        )
        .unwrap();

        match outcome {
            SyncOutcome::Pushed { change, branch } => {
                assert_eq!(change.name, "leftpad");
                assert_eq!(change.old_version, "1.0.0");
                assert_eq!(change.new_version, "1.2.3");
                assert_eq!(branch, "feature/bump");
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        assert_eq!(
            fixture.hjson(),
            HJSON.replace(r#""leftpad": "1.0.0""#, r#""leftpad": "1.2.3""#)
        );
        assert_eq!(
            vcs.calls(),
            vec![
                "diff api/clients/node/package.json",
                "config Outreach CI <outreach-ci@users.noreply.github.com>",
                "add package.hjson",
                "commit chore: sync api/clients/node/package.hjson",
                "push origin feature/bump",
            ]
        );
        assert_eq!(
            fs::read_to_string(fixture.home.path().join(".netrc")).unwrap(),
            "machine github.com login outreach-ci password secret"
        );
    }

    #[test]
    fn missing_token_updates_file_without_git_changes() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new(DIFF);

        let outcome = run_sync(&fixture.config, &fixture.context(None, Some("main")), &vcs)
            .unwrap();

        assert!(matches!(outcome, SyncOutcome::MissingToken(ref c) if c.new_version == "1.2.3"));
        assert!(fixture.hjson().contains(r#""leftpad": "1.2.3""#));
        assert_eq!(vcs.calls().len(), 1);
        assert!(!fixture.home.path().join(".netrc").exists());
    }

    #[test]
    fn missing_branch_fails_before_commit_and_push() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new(DIFF);

        let err = run_sync(&fixture.config, &fixture.context(Some("secret"), None), &vcs)
            .unwrap_err();

        assert!(matches!(err, SyncError::MissingBranch));
        assert!(vcs.calls().iter().all(|c| !c.starts_with("push")));
        assert!(vcs.calls().iter().all(|c| !c.starts_with("commit")));
    }

    #[test]
    fn missing_home_directory_fails_before_commit() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new(DIFF);
        let context = RunContext {
            home_dir: None,
            ..fixture.context(Some("secret"), Some("main"))
        };

        let err = run_sync(&fixture.config, &context, &vcs).unwrap_err();

        assert!(matches!(err, SyncError::Credentials(_)));
        assert_eq!(vcs.calls().len(), 1);
        assert!(vcs.calls()[0].starts_with("diff"));
    }

    #[test]
    fn token_with_whitespace_fails_before_commit() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new(DIFF);

        let err = run_sync(
            &fixture.config,
            &fixture.context(Some("abc def"), Some("main")),
            &vcs,
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::Credentials(_)));
        assert!(vcs.calls().iter().all(|c| !c.starts_with("commit")));
        assert!(!fixture.home.path().join(".netrc").exists());
    }

    #[test]
    fn option_like_branch_fails_before_commit() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new(DIFF);

        let err = run_sync(
            &fixture.config,
            &fixture.context(Some("secret"), Some("--force")),
            &vcs,
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::GitOperation(_)));
        assert!(vcs.calls().iter().all(|c| !c.starts_with("commit")));
    }

    #[test]
    fn unknown_dependency_leaves_file_and_git_untouched() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new("+    \"rightpad\": \"2.0.0\",\n");

        let err = run_sync(
            &fixture.config,
            &fixture.context(Some("secret"), Some("main")),
            &vcs,
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::DependencyNotFound(ref name) if name == "rightpad"));
        assert_eq!(fixture.hjson(), HJSON);
        assert_eq!(vcs.calls().len(), 1);
    }

    #[test]
    fn dev_dependency_is_updated_when_not_a_runtime_dependency() {
        let fixture = Fixture::new();
        let vcs = RecordingVcs::new("+    \"typescript\": \"4.3.5\",\n");

        let outcome = run_sync(&fixture.config, &fixture.context(None, None), &vcs).unwrap();

        assert!(
            matches!(outcome, SyncOutcome::MissingToken(ref c) if c.group == "devDependencies")
        );
        assert!(fixture.hjson().contains(r#""typescript": "4.3.5""#));
        assert!(fixture.hjson().contains(r#""leftpad": "1.0.0""#));
    }
}
