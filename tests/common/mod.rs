//! Shared fixtures for the hjson-sync binary tests
//!
//! Each fixture is a throwaway git repository containing a Node.js client
//! package whose last commit bumps one dependency in package.json.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

pub const HJSON: &str = r#"{
  // Human-editable source of package.json
  "name": "@getoutreach/localizer",
  "dependencies": {
    "@grpc/grpc-js": "^1.3.0",
    "leftpad": "1.0.0",
  },
  "devDependencies": {
    "typescript": "4.2.3",
  },
}
"#;

pub fn package_json(leftpad: &str) -> String {
    format!(
        r#"{{
  "name": "@getoutreach/localizer",
  "dependencies": {{
    "@grpc/grpc-js": "^1.3.0",
    "leftpad": "{leftpad}"
  }},
  "devDependencies": {{
    "typescript": "4.2.3"
  }}
}}
"#
    )
}

/// Runs git in `repo` and panics if it is missing or fails, so tests never pass vacuously.
pub fn git(repo: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
        .args(args)
        .current_dir(repo)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .unwrap();
    assert!(status.success(), "git {} failed", args.join(" "));
}

/// Creates a repository whose HEAD commit changes leftpad from 1.0.0 to `bumped`.
pub fn create_client_repo(bumped: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    let client = repo.join("api/clients/node");
    fs::create_dir_all(&client).unwrap();

    fs::write(client.join("package.hjson"), HJSON).unwrap();
    fs::write(client.join("package.json"), package_json("1.0.0")).unwrap();

    git(repo, &["init", "-q"]);
    git(repo, &["add", "."]);
    git(repo, &["commit", "-q", "-m", "initial"]);

    fs::write(client.join("package.json"), package_json(bumped)).unwrap();
    git(repo, &["commit", "-q", "-am", "bump leftpad"]);

    temp
}

pub fn read_hjson(repo: &Path) -> String {
    fs::read_to_string(repo.join("api/clients/node/package.hjson")).unwrap()
}

/// Runs the binary in `repo` with a clean CI environment and `home` as HOME.
pub fn run_sync(repo: &Path, home: &Path, env: &[(&str, &str)]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("hjson-sync");
    cmd.current_dir(repo)
        .env_remove("OUTREACH_GITHUB_TOKEN")
        .env_remove("CIRCLE_BRANCH")
        .env("HOME", home)
        .env("NO_COLOR", "1");
    for (key, value) in env {
        cmd.env(key, value);
    }

    cmd.assert()
}

/// Subject line of the latest commit on `rev`.
pub fn commit_subject(repo: &Path, rev: &str) -> String {
    let output = Command::new("git")
        .args(["log", "-1", "--pretty=%s", rev])
        .current_dir(repo)
        .output()
        .unwrap();
    assert!(output.status.success(), "git log {rev} failed");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
