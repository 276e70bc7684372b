use crate::error::Result;
use regex::Regex;
use std::fmt;

const DEPENDENCY_LINE: &str = r#"^\+\s+"(?P<name>[^"]+)":\s*"(?P<version>[^"]*)",?"#;

/// A single dependency version bump read from a manifest diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyChange {
    pub name: String,
    pub version: String,
}

impl fmt::Display for DependencyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Returns the first added line of a zero-context unified diff.
///
/// File headers (`+++ b/...`) never match because an added line must start with `"+ "`.
pub fn extract_added_dependency_line(diff_output: &str) -> Option<&str> {
    diff_output.lines().find(|line| line.starts_with("+ "))
}

/// Matches `+ "name": "version",` and returns `Ok(None)` for any other line shape.
pub fn parse_dependency_change(line: &str) -> Result<Option<DependencyChange>> {
    let pattern = Regex::new(DEPENDENCY_LINE)?;
    Ok(pattern.captures(line).map(|captures| DependencyChange {
        name: captures["name"].to_string(),
        version: captures["version"].to_string(),
    }))
}
