use crate::agents::diff_parser::DependencyChange;
use crate::error::{Result, SyncError};
use crate::hjson::HjsonDocument;
use crate::version::BumpKind;
use std::fs;
use std::path::{Path, PathBuf};

/// Dependency groups searched for a match, in priority order.
pub const DEPENDENCY_GROUPS: [&str; 2] = ["dependencies", "devDependencies"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    pub group: &'static str,
    pub name: String,
    pub old_version: String,
    pub new_version: String,
}

impl AppliedChange {
    pub fn bump(&self) -> BumpKind {
        BumpKind::between(&self.old_version, &self.new_version)
    }
}

/// The secondary manifest: two dependency groups inside an HJSON document.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    doc: HjsonDocument,
}

impl ManifestDocument {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            doc: content.parse()?,
        })
    }

    /// Entries of a dependency group in file order; empty when the group is absent.
    pub fn group(&self, group: &str) -> Vec<(&str, &str)> {
        self.doc.table_entries(group).unwrap_or_default()
    }

    pub fn dependencies(&self) -> Vec<(&str, &str)> {
        self.group(DEPENDENCY_GROUPS[0])
    }

    pub fn dev_dependencies(&self) -> Vec<(&str, &str)> {
        self.group(DEPENDENCY_GROUPS[1])
    }

    /// Updates the first entry named `change.name`, searching `dependencies` before
    /// `devDependencies`. Returns `None` and leaves the document untouched when
    /// neither group has the entry.
    pub fn apply_change(&mut self, change: &DependencyChange) -> Result<Option<AppliedChange>> {
        for group in DEPENDENCY_GROUPS {
            let old_version = match self.doc.get_str(group, &change.name) {
                Some(version) => version.to_string(),
                None => continue,
            };

            self.doc.set_str(group, &change.name, &change.version)?;
            return Ok(Some(AppliedChange {
                group,
                name: change.name.clone(),
                old_version,
                new_version: change.version.clone(),
            }));
        }

        Ok(None)
    }
}

impl std::fmt::Display for ManifestDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.doc, f)
    }
}

/// Reads and rewrites `package.hjson`.
pub struct ManifestEditor {
    manifest_path: PathBuf,
}

impl ManifestEditor {
    pub fn new<P: AsRef<Path>>(manifest_path: P) -> Self {
        Self {
            manifest_path: manifest_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.manifest_path
    }

    /// Applies the change and writes the file only when an entry was updated.
    pub fn sync_dependency(&self, change: &DependencyChange) -> Result<AppliedChange> {
        let mut doc = self.load_document()?;
        log::debug!(
            "{} lists {} dependencies and {} devDependencies",
            self.manifest_path.display(),
            doc.dependencies().len(),
            doc.dev_dependencies().len()
        );

        let applied = doc
            .apply_change(change)?
            .ok_or_else(|| SyncError::DependencyNotFound(change.name.clone()))?;

        log::debug!(
            "Updating {}.{} in {}",
            applied.group,
            applied.name,
            self.manifest_path.display()
        );
        self.write_document(&doc)?;

        Ok(applied)
    }

    pub fn load_document(&self) -> Result<ManifestDocument> {
        let content = fs::read_to_string(&self.manifest_path).map_err(|e| {
            SyncError::ProjectValidation(format!(
                "Failed to read '{}': {}",
                self.manifest_path.display(),
                e
            ))
        })?;

        ManifestDocument::parse(&content)
    }

    fn write_document(&self, doc: &ManifestDocument) -> Result<()> {
        let mut content = doc.to_string();
        if !content.ends_with('\n') {
            content.push('\n');
        }

        fs::write(&self.manifest_path, content).map_err(|e| {
            SyncError::ProjectValidation(format!(
                "Failed to write '{}': {}",
                self.manifest_path.display(),
                e
            ))
        })
    }
}
