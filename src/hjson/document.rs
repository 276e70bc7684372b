use super::parser::{Node, Parser};
use crate::error::{Result, SyncError};
use std::fmt;
use std::str::FromStr;

/// An HJSON document that can be edited without disturbing comments or layout.
///
/// Only the bytes of a replaced value change on edit; everything else is written
/// back exactly as it was read.
#[derive(Debug, Clone)]
pub struct HjsonDocument {
    source: String,
    root: Node,
}

impl HjsonDocument {
    /// Returns the members of a top-level object as `(key, scalar)` pairs in file order.
    ///
    /// Members whose value is not a scalar are skipped. `None` means the table is
    /// missing or is not an object.
    pub fn table_entries(&self, table: &str) -> Option<Vec<(&str, &str)>> {
        let members = self.root.member(table)?.as_object()?;
        Some(
            members
                .iter()
                .filter_map(|m| m.value.as_scalar().map(|v| (m.key.as_str(), v)))
                .collect(),
        )
    }

    pub fn get_str(&self, table: &str, key: &str) -> Option<&str> {
        self.root.member(table)?.member(key)?.as_scalar()
    }

    /// Replaces the value of `table.key` with a double-quoted string.
    ///
    /// Returns `Ok(false)` when the entry does not exist.
    pub fn set_str(&mut self, table: &str, key: &str, value: &str) -> Result<bool> {
        let span = match self.root.member(table).and_then(|t| t.member(key)) {
            Some(node) => node.span.clone(),
            None => return Ok(false),
        };

        let quoted = serde_json::to_string(value)?;
        self.source.replace_range(span, &quoted);
        self.root = Parser::new(&self.source).parse()?;
        Ok(true)
    }
}

impl FromStr for HjsonDocument {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        let root = Parser::new(s).parse()?;
        Ok(Self {
            source: s.to_string(),
            root,
        })
    }
}

impl fmt::Display for HjsonDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
