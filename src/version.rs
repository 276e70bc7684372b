use std::cmp::Ordering;
use std::fmt;

/// Version representation for npm-style version specifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    Semantic(semver::Version),
    Numeric(Vec<u64>),
    /// Tags, URLs and ranges that cannot be ordered.
    Unknown,
}

impl Version {
    pub fn parse(version: &str) -> Self {
        let bare = strip_range_operator(version);
        if let Ok(v) = semver::Version::parse(bare) {
            Version::Semantic(v)
        } else if let Some(numeric) = Self::parse_numeric(bare) {
            Version::Numeric(numeric)
        } else {
            Version::Unknown
        }
    }

    fn parse_numeric(version: &str) -> Option<Vec<u64>> {
        let numbers = version
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        if numbers.is_empty() {
            None
        } else {
            Some(numbers)
        }
    }

    /// Orders two versions when both are comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Version::Semantic(a), Version::Semantic(b)) => Some(a.cmp(b)),
            (Version::Numeric(a), Version::Numeric(b)) => Some(compare_numeric(a, b)),
            (Version::Semantic(a), Version::Numeric(b)) => {
                Some(compare_numeric(&[a.major, a.minor, a.patch], b))
            }
            (Version::Numeric(a), Version::Semantic(b)) => {
                Some(compare_numeric(a, &[b.major, b.minor, b.patch]))
            }
            _ => None,
        }
    }
}

fn compare_numeric(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let av = a.get(i).copied().unwrap_or(0);
            let bv = b.get(i).copied().unwrap_or(0);
            av.cmp(&bv)
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Drops a leading range operator such as `^`, `~`, `>=` or `v`.
fn strip_range_operator(version: &str) -> &str {
    version
        .trim()
        .trim_start_matches(['^', '~', '=', '>', '<', 'v'])
        .trim_start()
}

/// Direction of a single dependency version change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Upgrade,
    Downgrade,
    Repin,
    Changed,
}

impl BumpKind {
    pub fn between(old: &str, new: &str) -> Self {
        match Version::parse(old).compare(&Version::parse(new)) {
            Some(Ordering::Less) => BumpKind::Upgrade,
            Some(Ordering::Greater) => BumpKind::Downgrade,
            Some(Ordering::Equal) => BumpKind::Repin,
            None => BumpKind::Changed,
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BumpKind::Upgrade => "upgrade",
            BumpKind::Downgrade => "downgrade",
            BumpKind::Repin => "re-pin",
            BumpKind::Changed => "changed",
        };
        f.write_str(label)
    }
}
