use std::fmt;

use crate::domain::models::NO_VERSION;

/// A dotted numeric triple. Tag suffixes (`+security`, `-preview`) are
/// stripped from the patch component before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Parse `major.minor.patch` with an optional `+`/`-` suffix on the
    /// patch component. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Version> {
        let mut parts = s.splitn(3, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch_raw = parts.next()?;
        let patch = patch_raw
            .split(['+', '-'])
            .next()
            .unwrap_or(patch_raw)
            .parse()
            .ok()?;
        Some(Version {
            major,
            minor,
            patch,
        })
    }

    /// Parse a release tag of the form `v<major>.<minor>.<patch>`.
    pub fn parse_tag(tag: &str) -> Option<Version> {
        Version::parse(tag.strip_prefix('v')?)
    }

    pub fn major_minor(&self) -> (u64, u64) {
        (self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Truncate a bucket label to its `major.minor` prefix. The
/// [`NO_VERSION`] sentinel passes through unchanged.
pub fn major_minor_label(version: &str) -> String {
    if version == NO_VERSION {
        return NO_VERSION.to_string();
    }
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}
