use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket label for issues whose body carries no recognizable version.
pub const NO_VERSION: &str = "No Version";

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueState {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "OPEN",
            IssueState::Closed => "CLOSED",
        }
    }
}

/// A tracker issue as fetched (and later annotated with its fixed-in
/// milestone). `fixed_in` is only ever set for closed issues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    pub url: String,
    pub title: String,
    pub body: String,
    pub state: IssueState,
    #[serde(default)]
    pub fixed_in: Option<String>,
}

/// An issue after the extraction pass. `found_in` and `found_in_line` are
/// mutually exclusive: an exact version wins, otherwise the raw labeled line
/// is kept for aggregate counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedIssue {
    pub url: String,
    pub title: String,
    pub body: String,
    pub state: IssueState,
    pub found_in: Option<String>,
    pub fixed_in: Option<String>,
    pub found_in_line: Option<String>,
}

/// The per-bucket entry carried into grouping and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub url: String,
    pub title: String,
    pub fixed_in: Option<String>,
    pub state: IssueState,
}

/// Output of the grouping pass. `by_version` is keyed by exact version
/// string or [`NO_VERSION`]; `line_only` holds issues that had a labeled
/// line but no parseable version and surfaces only in aggregate counts.
#[derive(Debug, Default)]
pub struct VersionGroups {
    pub by_version: BTreeMap<String, Vec<IssueSummary>>,
    pub line_only: Vec<IssueSummary>,
}

/// Total/open/closed counts for one version (or rollup) bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionCount {
    pub version: String,
    pub total: usize,
    pub open: usize,
    pub closed: usize,
}

/// One row of the release statistics CSVs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseRow {
    pub version: String,
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub commits: u64,
}

/// The trailing stats block of every report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub scanned: usize,
    pub open: usize,
    pub closed: usize,
    pub with_version: usize,
    pub open_with_version: usize,
    pub line_only: usize,
}
