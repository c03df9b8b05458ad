use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::process::Command;
use tracing::warn;

use crate::domain::models::{IssueState, IssueSummary, ReleaseRow};
use crate::domain::version::Version;
use crate::services::rollup::get_prior_release;

/// Known tags in numeric (major, minor, patch) descending order.
pub fn sort_tags_desc(tags: &[String]) -> Vec<String> {
    let mut sorted = tags.to_vec();
    sorted.sort_by(|a, b| Version::parse_tag(b).cmp(&Version::parse_tag(a)));
    sorted
}

/// One row per release tag: issue counts for the matching found-in bucket
/// (zeros when no bucket exists) plus the commit distance to the prior
/// release. Tags must already be in display order.
pub fn release_rows(
    tags_desc: &[String],
    by_version: &BTreeMap<String, Vec<IssueSummary>>,
    checkout: Option<&Path>,
) -> Vec<ReleaseRow> {
    tags_desc
        .iter()
        .map(|release| {
            let commits = match get_prior_release(release, tags_desc) {
                Some(prior) => commits_between(checkout, &prior, release),
                None => 0,
            };
            let bare = release.trim_start_matches('v');
            let issues = by_version.get(bare).map_or(&[][..], Vec::as_slice);
            let open = issues
                .iter()
                .filter(|i| i.state == IssueState::Open)
                .count();
            ReleaseRow {
                version: bare.to_string(),
                total: issues.len(),
                open,
                closed: issues.len() - open,
                commits,
            }
        })
        .collect()
}

/// Commit count between two tags via a local checkout. Without a checkout,
/// or on any git failure, the count is 0.
fn commits_between(checkout: Option<&Path>, prior: &str, release: &str) -> u64 {
    let Some(dir) = checkout else {
        return 0;
    };
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .arg("rev-list")
        .arg("--count")
        .arg(format!("{prior}..{release}"))
        .output();
    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .trim()
            .parse()
            .unwrap_or(0),
        Ok(out) => {
            warn!(
                prior,
                release,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "git rev-list failed"
            );
            0
        }
        Err(e) => {
            warn!(prior, release, error = %e, "git rev-list failed");
            0
        }
    }
}

/// Collapse per-release rows into major.minor rows, summing all four
/// columns. Order follows the first appearance of each prefix.
pub fn major_minor_release_rows(rows: &[ReleaseRow]) -> Vec<ReleaseRow> {
    let mut rolled: Vec<ReleaseRow> = Vec::new();
    for row in rows {
        let label = match row.version.rsplit_once('.') {
            Some((prefix, _)) => prefix.to_string(),
            None => row.version.clone(),
        };
        match rolled.iter_mut().find(|r| r.version == label) {
            Some(existing) => {
                existing.total += row.total;
                existing.open += row.open;
                existing.closed += row.closed;
                existing.commits += row.commits;
            }
            None => rolled.push(ReleaseRow {
                version: label,
                total: row.total,
                open: row.open,
                closed: row.closed,
                commits: row.commits,
            }),
        }
    }
    rolled
}

pub fn release_csv(rows: &[ReleaseRow]) -> String {
    let mut out = String::from("Version, Total, Open, Closed, Commits\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{}, {}, {}, {}, {}",
            row.version, row.total, row.open, row.closed, row.commits
        );
    }
    out
}
