use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::domain::models::{
    EnrichedIssue, IssueState, IssueSummary, StatsSummary, VersionCount, VersionGroups,
};

/// The pair of booleans distinguishing the three report flavors.
#[derive(Debug, Clone, Copy)]
pub struct ReportFilters {
    pub show_open: bool,
    pub show_closed: bool,
}

impl ReportFilters {
    pub const ALL: ReportFilters = ReportFilters {
        show_open: true,
        show_closed: true,
    };
    pub const OPEN_ONLY: ReportFilters = ReportFilters {
        show_open: true,
        show_closed: false,
    };
    pub const CLOSED_ONLY: ReportFilters = ReportFilters {
        show_open: false,
        show_closed: true,
    };
}

pub fn compute_stats(
    scanned: usize,
    enriched: &[EnrichedIssue],
    groups: &VersionGroups,
) -> StatsSummary {
    let open = enriched
        .iter()
        .filter(|i| i.state == IssueState::Open)
        .count();
    let with_version: Vec<&EnrichedIssue> =
        enriched.iter().filter(|i| i.found_in.is_some()).collect();
    StatsSummary {
        scanned,
        open,
        closed: enriched.len() - open,
        with_version: with_version.len(),
        open_with_version: with_version
            .iter()
            .filter(|i| i.state == IssueState::Open)
            .count(),
        line_only: groups.line_only.len(),
    }
}

/// Render one Markdown report flavor.
///
/// Versions follow the descending display `order`. Within a version the
/// bucket is re-sorted by state descending only (stable), so OPEN runs
/// precede CLOSED runs while the grouper's title order survives inside each
/// run. A version heading appears only if an issue survives the filters;
/// state sub-headings appear only in the all-report, at run boundaries.
pub fn render_markdown(
    by_version: &BTreeMap<String, Vec<IssueSummary>>,
    order: &[String],
    stats: &StatsSummary,
    product: &str,
    date: &str,
    filters: ReportFilters,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {product} Bug Report");
    let _ = writeln!(out, "## Date: {date}");

    for version in order {
        let Some(bucket) = by_version.get(version) else {
            continue;
        };
        let mut sorted = bucket.clone();
        sorted.sort_by(|a, b| b.state.as_str().cmp(a.state.as_str()));

        let mut printed = 0usize;
        for (index, issue) in sorted.iter().enumerate() {
            let visible = match issue.state {
                IssueState::Open => filters.show_open,
                IssueState::Closed => filters.show_closed,
            };
            if !visible {
                continue;
            }
            if printed == 0 {
                let _ = writeln!(out, "## {version}");
            }
            if (index == 0 || issue.state != sorted[index - 1].state)
                && filters.show_open
                && filters.show_closed
            {
                let _ = writeln!(out, "### {}", issue.state.as_str());
            }
            match &issue.fixed_in {
                Some(fixed_in) => {
                    let _ = writeln!(out, "- [{}]({}) (Fixed in {})", issue.title, issue.url, fixed_in);
                }
                None => {
                    let _ = writeln!(out, "- [{}]({})", issue.title, issue.url);
                }
            }
            printed += 1;
        }
    }

    let _ = writeln!(out, "## Stats");
    let _ = writeln!(out, "- Total Bugs Scanned: {}", stats.scanned);
    let _ = writeln!(out, "- Total Open Bugs: {}", stats.open);
    let _ = writeln!(out, "- Total Closed Bugs: {}", stats.closed);
    let _ = writeln!(out, "- Total Bugs with Version: {}", stats.with_version);
    let _ = writeln!(
        out,
        "- Total Bugs with Version and OPEN state: {}",
        stats.open_with_version
    );
    let _ = writeln!(
        out,
        "- Total Bugs with Version (but not exact version): {}",
        stats.line_only
    );
    out
}

/// The `Version, Total, Open, Closed` CSV shared by the per-version and
/// per-major.minor summaries.
pub fn version_counts_csv(rows: &[VersionCount]) -> String {
    let mut out = String::from("Version, Total, Open, Closed\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{}, {}, {}, {}",
            row.version, row.total, row.open, row.closed
        );
    }
    out
}

/// The plaintext stats summary, also echoed to stdout.
pub fn render_stats_txt(
    per_version: &[VersionCount],
    stats: &StatsSummary,
    product: &str,
    date: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{product} Bug Report");
    let _ = writeln!(out, "Date: {date}");
    let _ = writeln!(out);
    let _ = writeln!(out, "## By Version");
    let _ = write!(out, "{}", version_counts_csv(per_version));
    let _ = writeln!(out);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Overall Stats");
    let _ = writeln!(out, "- Total Bugs Scanned: {}", stats.scanned);
    let _ = writeln!(out, "- Total Open Bugs: {}", stats.open);
    let _ = writeln!(out, "- Total Closed Bugs: {}", stats.closed);
    let _ = writeln!(out, "- Total Bugs with Version: {}", stats.with_version);
    let _ = writeln!(
        out,
        "- Total Bugs with Version (but not exact version): {}",
        stats.line_only
    );
    out
}
