use std::collections::BTreeMap;

use crate::domain::models::{IssueState, IssueSummary, VersionCount, NO_VERSION};
use crate::domain::version::{major_minor_label, Version};

/// Display order for version buckets: numeric (major, minor, patch)
/// descending, with the "No Version" bucket always last.
pub fn display_order(by_version: &BTreeMap<String, Vec<IssueSummary>>) -> Vec<String> {
    let mut versions: Vec<&String> = by_version.keys().filter(|v| *v != NO_VERSION).collect();
    versions.sort_by(|a, b| Version::parse(b).cmp(&Version::parse(a)));
    let mut order: Vec<String> = versions.into_iter().cloned().collect();
    if by_version.contains_key(NO_VERSION) {
        order.push(NO_VERSION.to_string());
    }
    order
}

fn count_bucket(version: &str, issues: &[IssueSummary]) -> VersionCount {
    let open = issues
        .iter()
        .filter(|i| i.state == IssueState::Open)
        .count();
    VersionCount {
        version: version.to_string(),
        total: issues.len(),
        open,
        closed: issues.len() - open,
    }
}

/// Per-exact-version totals in display order.
pub fn version_counts(
    by_version: &BTreeMap<String, Vec<IssueSummary>>,
    order: &[String],
) -> Vec<VersionCount> {
    order
        .iter()
        .map(|v| count_bucket(v, by_version.get(v).map_or(&[][..], Vec::as_slice)))
        .collect()
}

/// Collapse patch buckets into major.minor buckets, concatenating issue
/// lists. Bucket order follows the first appearance of each prefix in the
/// descending display order, so the output is stable run to run.
pub fn major_minor_rollup(
    by_version: &BTreeMap<String, Vec<IssueSummary>>,
    order: &[String],
) -> Vec<(String, Vec<IssueSummary>)> {
    let mut rolled: Vec<(String, Vec<IssueSummary>)> = Vec::new();
    for version in order {
        let label = major_minor_label(version);
        let issues = by_version.get(version).map_or(&[][..], Vec::as_slice);
        match rolled.iter_mut().find(|(l, _)| *l == label) {
            Some((_, bucket)) => bucket.extend_from_slice(issues),
            None => rolled.push((label, issues.to_vec())),
        }
    }
    rolled
}

/// Per-major.minor totals in first-appearance order.
pub fn major_minor_counts(
    by_version: &BTreeMap<String, Vec<IssueSummary>>,
    order: &[String],
) -> Vec<VersionCount> {
    major_minor_rollup(by_version, order)
        .iter()
        .map(|(label, issues)| count_bucket(label, issues))
        .collect()
}

/// Resolve the release immediately preceding `release` within `known` tags.
///
/// patch > 0: plain decrement of the patch component — the candidate is not
/// searched for in the tag set, only membership-checked at the end. patch ==
/// 0: the numerically largest known tag under the previous minor (or, when
/// minor is also 0, under the previous major). Any candidate not literally
/// present in `known` resolves to None. The decrement path deliberately
/// skips the set search the fallback paths perform; both behaviors are
/// pinned by tests.
pub fn get_prior_release(release: &str, known: &[String]) -> Option<String> {
    let version = Version::parse(release.trim_start_matches('v'))?;
    let candidate = if version.patch > 0 {
        Some(format!(
            "v{}.{}.{}",
            version.major,
            version.minor,
            version.patch - 1
        ))
    } else if version.minor > 0 {
        max_known_tag(known, |k| {
            k.major_minor() == (version.major, version.minor - 1)
        })
    } else {
        let prior_major = version.major.checked_sub(1)?;
        max_known_tag(known, |k| k.major == prior_major)
    };
    candidate.filter(|c| known.iter().any(|k| k == c))
}

fn max_known_tag(known: &[String], keep: impl Fn(&Version) -> bool) -> Option<String> {
    known
        .iter()
        .filter_map(|tag| Version::parse_tag(tag).map(|v| (v, tag)))
        .filter(|(v, _)| keep(v))
        .max_by_key(|(v, _)| *v)
        .map(|(_, tag)| tag.clone())
}
