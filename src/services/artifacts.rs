use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::models::{EnrichedIssue, Issue, IssueSummary};

pub const ISSUES_FILE: &str = "issues.json";
pub const ISSUES_WITH_FIXED_FILE: &str = "issues_with_fixed.json";
pub const ISSUES_WITH_FOUND_IN_FILE: &str = "issues_with_found_in.json";
pub const ISSUES_BY_VERSION_FILE: &str = "issues_by_version.json";
pub const TAGS_FILE: &str = "tags.json";

pub fn tags_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TAGS_FILE)
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("missing artifact {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("malformed artifact {}", path.display()))
}

pub fn save_issues(data_dir: &Path, issues: &[Issue]) -> anyhow::Result<()> {
    save_json(&data_dir.join(ISSUES_FILE), &issues)
}

pub fn load_issues(data_dir: &Path) -> anyhow::Result<Vec<Issue>> {
    load_json(&data_dir.join(ISSUES_FILE))
}

pub fn save_issues_with_fixed(data_dir: &Path, issues: &[Issue]) -> anyhow::Result<()> {
    save_json(&data_dir.join(ISSUES_WITH_FIXED_FILE), &issues)
}

pub fn load_issues_with_fixed(data_dir: &Path) -> anyhow::Result<Vec<Issue>> {
    load_json(&data_dir.join(ISSUES_WITH_FIXED_FILE))
}

pub fn save_enriched(data_dir: &Path, issues: &[EnrichedIssue]) -> anyhow::Result<()> {
    save_json(&data_dir.join(ISSUES_WITH_FOUND_IN_FILE), &issues)
}

pub fn load_enriched(data_dir: &Path) -> anyhow::Result<Vec<EnrichedIssue>> {
    load_json(&data_dir.join(ISSUES_WITH_FOUND_IN_FILE))
}

pub fn save_groups(
    data_dir: &Path,
    by_version: &BTreeMap<String, Vec<IssueSummary>>,
) -> anyhow::Result<()> {
    save_json(&data_dir.join(ISSUES_BY_VERSION_FILE), by_version)
}

pub fn load_groups(data_dir: &Path) -> anyhow::Result<BTreeMap<String, Vec<IssueSummary>>> {
    load_json(&data_dir.join(ISSUES_BY_VERSION_FILE))
}

pub fn save_tags(data_dir: &Path, tags: &[String]) -> anyhow::Result<()> {
    save_json(&tags_path(data_dir), &tags)
}

pub fn load_tags(data_dir: &Path) -> anyhow::Result<Vec<String>> {
    load_json(&tags_path(data_dir))
}

/// Merge freshly fetched issues ahead of the previously persisted list,
/// dropping duplicates. Two issues are duplicates only when EVERY field
/// matches, `fixed_in` included — an issue whose fixed-in milestone changed
/// between runs keeps both entries. First occurrence wins, so the merge is
/// deterministic.
pub fn merge_issues(new_issues: Vec<Issue>, old_issues: Vec<Issue>) -> Vec<Issue> {
    let mut merged = new_issues;
    merged.extend(old_issues);
    let mut seen = HashSet::new();
    merged.retain(|issue| seen.insert(issue.clone()));
    merged
}
