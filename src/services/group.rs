use crate::domain::models::{EnrichedIssue, IssueSummary, VersionGroups, NO_VERSION};

pub fn summarize(issue: &EnrichedIssue) -> IssueSummary {
    IssueSummary {
        url: issue.url.clone(),
        title: issue.title.clone(),
        fixed_in: issue.fixed_in.clone(),
        state: issue.state,
    }
}

/// Partition enriched issues into exact-version buckets, the line-only side
/// list, and the "No Version" catch-all. Line-only issues are NOT merged
/// into "No Version"; they surface only in aggregate counts. Each bucket is
/// sorted by title ascending; the sort is stable, so equal titles keep
/// their input order.
pub fn group_by_version(issues: &[EnrichedIssue]) -> VersionGroups {
    let mut groups = VersionGroups::default();
    for issue in issues {
        if let Some(version) = &issue.found_in {
            groups
                .by_version
                .entry(version.clone())
                .or_default()
                .push(summarize(issue));
        } else if issue.found_in_line.is_some() {
            groups.line_only.push(summarize(issue));
        } else {
            groups
                .by_version
                .entry(NO_VERSION.to_string())
                .or_default()
                .push(summarize(issue));
        }
    }
    for bucket in groups.by_version.values_mut() {
        bucket.sort_by(|a, b| a.title.cmp(&b.title));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::group_by_version;
    use crate::domain::models::{EnrichedIssue, IssueState, NO_VERSION};

    fn enriched(
        url: &str,
        title: &str,
        state: IssueState,
        found_in: Option<&str>,
        found_in_line: Option<&str>,
    ) -> EnrichedIssue {
        EnrichedIssue {
            url: url.to_string(),
            title: title.to_string(),
            body: String::new(),
            state,
            found_in: found_in.map(str::to_string),
            fixed_in: None,
            found_in_line: found_in_line.map(str::to_string),
        }
    }

    #[test]
    fn partitions_into_three_classes() {
        let issues = vec![
            enriched("u1", "b", IssueState::Open, Some("11.2.0"), None),
            enriched("u2", "a", IssueState::Open, Some("11.2.0"), None),
            enriched("u3", "c", IssueState::Closed, None, Some("Grafana version: ?")),
            enriched("u4", "d", IssueState::Open, None, None),
        ];
        let groups = group_by_version(&issues);

        let bucket = &groups.by_version["11.2.0"];
        assert_eq!(bucket.len(), 2);
        // title sort, ascending
        assert_eq!(bucket[0].title, "a");
        assert_eq!(bucket[1].title, "b");

        assert_eq!(groups.line_only.len(), 1);
        assert_eq!(groups.line_only[0].url, "u3");

        // line-only issues stay out of the catch-all bucket
        assert_eq!(groups.by_version[NO_VERSION].len(), 1);
        assert_eq!(groups.by_version[NO_VERSION][0].url, "u4");
    }

    #[test]
    fn equal_titles_keep_input_order() {
        let issues = vec![
            enriched("first", "same", IssueState::Open, Some("9.0.0"), None),
            enriched("second", "same", IssueState::Closed, Some("9.0.0"), None),
        ];
        let groups = group_by_version(&issues);
        let bucket = &groups.by_version["9.0.0"];
        assert_eq!(bucket[0].url, "first");
        assert_eq!(bucket[1].url, "second");
    }
}
