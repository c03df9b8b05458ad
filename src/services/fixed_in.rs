use tracing::{debug, warn};

use crate::domain::models::{Issue, IssueState};
use crate::github::MilestoneSource;

/// Annotate every issue with its fixed-in milestone.
///
/// Closed issues take the two-hop lookup: first connected cross-reference,
/// then that item's milestone title. Either hop coming back empty (or
/// failing) leaves `fixed_in` unset. Open issues are skipped outright.
/// One round-trip per hop per closed issue, strictly serialized.
pub fn resolve_fixed_in(issues: &mut [Issue], source: &dyn MilestoneSource) {
    for issue in issues.iter_mut() {
        issue.fixed_in = match issue.state {
            IssueState::Open => None,
            IssueState::Closed => lookup(&issue.url, source),
        };
    }
}

fn lookup(issue_url: &str, source: &dyn MilestoneSource) -> Option<String> {
    let linked = match source.linked_item_url(issue_url) {
        Ok(linked) => linked,
        Err(e) => {
            warn!(issue = issue_url, error = %e, "connected-event lookup failed");
            None
        }
    }?;
    match source.milestone_title(&linked) {
        Ok(Some(title)) => {
            debug!(issue = issue_url, milestone = %title, "resolved fixed-in");
            Some(title)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(item = %linked, error = %e, "milestone lookup failed");
            None
        }
    }
}
