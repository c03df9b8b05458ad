use regex::Regex;
use std::sync::LazyLock;

use crate::domain::models::{EnrichedIssue, Issue};

static VERSION_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"\d+\.\d+\.\d+") {
    Ok(re) => re,
    Err(_) => unreachable!("static regex pattern"),
});

/// The labeled-line markers for a product. Matching is case-sensitive and
/// limited to exactly these three spellings.
fn label_markers(product: &str) -> [String; 3] {
    [
        format!("{product}:"),
        format!("{product} Version:"),
        format!("{product} version:"),
    ]
}

#[derive(Debug, Default, PartialEq)]
pub struct Extracted {
    pub found_in: Option<String>,
    pub found_in_line: Option<String>,
}

/// Scan an issue body for the reported product version.
///
/// Scanning stops at the FIRST line containing a label marker: a
/// `\d+.\d+.\d+` token on that line becomes `found_in`, otherwise the raw
/// line is kept as `found_in_line`. Version-shaped tokens on unlabeled
/// lines never match, so a body without any labeled line yields neither.
pub fn extract_found_in(body: &str, product: &str) -> Extracted {
    let markers = label_markers(product);
    for line in body.lines() {
        if markers.iter().any(|m| line.contains(m.as_str())) {
            if let Some(token) = VERSION_TOKEN_RE.find(line) {
                return Extracted {
                    found_in: Some(token.as_str().to_string()),
                    found_in_line: None,
                };
            }
            return Extracted {
                found_in: None,
                found_in_line: Some(line.to_string()),
            };
        }
    }
    Extracted::default()
}

/// Run the extraction pass over a fetched issue list.
pub fn enrich(issues: &[Issue], product: &str) -> Vec<EnrichedIssue> {
    issues
        .iter()
        .map(|issue| {
            let extracted = extract_found_in(&issue.body, product);
            EnrichedIssue {
                url: issue.url.clone(),
                title: issue.title.clone(),
                body: issue.body.clone(),
                state: issue.state,
                found_in: extracted.found_in,
                fixed_in: issue.fixed_in.clone(),
                found_in_line: extracted.found_in_line,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::extract_found_in;

    #[test]
    fn labeled_line_with_token_yields_exact_version() {
        let got = extract_found_in("What happened:\nGrafana version: 11.2.0 foo\n", "Grafana");
        assert_eq!(got.found_in.as_deref(), Some("11.2.0"));
        assert_eq!(got.found_in_line, None);
    }

    #[test]
    fn labeled_line_without_token_keeps_raw_line() {
        let got = extract_found_in(
            "Grafana version: see attached screenshot\nmore text",
            "Grafana",
        );
        assert_eq!(got.found_in, None);
        assert_eq!(
            got.found_in_line.as_deref(),
            Some("Grafana version: see attached screenshot")
        );
    }

    #[test]
    fn body_without_label_or_version_yields_nothing() {
        let got = extract_found_in("it broke\nplease fix", "Grafana");
        assert_eq!(got.found_in, None);
        assert_eq!(got.found_in_line, None);
    }

    #[test]
    fn unlabeled_version_token_is_never_a_match() {
        let got = extract_found_in("Seen in 10.4.1 build\nno labels here", "Grafana");
        assert_eq!(got.found_in, None);
        assert_eq!(got.found_in_line, None);

        // Even ahead of a labeled line, the unlabeled token loses.
        let got = extract_found_in(
            "Seen in 10.4.1 build\nGrafana version: 11.2.0",
            "Grafana",
        );
        assert_eq!(got.found_in.as_deref(), Some("11.2.0"));
    }

    #[test]
    fn label_matching_is_case_sensitive() {
        let got = extract_found_in("grafana version: 11.2.0", "Grafana");
        assert_eq!(got.found_in, None);
        assert_eq!(got.found_in_line, None);

        let got = extract_found_in("Grafana: 9.5.2 on linux", "Grafana");
        assert_eq!(got.found_in.as_deref(), Some("9.5.2"));
    }

    #[test]
    fn first_labeled_line_wins() {
        let got = extract_found_in(
            "Grafana version: none given\nGrafana version: 11.2.0",
            "Grafana",
        );
        assert_eq!(got.found_in, None);
        assert_eq!(got.found_in_line.as_deref(), Some("Grafana version: none given"));
    }
}
