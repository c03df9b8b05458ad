use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::models::{Issue, IssueState};

const GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";
const TOKEN_ENV: &str = "GH_TOKEN";

static RELEASE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"^v\d+\.\d+\.\d+") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    });

#[derive(thiserror::Error, Debug)]
pub enum GithubError {
    #[error("{TOKEN_ENV} environment variable is not set")]
    MissingToken,
    #[error("unexpected response shape for {0}")]
    UnexpectedShape(&'static str),
}

/// The two-hop lookup the fixed-in resolver depends on. Kept as a trait so
/// the resolver can run against an in-memory stub.
pub trait MilestoneSource {
    /// First connected cross-reference of an issue, as the linked item's URL.
    fn linked_item_url(&self, issue_url: &str) -> anyhow::Result<Option<String>>;
    /// Milestone title of a linked issue or pull request, if any.
    fn milestone_title(&self, item_url: &str) -> anyhow::Result<Option<String>>;
}

pub struct GithubClient {
    http: reqwest::blocking::Client,
    token: String,
    owner: String,
    repo: String,
    label: String,
}

impl GithubClient {
    pub fn new(owner: &str, repo: &str, label: &str) -> anyhow::Result<Self> {
        let token = std::env::var(TOKEN_ENV).map_err(|_| GithubError::MissingToken)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("bugsift/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            token,
            owner: owner.to_string(),
            repo: repo.to_string(),
            label: label.to_string(),
        })
    }

    fn post(&self, query: String) -> anyhow::Result<serde_json::Value> {
        let resp = self
            .http
            .post(GRAPHQL_ENDPOINT)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "query": query }))
            .send()?
            .error_for_status()?;
        let remaining = header_str(&resp, "x-ratelimit-remaining");
        let limit = header_str(&resp, "x-ratelimit-limit");
        info!(remaining, limit, "rate limit");
        Ok(resp.json()?)
    }

    /// Fetch up to `max_pages` issue pages, newest first, accumulating into
    /// one list. The cursor is threaded as explicit loop state; a failed or
    /// malformed page truncates the result set rather than erroring the run.
    pub fn fetch_issues(&self, max_pages: u32) -> Vec<Issue> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 0u32;
        loop {
            let value = match self.post(issue_page_query(
                &self.owner,
                &self.repo,
                &self.label,
                cursor.as_deref(),
            )) {
                Ok(v) => v,
                Err(e) => {
                    warn!(page, error = %e, "issue page fetch failed, truncating");
                    break;
                }
            };
            let parsed = match parse_issue_page(value) {
                Ok(p) => p,
                Err(e) => {
                    warn!(page, error = %e, "issue page unusable, truncating");
                    break;
                }
            };
            all.extend(parsed.issues);
            info!(page, total = all.len(), "fetched issue page");
            if !(page < max_pages && parsed.has_next_page) {
                break;
            }
            cursor = parsed.end_cursor;
            page += 1;
        }
        all
    }

    /// Fetch the first 100 tag refs by tag commit date descending, keeping
    /// only names shaped like `v<major>.<minor>.<patch>`.
    pub fn fetch_tags(&self) -> anyhow::Result<Vec<String>> {
        let value = self.post(tags_query(&self.owner, &self.repo))?;
        let resp: TagsResponse = serde_json::from_value(value)
            .map_err(|_| GithubError::UnexpectedShape("tags"))?;
        let nodes = resp
            .data
            .and_then(|d| d.repository)
            .map(|r| r.refs.nodes)
            .ok_or(GithubError::UnexpectedShape("tags"))?;
        Ok(nodes
            .into_iter()
            .map(|n| n.name)
            .filter(|name| RELEASE_TAG_RE.is_match(name))
            .collect())
    }
}

impl MilestoneSource for GithubClient {
    fn linked_item_url(&self, issue_url: &str) -> anyhow::Result<Option<String>> {
        let number = item_number(issue_url);
        let value = self.post(connected_event_query(&self.owner, &self.repo, number))?;
        let resp: ConnectedResponse = serde_json::from_value(value)
            .map_err(|_| GithubError::UnexpectedShape("connected event"))?;
        let nodes = resp
            .data
            .and_then(|d| d.repository)
            .and_then(|r| r.issue)
            .map(|i| i.timeline_items.nodes)
            .ok_or(GithubError::UnexpectedShape("connected event"))?;
        Ok(nodes
            .into_iter()
            .next()
            .and_then(|n| n.subject)
            .and_then(|s| s.url))
    }

    fn milestone_title(&self, item_url: &str) -> anyhow::Result<Option<String>> {
        let number = item_number(item_url);
        let query = if item_url.contains("pull") {
            pull_milestone_query(&self.owner, &self.repo, number)
        } else {
            issue_milestone_query(&self.owner, &self.repo, number)
        };
        let value = self.post(query)?;
        let resp: MilestoneResponse = serde_json::from_value(value)
            .map_err(|_| GithubError::UnexpectedShape("milestone"))?;
        let repository = resp
            .data
            .and_then(|d| d.repository)
            .ok_or(GithubError::UnexpectedShape("milestone"))?;
        let item = repository.issue.or(repository.pull_request);
        Ok(item
            .and_then(|i| i.milestone)
            .map(|m| m.title))
    }
}

/// Trailing path segment of an issue/PR URL, i.e. its number.
fn item_number(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

fn header_str<'a>(resp: &'a reqwest::blocking::Response, name: &str) -> &'a str {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("?")
}

fn issue_page_query(owner: &str, repo: &str, label: &str, cursor: Option<&str>) -> String {
    let after = cursor
        .map(|c| format!(r#", after: "{c}""#))
        .unwrap_or_default();
    format!(
        r#"query {{
    repository(owner: "{owner}", name: "{repo}") {{
        issues(labels: ["{label}"], first: 100, orderBy: {{field: CREATED_AT, direction: DESC}}{after}) {{
            pageInfo {{
                hasNextPage
                endCursor
            }}
            nodes {{
                url
                title
                body
                state
            }}
        }}
    }}
}}"#
    )
}

fn connected_event_query(owner: &str, repo: &str, number: &str) -> String {
    format!(
        r#"query {{
    repository(owner: "{owner}", name: "{repo}") {{
        issue(number: {number}) {{
            timelineItems(first: 100, itemTypes: [CONNECTED_EVENT]) {{
                nodes {{
                    ... on ConnectedEvent {{
                        subject {{
                            ... on Issue {{
                                url
                            }}
                            ... on PullRequest {{
                                url
                            }}
                        }}
                    }}
                }}
            }}
        }}
    }}
}}"#
    )
}

fn issue_milestone_query(owner: &str, repo: &str, number: &str) -> String {
    format!(
        r#"query {{
    repository(owner: "{owner}", name: "{repo}") {{
        issue(number: {number}) {{
            milestone {{
                title
            }}
        }}
    }}
}}"#
    )
}

fn pull_milestone_query(owner: &str, repo: &str, number: &str) -> String {
    format!(
        r#"query {{
    repository(owner: "{owner}", name: "{repo}") {{
        pullRequest(number: {number}) {{
            milestone {{
                title
            }}
        }}
    }}
}}"#
    )
}

fn tags_query(owner: &str, repo: &str) -> String {
    format!(
        r#"query {{
    repository(owner: "{owner}", name: "{repo}") {{
        refs(refPrefix: "refs/tags/", first: 100, orderBy: {{field: TAG_COMMIT_DATE, direction: DESC}}) {{
            nodes {{
                name
            }}
        }}
    }}
}}"#
    )
}

struct IssuePage {
    issues: Vec<Issue>,
    has_next_page: bool,
    end_cursor: Option<String>,
}

fn parse_issue_page(value: serde_json::Value) -> Result<IssuePage, GithubError> {
    let resp: IssuesResponse = serde_json::from_value(value)
        .map_err(|_| GithubError::UnexpectedShape("issues"))?;
    let issues = resp
        .data
        .and_then(|d| d.repository)
        .map(|r| r.issues)
        .ok_or(GithubError::UnexpectedShape("issues"))?;
    Ok(IssuePage {
        issues: issues
            .nodes
            .into_iter()
            .map(|n| Issue {
                url: n.url,
                title: n.title,
                body: n.body,
                state: n.state,
                fixed_in: None,
            })
            .collect(),
        has_next_page: issues.page_info.has_next_page,
        end_cursor: issues.page_info.end_cursor,
    })
}

#[derive(Deserialize)]
struct IssuesResponse {
    data: Option<IssuesData>,
}

#[derive(Deserialize)]
struct IssuesData {
    repository: Option<IssuesRepository>,
}

#[derive(Deserialize)]
struct IssuesRepository {
    issues: IssueConnection,
}

#[derive(Deserialize)]
struct IssueConnection {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    nodes: Vec<IssueNode>,
}

#[derive(Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct IssueNode {
    url: String,
    title: String,
    #[serde(default)]
    body: String,
    state: IssueState,
}

#[derive(Deserialize)]
struct TagsResponse {
    data: Option<TagsData>,
}

#[derive(Deserialize)]
struct TagsData {
    repository: Option<TagsRepository>,
}

#[derive(Deserialize)]
struct TagsRepository {
    refs: RefConnection,
}

#[derive(Deserialize)]
struct RefConnection {
    nodes: Vec<RefNode>,
}

#[derive(Deserialize)]
struct RefNode {
    name: String,
}

#[derive(Deserialize)]
struct ConnectedResponse {
    data: Option<ConnectedData>,
}

#[derive(Deserialize)]
struct ConnectedData {
    repository: Option<ConnectedRepository>,
}

#[derive(Deserialize)]
struct ConnectedRepository {
    issue: Option<ConnectedIssue>,
}

#[derive(Deserialize)]
struct ConnectedIssue {
    #[serde(rename = "timelineItems")]
    timeline_items: TimelineItems,
}

#[derive(Deserialize)]
struct TimelineItems {
    nodes: Vec<TimelineNode>,
}

#[derive(Deserialize)]
struct TimelineNode {
    subject: Option<Subject>,
}

#[derive(Deserialize)]
struct Subject {
    url: Option<String>,
}

#[derive(Deserialize)]
struct MilestoneResponse {
    data: Option<MilestoneData>,
}

#[derive(Deserialize)]
struct MilestoneData {
    repository: Option<MilestoneRepository>,
}

#[derive(Deserialize)]
struct MilestoneRepository {
    issue: Option<MilestoneItem>,
    #[serde(rename = "pullRequest")]
    pull_request: Option<MilestoneItem>,
}

#[derive(Deserialize)]
struct MilestoneItem {
    milestone: Option<Milestone>,
}

#[derive(Deserialize)]
struct Milestone {
    title: String,
}
