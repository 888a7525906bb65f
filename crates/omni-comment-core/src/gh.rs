//! GitHub issue-comment transport.
//!
//! Defines the [`IssueCommentOps`] trait for the three comment operations
//! the engine needs and provides [`GithubClient`], the production
//! implementation backed by `reqwest` against the GitHub REST API. The
//! trait seam enables unit-testing everything above it without a real
//! repository. No retries or rate-limit handling happen here; failures
//! surface as `CoreError::Api` with the operation context.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::CoreError;

/// Base URL for the GitHub REST API.
const GITHUB_API_BASE: &str = "https://api.github.com";

/// User-Agent header value; the GitHub API rejects requests without one.
const USER_AGENT: &str = concat!("omni-comment/", env!("CARGO_PKG_VERSION"));

/// Page size for comment listing.
const COMMENTS_PER_PAGE: usize = 100;

/// One comment on an issue or pull request, as returned by the list call.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    /// Comment id used for updates.
    pub id: u64,

    /// Raw comment body. Absent bodies deserialize as empty.
    #[serde(default)]
    pub body: String,

    /// Browser URL of the comment.
    pub html_url: String,
}

/// Response of a create or update call; only the URL is needed upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentLink {
    /// Browser URL of the created or updated comment.
    pub html_url: String,
}

/// Abstraction over the issue-comment API operations.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` by the engine.
#[async_trait]
pub trait IssueCommentOps: Send + Sync {
    /// Lists all comments on the given issue or pull request.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Api` on any transport failure.
    async fn list_comments(
        &self,
        repo: &str,
        issue_number: u64,
    ) -> Result<Vec<IssueComment>, CoreError>;

    /// Creates a new comment on the given issue or pull request.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Api` on any transport failure.
    async fn create_comment(
        &self,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<CommentLink, CoreError>;

    /// Replaces the body of an existing comment.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Api` on any transport failure.
    async fn update_comment(
        &self,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<CommentLink, CoreError>;
}

/// Production [`IssueCommentOps`] implementation over the GitHub REST API.
///
/// # Examples
///
/// ```
/// use omni_comment_core::GithubClient;
///
/// let client = GithubClient::new("ghp_test".into());
/// // client.list_comments("org/repo", 42).await?;
/// ```
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl GithubClient {
    /// Creates a new client authenticating with the given token.
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            api_base: GITHUB_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL (GitHub Enterprise installations).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sends a prepared request and checks for an HTTP-level success.
    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CoreError> {
        let response = request
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| CoreError::Api(format!("{operation} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CoreError::Api(format!(
                "{operation} failed with HTTP {status}: {}",
                detail.trim(),
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl IssueCommentOps for GithubClient {
    async fn list_comments(
        &self,
        repo: &str,
        issue_number: u64,
    ) -> Result<Vec<IssueComment>, CoreError> {
        let operation = format!("list comments on {repo}#{issue_number}");
        let mut comments = Vec::new();
        let mut page = 1u32;

        loop {
            debug!(repo, issue_number, page, "Listing issue comments");
            let url = format!(
                "{}/repos/{repo}/issues/{issue_number}/comments?per_page={COMMENTS_PER_PAGE}&page={page}",
                self.api_base,
            );
            let response = self.send(&operation, self.http.get(url)).await?;
            let batch: Vec<IssueComment> = response
                .json()
                .await
                .map_err(|e| CoreError::Api(format!("{operation} response parse failed: {e}")))?;

            let last_page = batch.len() < COMMENTS_PER_PAGE;
            comments.extend(batch);
            if last_page {
                return Ok(comments);
            }
            page += 1;
        }
    }

    async fn create_comment(
        &self,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<CommentLink, CoreError> {
        let operation = format!("create comment on {repo}#{issue_number}");
        debug!(repo, issue_number, bytes = body.len(), "Creating comment");
        let url = format!("{}/repos/{repo}/issues/{issue_number}/comments", self.api_base);
        let response = self
            .send(
                &operation,
                self.http.post(url).json(&serde_json::json!({ "body": body })),
            )
            .await?;
        response
            .json()
            .await
            .map_err(|e| CoreError::Api(format!("{operation} response parse failed: {e}")))
    }

    async fn update_comment(
        &self,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<CommentLink, CoreError> {
        let operation = format!("update comment {comment_id} on {repo}");
        debug!(repo, comment_id, bytes = body.len(), "Updating comment");
        let url = format!("{}/repos/{repo}/issues/comments/{comment_id}", self.api_base);
        let response = self
            .send(
                &operation,
                self.http.patch(url).json(&serde_json::json!({ "body": body })),
            )
            .await?;
        response
            .json()
            .await
            .map_err(|e| CoreError::Api(format!("{operation} response parse failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_client() {
        let client = GithubClient::new("ghp_test".into());
        assert!(format!("{client:?}").contains("GithubClient"));
        assert_eq!(client.api_base, GITHUB_API_BASE);
    }

    #[test]
    fn test_should_override_api_base() {
        let client =
            GithubClient::new("ghp_test".into()).with_api_base("https://ghe.example.com/api/v3");
        assert_eq!(client.api_base, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_should_deserialize_issue_comment_without_body() {
        let json = r#"{"id": 1, "html_url": "https://github.com/org/repo/issues/1#issuecomment-1"}"#;
        let comment: IssueComment = serde_json::from_str(json).expect("deserialize");
        assert_eq!(comment.id, 1);
        assert!(comment.body.is_empty());
    }
}
