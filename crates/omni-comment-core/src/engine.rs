//! Core comment-merge engine.
//!
//! The `Engine` runs one invocation end to end: resolve section defaults
//! from config, locate the managed comment on the issue, merge the new
//! section into its body, and create or update the remote comment. It
//! delegates all GitHub traffic through the
//! [`IssueCommentOps`](crate::gh::IssueCommentOps) trait.
//!
//! The engine holds no state between invocations. The remote comment body
//! is the single source of truth and is re-fetched on every call, because
//! concurrent CI jobs may have updated it since this process last looked;
//! racing jobs converge on last-writer-wins for the whole body.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::codec::{self, SIGNATURE_MARKER, Section};
use crate::config::CommentConfig;
use crate::error::CoreError;
use crate::gh::{GithubClient, IssueComment, IssueCommentOps};
use crate::merge;

/// One invocation's inputs, as supplied by the CLI layer.
#[derive(Debug, Clone)]
pub struct CommentRequest {
    /// Repository in `owner/name` form.
    pub repo: String,

    /// Issue or pull request number.
    pub issue_number: u64,

    /// Section id owned by the calling job.
    pub section: String,

    /// Section title; `None` falls back to the config defaults.
    pub title: Option<String>,

    /// Collapsed flag; `None` falls back to the config defaults.
    pub collapsed: Option<bool>,

    /// Section content. `None` means the caller has nothing to merge and
    /// the invocation is a no-op.
    pub message: Option<String>,
}

/// Outcome of a write: the comment that was touched and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// A new managed comment was created.
    Created {
        /// Browser URL of the new comment.
        html_url: String,
    },

    /// The existing managed comment was updated.
    Updated {
        /// Browser URL of the updated comment.
        html_url: String,
    },
}

impl OperationResult {
    /// Browser URL of the affected comment.
    pub fn html_url(&self) -> &str {
        match self {
            Self::Created { html_url } | Self::Updated { html_url } => html_url,
        }
    }
}

/// Orchestrates locate → decode → merge → write for one section submission.
pub struct Engine {
    /// Defaults loaded from `omni-comment.yml`.
    config: CommentConfig,

    /// GitHub transport implementation.
    gh: Arc<dyn IssueCommentOps>,
}

impl Engine {
    /// Creates an engine backed by the production GitHub client.
    ///
    /// Loads configuration from `config_path`, falling back to defaults
    /// when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the config file exists but cannot be
    /// read or parsed.
    pub fn new(config_path: &Path, token: String) -> Result<Self, CoreError> {
        let config = CommentConfig::load(config_path)?;
        let gh: Arc<dyn IssueCommentOps> = Arc::new(GithubClient::new(token));
        Ok(Self { config, gh })
    }

    /// Creates an engine with a custom transport implementation.
    pub fn with_ops(config: CommentConfig, gh: Arc<dyn IssueCommentOps>) -> Self {
        Self { config, gh }
    }

    /// Merges one section into the managed comment for the request's issue.
    ///
    /// Returns `Ok(None)` when nothing was written: either the request
    /// carried no message, or the merged body was byte-identical to the
    /// remote comment.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Section` for an id that cannot be embedded in a
    /// marker, `CoreError::AmbiguousComment` when more than one managed
    /// comment exists on the issue, and `CoreError::Api` for transport
    /// failures.
    pub async fn post_section(
        &self,
        request: &CommentRequest,
    ) -> Result<Option<OperationResult>, CoreError> {
        let Some(message) = &request.message else {
            info!(section = %request.section, "No message supplied; nothing to merge");
            return Ok(None);
        };

        if !codec::is_valid_section_id(&request.section) {
            return Err(CoreError::Section(format!(
                "invalid section id {:?}: only alphanumerics, '-', '_' and '.' are allowed",
                request.section,
            )));
        }

        let section = Section {
            id: request.section.clone(),
            title: self
                .config
                .resolve_title(&request.section, request.title.as_deref()),
            collapsed: self
                .config
                .resolve_collapsed(&request.section, request.collapsed),
            content: message.clone(),
        };

        let existing = self.locate(&request.repo, request.issue_number).await?;
        let merged = merge::merge_section(
            existing.as_ref().map(|c| c.body.as_str()),
            &section,
            self.config.preamble.as_deref(),
        );

        self.write(&request.repo, request.issue_number, existing, merged)
            .await
    }

    /// Finds the managed comment on the issue, if any.
    ///
    /// A comment is ours when its body contains the signature marker. More
    /// than one match means a prior run double-created (e.g., two jobs
    /// raced through the create path); picking one silently would lose the
    /// other comment's sections, so this is surfaced as an error.
    async fn locate(
        &self,
        repo: &str,
        issue_number: u64,
    ) -> Result<Option<IssueComment>, CoreError> {
        let comments = self.gh.list_comments(repo, issue_number).await?;
        debug!(repo, issue_number, total = comments.len(), "Fetched issue comments");

        let mut managed: Vec<IssueComment> = comments
            .into_iter()
            .filter(|c| c.body.contains(SIGNATURE_MARKER))
            .collect();

        match managed.len() {
            0 => Ok(None),
            1 => Ok(Some(managed.remove(0))),
            count => Err(CoreError::AmbiguousComment {
                repo: repo.to_string(),
                issue_number,
                count,
            }),
        }
    }

    /// Creates or updates the remote comment, skipping identical bodies.
    async fn write(
        &self,
        repo: &str,
        issue_number: u64,
        existing: Option<IssueComment>,
        merged: String,
    ) -> Result<Option<OperationResult>, CoreError> {
        match existing {
            None => {
                info!(repo, issue_number, "Creating managed comment");
                let link = self.gh.create_comment(repo, issue_number, &merged).await?;
                Ok(Some(OperationResult::Created {
                    html_url: link.html_url,
                }))
            }
            Some(comment) if comment.body == merged => {
                debug!(
                    repo,
                    issue_number,
                    comment_id = comment.id,
                    "Merged body unchanged; skipping update"
                );
                Ok(None)
            }
            Some(comment) => {
                info!(repo, issue_number, comment_id = comment.id, "Updating managed comment");
                let link = self.gh.update_comment(repo, comment.id, &merged).await?;
                Ok(Some(OperationResult::Updated {
                    html_url: link.html_url,
                }))
            }
        }
    }
}
