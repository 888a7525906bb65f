//! Error types for the core engine.
//!
//! Defines `CoreError` as the primary error type for all operations
//! within `omni-comment-core`.

use thiserror::Error;

/// Error type for omni-comment-core operations.
///
/// # Examples
///
/// ```
/// use omni_comment_core::CoreError;
///
/// let err = CoreError::Config("invalid YAML".into());
/// assert!(err.to_string().contains("invalid YAML"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A configuration error (config file present but unreadable or invalid).
    #[error("Config error: {0}")]
    Config(String),

    /// An invalid section id that cannot be embedded in a fragment marker.
    #[error("Section error: {0}")]
    Section(String),

    /// An error from a GitHub API call (network, auth, rate limit, not-found).
    #[error("GitHub API error: {0}")]
    Api(String),

    /// More than one managed comment was found on the issue.
    ///
    /// Silently picking one would risk losing the sections held by whichever
    /// comment is ignored, so the invocation fails instead.
    #[error("found {count} managed comments on {repo}#{issue_number}; expected at most one")]
    AmbiguousComment {
        /// Repository in `owner/name` form.
        repo: String,
        /// Issue or pull request number.
        issue_number: u64,
        /// Number of comments carrying the signature marker.
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_display_config_error() {
        let err = CoreError::Config("bad yaml at line 3".into());
        assert_eq!(err.to_string(), "Config error: bad yaml at line 3");
    }

    #[test]
    fn test_should_display_api_error() {
        let err = CoreError::Api("create comment failed: HTTP 403".into());
        assert!(err.to_string().starts_with("GitHub API error:"));
    }

    #[test]
    fn test_should_display_ambiguous_comment_error_with_identity() {
        let err = CoreError::AmbiguousComment {
            repo: "org/repo".into(),
            issue_number: 7,
            count: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 managed comments"));
        assert!(msg.contains("org/repo#7"));
    }
}
