//! CLI argument parsing.
//!
//! Defines the command-line interface for omni-comment using clap. The CLI
//! is a thin wrapper: it captures the message (flag or stdin), loads the
//! config, and reports the engine's outcome on stdout.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use omni_comment_core::{CommentRequest, Engine, OperationResult};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Combine outputs from many jobs into a single comment.
#[derive(Parser)]
#[command(name = "omni-comment")]
#[command(author, version, about = "Combine outputs from many jobs into a single comment")]
pub struct Cli {
    /// GitHub token.
    #[arg(long)]
    token: String,

    /// GitHub repository in `owner/name` form.
    #[arg(long)]
    repo: String,

    /// GitHub issue/pull request number.
    #[arg(long)]
    issue_number: u64,

    /// Comment section owned by this job.
    #[arg(long)]
    section: String,

    /// Comment message.
    #[arg(long)]
    message: Option<String>,

    /// Config file path.
    #[arg(long, default_value = "omni-comment.yml")]
    config: PathBuf,

    /// Comment title.
    #[arg(long)]
    title: Option<String>,

    /// Collapse the comment by default.
    #[arg(long)]
    collapsed: bool,

    /// Read message from stdin.
    #[arg(long)]
    stdin: bool,

    /// Verbose output.
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    /// Installs the tracing subscriber.
    ///
    /// `--verbose` lowers the default level to `debug`; an explicit
    /// `RUST_LOG` always wins. Logs go to stderr so stdout carries only the
    /// outcome report.
    pub fn init_tracing(&self) {
        let default_level = if self.verbose { "debug" } else { "info" };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    /// Executes the invocation and prints the outcome.
    pub async fn run(self) -> Result<()> {
        let message = if self.stdin {
            Some(read_stdin().await?)
        } else {
            self.message
        };

        let engine = Engine::new(&self.config, self.token)?;
        let request = CommentRequest {
            repo: self.repo,
            issue_number: self.issue_number,
            section: self.section,
            title: self.title,
            // Absent flag defers to the config defaults.
            collapsed: self.collapsed.then_some(true),
            message,
        };

        match engine.post_section(&request).await? {
            None => println!("No comment was created or updated"),
            Some(OperationResult::Created { html_url }) => {
                println!("Created comment: {html_url}");
            }
            Some(OperationResult::Updated { html_url }) => {
                println!("Updated comment: {html_url}");
            }
        }
        Ok(())
    }
}

/// Reads the whole of stdin as UTF-8.
async fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    tokio::io::stdin().read_to_string(&mut buf).await?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_required_flags() {
        let cli = Cli::try_parse_from([
            "omni-comment",
            "--token",
            "ghp_x",
            "--repo",
            "org/repo",
            "--issue-number",
            "42",
            "--section",
            "lint",
            "--message",
            "0 errors",
        ])
        .expect("parse");
        assert_eq!(cli.repo, "org/repo");
        assert_eq!(cli.issue_number, 42);
        assert_eq!(cli.section, "lint");
        assert_eq!(cli.message.as_deref(), Some("0 errors"));
        assert!(!cli.collapsed);
        assert!(!cli.stdin);
    }

    #[test]
    fn test_should_default_config_path() {
        let cli = Cli::try_parse_from([
            "omni-comment",
            "--token",
            "ghp_x",
            "--repo",
            "org/repo",
            "--issue-number",
            "1",
            "--section",
            "lint",
        ])
        .expect("parse");
        assert_eq!(cli.config, PathBuf::from("omni-comment.yml"));
    }

    #[test]
    fn test_should_reject_missing_section() {
        let result = Cli::try_parse_from([
            "omni-comment",
            "--token",
            "ghp_x",
            "--repo",
            "org/repo",
            "--issue-number",
            "1",
        ]);
        assert!(result.is_err());
    }
}
