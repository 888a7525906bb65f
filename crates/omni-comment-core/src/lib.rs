//! omni-comment core engine.
//!
//! Merges labeled output from many independent CI jobs into one shared
//! GitHub issue or pull-request comment, instead of each job posting its
//! own. Each job owns a section identified by a stable id; re-running a job
//! replaces its section in place and leaves every other job's section
//! untouched.
//!
//! # Architecture
//!
//! - [`Engine`] runs one invocation: locate → decode → merge → write
//! - [`codec`] encodes sections between hidden markers and decodes bodies
//!   into byte-exact segment lists
//! - [`merge_section`](merge::merge_section) is the pure merge over a body
//! - [`IssueCommentOps`] abstracts the GitHub comment API for testability;
//!   [`GithubClient`] is the production implementation
//! - [`CommentConfig`] holds defaults from `omni-comment.yml`
//!
//! All persistent state lives in the remote comment body; the engine caches
//! nothing across invocations.

pub mod codec;
pub mod config;
mod engine;
mod error;
pub mod gh;
pub mod merge;

pub use codec::{CommentBody, Fragment, SIGNATURE_MARKER, Section, Segment};
pub use config::{CommentConfig, SectionDefaults};
pub use engine::{CommentRequest, Engine, OperationResult};
pub use error::CoreError;
pub use gh::{CommentLink, GithubClient, IssueComment, IssueCommentOps};
pub use merge::merge_section;
