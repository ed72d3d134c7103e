//! verdiff - PR Version Store Library
//!
//! Uses a scratch git repository as durable storage for an ordered sequence
//! of immutable pull-request snapshots, and synthesizes an interdiff commit
//! between consecutive snapshots: a commit whose diff against its own
//! parent shows exactly what changed between two submitted versions, even
//! when the PR's base branch moved in between.
//!
//! # Core Concepts
//!
//! - **Version**: one immutable `(base, head)` snapshot of a PR, persisted
//!   as refs under `refs/pr/<pr>/<version>/`
//! - **Interdiff**: a synthesized commit whose tree equals the new head's
//!   tree but whose parent carries the previous version replayed onto the
//!   new base
//! - **Force-pick**: snap the checkout to a target commit's content and
//!   commit with the target's metadata
//! - **Force-range-apply**: replay a commit range with a prefer-incoming
//!   policy and a fixed, content-independent conflict resolution table
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `verdiff.toml`
//! - `error`: error types and result aliases
//! - `shell`: external command execution with explicit configuration
//! - `commits`: decoder for git's raw commit-log format
//! - `status`: decoder for git's porcelain status format
//! - `apply`: forced-apply primitives
//! - `store`: ref schema, version lifecycle, interdiff synthesis
//! - `lock`: file locking for scratch-directory ownership
//! - `output`: shared CLI output formatting

pub mod apply;
pub mod cli;
pub mod commits;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod shell;
pub mod status;
pub mod store;

pub use error::{Error, Result};
