//! GitHub REST API v3 operations for repository administration.
//!
//! This crate provides a blocking client for the GitHub API and the
//! operations behind the `github` binary:
//! - Create repositories under a user or organization
//! - Clone issue labels between repositories
//! - Clone team access between repositories of the same organization
//! - Clone the default branch setting
//! - Clone branch protection rules
//!
//! # Example
//!
//! ```rust,no_run
//! use github::{GitHubClient, RepoOps, RepoRef};
//!
//! let client = GitHubClient::from_env()?;
//! let repo = client.get_repo(&RepoRef::new("acme", "widgets"))?;
//! println!("{}: default branch {}", repo.full_name, repo.default_branch);
//! # Ok::<(), github::GitHubError>(())
//! ```

mod client;
mod error;
pub mod labels;
pub mod protection;
pub mod repos;
pub mod teams;

pub use client::GitHubClient;
pub use error::{GitHubError, Result};
pub use labels::{clone_labels, CloneLabelOptions, CloneLabelSummary, Label, LabelOps};
pub use protection::{
    clone_branch_protection, Branch, BranchProtection, ProtectionOps, ProtectionOutcome,
    ProtectionUpdate,
};
pub use repos::{clone_default_branch, NewRepository, Owner, RepoOps, RepoRef, Repository};
pub use teams::{clone_repo_teams, Team, TeamOps};
