//! GitHub API integration for repository lifecycle management.
//!
//! This module provides a client for the subset of the GitHub REST API the
//! provider needs:
//! - Read a repository
//! - Create a repository for an organization or the authenticated user
//! - Update and delete a repository
//! - List repositories of an organization, a user or the authenticated user
//!
//! # Example
//!
//! ```rust,no_run
//! use github_repo_provider::github::{GitHubClient, RepoOps};
//!
//! # async fn run() -> github_repo_provider::error::Result<()> {
//! let client = GitHubClient::new("ghp_your_token_here")?;
//!
//! let repo = client.get_repo("octocat", "hello-world").await?;
//! println!("{}: {:?}", repo.full_name, repo.html_url);
//! # Ok(())
//! # }
//! ```

mod client;
mod repos;

pub use client::GitHubClient;
pub use repos::{
    CreateRepository, FeatureSetting, RepoOps, Repository, RepositoryOwner,
    SecurityAndAnalysisSettings, UpdateRepository,
};
