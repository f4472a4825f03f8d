//! GitHub repository operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GitHubResult;
use crate::github::GitHubClient;

/// Number of repositories requested per page when listing.
const PER_PAGE: usize = 100;

/// Upper bound on pages fetched by a single listing.
const MAX_PAGES: usize = 100;

/// Repository information from GitHub API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
    pub private: bool,
    pub visibility: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub git_url: Option<String>,
    pub html_url: Option<String>,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    pub forks_count: u64,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub open_issues_count: u64,
    pub archived: bool,
    pub is_template: Option<bool>,
    pub has_issues: Option<bool>,
    pub has_projects: Option<bool>,
    pub has_wiki: Option<bool>,
    pub allow_forking: Option<bool>,
    pub allow_auto_merge: Option<bool>,
    pub allow_merge_commit: Option<bool>,
    pub allow_rebase_merge: Option<bool>,
    pub allow_squash_merge: Option<bool>,
    pub delete_branch_on_merge: Option<bool>,
    pub security_and_analysis: Option<SecurityAndAnalysisSettings>,
}

/// The account that owns a repository.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RepositoryOwner {
    pub login: String,
}

/// `security_and_analysis` object, as sent on update and returned on read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SecurityAndAnalysisSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_security: Option<FeatureSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_scanning: Option<FeatureSetting>,
}

/// A security feature toggle: `{"status": "enabled"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureSetting {
    pub status: String,
}

/// Request body for `POST /orgs/{org}/repos` and `POST /user/repos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateRepository {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_init: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitignore_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
}

/// Request body for `PATCH /repos/{owner}/{repo}`.
///
/// `security_and_analysis` is always present; an unset model sends `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateRepository {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    pub security_and_analysis: SecurityAndAnalysisSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_forking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

/// Repository lifecycle operations against the GitHub API.
#[async_trait]
pub trait RepoOps: Send + Sync {
    /// Get a specific repository.
    async fn get_repo(&self, owner: &str, name: &str) -> GitHubResult<Repository>;

    /// Create a repository owned by an organization.
    async fn create_org_repo(&self, org: &str, repo: &CreateRepository)
    -> GitHubResult<Repository>;

    /// Create a repository owned by the authenticated user.
    async fn create_user_repo(&self, repo: &CreateRepository) -> GitHubResult<Repository>;

    /// Update a repository's settings.
    async fn update_repo(
        &self,
        owner: &str,
        name: &str,
        update: &UpdateRepository,
    ) -> GitHubResult<Repository>;

    /// Delete a repository.
    async fn delete_repo(&self, owner: &str, name: &str) -> GitHubResult<()>;

    /// List all repositories in an organization.
    async fn list_org_repos(&self, org: &str) -> GitHubResult<Vec<Repository>>;

    /// List all public repositories of a user.
    async fn list_user_repos(&self, user: &str) -> GitHubResult<Vec<Repository>>;

    /// List the repositories the authenticated user can access.
    async fn list_authenticated_repos(&self) -> GitHubResult<Vec<Repository>>;
}

/// Path of a single repository with both segments percent-encoded.
pub(crate) fn repo_path(owner: &str, name: &str) -> String {
    format!(
        "/repos/{}/{}",
        urlencoding::encode(owner),
        urlencoding::encode(name)
    )
}

impl GitHubClient {
    /// Fetch every page of a listing endpoint, stopping at the first empty page.
    async fn list_all(&self, path: &str, extra_query: &str) -> GitHubResult<Vec<Repository>> {
        let mut all_repos = Vec::new();
        let mut page = 1;

        loop {
            let endpoint = format!(
                "{}?per_page={}&page={}{}",
                path, PER_PAGE, page, extra_query
            );
            let repos: Vec<Repository> = self.get(&endpoint).await?;

            if repos.is_empty() {
                break;
            }

            all_repos.extend(repos);
            page += 1;

            if page > MAX_PAGES {
                tracing::warn!(path, "stopped listing after {} pages", MAX_PAGES);
                break;
            }
        }

        Ok(all_repos)
    }
}

#[async_trait]
impl RepoOps for GitHubClient {
    async fn get_repo(&self, owner: &str, name: &str) -> GitHubResult<Repository> {
        self.get(&repo_path(owner, name)).await
    }

    async fn create_org_repo(
        &self,
        org: &str,
        repo: &CreateRepository,
    ) -> GitHubResult<Repository> {
        let endpoint = format!("/orgs/{}/repos", urlencoding::encode(org));
        self.post(&endpoint, repo).await
    }

    async fn create_user_repo(&self, repo: &CreateRepository) -> GitHubResult<Repository> {
        self.post("/user/repos", repo).await
    }

    async fn update_repo(
        &self,
        owner: &str,
        name: &str,
        update: &UpdateRepository,
    ) -> GitHubResult<Repository> {
        self.patch(&repo_path(owner, name), update).await
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> GitHubResult<()> {
        self.delete(&repo_path(owner, name)).await
    }

    async fn list_org_repos(&self, org: &str) -> GitHubResult<Vec<Repository>> {
        let path = format!("/orgs/{}/repos", urlencoding::encode(org));
        self.list_all(&path, "&type=all").await
    }

    async fn list_user_repos(&self, user: &str) -> GitHubResult<Vec<Repository>> {
        let path = format!("/users/{}/repos", urlencoding::encode(user));
        self.list_all(&path, "").await
    }

    async fn list_authenticated_repos(&self) -> GitHubResult<Vec<Repository>> {
        self.list_all("/user/repos", "").await
    }
}
