//! The `GitHub::Repositories::Repository` resource model.
//!
//! Property names follow the resource schema (PascalCase). A model is built
//! from the request's desired state at the start of an invocation, enriched
//! with observed attributes from the GitHub response and returned.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProviderError, Result};
use crate::github::{
    CreateRepository, FeatureSetting, Repository, SecurityAndAnalysisSettings, UpdateRepository,
};

/// CloudFormation type name of the resource.
pub const TYPE_NAME: &str = "GitHub::Repositories::Repository";

/// A GitHub personal access token.
///
/// The value is never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building request credentials.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Repository visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Internal,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Internal => "internal",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "internal" => Some(Self::Internal),
            _ => None,
        }
    }
}

/// Whether a security feature is switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStatus {
    Enabled,
    Disabled,
}

impl FeatureStatus {
    fn to_setting(self) -> FeatureSetting {
        let status = match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        };
        FeatureSetting {
            status: status.into(),
        }
    }

    fn from_setting(setting: &FeatureSetting) -> Option<Self> {
        match setting.status.as_str() {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Security and analysis features of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityAndAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_security: Option<FeatureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_scanning: Option<FeatureStatus>,
}

impl SecurityAndAnalysis {
    fn to_settings(&self) -> SecurityAndAnalysisSettings {
        SecurityAndAnalysisSettings {
            advanced_security: self.advanced_security.map(FeatureStatus::to_setting),
            secret_scanning: self.secret_scanning.map(FeatureStatus::to_setting),
        }
    }

    fn from_settings(settings: &SecurityAndAnalysisSettings) -> Self {
        Self {
            advanced_security: settings
                .advanced_security
                .as_ref()
                .and_then(FeatureStatus::from_setting),
            secret_scanning: settings
                .secret_scanning
                .as_ref()
                .and_then(FeatureStatus::from_setting),
        }
    }
}

/// Declarative state of a GitHub repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceModel {
    // Identity and credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessToken>,

    // Desired configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_init: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitignore_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_forking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_and_analysis: Option<SecurityAndAnalysis>,

    // Observed, read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forks_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchers_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_count: Option<u64>,
}

impl ResourceModel {
    /// Deserialize a model from a request's desired-state payload.
    ///
    /// A missing (`null`) state yields an empty model.
    pub fn from_desired_state(state: serde_json::Value) -> Result<Self> {
        if state.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(state).map_err(|e| {
            ProviderError::InvalidRequest(format!("desired resource state is malformed: {}", e))
        })
    }

    /// Build the model of an existing repository, without credentials.
    pub fn from_repository(repo: &Repository) -> Self {
        let mut model = Self {
            name: Some(repo.name.clone()),
            private: Some(repo.private),
            visibility: repo.visibility.as_deref().and_then(Visibility::parse),
            description: repo.description.clone(),
            homepage: repo.homepage.clone(),
            allow_auto_merge: repo.allow_auto_merge,
            allow_merge_commit: repo.allow_merge_commit,
            allow_rebase_merge: repo.allow_rebase_merge,
            allow_squash_merge: repo.allow_squash_merge,
            delete_branch_on_merge: repo.delete_branch_on_merge,
            has_issues: repo.has_issues,
            has_projects: repo.has_projects,
            has_wiki: repo.has_wiki,
            is_template: repo.is_template,
            allow_forking: repo.allow_forking,
            archived: Some(repo.archived),
            security_and_analysis: repo
                .security_and_analysis
                .as_ref()
                .map(SecurityAndAnalysis::from_settings),
            ..Self::default()
        };
        model.apply_observed(repo);
        model
    }

    /// Repository name, required by every operation that talks to GitHub.
    pub fn repository_name(&self) -> Result<&str> {
        non_empty(&self.name).ok_or_else(|| ProviderError::InvalidRequest("Name is required".into()))
    }

    /// Account the repository lives under: the organization when set,
    /// otherwise the owner login.
    pub fn repository_owner(&self) -> Option<&str> {
        non_empty(&self.org).or_else(|| non_empty(&self.owner))
    }

    /// Owner and name, for operations that address an existing repository.
    pub fn repository_address(&self) -> Result<(&str, &str)> {
        let name = self.repository_name()?;
        let owner = self
            .repository_owner()
            .ok_or_else(|| ProviderError::InvalidRequest("Owner or Org is required".into()))?;
        Ok((owner, name))
    }

    /// Organization to create the repository under, if any.
    pub fn organization(&self) -> Option<&str> {
        non_empty(&self.org)
    }

    /// Access token, or an empty string when none is set.
    ///
    /// Clients built from an empty token send no `Authorization` header.
    pub fn token(&self) -> &str {
        self.access_token.as_ref().map(AccessToken::expose).unwrap_or("")
    }

    /// Body of the creation request.
    pub fn to_create_request(&self) -> Result<CreateRepository> {
        Ok(CreateRepository {
            name: self.repository_name()?.to_string(),
            description: self.description.clone(),
            homepage: self.homepage.clone(),
            private: self.private,
            visibility: self.visibility.map(|v| v.as_str().to_string()),
            has_issues: self.has_issues,
            has_projects: self.has_projects,
            has_wiki: self.has_wiki,
            is_template: self.is_template,
            team_id: self.team_id,
            auto_init: self.auto_init,
            gitignore_template: self.gitignore_template.clone(),
            license_template: self.license_template.clone(),
            allow_squash_merge: self.allow_squash_merge,
            allow_merge_commit: self.allow_merge_commit,
            allow_rebase_merge: self.allow_rebase_merge,
            allow_auto_merge: self.allow_auto_merge,
            delete_branch_on_merge: self.delete_branch_on_merge,
        })
    }

    /// Body of the update request.
    pub fn to_update_request(&self) -> UpdateRepository {
        UpdateRepository {
            name: self.name.clone(),
            description: self.description.clone(),
            homepage: self.homepage.clone(),
            private: self.private,
            visibility: self.visibility.map(|v| v.as_str().to_string()),
            security_and_analysis: self
                .security_and_analysis
                .as_ref()
                .map(SecurityAndAnalysis::to_settings)
                .unwrap_or_default(),
            has_issues: self.has_issues,
            has_projects: self.has_projects,
            has_wiki: self.has_wiki,
            is_template: self.is_template,
            default_branch: self.default_branch.clone(),
            allow_squash_merge: self.allow_squash_merge,
            allow_merge_commit: self.allow_merge_commit,
            allow_rebase_merge: self.allow_rebase_merge,
            allow_auto_merge: self.allow_auto_merge,
            delete_branch_on_merge: self.delete_branch_on_merge,
            allow_forking: self.allow_forking,
            archived: self.archived,
        }
    }

    /// Copy the observed attributes of `repo` onto the model.
    pub fn apply_observed(&mut self, repo: &Repository) {
        self.owner = Some(repo.owner.login.clone());
        self.git_url = repo.git_url.clone();
        self.html_url = repo.html_url.clone();
        self.default_branch = repo.default_branch.clone();
        self.language = repo.language.clone();
        self.forks_count = Some(repo.forks_count);
        self.stars_count = Some(repo.stargazers_count);
        self.watchers_count = Some(repo.watchers_count);
        self.issues_count = Some(repo.open_issues_count);
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
