//! Lifecycle handlers for the repository resource.
//!
//! Each operation builds a GitHub client scoped to the model's access token,
//! runs at most one existence probe and one primary API call, and returns a
//! success event carrying the updated model. Failures are returned as
//! [`ProviderError`]s and turned into FAILED events by
//! [`ResourceProvider::invoke`](crate::provider::ResourceProvider::invoke).

mod probe;

pub use probe::{Presence, probe};

use crate::config::{ListMode, ProbePolicy, ProviderConfig};
use crate::error::{GitHubError, ProviderError, Result};
use crate::github::{GitHubClient, RepoOps, Repository};
use crate::model::{ResourceModel, TYPE_NAME};
use crate::provider::ProgressEvent;

/// Builds an API client for one invocation.
pub trait ClientFactory: Send + Sync {
    fn client(&self, token: &str) -> Result<Box<dyn RepoOps>>;
}

impl<F> ClientFactory for F
where
    F: Fn(&str) -> Result<Box<dyn RepoOps>> + Send + Sync,
{
    fn client(&self, token: &str) -> Result<Box<dyn RepoOps>> {
        self(token)
    }
}

/// Creates [`GitHubClient`]s against the configured endpoint.
#[derive(Debug, Clone, Default)]
pub struct GitHubClientFactory {
    config: ProviderConfig,
}

impl GitHubClientFactory {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for GitHubClientFactory {
    fn client(&self, token: &str) -> Result<Box<dyn RepoOps>> {
        Ok(Box::new(GitHubClient::with_config(token, &self.config)?))
    }
}

/// Desired state plus the template name used in error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequest {
    pub logical_resource_identifier: String,
    pub model: ResourceModel,
}

impl ResourceRequest {
    pub fn new(logical_resource_identifier: impl Into<String>, model: ResourceModel) -> Self {
        Self {
            logical_resource_identifier: logical_resource_identifier.into(),
            model,
        }
    }
}

/// Handler for the `GitHub::Repositories::Repository` resource type.
pub struct RepositoryHandler<F = GitHubClientFactory> {
    factory: F,
    probe_policy: ProbePolicy,
    list_mode: ListMode,
}

impl RepositoryHandler<GitHubClientFactory> {
    /// Create a handler talking to the API described by `config`.
    pub fn from_config(config: ProviderConfig) -> Self {
        let probe_policy = config.probe_policy;
        let list_mode = config.list_mode;
        Self::new(GitHubClientFactory::new(config))
            .probe_policy(probe_policy)
            .list_mode(list_mode)
    }
}

impl<F: ClientFactory> RepositoryHandler<F> {
    /// Create a handler with default policies.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            probe_policy: ProbePolicy::default(),
            list_mode: ListMode::default(),
        }
    }

    pub fn probe_policy(mut self, policy: ProbePolicy) -> Self {
        self.probe_policy = policy;
        self
    }

    pub fn list_mode(mut self, mode: ListMode) -> Self {
        self.list_mode = mode;
        self
    }

    /// Create the repository unless it already exists.
    pub async fn create(&self, request: ResourceRequest) -> Result<ProgressEvent> {
        let ResourceRequest {
            logical_resource_identifier: identifier,
            mut model,
        } = request;
        let client = self.factory.client(model.token())?;
        let body = model.to_create_request()?;

        let presence = match model.repository_owner() {
            Some(owner) => probe(client.as_ref(), owner, &body.name).await,
            None => {
                tracing::debug!(
                    name = %body.name,
                    "no owner or org set, skipping existence check"
                );
                Presence::Absent
            }
        };
        if self.existing(presence)?.is_some() {
            return Err(already_exists(&identifier));
        }

        let result = match model.organization() {
            Some(org) => {
                tracing::info!(org, name = %body.name, "creating organization repository");
                client.create_org_repo(org, &body).await
            }
            None => {
                tracing::info!(name = %body.name, "creating user repository");
                client.create_user_repo(&body).await
            }
        };
        let repo = result.map_err(|e| internal_failure("create", e))?;

        model.apply_observed(&repo);
        Ok(ProgressEvent::success(model))
    }

    /// Update the repository, which must already exist.
    pub async fn update(&self, request: ResourceRequest) -> Result<ProgressEvent> {
        let ResourceRequest {
            logical_resource_identifier: identifier,
            mut model,
        } = request;
        let client = self.factory.client(model.token())?;
        let (owner, name) = model.repository_address()?;
        let (owner, name) = (owner.to_string(), name.to_string());

        let presence = probe(client.as_ref(), &owner, &name).await;
        if self.existing(presence)?.is_none() {
            return Err(not_found(&identifier));
        }

        tracing::info!(owner = %owner, name = %name, "updating repository");
        let repo = client
            .update_repo(&owner, &name, &model.to_update_request())
            .await
            .map_err(|e| internal_failure("update", e))?;

        model.apply_observed(&repo);
        Ok(ProgressEvent::success(model))
    }

    /// Delete the repository.
    ///
    /// A repository the probe reports absent fails with NotFound. An
    /// inconclusive probe does not stop the deletion call.
    pub async fn delete(&self, request: ResourceRequest) -> Result<ProgressEvent> {
        let ResourceRequest {
            logical_resource_identifier: identifier,
            mut model,
        } = request;
        let client = self.factory.client(model.token())?;
        let (owner, name) = model.repository_address()?;
        let (owner, name) = (owner.to_string(), name.to_string());

        let observed = match probe(client.as_ref(), &owner, &name).await {
            Presence::Present(repo) => Some(repo),
            Presence::Absent => return Err(not_found(&identifier)),
            Presence::Indeterminate(_) => None,
        };

        tracing::info!(owner = %owner, name = %name, "deleting repository");
        client
            .delete_repo(&owner, &name)
            .await
            .map_err(|e| internal_failure("delete", e))?;

        // The DELETE response has no body; report what the probe saw.
        if let Some(repo) = observed {
            model.apply_observed(&repo);
        }
        Ok(ProgressEvent::success(model))
    }

    /// Read the repository's current state.
    pub async fn read(&self, request: ResourceRequest) -> Result<ProgressEvent> {
        let ResourceRequest {
            logical_resource_identifier: identifier,
            mut model,
        } = request;
        let client = self.factory.client(model.token())?;
        let (owner, name) = model.repository_address()?;

        let repo = client
            .get_repo(owner, name)
            .await
            .map_err(|e| classify_lookup_error(e, &identifier))?;

        model.apply_observed(&repo);
        Ok(ProgressEvent::success(model))
    }

    /// List repositories.
    ///
    /// In [`ListMode::Echo`] the request's model is returned as the only
    /// element without calling GitHub.
    pub async fn list(&self, request: ResourceRequest) -> Result<ProgressEvent> {
        let ResourceRequest {
            logical_resource_identifier: identifier,
            model,
        } = request;

        if self.list_mode == ListMode::Echo {
            return Ok(ProgressEvent::success_list(vec![model]));
        }

        let client = self.factory.client(model.token())?;
        let result = if let Some(org) = model.organization() {
            client.list_org_repos(org).await
        } else if let Some(owner) = model.owner.as_deref().filter(|o| !o.is_empty()) {
            client.list_user_repos(owner).await
        } else {
            client.list_authenticated_repos().await
        };
        let repos = result.map_err(|e| classify_lookup_error(e, &identifier))?;

        tracing::info!(count = repos.len(), "listed repositories");
        let models = repos.iter().map(ResourceModel::from_repository).collect();
        Ok(ProgressEvent::success_list(models))
    }

    /// Resolve a probe into "exists" / "does not exist" under the probe policy.
    fn existing(&self, presence: Presence) -> Result<Option<Box<Repository>>> {
        match presence {
            Presence::Present(repo) => Ok(Some(repo)),
            Presence::Absent => Ok(None),
            Presence::Indeterminate(e) => match self.probe_policy {
                ProbePolicy::Lenient => Ok(None),
                ProbePolicy::Strict => Err(ProviderError::InternalFailure(format!(
                    "Could not determine whether the repository exists: {}",
                    e
                ))),
            },
        }
    }
}

fn already_exists(identifier: &str) -> ProviderError {
    ProviderError::AlreadyExists {
        type_name: TYPE_NAME.into(),
        identifier: identifier.into(),
    }
}

fn not_found(identifier: &str) -> ProviderError {
    ProviderError::NotFound {
        type_name: TYPE_NAME.into(),
        identifier: identifier.into(),
    }
}

fn internal_failure(operation: &str, err: GitHubError) -> ProviderError {
    tracing::error!(operation, error = %err, "GitHub request failed");
    ProviderError::InternalFailure(err.to_string())
}

/// Map a failed read or listing onto the handler error taxonomy.
fn classify_lookup_error(err: GitHubError, identifier: &str) -> ProviderError {
    match err {
        GitHubError::NotFound { .. } => not_found(identifier),
        GitHubError::Forbidden { message, errors } => {
            if errors.is_empty() {
                ProviderError::AccessDenied(message)
            } else {
                ProviderError::AccessDenied(errors.join("\n"))
            }
        }
        other => ProviderError::InternalFailure(other.to_string()),
    }
}

#[cfg(test)]
mod tests;
