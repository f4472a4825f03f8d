//! Existence probe run before create, update and delete.

use crate::error::GitHubError;
use crate::github::{RepoOps, Repository};

/// Outcome of looking a repository up before acting on it.
#[derive(Debug)]
pub enum Presence {
    /// The repository exists.
    Present(Box<Repository>),
    /// GitHub answered 404, or there was no owner to look under.
    Absent,
    /// The lookup failed for another reason, so existence is unknown.
    Indeterminate(GitHubError),
}

/// Look up `owner/name`.
pub async fn probe(client: &dyn RepoOps, owner: &str, name: &str) -> Presence {
    let presence = match client.get_repo(owner, name).await {
        Ok(repo) => Presence::Present(Box::new(repo)),
        Err(GitHubError::NotFound { .. }) => Presence::Absent,
        Err(e) => Presence::Indeterminate(e),
    };

    match &presence {
        Presence::Present(_) => tracing::debug!(owner, name, "repository exists"),
        Presence::Absent => tracing::debug!(owner, name, "repository does not exist"),
        Presence::Indeterminate(e) => {
            tracing::warn!(owner, name, error = %e, "could not determine whether repository exists")
        }
    }

    presence
}
