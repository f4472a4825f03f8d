//! # GitHub Repository Provider
//!
//! A CloudFormation resource provider for the `GitHub::Repositories::Repository`
//! resource type.
//!
//! The provider turns lifecycle events (Create, Read, Update, Delete, List)
//! into calls against the GitHub REST API and reflects the responses back
//! into the resource model:
//! - Create probes for an existing repository, then creates it under the
//!   organization or the authenticated user
//! - Update and Delete require the repository to exist
//! - Read maps 404 and 403 responses to NotFound and AccessDenied
//! - List echoes the model, or enumerates repositories when configured to
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use github_repo_provider::prelude::*;
//! use serde_json::json;
//!
//! # async fn run() -> github_repo_provider::error::Result<()> {
//! let handler = RepositoryHandler::from_config(ProviderConfig::from_env()?);
//!
//! let request = HandlerRequest::new(
//!     Action::Create,
//!     "MyRepository",
//!     json!({
//!         "Org": "acme",
//!         "Name": "infrastructure",
//!         "AccessToken": "ghp_your_token_here",
//!         "Private": true
//!     }),
//! );
//!
//! let event = handler.invoke(request).await;
//! println!("{}", serde_json::to_string_pretty(&event)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod github;
pub mod handler;
pub mod logging;
pub mod model;
pub mod provider;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{ListMode, ProbePolicy, ProviderConfig};
    pub use crate::error::{GitHubError, HandlerErrorCode, ProviderError, Result};
    pub use crate::github::{GitHubClient, RepoOps, Repository};
    pub use crate::handler::{
        ClientFactory, GitHubClientFactory, Presence, RepositoryHandler, ResourceRequest,
    };
    pub use crate::model::{
        AccessToken, FeatureStatus, ResourceModel, SecurityAndAnalysis, TYPE_NAME, Visibility,
    };
    pub use crate::provider::{
        Action, HandlerRequest, OperationStatus, ProgressEvent, ResourceProvider,
    };
}

pub use prelude::*;
