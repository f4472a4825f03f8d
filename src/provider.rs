//! CloudFormation handler contract.
//!
//! A [`HandlerRequest`] names the lifecycle action and carries the desired
//! resource state; [`ResourceProvider::invoke`] answers with a
//! [`ProgressEvent`]. Handler errors never escape `invoke`: they become
//! FAILED events carrying a [`HandlerErrorCode`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::Instrument;

use crate::error::{HandlerErrorCode, ProviderError, Result};
use crate::handler::{ClientFactory, RepositoryHandler, ResourceRequest};
use crate::model::ResourceModel;

/// Resource lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::List => "LIST",
        })
    }
}

impl FromStr for Action {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "READ" => Ok(Self::Read),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            "LIST" => Ok(Self::List),
            other => Err(ProviderError::InvalidRequest(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }
}

/// One invocation of the resource handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    pub action: Action,
    #[serde(default)]
    pub logical_resource_identifier: String,
    #[serde(default)]
    pub desired_resource_state: serde_json::Value,
}

impl HandlerRequest {
    pub fn new(
        action: Action,
        logical_resource_identifier: impl Into<String>,
        desired_resource_state: serde_json::Value,
    ) -> Self {
        Self {
            action,
            logical_resource_identifier: logical_resource_identifier.into(),
            desired_resource_state,
        }
    }

    /// Read a request from a JSON file, or YAML when the extension says so.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        if is_yaml(path) {
            Ok(serde_yaml::from_str(&text)?)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    /// Parse a request that may be either JSON or YAML.
    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str(text) {
            Ok(request) => Ok(request),
            Err(_) => Ok(serde_yaml::from_str(text)?),
        }
    }
}

/// Read a desired-state document from a JSON or YAML file.
pub fn read_desired_state(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)?;
    if is_yaml(path) {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Status of a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Success,
    Failed,
}

/// Result of one handler invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<ResourceModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<ResourceModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<HandlerErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn success(model: ResourceModel) -> Self {
        Self {
            status: OperationStatus::Success,
            resource_model: Some(model),
            resource_models: None,
            error_code: None,
            message: None,
        }
    }

    pub fn success_list(models: Vec<ResourceModel>) -> Self {
        Self {
            status: OperationStatus::Success,
            resource_model: None,
            resource_models: Some(models),
            error_code: None,
            message: None,
        }
    }

    pub fn failed(error_code: HandlerErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Failed,
            resource_model: None,
            resource_models: None,
            error_code: Some(error_code),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}

impl From<ProviderError> for ProgressEvent {
    fn from(err: ProviderError) -> Self {
        Self::failed(err.error_code(), err.to_string())
    }
}

/// Entry point the orchestration framework calls for every lifecycle event.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn invoke(&self, request: HandlerRequest) -> ProgressEvent;
}

impl<F: ClientFactory> RepositoryHandler<F> {
    async fn dispatch(&self, request: HandlerRequest) -> Result<ProgressEvent> {
        let action = request.action;
        let model = ResourceModel::from_desired_state(request.desired_resource_state)?;
        let request = ResourceRequest::new(request.logical_resource_identifier, model);

        match action {
            Action::Create => self.create(request).await,
            Action::Read => self.read(request).await,
            Action::Update => self.update(request).await,
            Action::Delete => self.delete(request).await,
            Action::List => self.list(request).await,
        }
    }
}

#[async_trait]
impl<F: ClientFactory> ResourceProvider for RepositoryHandler<F> {
    async fn invoke(&self, request: HandlerRequest) -> ProgressEvent {
        let span = tracing::info_span!(
            "invoke",
            action = %request.action,
            logical_id = %request.logical_resource_identifier,
        );

        async move {
            tracing::info!("handling request");
            match self.dispatch(request).await {
                Ok(event) => event,
                Err(err) => {
                    tracing::debug!(error_code = %err.error_code(), "request failed");
                    ProgressEvent::from(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}
