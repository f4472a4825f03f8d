//! GitHub API client.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::{GitHubError, GitHubResult, ProviderError, Result};

/// Client for interacting with the GitHub API.
///
/// A client is bound to a single access token; build a new one per invocation.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) base_url: String,
    pub(crate) client: Client,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client for the public GitHub API with the given token.
    ///
    /// An empty token makes unauthenticated requests.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_config(token, &ProviderConfig::default())
    }

    /// Create a client using the endpoint, user agent and timeout in `config`.
    pub fn with_config(token: &str, config: &ProviderConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .default_headers(default_headers(token)?)
            .user_agent(config.user_agent.clone());

        if let Some(timeout) = config.timeout_duration() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ProviderError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_url.clone(),
            client,
        })
    }

    /// Make a GET request to the GitHub API.
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> GitHubResult<T> {
        let request = self.client.get(self.url(endpoint));
        let body = self.send(request).await?;
        decode(&body)
    }

    /// Make a POST request to the GitHub API.
    pub(crate) async fn post<T, B>(&self, endpoint: &str, body: &B) -> GitHubResult<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let request = self.client.post(self.url(endpoint)).json(body);
        let body = self.send(request).await?;
        decode(&body)
    }

    /// Make a PATCH request to the GitHub API.
    pub(crate) async fn patch<T, B>(&self, endpoint: &str, body: &B) -> GitHubResult<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let request = self.client.patch(self.url(endpoint)).json(body);
        let body = self.send(request).await?;
        decode(&body)
    }

    /// Make a DELETE request to the GitHub API. The response body is ignored.
    pub(crate) async fn delete(&self, endpoint: &str) -> GitHubResult<()> {
        let request = self.client.delete(self.url(endpoint));
        self.send(request).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> GitHubResult<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }

        Ok(body.to_vec())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Standard GitHub headers. An empty token sends no `Authorization` header.
fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let token = token.trim();
    if !token.is_empty() {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ProviderError::InvalidRequest("access token contains invalid characters".into())
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
    }

    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static("2022-11-28"),
    );
    Ok(headers)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> GitHubResult<T> {
    serde_json::from_slice(body).map_err(|e| GitHubError::Decode {
        message: e.to_string(),
    })
}

/// Message carried by one entry of an error payload's `errors` array.
///
/// Entries are either plain strings or objects with `message` and `code`;
/// anything else is skipped.
fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => ["message", "code"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// Turn a non-success response into a typed error.
pub(crate) fn error_from_response(status: StatusCode, body: &[u8]) -> GitHubError {
    let parsed: Value = serde_json::from_slice(body).unwrap_or_default();
    let message = match parsed.get("message").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned()),
    };
    let errors: Vec<String> = parsed
        .get("errors")
        .and_then(Value::as_array)
        .map(|details| details.iter().filter_map(detail_message).collect())
        .unwrap_or_default();

    match status {
        StatusCode::NOT_FOUND => GitHubError::NotFound { message },
        StatusCode::FORBIDDEN => GitHubError::Forbidden { message, errors },
        _ => GitHubError::Request {
            status: status.as_u16(),
            message,
            errors,
        },
    }
}
