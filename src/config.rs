//! Provider configuration.
//!
//! Settings come from builder methods or from the environment:
//!
//! | Variable | Default |
//! |---|---|
//! | `GITHUB_API_URL` | `https://api.github.com` |
//! | `GITHUB_REPO_PROVIDER_USER_AGENT` | `github-repo-provider/<version>` |
//! | `GITHUB_REPO_PROVIDER_TIMEOUT_SECS` | unset |
//! | `GITHUB_REPO_PROVIDER_PROBE_POLICY` | `lenient` |
//! | `GITHUB_REPO_PROVIDER_LIST_MODE` | `echo` |

use crate::error::{ProviderError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub const ENV_API_URL: &str = "GITHUB_API_URL";
pub const ENV_USER_AGENT: &str = "GITHUB_REPO_PROVIDER_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "GITHUB_REPO_PROVIDER_TIMEOUT_SECS";
pub const ENV_PROBE_POLICY: &str = "GITHUB_REPO_PROVIDER_PROBE_POLICY";
pub const ENV_LIST_MODE: &str = "GITHUB_REPO_PROVIDER_LIST_MODE";

/// What to do when the existence probe neither finds nor rules out a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbePolicy {
    /// Treat an inconclusive probe as "absent".
    #[default]
    Lenient,
    /// Fail the operation with the probe's error.
    Strict,
}

impl FromStr for ProbePolicy {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(ProviderError::InvalidConfig(format!(
                "unknown probe policy '{}' (expected 'lenient' or 'strict')",
                other
            ))),
        }
    }
}

impl fmt::Display for ProbePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        })
    }
}

/// How the List action answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListMode {
    /// Return the caller's model unchanged without calling GitHub.
    #[default]
    Echo,
    /// Page through the owner's repositories.
    Enumerate,
}

impl FromStr for ListMode {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "echo" => Ok(Self::Echo),
            "enumerate" => Ok(Self::Enumerate),
            other => Err(ProviderError::InvalidConfig(format!(
                "unknown list mode '{}' (expected 'echo' or 'enumerate')",
                other
            ))),
        }
    }
}

impl fmt::Display for ListMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Echo => "echo",
            Self::Enumerate => "enumerate",
        })
    }
}

/// Configuration shared by every invocation of the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL of the GitHub REST API, without a trailing slash.
    pub api_url: String,
    pub user_agent: String,
    /// Per-request timeout; `None` leaves it to the HTTP client.
    pub timeout_secs: Option<u64>,
    pub probe_policy: ProbePolicy,
    pub list_mode: ListMode,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            user_agent: default_user_agent(),
            timeout_secs: None,
            probe_policy: ProbePolicy::default(),
            list_mode: ListMode::default(),
        }
    }
}

impl ProviderConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration from an arbitrary key lookup.
    ///
    /// Unset or empty keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config = config.api_url(url)?;
        }
        if let Some(agent) = get(ENV_USER_AGENT) {
            config = config.user_agent(agent);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                ProviderError::InvalidConfig(format!("{}: {}", ENV_TIMEOUT_SECS, e))
            })?;
            config = config.timeout(secs);
        }
        if let Some(policy) = get(ENV_PROBE_POLICY) {
            config = config.probe_policy(policy.parse()?);
        }
        if let Some(mode) = get(ENV_LIST_MODE) {
            config = config.list_mode(mode.parse()?);
        }

        Ok(config)
    }

    /// Point the provider at another API endpoint, e.g. GitHub Enterprise.
    pub fn api_url(mut self, url: impl Into<String>) -> Result<Self> {
        let mut url = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        url::Url::parse(&url)
            .map_err(|e| ProviderError::InvalidConfig(format!("invalid API URL '{}': {}", url, e)))?;
        self.api_url = url;
        Ok(self)
    }

    /// Set the User-Agent header sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn probe_policy(mut self, policy: ProbePolicy) -> Self {
        self.probe_policy = policy;
        self
    }

    pub fn list_mode(mut self, mode: ListMode) -> Self {
        self.list_mode = mode;
        self
    }

    /// The configured timeout as a [`Duration`].
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
