//! CLI for driving the repository provider outside CloudFormation.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use github_repo_provider::config;
use github_repo_provider::logging::{self, LogFormat};
use github_repo_provider::prelude::*;
use github_repo_provider::provider::read_desired_state;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "github-repo-provider")]
#[command(author, version, about = "CloudFormation resource provider for GitHub repositories", long_about = None)]
struct Cli {
    /// Log output format (pretty or json)
    #[arg(long, global = true, env = "GITHUB_REPO_PROVIDER_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one handler invocation and print the progress event as JSON
    Invoke {
        /// Handler request file (JSON or YAML), or "-" for stdin
        #[arg(short, long, conflicts_with_all = ["action", "model"])]
        request: Option<PathBuf>,

        /// Lifecycle action (create, read, update, delete, list)
        #[arg(short, long, requires = "model")]
        action: Option<Action>,

        /// Logical resource identifier used in error messages
        #[arg(short, long, default_value = "Repository")]
        logical_id: String,

        /// Desired resource state file (JSON or YAML)
        #[arg(short, long)]
        model: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,
    },
}

#[derive(Args)]
struct Settings {
    /// GitHub API base URL
    #[arg(long, env = config::ENV_API_URL, default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// User-Agent header sent to GitHub
    #[arg(long, env = config::ENV_USER_AGENT)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = config::ENV_TIMEOUT_SECS)]
    timeout: Option<u64>,

    /// Policy for inconclusive existence checks (lenient or strict)
    #[arg(long, env = config::ENV_PROBE_POLICY, default_value = "lenient")]
    probe_policy: ProbePolicy,

    /// List behaviour (echo or enumerate)
    #[arg(long, env = config::ENV_LIST_MODE, default_value = "echo")]
    list_mode: ListMode,
}

impl Settings {
    fn into_config(self) -> Result<ProviderConfig> {
        let mut config = ProviderConfig::new()
            .api_url(self.api_url)?
            .probe_policy(self.probe_policy)
            .list_mode(self.list_mode);
        if let Some(agent) = self.user_agent {
            config = config.user_agent(agent);
        }
        if let Some(secs) = self.timeout {
            config = config.timeout(secs);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    logging::init(cli.log_format, level).context("Failed to initialise logging")?;

    match cli.command {
        Commands::Invoke {
            request,
            action,
            logical_id,
            model,
            settings,
        } => cmd_invoke(request, action, logical_id, model, settings).await,
    }
}

async fn cmd_invoke(
    request: Option<PathBuf>,
    action: Option<Action>,
    logical_id: String,
    model: Option<PathBuf>,
    settings: Settings,
) -> Result<()> {
    let request = match (request, action, model) {
        (Some(path), _, _) => load_request(path).await?,
        (None, Some(action), Some(model)) => {
            let state = read_desired_state(&model)
                .with_context(|| format!("Failed to read model from {}", model.display()))?;
            HandlerRequest::new(action, logical_id, state)
        }
        _ => bail!("either --request or both --action and --model are required"),
    };

    let handler = RepositoryHandler::from_config(settings.into_config()?);
    let event = handler.invoke(request).await;

    println!("{}", serde_json::to_string_pretty(&event)?);

    if !event.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn load_request(path: PathBuf) -> Result<HandlerRequest> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read request from stdin")?;
        return HandlerRequest::parse(&text).context("Failed to parse request");
    }

    HandlerRequest::from_path(&path)
        .with_context(|| format!("Failed to read request from {}", path.display()))
}
