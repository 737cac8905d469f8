use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use serde_json::json;

use crate::auth::Token;
use crate::config::Config;
use crate::insights::summarize;
use crate::metrics::build_overview;
use crate::models::{date_or_today, RepoPath, RepositoryRecord};
use crate::output;
use crate::providers::{GitHubProvider, RunFetcher};
use crate::registry::{JsonFileRegistry, RepositoryStore};
use crate::server::{self, AppState};

#[derive(Parser)]
#[command(name = "runboard")]
#[command(author, version, about = "GitHub Actions run dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./runboard.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Registry file (defaults to the platform data directory)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,
}

#[derive(Args)]
struct GitHubArgs {
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard HTTP API
    Serve {
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        #[command(flatten)]
        github: GitHubArgs,
    },

    /// Fetch the workflow runs of one repository for a day
    Runs {
        /// Repository as owner/name
        #[arg(short, long)]
        repo: String,

        /// Day to fetch (YYYY-MM-DD, UTC); defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Print a table instead of JSON
        #[arg(long, default_value_t = false)]
        table: bool,

        #[command(flatten)]
        github: GitHubArgs,
    },

    /// Summarize every registered repository for a day
    Overview {
        #[arg(short, long)]
        date: Option<String>,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        github: GitHubArgs,
    },

    /// Manage the repository registry
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
}

#[derive(Subcommand)]
enum RepoAction {
    /// List registered repositories
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Register a repository
    Add {
        /// Repository as owner/name
        slug: String,

        /// Name shown on the dashboard; defaults to the repository name
        #[arg(short, long)]
        display_name: Option<String>,

        #[arg(long, default_value_t = false)]
        has_config: bool,
    },

    /// Unregister a repository
    Remove { slug: String },
}

impl Cli {
    fn open_registry(&self, config: &Config) -> Result<JsonFileRegistry> {
        let path = match self.registry.as_ref().or(config.registry.path.as_ref()) {
            Some(path) => path.clone(),
            None => JsonFileRegistry::default_path()?,
        };

        let registry = JsonFileRegistry::open(&path)?;
        info!("Using registry: {}", registry.path().display());
        Ok(registry)
    }

    fn github_provider(&self, args: &GitHubArgs, config: &Config) -> Result<GitHubProvider> {
        let token = Token::from_optional(args.token.as_deref())
            .or_else(|| Token::from_optional(config.github.token.as_deref()));
        let base_url = args.base_url.as_deref().unwrap_or(&config.github.base_url);

        Ok(GitHubProvider::new(base_url, token)?)
    }

    fn write_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let json_output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)?;
            info!("Output written to: {}", output_path.display());
        } else {
            println!("{json_output}");
        }

        Ok(())
    }

    fn write_table(&self, table: comfy_table::Table) -> Result<()> {
        if let Some(output_path) = &self.output {
            std::fs::write(output_path, format!("{table}\n"))?;
            info!("Output written to: {}", output_path.display());
        } else {
            println!("{table}");
        }

        Ok(())
    }

    async fn execute_serve(
        &self,
        config: &Config,
        bind: Option<SocketAddr>,
        github: &GitHubArgs,
    ) -> Result<()> {
        let registry = self.open_registry(config)?;
        let provider = self.github_provider(github, config)?;
        let state = AppState::new(Arc::new(registry), Arc::new(provider));

        let bind = bind.unwrap_or(config.server.bind);
        server::serve(bind, state, config.server.allowed_origin.as_deref()).await
    }

    async fn execute_runs(
        &self,
        config: &Config,
        repo: &str,
        date: Option<&str>,
        table: bool,
        github: &GitHubArgs,
    ) -> Result<()> {
        let date = date_or_today(date)?;
        info!("Fetching workflow runs for {repo} on {date}");

        let provider = self.github_provider(github, config)?;
        let runs = provider.fetch_runs(repo, date).await?;

        if table {
            return self.write_table(output::runs_table(&runs));
        }

        let summary = summarize(&runs);
        self.write_json(&json!({ "workflow_runs": runs, "summary": summary }))
    }

    async fn execute_overview(
        &self,
        config: &Config,
        date: Option<&str>,
        as_json: bool,
        github: &GitHubArgs,
    ) -> Result<()> {
        let date = date_or_today(date)?;
        let registry = self.open_registry(config)?;
        let provider = self.github_provider(github, config)?;

        let overview = build_overview(&registry, &provider, date).await?;

        if as_json {
            self.write_json(&overview)
        } else {
            self.write_table(output::overview_table(&overview))
        }
    }

    fn execute_repo(&self, config: &Config, action: &RepoAction) -> Result<()> {
        let registry = self.open_registry(config)?;

        match action {
            RepoAction::List { json } => {
                let records = registry.list()?;
                if *json {
                    self.write_json(&records)
                } else {
                    self.write_table(output::repositories_table(&records))
                }
            }
            RepoAction::Add {
                slug,
                display_name,
                has_config,
            } => {
                let repo_path = RepoPath::parse(slug)?;
                let display_name = display_name.as_deref().unwrap_or(&repo_path.name);

                let mut record = RepositoryRecord::new(&repo_path.to_string(), display_name);
                record.has_config = *has_config;
                record.html_url = Some(format!("https://github.com/{repo_path}"));

                registry.add(record)?;
                output::print_done(format!("Registered {}", output::cyan(&repo_path)));
                Ok(())
            }
            RepoAction::Remove { slug } => {
                registry.remove(slug)?;
                output::print_done(format!("Removed {}", output::cyan(slug)));
                Ok(())
            }
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Serve { bind, github } => self.execute_serve(&config, *bind, github).await,
            Commands::Runs {
                repo,
                date,
                table,
                github,
            } => {
                self.execute_runs(&config, repo, date.as_deref(), *table, github)
                    .await
            }
            Commands::Overview { date, json, github } => {
                self.execute_overview(&config, date.as_deref(), *json, github)
                    .await
            }
            Commands::Repo { action } => self.execute_repo(&config, action),
        }
    }
}
