mod config_commands;
mod messages;
mod provider_commands;
mod settings_commands;

use std::path::{Path, PathBuf};

use {
    apiconf_config::ApiconfConfig,
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "apiconf", about = "apiconf: LLM provider settings reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Engine config file (defaults to discovery in ./ then ~/.config/apiconf/).
    #[arg(long, global = true, env = "APICONF_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List known providers and how their model is selected.
    Providers,
    /// List the compiled-in model catalog of a provider.
    Models {
        /// Provider identifier, e.g. `anthropic` or `bedrock`.
        provider: String,
    },
    /// Run a reconciliation pass over a settings file and report the result.
    Check {
        /// Provider settings file (JSON, YAML or TOML).
        file: PathBuf,
        /// Wait for the catalog refresh before validating.
        #[arg(long)]
        fetch: bool,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Apply `field=value` edits through the engine and save the file.
    Set {
        /// Provider settings file; created when missing.
        file: PathBuf,
        /// Edits such as `apiProvider=openrouter`. Values are parsed as JSON
        /// when that fits the field and taken as strings otherwise; `null`
        /// clears.
        #[arg(required = true)]
        assignments: Vec<String>,
        /// Wait for the catalog refresh before validating.
        #[arg(long)]
        fetch: bool,
    },
    /// Engine configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn engine_config(path: Option<&Path>) -> anyhow::Result<ApiconfConfig> {
    Ok(match path {
        Some(path) => apiconf_config::load_config(path)?,
        None => apiconf_config::discover_and_load(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "apiconf starting");

    match cli.command {
        Commands::Providers => {
            provider_commands::list_providers();
            Ok(())
        },
        Commands::Models { provider } => provider_commands::list_models(&provider),
        Commands::Check { file, fetch, json } => {
            let config = engine_config(cli.config.as_deref())?;
            settings_commands::check(&config, &file, fetch, json).await
        },
        Commands::Set {
            file,
            assignments,
            fetch,
        } => {
            let config = engine_config(cli.config.as_deref())?;
            settings_commands::set(&config, &file, &assignments, fetch).await
        },
        Commands::Config { action } => config_commands::handle_config(action, cli.config),
    }
}
