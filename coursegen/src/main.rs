//! coursegen: generate learning curricula and track progress through them
//!
//! Talks to any OpenAI-compatible chat completions endpoint (OpenAI, Ollama,
//! vLLM, ...) and keeps saved courses in a local JSON file.

mod cli;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use curriculum::FileCourseStore;
use curriculum_agent::{CourseService, CurriculumOrchestrator, OpenAiBackend};
use tracing::{debug, info};

use cli::{execute_command, Commands};
use config::Config;

#[derive(Parser)]
#[command(name = "coursegen")]
#[command(about = "Generate learning curricula and track progress through them")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "coursegen.toml")]
    config: PathBuf,

    /// Course store file (overrides config file)
    #[arg(short, long, env = "COURSEGEN_STORE")]
    store: Option<PathBuf>,

    /// Backend base URL (overrides config file)
    #[arg(long, env = "COURSEGEN_BASE_URL")]
    base_url: Option<String>,

    /// Model name (overrides config file)
    #[arg(long, env = "COURSEGEN_MODEL")]
    model: Option<String>,

    /// Environment variable holding the API key (overrides config file)
    #[arg(long)]
    api_key_env: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursegen=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(store) = cli.store {
        config.store.path = store;
    }
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(model) = cli.model {
        config.backend.model = model;
    }
    if let Some(api_key_env) = cli.api_key_env {
        config.backend.api_key_env = api_key_env;
    }

    debug!(
        base_url = %config.backend.base_url,
        model = %config.backend.model,
        shape = ?config.generation.shape,
        store = %config.store.path.display(),
        "Configuration loaded"
    );

    let api_key = config.backend.api_key();
    if api_key.is_none() {
        info!(
            env = %config.backend.api_key_env,
            "No API key set, sending unauthenticated requests"
        );
    }

    let backend = OpenAiBackend::new(&config.backend.base_url, &config.backend.model, api_key)
        .context("creating backend")?;
    let orchestrator = CurriculumOrchestrator::with_config(Arc::new(backend), config.generation);
    let store = Arc::new(FileCourseStore::new(config.store.path));
    let service = CourseService::new(orchestrator, store);

    let output = execute_command(&service, cli.command, cli.json).await?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
