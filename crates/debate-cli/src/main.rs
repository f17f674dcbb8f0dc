use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use debate_cli::agents::ChatCompletionsActor;
use debate_cli::config::{load_debate_config, ApiEndpoint};
use debate_cli::report::spawn_reporter;
use debate_coordination::debate::DebateOrchestrator;

/// Run a moderated debate between two model-backed debaters and print the
/// judge's verdict.
#[derive(Debug, Parser)]
#[command(name = "debate", version)]
struct Args {
    /// Debate topic. Read from stdin when omitted.
    topic: Option<String>,

    /// TOML file with round count, model bindings and guardrails.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Number of free-debate exchanges (overrides the config file).
    #[arg(long, short = 'r')]
    rounds: Option<u32>,

    /// Write the full outcome (transcript included) as JSON to this file.
    #[arg(long)]
    transcript_out: Option<PathBuf>,

    /// Do not print turns as they happen; print only the result.
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let topic = match args.topic {
        Some(topic) => topic,
        None => read_topic()?,
    };
    if topic.trim().is_empty() {
        bail!("A debate topic is required");
    }

    let config = load_debate_config(args.config.as_deref(), args.rounds)?;
    let endpoint = ApiEndpoint::from_env();
    if endpoint.api_key.is_none() {
        warn!(url = %endpoint.url, "No API key set (DEBATE_API_KEY / DASHSCOPE_API_KEY)");
    }
    info!(
        url = %endpoint.url,
        rounds = config.free_debate_rounds,
        "Debate runner starting"
    );

    let actor = ChatCompletionsActor::new(endpoint).context("Failed to build HTTP client")?;
    let orchestrator = DebateOrchestrator::new(config, Arc::new(actor))
        .context("Invalid debate configuration")?;

    let reporter = if args.quiet {
        None
    } else {
        Some(spawn_reporter(orchestrator.subscribe(), std::io::stdout()))
    };

    let abort = orchestrator.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current turn");
            abort.abort();
        }
    });

    let result = orchestrator.run(&topic).await;
    if let Some(reporter) = reporter {
        if let Err(e) = reporter.await {
            warn!("Progress reporter stopped abnormally: {e}");
        }
    }

    match result {
        Ok(outcome) => {
            if let Some(path) = &args.transcript_out {
                write_file(path, &outcome.to_json()?)?;
            }
            info!("{}", outcome.summary_line());
            println!("{}", outcome.result_text()?);
            Ok(())
        }
        Err(failure) => {
            if let Some(path) = &args.transcript_out {
                write_file(path, &serde_json::to_string_pretty(&failure.session)?)?;
            }
            let context = format!("Debate failed during {}", failure.failed_in);
            Err(anyhow::Error::new(failure.error).context(context))
        }
    }
}

fn read_topic() -> Result<String> {
    eprintln!("Debate topic:");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read topic from stdin")?;
    Ok(line.trim().to_string())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Transcript written");
    Ok(())
}
