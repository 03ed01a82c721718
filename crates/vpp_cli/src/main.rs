//! vpp - run the video publishing pipeline from the terminal.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vpp_core::config::ConfigManager;
use vpp_core::logging::{init_tracing, LogLevel};
use vpp_core::orchestrator::{Pipeline, PipelineError, Run, StageStatus};

/// Video publishing pipeline
#[derive(Parser)]
#[command(name = "vpp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate, render and publish a video from a topic")]
#[command(long_about = r#"
Runs the full pipeline: script, SEO metadata, thumbnail, audio, video,
upload and email notification. Each run is written to the output folder
as pipeline_results_<timestamp>.json.

Examples:
  vpp run --topic "Rust ownership"     # Full run for a topic
  vpp run --no-upload --no-email       # Render only, topic picked automatically
  vpp config init                      # Write a default vpp.toml
"#)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "VPP_CONFIG", default_value = "vpp.toml")]
    config: PathBuf,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once
    Run {
        /// Video topic (picked automatically when omitted)
        #[arg(short, long)]
        topic: Option<String>,

        /// Render everything but skip the upload
        #[arg(long)]
        no_upload: bool,

        /// Skip email notifications
        #[arg(long)]
        no_email: bool,

        /// Print the run record as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Create the config file with defaults if it does not exist
    Init,
    /// Print the effective configuration path and folders
    Show,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run_cli(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<ExitCode> {
    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let level = if cli.debug {
        LogLevel::Debug
    } else {
        config.settings().logging.level
    };
    init_tracing(level);

    match cli.command {
        Commands::Run {
            topic,
            no_upload,
            no_email,
            json,
        } => {
            config.ensure_dirs_exist().context("creating pipeline folders")?;
            let pipeline = Pipeline::from_settings(config.settings());

            tracing::info!("Starting pipeline (vpp_core {})", vpp_core::version());
            match pipeline.execute(topic.as_deref(), !no_upload, !no_email) {
                Ok(run) => {
                    report(&run, json)?;
                    Ok(if run.is_success() {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    })
                }
                Err(e) => {
                    eprintln!("{}", e);
                    if let PipelineError::StageFailed { source, .. } = &e {
                        tracing::debug!("Stage error kind: {}", source.kind());
                    }
                    report(e.run(), json)?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Init => {
                    config.save().context("writing config")?;
                    println!("Config written to {}", config.path().display());
                }
                ConfigAction::Show => {
                    let settings = config.settings();
                    println!("Config:  {}", config.path().display());
                    println!("Output:  {}", settings.output_folder().display());
                    println!("Logs:    {}", settings.logs_folder().display());
                    println!("Assets:  {}", settings.assets_folder().display());
                    println!("Channel: {}", settings.content.channel_name);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report(run: &Run, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(run)?);
        return Ok(());
    }

    println!();
    println!("Run {} finished: {:?}", run.id, run.status);
    for (stage, result) in &run.stages {
        let mark = match result.status {
            StageStatus::Success => "ok",
            StageStatus::Skipped => "skipped",
            StageStatus::Error => "FAILED",
        };
        println!("  {:<20} {}", stage.as_str(), mark);
        for warning in &result.warnings {
            println!("  {:<20}   warning: {}", "", warning);
        }
    }
    if let Some(published) = run.published() {
        println!("Video: {}", published.video_url);
    }
    if let Some(error) = &run.error {
        println!("Error ({}): {}", run.failed_stage(), error);
    }
    if let Some(duration) = run.duration_seconds {
        println!("Duration: {:.1}s", duration);
    }
    Ok(())
}
