//! TripGuide - guided road trip planning
//!
//! CLI entry point: interactive chat, one-shot planning, itinerary rendering
//! and flow listing.

use std::fs;
use std::io::Read;
use std::path::Path;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use tripguide::cli::{Cli, Command, OutputFormat, get_log_path};
use tripguide::backend::create_client;
use tripguide::config::{BackendConfig, Config};
use tripguide::flow::FlowDefinition;
use tripguide::itinerary::ResponseView;
use tripguide::pipeline::{SubmissionPipeline, TripForm, TripOutcome};
use tripguide::repl::{self, render};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(base_url = %config.backend.base_url, "TripGuide loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Chat) | None => repl::run_interactive(&config).await,
        Some(Command::Render { file, format }) => cmd_render(file.as_deref(), format),
        Some(Command::Flow) => cmd_flow(),
        Some(Command::Plan {
            from,
            to,
            days,
            hours,
            hurry,
            format,
        }) => {
            let form = TripForm {
                from,
                to,
                duration: days,
                driving_hours_per_day: hours,
                route_preference: hurry,
            };
            cmd_plan(&config.backend, &form, format).await
        }
    }
}

/// Parse an itinerary from a file or stdin and print it
fn cmd_render(file: Option<&Path>, format: OutputFormat) -> Result<()> {
    debug!(?file, ?format, "cmd_render: called");
    let text = match file {
        Some(path) => fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    print_view(&ResponseView::from_text(&text), format)
}

fn print_view(view: &ResponseView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", render::format_view(view)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(view).context("Failed to serialize itinerary")?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Validate a trip form, plan it and print the result
async fn cmd_plan(backend: &BackendConfig, form: &TripForm, format: OutputFormat) -> Result<()> {
    debug!(?form, ?format, "cmd_plan: called");
    let trip = form.validate()?;

    let client = create_client(backend).context("Failed to create backend client")?;
    let pipeline = SubmissionPipeline::from_config(client, backend);
    let outcome = pipeline.plan_trip(&trip).await.context("Failed to plan trip")?;

    if let TripOutcome::Infeasible(_) = &outcome {
        eprintln!("{}", "Route is not feasible as planned".yellow());
    }
    print_view(&ResponseView::from_text(outcome.text()), format)
}

/// Print the guided questions in order
fn cmd_flow() -> Result<()> {
    let flow = FlowDefinition::road_trip();
    for (i, question) in flow.iter().enumerate() {
        let mode = if question.is_api() {
            format!("api {}", question.endpoint.as_deref().unwrap_or("")).cyan()
        } else {
            "collect".dimmed()
        };
        println!("{}. {} [{}]", i + 1, question.prompt, mode);
        if !question.options.is_empty() {
            println!("   options: {}", question.options.join(", "));
        }
    }
    Ok(())
}
