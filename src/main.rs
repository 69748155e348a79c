use clap::Parser;
use survey_walker::cli::commands::{cmd_classify, cmd_walk};
use survey_walker::cli::config::{Cli, Commands, WalkOverrides, apply_overrides, load_config};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // -v info, -vv debug, -vvv trace; RUST_LOG wins when set
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("survey_walker={}", level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Walk {
            url,
            output,
            no_reset,
            capture_dir,
            trace,
            max_pages,
            headed,
            advisor,
        } => {
            let config = apply_overrides(
                config,
                WalkOverrides {
                    capture_dir,
                    trace,
                    max_pages,
                    headed,
                    advisor,
                    ollama_endpoint: cli.ollama_endpoint,
                    ollama_model: cli.ollama_model,
                },
            );
            let run = cmd_walk(&url, &config, output.as_deref(), !no_reset, cli.verbose)?;
            if !run.report.outcome.is_success() {
                std::process::exit(2);
            }
        }
        Commands::Classify {
            text,
            kind,
            choices,
            advisor,
        } => {
            let mut advisor_config = config.advisor.clone();
            advisor_config.enabled |= advisor;
            if cli.ollama_endpoint.is_some() {
                advisor_config.endpoint = cli.ollama_endpoint;
            }
            if cli.ollama_model.is_some() {
                advisor_config.model = cli.ollama_model;
            }
            cmd_classify(&text, &kind, &choices, &advisor_config)?;
        }
    }

    Ok(())
}
