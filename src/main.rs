//! Palaver CLI entry point.

use anyhow::Result;
use clap::Parser;
use palaver::cli::commands::{self, Attachments};
use palaver::cli::{Cli, Commands};
use palaver::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; stdout is reserved for command output and MCP traffic
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("palaver={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match cli.command {
        Commands::Chat {
            model,
            image,
            csv,
            json,
            message,
        } => {
            let attachments = Attachments { image, csv, json };
            commands::run_chat(model, attachments, message, settings).await?;
        }

        Commands::Converse {
            prompt,
            model,
            max_messages,
        } => {
            commands::run_converse(prompt, model, max_messages, settings).await?;
        }

        Commands::Csv {
            path,
            operation,
            column,
            query,
        } => {
            commands::run_csv(&path, &operation, column, query)?;
        }

        Commands::Json {
            path,
            operation,
            query,
        } => {
            commands::run_json(&path, &operation, query)?;
        }

        Commands::Tool { name, input } => {
            commands::run_tool(&name, &input, &settings).await?;
        }

        Commands::Tools => {
            commands::run_tools(&settings)?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Mcp => {
            commands::run_mcp(settings).await?;
        }

        Commands::Doctor => {
            let path = config_path.unwrap_or_else(Settings::default_config_path);
            commands::run_doctor(&settings, &path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }
    }

    Ok(())
}
