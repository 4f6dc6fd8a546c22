mod config;
mod record;
mod render;
mod roc;
mod source;
mod web;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{load as config_load, validate as config_validate};
use source::{SessionQuery, SessionSource};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// View Taiwan court session schedules with ROC dates shown in the Gregorian calendar.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the schedule once and write the rendered table.
    Render {
        /// Court id, e.g. TPD. Defaults to query.crtid from the config.
        #[arg(long)]
        crtid: Option<String>,

        /// ROC case year, e.g. 114. Defaults to query.crmyy from the config.
        #[arg(long)]
        crmyy: Option<String>,

        /// Write the HTML fragment here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Serve the schedule page over HTTP.
    Serve {
        /// Listen port. Defaults to web.port from the config.
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match config_load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err:#}");
            std::process::exit(1);
        }
    };

    if let Err(err) = config_validate(&config) {
        eprintln!("Configuration error: {err}");
        std::process::exit(1);
    }

    info!(
        source_config = ?config.source.sanitized_for_log(),
        "Effective configuration loaded"
    );

    let source: Arc<dyn SessionSource> = match source::build_source(&config.source) {
        Ok(source) => Arc::from(source),
        Err(err) => {
            error!(error = %err, "Failed to set up session source");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Render {
            crtid,
            crmyy,
            output,
        } => {
            let query = SessionQuery::new(
                crtid.as_deref().unwrap_or(&config.query.crtid),
                crmyy.as_deref().unwrap_or(&config.query.crmyy),
            );
            render(source.as_ref(), &query, output)
        }
        Command::Serve { port } => serve(Arc::clone(&source), port.unwrap_or(config.web.port)),
    };

    if let Err(err) = result {
        let message = format!("{err:#}");
        error!(error = %message, "courtsched failed");
        std::process::exit(1);
    }
}

fn render(source: &dyn SessionSource, query: &SessionQuery, output: Option<PathBuf>) -> Result<()> {
    let table = source::fetch_table(source, query)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &table.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), items = table.count, "Table written");
        }
        None => print!("{}", table.html),
    }

    Ok(())
}

fn serve(source: Arc<dyn SessionSource>, port: u16) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let running_signal = Arc::clone(&running);

    ctrlc::set_handler(move || {
        info!("Ctrl-C received, shutting down gracefully");
        running_signal.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    info!(port, "courtsched starting");
    web::start(source, port, running)?;
    info!("courtsched stopped");

    Ok(())
}
