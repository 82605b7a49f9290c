//! # DeepPrint CLI
//!
//! Command-line interface for laying out print templates.
//!
//! ## Usage
//!
//! ```bash
//! # Lay out a template against real data
//! deepprint layout ticket.json --data order.json
//!
//! # Lay out with synthesized sample data, in 203 DPI printer dots
//! deepprint layout ticket.json --dpi 203
//!
//! # Show the sample data a template would be previewed with
//! deepprint mock ticket.json
//!
//! # Serve the JSON API
//! deepprint serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deepprint::{
    DataContext, DeepPrintError, LayoutEngine, Template, UnitConfig,
    mock::synthesize,
    server::{self, DEFAULT_LISTEN_ADDR, ServerConfig},
};

/// DeepPrint - template layout engine for receipts, tickets and labels
#[derive(Parser, Debug)]
#[command(name = "deepprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out a template and print the render tree as JSON
    Layout {
        /// Template JSON file
        template: PathBuf,

        /// Data context JSON file (synthesized from the template if omitted)
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Zoom factor
        #[arg(long, default_value = "1.0")]
        scale: f64,

        /// Convert to device dots at this resolution instead of screen pixels
        #[arg(long)]
        dpi: Option<f64>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the sample data context synthesized for a template
    Mock {
        /// Template JSON file
        template: PathBuf,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
        listen: String,

        /// Default device resolution for requests without `dpi`
        #[arg(long)]
        dpi: Option<f64>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deepprint=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), DeepPrintError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            template,
            data,
            scale,
            dpi,
            compact,
        } => {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(DeepPrintError::Config(format!(
                    "--scale must be a positive number, got {}",
                    scale
                )));
            }
            let template = read_template(&template)?;
            let ctx = match data {
                Some(path) => DataContext::from_json(&std::fs::read_to_string(path)?)?,
                None => synthesize(&template),
            };
            let engine = LayoutEngine::new(unit_config(dpi)?);
            let tree = engine.layout(&template, &ctx, scale);
            print_json(&tree, compact)?;
        }

        Commands::Mock { template, compact } => {
            let template = read_template(&template)?;
            print_json(&synthesize(&template), compact)?;
        }

        Commands::Serve { listen, dpi } => {
            let config = ServerConfig {
                listen_addr: listen,
                units: unit_config(dpi)?,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))?;
        }
    }

    Ok(())
}

fn read_template(path: &Path) -> Result<Template, DeepPrintError> {
    let json = std::fs::read_to_string(path)?;
    Template::from_json(&json).map_err(|e| match e {
        DeepPrintError::Template(msg) => {
            DeepPrintError::Template(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

fn unit_config(dpi: Option<f64>) -> Result<UnitConfig, DeepPrintError> {
    match dpi {
        None => Ok(UnitConfig::default()),
        Some(dpi) if dpi.is_finite() && dpi > 0.0 => Ok(UnitConfig::from_dpi(dpi)),
        Some(dpi) => Err(DeepPrintError::Config(format!(
            "--dpi must be a positive number, got {}",
            dpi
        ))),
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<(), DeepPrintError> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}
