//! Tweaker Config - command-line front end
//!
//! Edit, save, load and dump configurations for the Electrix Tweaker.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tweaker_config::cli::{self, Session};
use tweaker_config::config::ToolConfig;
use tweaker_config::paths::AppPaths;
use tweaker_config::transport::discovery;
use tweaker_config::transport::{MidiTransport, MidirTransport};
use tweaker_config::wire;
use tweaker_config::Registry;

/// Tweaker Config - configure the Electrix Tweaker over MIDI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List MIDI output ports
    Ports,

    /// Write a document with the factory configuration
    New {
        file: Option<PathBuf>,
    },

    /// Print every control of a document
    Show {
        file: Option<PathBuf>,
    },

    /// Send a document to the device
    Dump {
        file: Option<PathBuf>,

        /// Also send the SysEx mapping blocks
        #[arg(long)]
        blocks: bool,

        /// Output port index instead of automatic discovery
        #[arg(long)]
        port: Option<usize>,
    },

    /// Interactive editing shell
    Edit {
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level)?;

    let paths = AppPaths::detect();
    let config_path = args.config.clone().unwrap_or_else(|| paths.config.clone());
    info!(
        "Configuration file: {} ({} mode)",
        config_path.display(),
        if paths.is_portable { "portable" } else { "installed" }
    );
    let config = ToolConfig::load(&config_path)?;

    match args.command {
        Command::Ports => list_ports(&config),
        Command::New { file } => {
            let path = paths.document(file.as_deref());
            if paths.is_in_documents(&path) {
                paths.ensure_directories()?;
            }
            Registry::with_policy(&config.addressing)?
                .save_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "Created".green(), path.display());
            Ok(())
        }
        Command::Show { file } => {
            let path = paths.document(file.as_deref());
            let document = cli::read_document(&path)?;
            println!("{}", path.display().to_string().bold());
            if let Some(created) = &document.creation_date {
                println!("  {} {}", "created".dimmed(), created);
            }
            for line in cli::summary(&document.registry) {
                println!("  {}", line);
            }
            Ok(())
        }
        Command::Dump { file, blocks, port } => {
            let path = paths.document(file.as_deref());
            let mut registry = cli::open_document(&path)?;

            let mut transport =
                MidirTransport::new(&config.midi.client_name, config.midi.device_patterns.clone());
            match port {
                Some(index) => transport.open_index(index)?,
                None => transport.open()?,
            }

            let mut options = config.dump.clone();
            options.include_mapping_blocks |= blocks;
            wire::dump(&mut registry, &mut transport, &options)?;
            println!(
                "{} {} to {}",
                "Dumped".green(),
                path.display(),
                transport.port_name().unwrap_or("device")
            );
            Ok(())
        }
        Command::Edit { file } => {
            let path = paths.document(file.as_deref());
            let registry = if path.exists() {
                cli::open_document(&path)?
            } else {
                Registry::with_policy(&config.addressing)?
            };
            let transport =
                MidirTransport::new(&config.midi.client_name, config.midi.device_patterns.clone());
            let mut session = Session::new(registry, transport, config.dump.clone(), path);
            cli::run_repl(&mut session)
        }
    }
}

fn list_ports(config: &ToolConfig) -> Result<()> {
    let ports = discovery::list_output_ports(&config.midi.client_name)?;

    println!("\n{}", "=== MIDI Output Ports ===".bold().cyan());
    if ports.is_empty() {
        println!("  {}", "No output ports found".dimmed());
    }
    for port in &ports {
        let marker = if port.is_virtual {
            "[VIRTUAL]".yellow()
        } else {
            "[PHYSICAL]".green()
        };
        let name = if port.matches(&config.midi.device_patterns) {
            port.name.bright_green().bold()
        } else {
            port.name.normal()
        };
        println!("  {:>2}: {} {}", port.index, marker, name);
    }
    println!();
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
