// SPDX-License-Identifier: MIT OR Apache-2.0
//! `framekit` - load kinematic documents and resolve frame poses.
//!
//! Documents are RON encodings of a `<model>` element tree. The tool can
//! report load diagnostics, list every entity's pose in a chosen frame, or
//! resolve a single pose between two named frames.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "framekit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Load kinematic documents and resolve frame poses")]
#[command(propagate_version = true)]
struct Cli {
    /// Loader settings file (RON)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a document and print its diagnostics
    Check {
        /// Model document (RON)
        document: PathBuf,
    },

    /// Print the pose of every link, joint and light
    Poses {
        /// Model document (RON)
        document: PathBuf,

        /// Frame to express poses in (default: the model's root frame)
        #[arg(short, long)]
        frame: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the pose of one frame expressed in another
    Pose {
        /// Model document (RON)
        document: PathBuf,

        /// Frame whose pose is wanted
        source: String,

        /// Frame to express it in
        target: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write the default loader settings to a file
    Settings {
        /// Output path
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for crate_name in ["framekit", "framekit_graph", "framekit_model"] {
        match format!("{crate_name}={level}").parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Invalid log directive for {crate_name}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting framekit v{}", env!("CARGO_PKG_VERSION"));

    let result = commands::load_settings(cli.settings.as_deref()).and_then(|settings| {
        match cli.command {
            Commands::Check { document } => commands::check(&document, &settings),
            Commands::Poses {
                document,
                frame,
                json,
            } => commands::poses(&document, frame.as_deref(), json, &settings),
            Commands::Pose {
                document,
                source,
                target,
                json,
            } => commands::pose(&document, &source, &target, json, &settings),
            Commands::Settings { output } => commands::write_settings(&output, &settings),
        }
    });

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
