//! Frame graph analysis tool
//!
//! Loads a YAML or JSON manifest, compiles it and dumps the compiled graph (execution
//! order, node table, physical images and aliasing decisions) to stdout.

use clap::{Parser, ValueEnum};
use frame_graph::GraphManifest;
use std::{path::PathBuf, process};

/// How the compiled graph is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Rust debug formatting
    Debug,
}

/// Command-line arguments for the analyzer
#[derive(Parser)]
#[command(version, about = "Compiles a frame graph manifest and dumps the result")]
struct Args {
    /// Manifest file (.yaml, .yml or .json)
    manifest: PathBuf,

    /// Output format
    #[arg(long, short, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Log reference counts and aliasing decisions
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    if !args.manifest.exists() {
        eprintln!("Error: Manifest file '{}' does not exist", args.manifest.display());
        process::exit(1);
    }

    let compiled = match GraphManifest::from_file(&args.manifest).and_then(|manifest| manifest.compile()) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Error compiling manifest '{}': {e}", args.manifest.display());
            process::exit(1);
        }
    };

    match args.format {
        OutputFormat::Debug => println!("{compiled:#?}"),
        OutputFormat::Json => match serde_json::to_string_pretty(&compiled) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing compiled graph: {e}");
                process::exit(1);
            }
        },
    }
}
