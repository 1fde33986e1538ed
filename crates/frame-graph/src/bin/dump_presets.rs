//! Preset dumping tool
//!
//! Compiles every predefined frame graph and writes them to a single JSON file keyed
//! by preset name. Each entry carries the source manifest next to the compiled graph.

use clap::Parser;
use frame_graph::{CompiledGraph, GraphManifest, presets::Preset};
use serde::Serialize;
use std::{collections::BTreeMap, fs, path::PathBuf, process};

/// A predefined graph together with its compilation result
#[derive(Debug, Serialize)]
struct DumpedPreset {
    manifest: GraphManifest,
    compiled: CompiledGraph,
}

#[derive(Parser)]
#[command(version, about = "Compiles all predefined frame graphs and dumps them to a JSON file")]
struct Args {
    /// Path to the output JSON file
    output_file: PathBuf,

    /// Log reference counts and aliasing decisions
    #[arg(long, short)]
    verbose: bool,
}

fn dump_preset(preset: Preset) -> frame_graph::Result<DumpedPreset> {
    let graph = preset.build()?;
    let compiled = graph.compile()?;
    Ok(DumpedPreset {
        manifest: GraphManifest::from_graph(preset.name(), format!("{preset:?}"), &graph),
        compiled,
    })
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut presets = BTreeMap::new();
    for &preset in Preset::all() {
        match dump_preset(preset) {
            Ok(dumped) => {
                tracing::info!("Compiled preset '{}': {} passes, {} images", preset.name(), dumped.compiled.execution_order().len(), dumped.compiled.images().len());
                presets.insert(preset.name(), dumped);
            }
            Err(e) => {
                eprintln!("Error compiling preset '{}': {e}", preset.name());
                process::exit(1);
            }
        }
    }

    println!("Total presets: {}", presets.len());

    let json = match serde_json::to_string_pretty(&presets) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing presets: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = fs::write(&args.output_file, json) {
        eprintln!("Error writing output file '{}': {e}", args.output_file.display());
        process::exit(1);
    }

    println!("Successfully wrote presets to {}", args.output_file.display());
}
