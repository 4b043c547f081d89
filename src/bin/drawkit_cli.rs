//! CLI tool for drawkit - renders a progress configuration to SVG
//!
//! Usage:
//!   drawkit_cli <config.json>             # Output SVG to stdout
//!   drawkit_cli <config.json> -o out.svg  # Output SVG to file
//!
//! Animations are played to their end state; set `RUST_LOG=drawkit=debug`
//! to trace rendering and scheduling.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use drawkit::progress::{render_svg, ProgressConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: drawkit_cli <config.json> [-o output.svg]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    // Read input file
    let json = match fs::read_to_string(input_path) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    // Parse and validate configuration
    let config = match ProgressConfig::from_json(&json) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error in configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Element ids are prefixed with the file stem
    let id = Path::new(input_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("progress");

    let snapshot = match render_svg(id, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error rendering: {}", e);
            std::process::exit(1);
        }
    };
    for event in &snapshot.events {
        tracing::info!(event = %serde_json::to_string(event).unwrap(), "progress event");
    }

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &snapshot.markup) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(snapshot.markup.as_bytes()).unwrap();
            println!();
        }
    }
}
