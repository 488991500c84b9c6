// src/main.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use trellis::{render, Document, OutputFormat};
use trellis_core::Direction;
use trellis_layout::LayoutConfig;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about = "Lays out a JSON node tree with flexbox and prints the result")]
struct Args {
    /// Path to the JSON document
    #[arg(value_name = "FILE")]
    document: String,

    /// Available width; omit for unconstrained
    #[arg(long)]
    width: Option<f32>,

    /// Available height; omit for unconstrained
    #[arg(long)]
    height: Option<f32>,

    /// Inline direction of the root (inherit, ltr, rtl)
    #[arg(long, default_value = "ltr")]
    direction: Direction,

    /// Device pixels per layout point; 0 disables rounding
    #[arg(long, default_value = "1.0")]
    scale: f32,

    /// Output format
    #[arg(long, value_enum, default_value = "tree")]
    format: OutputFormat,

    /// Save output to file instead of stdout
    #[arg(long)]
    output: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if !Path::new(&args.document).exists() {
        anyhow::bail!("Document not found: {}", args.document);
    }

    info!("Loading document: {}", args.document);
    let config = LayoutConfig::new()
        .with_point_scale_factor(args.scale)
        .with_debug(args.debug);
    let mut document = Document::load(&args.document, config)?;

    document.layout(args.width, args.height, args.direction)?;
    let stats = document.tree.last_pass_stats();
    info!(
        "Laid out {} nodes ({} cache hits, {} measure calls)",
        document.tree.len(),
        stats.hits,
        stats.measure_calls
    );

    let output_text = render(&document, args.format)?;

    // Output to file or stdout
    if let Some(output_file) = args.output {
        fs::write(&output_file, output_text)
            .with_context(|| format!("Failed to write to file: {}", output_file))?;
        info!("Output written to: {}", output_file);
    } else {
        print!("{}", output_text);
    }

    Ok(())
}
