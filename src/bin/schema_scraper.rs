//! schema_scraper - writes the Udyam form schema artifact
//!
//! The registration portal sits behind anti-bot protection, so the schema is
//! the predefined field set mirroring the portal's form rather than a live
//! scrape.
//!
//! Usage: schema_scraper [--out <path>] [--stdout]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use udyam::telemetry::init_tracing;
use udyam_core::schema::{builtin_schema, SchemaProvider, DEFAULT_SCHEMA_PATH};

#[derive(Parser)]
#[command(name = "schema_scraper")]
#[command(about = "Write the Udyam registration form schema as JSON")]
struct Cli {
    /// Output file for the schema artifact
    #[arg(long, env = "UDYAM_SCHEMA_PATH", default_value = DEFAULT_SCHEMA_PATH)]
    out: PathBuf,

    /// Print the schema instead of writing it
    #[arg(long)]
    stdout: bool,
}

fn main() -> Result<()> {
    init_tracing("info");
    let cli = Cli::parse();

    let schema = builtin_schema();
    // Refuse to emit an artifact the server would reject at startup.
    SchemaProvider::new(schema.clone()).context("built-in schema failed validation")?;
    let json = serde_json::to_string_pretty(&schema).context("failed to serialize schema")?;

    if cli.stdout {
        println!("{json}");
        return Ok(());
    }

    if let Some(parent) = cli.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&cli.out, format!("{json}\n"))
        .with_context(|| format!("failed to write {}", cli.out.display()))?;

    let titles: Vec<&str> = schema.steps.iter().map(|s| s.title.as_str()).collect();
    println!("Schema written to {}", cli.out.display());
    println!("Form fields extracted: {} total fields", schema.field_count());
    println!("Steps: {}", titles.join(", "));
    Ok(())
}
