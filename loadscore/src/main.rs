mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use loadscore::{Ingest, JsonReporter, Pipeline, Reporter, TextReporter};
use tokio::io::BufReader;

use cli::{Cli, Format};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("\nError: {e:#}\n");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.log_level.as_deref());

    let pipeline = Pipeline::builder().name(cli.name.clone()).build();
    let mut ingest = Ingest::new();
    for input in &cli.inputs {
        if input.as_os_str() == "-" {
            ingest
                .read("stdin", BufReader::new(tokio::io::stdin()))
                .await
                .context("Failed to read metrics from stdin")?;
        } else {
            ingest
                .read_path(input)
                .await
                .with_context(|| format!("Failed to read metrics from {}", input.display()))?;
        }
    }

    let report = pipeline.report(ingest);
    match cli.format {
        Format::Text => TextReporter.report(&report).await?,
        Format::Json => JsonReporter.report(&report).await?,
    }
    Ok(())
}
