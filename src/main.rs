//! listflow - Command-line pipeline runner
//!
//! Loads a declarative pipeline description, optionally an initial
//! payload, runs the pipeline and prints the final payload as JSON.
//!
//! Usage: `listflow <pipeline.json> [input.json]`

use anyhow::Context;
use listflow::pipeline::PipelineFile;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(pipeline_path) = args.next() else {
        anyhow::bail!("usage: listflow <pipeline.json> [input.json]");
    };
    let input_path = args.next();

    let description = PipelineFile::load(&pipeline_path)
        .with_context(|| format!("failed to load pipeline from {pipeline_path}"))?;
    let mut pipeline = description.build().context("failed to build pipeline")?;
    tracing::info!(stages = pipeline.len(), "pipeline built");

    let initial: Option<Value> = match input_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read input from {path}"))?;
            Some(serde_json::from_str(&text).context("input is not valid JSON")?)
        }
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .context("failed to build runtime")?;
    let mut logger = |msg: &str| tracing::info!("{msg}");
    let output = runtime
        .block_on(pipeline.run(initial, Some(&mut logger), None))
        .context("pipeline run failed")?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
