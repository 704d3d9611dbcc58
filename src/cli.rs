//! Command-line entry points.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::api::{serve_until_ctrl_c, ApiContext};
use crate::config::AppConfig;
use crate::pipeline::drift::{
    compare_files, write_report, KsDriftComparator, DEFAULT_DRIFT_THRESHOLD,
};
use crate::pipeline::SymptomPipeline;

#[derive(Parser, Debug)]
#[command(name = "calmora")]
#[command(about = "Calm, explainable symptom checker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API (default)
    Serve {
        /// Address to bind; overrides CALMORA_BIND_ADDR
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
    },

    /// Compare two CSV files offline and write a JSON drift report
    Drift {
        reference: PathBuf,
        current: PathBuf,
        report: PathBuf,
        #[arg(long, default_value_t = DEFAULT_DRIFT_THRESHOLD)]
        threshold: f64,
    },
}

pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(bind),
        Command::Drift {
            reference,
            current,
            report,
            threshold,
        } => drift(&reference, &current, &report, threshold),
    }
}

fn serve(bind: Option<std::net::SocketAddr>) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(addr) = bind {
        config.bind_addr = addr;
    }

    // Built before the runtime: the remote recognizer owns a blocking HTTP
    // client, which must be created and dropped outside async context.
    let pipeline = Arc::new(
        SymptomPipeline::from_config(&config).context("Failed to build the symptom pipeline")?,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let result = runtime.block_on(serve_until_ctrl_c(
        ApiContext::new(Arc::clone(&pipeline)),
        config.bind_addr,
    ));
    drop(runtime);
    drop(pipeline);

    result.with_context(|| format!("API server on {} failed", config.bind_addr))
}

fn drift(
    reference: &std::path::Path,
    current: &std::path::Path,
    output: &std::path::Path,
    threshold: f64,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "threshold must be between 0 and 1, got {threshold}"
    );
    let report = compare_files(reference, current, threshold, &KsDriftComparator::default())?;
    write_report(&report, output)?;
    println!(
        "Drift Score: {:.3} | Drift Detected: {} | report: {}",
        report.drift_score,
        report.drift_detected,
        output.display()
    );
    Ok(())
}
