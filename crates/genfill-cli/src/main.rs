mod args;
mod auth;
mod context;
mod output;
mod pipeline;
mod predict;
mod session;
mod upload;

#[cfg(test)]
mod mock;

use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::output::print_summary;
use crate::pipeline::{run, RunConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    genfill_common::telemetry::init_tracing("genfill", args.log_format);

    let cfg = RunConfig::from_args(args);
    let outcome = run(&cfg).await.inspect_err(|e| {
        tracing::error!("run aborted: {e:#}");
    })?;

    print_summary(cfg.params.seed, &outcome.artifacts, &outcome.written);
    Ok(())
}
