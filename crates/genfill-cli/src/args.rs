use std::path::PathBuf;

use clap::Parser;

use genfill_common::consts::{
    DEFAULT_ANALYZER_ID, DEFAULT_BASE_URL, DEFAULT_ENGINE, DEFAULT_TIMEOUT_SECS, DEFAULT_WAIT_SECS,
    IMS_TOKEN_URL,
};
use genfill_common::telemetry::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "genfill")]
#[command(about = "Generative fill of a masked image region through the Sensei API", long_about = None)]
pub struct Args {
    /// JSON file holding `device_id` and `device_token`
    #[arg(long, env = "GENFILL_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Source image (PNG)
    #[arg(long, env = "GENFILL_IMAGE", default_value = "image.png")]
    pub image: PathBuf,

    /// Mask selecting the region to fill (PNG)
    #[arg(long, env = "GENFILL_MASK", default_value = "mask.png")]
    pub mask: PathBuf,

    /// Directory receiving the generated files
    #[arg(long, env = "GENFILL_OUT_DIR", default_value = "out")]
    pub out_dir: PathBuf,

    /// IMS token endpoint
    #[arg(long, env = "GENFILL_IMS_URL", default_value = IMS_TOKEN_URL)]
    pub ims_url: String,

    /// Sensei API host
    #[arg(long, env = "GENFILL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Remote engine selector
    #[arg(long, env = "GENFILL_ENGINE", default_value = DEFAULT_ENGINE)]
    pub engine: String,

    /// Value of the x-analyzer-id header on the predict call
    #[arg(long, env = "GENFILL_ANALYZER_ID", default_value = DEFAULT_ANALYZER_ID)]
    pub analyzer_id: String,

    /// Fixed seed; drawn from 0..=2147483647 when omitted
    #[arg(long)]
    pub seed: Option<u32>,

    /// Text prompt (switches the job to prompted fill)
    #[arg(long)]
    pub prompt: Option<String>,

    #[arg(long, default_value_t = 50)]
    pub steps: u32,

    #[arg(long, value_parser = finite_f64, default_value_t = 6.0)]
    pub guidance: f64,

    #[arg(long, value_parser = finite_f64, default_value_t = 0.0)]
    pub similarity: f64,

    #[arg(long, value_parser = finite_f64, default_value_t = 0.0)]
    pub content_preserve: f64,

    #[arg(long)]
    pub crop: bool,

    #[arg(long)]
    pub dilate: bool,

    /// Ask the service not to filter the prompt
    #[arg(long)]
    pub no_prompt_filter: bool,

    /// How long the service may block on the predict call before answering
    #[arg(long, env = "GENFILL_WAIT_SECS", default_value_t = DEFAULT_WAIT_SECS)]
    pub wait_secs: u64,

    /// Per-request timeout
    #[arg(long, env = "GENFILL_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Log output format: plain or json
    #[arg(long, env = "GENFILL_LOG_FORMAT", default_value = "plain")]
    pub log_format: LogFormat,
}

fn finite_f64(raw: &str) -> Result<f64, String> {
    let v: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("expected a finite number, got {raw}"))
    }
}
