use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;

use genfill_common::consts::SESSION_TTL_SECS;
use genfill_common::{demultiplex, Artifact, Credentials, InpaintParams};

use crate::args::Args;
use crate::auth::authenticate;
use crate::context::ServiceContext;
use crate::output::write_artifacts;
use crate::predict::{predict, PredictOptions};
use crate::session::create_session;
use crate::upload::load_assets;

/// Largest seed the service accepts.
pub const MAX_SEED: u32 = i32::MAX as u32;

pub fn draw_seed() -> u32 {
    rand::thread_rng().gen_range(0..=MAX_SEED)
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub config_path: PathBuf,
    pub image: PathBuf,
    pub mask: PathBuf,
    pub out_dir: PathBuf,
    pub ims_url: String,
    pub base_url: String,
    pub timeout: Duration,
    pub predict: PredictOptions,
    pub params: InpaintParams,
}

impl RunConfig {
    pub fn from_args(args: Args) -> Self {
        let seed = args.seed.unwrap_or_else(draw_seed);
        let params = InpaintParams {
            num_steps: args.steps,
            guidance: args.guidance,
            similarity: args.similarity,
            crop: args.crop,
            dilate: args.dilate,
            content_preserve: args.content_preserve,
            enable_prompt_filter: !args.no_prompt_filter,
            prompt: args.prompt,
            ..InpaintParams::with_seed(seed)
        };

        Self {
            config_path: args.config,
            image: args.image,
            mask: args.mask,
            out_dir: args.out_dir,
            ims_url: args.ims_url,
            base_url: args.base_url,
            timeout: Duration::from_secs(args.timeout_secs),
            predict: PredictOptions {
                engine: args.engine,
                analyzer_id: args.analyzer_id,
                wait_secs: args.wait_secs,
            },
            params,
        }
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub artifacts: Vec<Artifact>,
    pub written: Vec<PathBuf>,
}

/// authenticate → create session → load assets → predict → write outputs.
///
/// Stops at the first failure. Nothing is written unless the whole predict
/// response was received and routed.
pub async fn run(cfg: &RunConfig) -> Result<RunOutcome> {
    let creds = Credentials::load(&cfg.config_path)
        .with_context(|| format!("loading credentials from {}", cfg.config_path.display()))?;

    let seed = cfg.params.seed;
    if seed > MAX_SEED {
        tracing::warn!(seed, "seed above 2147483647 is known to fail remotely");
    }
    tracing::info!(seed, "seed selected");

    let ctx = ServiceContext::new(&cfg.ims_url, &cfg.base_url, cfg.timeout)?;

    tracing::info!(device_id = %creds.device_id, "authorizing device");
    let (ctx, token) = authenticate(ctx, &creds)
        .await
        .context("device token exchange failed")?;
    tracing::debug!(token_len = token.bearer_token.len(), "bearer token bound");

    let (ctx, _session) = create_session(ctx, SESSION_TTL_SECS)
        .await
        .context("creating session failed")?;

    let ctx = load_assets(ctx, &cfg.image, &cfg.mask)
        .await
        .context("loading image and mask failed")?;

    let (_ctx, parts) = predict(ctx, &cfg.predict, &cfg.params)
        .await
        .context("prediction failed")?;

    let artifacts = demultiplex(&parts, seed).context("unreadable prediction result")?;
    if artifacts.is_empty() {
        tracing::warn!(parts = parts.len(), "no recognised outputs in prediction result");
    }

    let written = write_artifacts(&cfg.out_dir, &artifacts)
        .await
        .with_context(|| format!("writing outputs to {}", cfg.out_dir.display()))?;

    Ok(RunOutcome { artifacts, written })
}
