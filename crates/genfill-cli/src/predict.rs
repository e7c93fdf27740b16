use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;

use genfill_common::consts::{
    FIELD_ANALYZER_REQUESTS, HEADER_ANALYZER_ID, HEADER_PREFER, PREDICT_PATH,
};
use genfill_common::demux::boundary_from_content_type;
use genfill_common::{
    check_status, parse_multipart, ContentAnalyzerRequest, FillError, InpaintParams, Part,
};

use crate::context::ServiceContext;

#[derive(Debug, Clone)]
pub struct PredictOptions {
    pub engine: String,
    pub analyzer_id: String,
    /// Seconds the service may block before answering with what is ready.
    pub wait_secs: u64,
}

/// Run one synchronous inpainting job and split the multipart answer.
///
/// The whole body is parsed before returning, so a truncated answer surfaces as
/// an error instead of a partial result.
pub async fn predict(
    mut ctx: ServiceContext,
    opts: &PredictOptions,
    params: &InpaintParams,
) -> Result<(ServiceContext, Vec<Part>), FillError> {
    ctx.set_header(HEADER_ANALYZER_ID, &opts.analyzer_id)?;
    ctx.set_header(HEADER_PREFER, &format!("respond-sync, wait={}", opts.wait_secs))?;

    let request = ContentAnalyzerRequest::inpaint(&opts.engine, params)?;
    let form = Form::new().text(FIELD_ANALYZER_REQUESTS, serde_json::to_string(&request)?);

    tracing::info!(
        seed = params.seed,
        mode = params.mode(),
        wait_secs = opts.wait_secs,
        "waiting for prediction"
    );
    let resp = ctx
        .post(&ctx.api_url(PREDICT_PATH))
        .multipart(form)
        .send()
        .await?;
    let resp = check_status(resp).await?;

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let boundary = boundary_from_content_type(&content_type).ok_or_else(|| {
        FillError::protocol(format!("predict response is not multipart: '{content_type}'"))
    })?;

    let parts = parse_multipart(resp.bytes_stream(), &boundary).await?;
    let bytes: usize = parts.iter().map(|p| p.body.len()).sum();
    tracing::info!(parts = parts.len(), bytes, "prediction received");
    Ok((ctx, parts))
}
