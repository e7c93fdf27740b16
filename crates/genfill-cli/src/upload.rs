use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use genfill_common::consts::{
    FIELD_INPUT_IMAGE, FIELD_INPUT_MASK, FIELD_LOAD_REQUEST, PNG, SESSION_LOAD_PATH,
};
use genfill_common::{check_status, FillError, LoadContentRequest};

use crate::context::ServiceContext;

async fn file_part(path: &Path) -> Result<Part, FillError> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        FillError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot read {}: {e}", path.display()),
        ))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.png".to_string());

    tracing::debug!(path = %path.display(), bytes = data.len(), "attaching asset");
    Ok(Part::bytes(data).file_name(file_name).mime_str(PNG)?)
}

/// Load the image and mask into the session cache as `gi_IMAGE` / `gi_MASK`.
///
/// Later calls refer to them by those names only. The service reports success
/// as `{"status": 200}` in the body.
pub async fn load_assets(
    ctx: ServiceContext,
    image: &Path,
    mask: &Path,
) -> Result<ServiceContext, FillError> {
    let request = serde_json::to_string(&LoadContentRequest::image_and_mask())?;
    let form = Form::new()
        .text(FIELD_LOAD_REQUEST, request)
        .part(FIELD_INPUT_IMAGE, file_part(image).await?)
        .part(FIELD_INPUT_MASK, file_part(mask).await?);

    let resp = ctx
        .post(&ctx.api_url(SESSION_LOAD_PATH))
        .multipart(form)
        .send()
        .await?;
    let resp = check_status(resp).await?;
    let body = resp.bytes().await?;

    let parsed: Value = serde_json::from_slice(&body)
        .map_err(|e| FillError::protocol(format!("load response is not JSON: {e}")))?;
    match parsed.get("status").and_then(Value::as_i64) {
        Some(200) => {}
        Some(other) => {
            return Err(FillError::protocol(format!("asset load reported status {other}")));
        }
        None => return Err(FillError::protocol("load response has no numeric status")),
    }

    tracing::info!("image and mask loaded into session");
    Ok(ctx)
}
