use reqwest::multipart::Form;

use genfill_common::consts::{
    FIELD_ANALYZER_REQUESTS, HEADER_SESSION_ID, HEADER_SESSION_SIZE, SESSION_CREATE_PATH,
};
use genfill_common::{check_status, FillError, SessionCreateRequest};

use crate::context::ServiceContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub quota_bytes: u64,
}

impl Session {
    pub fn quota_mb(&self) -> f64 {
        self.quota_bytes as f64 / 1024.0 / 1024.0
    }
}

fn required_header<'a>(resp: &'a reqwest::Response, name: &str) -> Result<&'a str, FillError> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FillError::protocol(format!("session response has no {name} header")))
}

/// Open a server-side session. The id and quota come back as headers; the id
/// is bound to the context for every later call. There is no teardown: the
/// server drops the session once `ttl_secs` run out.
pub async fn create_session(
    mut ctx: ServiceContext,
    ttl_secs: u64,
) -> Result<(ServiceContext, Session), FillError> {
    let request = serde_json::to_string(&SessionCreateRequest {
        session_ttl: ttl_secs,
    })?;
    let form = Form::new().text(FIELD_ANALYZER_REQUESTS, request);

    let resp = ctx
        .post(&ctx.api_url(SESSION_CREATE_PATH))
        .multipart(form)
        .send()
        .await?;
    let resp = check_status(resp).await?;

    let session_id = required_header(&resp, HEADER_SESSION_ID)?.to_string();
    let quota_raw = required_header(&resp, HEADER_SESSION_SIZE)?;
    let quota_bytes = quota_raw.parse::<u64>().map_err(|e| {
        FillError::protocol(format!("bad {HEADER_SESSION_SIZE} header '{quota_raw}': {e}"))
    })?;

    ctx.set_header(HEADER_SESSION_ID, &session_id)?;

    let session = Session {
        session_id,
        quota_bytes,
    };
    tracing::info!(
        session_id = %session.session_id,
        quota_mb = session.quota_mb(),
        ttl_secs,
        "session created"
    );
    Ok((ctx, session))
}
