use std::fmt;

use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, PRAGMA, USER_AGENT};
use serde::Deserialize;

use genfill_common::consts::{CLIENT_ID, HEADER_API_KEY, LOCALE, SCOPE};
use genfill_common::{check_status, Credentials, FillError};

use crate::context::ServiceContext;

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Clone)]
pub struct AccessToken {
    pub bearer_token: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchange device credentials for a bearer token (`grant_type=device`).
///
/// The returned context authenticates every later call and no longer sends the
/// enrollment user agent.
pub async fn authenticate(
    mut ctx: ServiceContext,
    creds: &Credentials,
) -> Result<(ServiceContext, AccessToken), FillError> {
    creds.validate()?;

    let form = [
        ("grant_type", "device"),
        ("device_id", creds.device_id.as_str()),
        ("device_token", creds.device_token.as_str()),
        ("client_id", CLIENT_ID),
        ("scope", SCOPE),
        ("locale", LOCALE),
    ];

    let resp = ctx.post(ctx.ims_url()).form(&form[..]).send().await?;
    let resp = check_status(resp).await?;
    let body = resp.bytes().await?;

    let parsed: TokenResponse = serde_json::from_slice(&body)
        .map_err(|e| FillError::protocol(format!("token response is not JSON: {e}")))?;
    let bearer_token = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FillError::protocol("token response has no access_token"))?;

    ctx.set_header(AUTHORIZATION.as_str(), &format!("Bearer {bearer_token}"))?;
    ctx.set_header(HEADER_API_KEY, CLIENT_ID)?;
    ctx.set_header(CACHE_CONTROL.as_str(), "no-cache")?;
    ctx.set_header(PRAGMA.as_str(), "no-cache")?;
    // API traffic goes out with an empty user agent.
    ctx.set_header(USER_AGENT.as_str(), "")?;

    tracing::info!("device authorized");
    Ok((ctx, AccessToken { bearer_token }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mock::{Behaviour, MockServer, TOKEN};

    fn creds() -> Credentials {
        Credentials {
            device_id: "dev-1".into(),
            device_token: "eyJ.device".into(),
        }
    }

    fn context(mock: &MockServer) -> ServiceContext {
        ServiceContext::new(&mock.ims_url(), &mock.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_sets_bearer_and_clears_user_agent() {
        let mock = MockServer::start(Behaviour::default()).await;
        let ctx = context(&mock);
        let enrollment_agent = ctx.header("user-agent").unwrap().to_string();

        let (ctx, token) = authenticate(ctx, &creds()).await.unwrap();
        assert_eq!(token.bearer_token, TOKEN);
        assert_eq!(ctx.header("authorization"), Some("Bearer tok-123"));
        assert_eq!(ctx.header("x-api-key"), Some("ps_gentech_diffusion_desktop"));
        assert_eq!(ctx.header("cache-control"), Some("no-cache"));
        assert_ne!(ctx.header("user-agent"), Some(enrollment_agent.as_str()));

        let call = mock.call("/ims/token");
        let sent_agent = call.headers.get("user-agent").unwrap().to_str().unwrap();
        assert_eq!(sent_agent, enrollment_agent);
        assert!(call.headers.get("authorization").is_none());
        assert!(call.form.contains("grant_type=device"));
        assert!(call.form.contains("device_id=dev-1"));
        assert!(call.form.contains("scope=AdobeID%2Copenid%2Ccreative_cloud"));
    }

    #[tokio::test]
    async fn test_authenticate_http_error() {
        let mock = MockServer::start(Behaviour {
            token_status: 401,
            token_body: r#"{"error":"invalid_token"}"#.into(),
            ..Behaviour::default()
        })
        .await;

        let err = authenticate(context(&mock), &creds()).await.unwrap_err();
        match err {
            FillError::Http { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid_token"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_missing_token_field() {
        for body in [r#"{"token_type":"bearer"}"#, r#"{"access_token":""}"#, "not json"] {
            let mock = MockServer::start(Behaviour {
                token_body: body.into(),
                ..Behaviour::default()
            })
            .await;
            let err = authenticate(context(&mock), &creds()).await.unwrap_err();
            assert!(matches!(err, FillError::Protocol(_)), "{body}: {err}");
        }
    }

    #[tokio::test]
    async fn test_empty_credentials_never_reach_network() {
        let mock = MockServer::start(Behaviour::default()).await;
        let bad = Credentials {
            device_id: "dev-1".into(),
            device_token: String::new(),
        };
        let err = authenticate(context(&mock), &bad).await.unwrap_err();
        assert!(matches!(err, FillError::Config(_)));
        assert!(mock.calls().is_empty());
    }
}
