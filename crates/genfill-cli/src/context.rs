use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder};

use genfill_common::consts::{CLIENT_ID, HEADER_IMS_CLIENT_ID, USER_AGENT_PREFIX};
use genfill_common::FillError;

/// Everything one run carries from stage to stage.
///
/// Stages take the context by value and hand it back, so the outgoing header
/// set only ever grows through [`ServiceContext::set_header`].
#[derive(Debug, Clone)]
pub struct ServiceContext {
    http: Client,
    ims_url: String,
    base_url: String,
    headers: HeaderMap,
}

/// `NGL Client/… [2023-06-07T20:12:34.567-0100]`
pub fn enrollment_user_agent<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{USER_AGENT_PREFIX} [{}]",
        now.format("%Y-%m-%dT%H:%M:%S%.3f%z")
    )
}

impl ServiceContext {
    pub fn new(ims_url: &str, base_url: &str, timeout: Duration) -> Result<Self, FillError> {
        let http = Client::builder().timeout(timeout).build()?;

        let mut ctx = Self {
            http,
            ims_url: ims_url.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
        };
        ctx.set_header(USER_AGENT.as_str(), &enrollment_user_agent(&Local::now()))?;
        ctx.set_header(HEADER_IMS_CLIENT_ID, CLIENT_ID)?;
        Ok(ctx)
    }

    pub fn ims_url(&self) -> &str {
        &self.ims_url
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), FillError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FillError::protocol(format!("invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FillError::protocol(format!("invalid value for header {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// POST carrying the current header set.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).headers(self.headers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_enrollment_user_agent_format() {
        let tz = FixedOffset::west_opt(3600).unwrap();
        let now = tz
            .with_ymd_and_hms(2023, 6, 7, 20, 12, 34)
            .unwrap()
            + chrono::Duration::milliseconds(567);
        assert_eq!(
            enrollment_user_agent(&now),
            "NGL Client/1.33.0.11 (WINDOWS_64/10.0.19045.1) [2023-06-07T20:12:34.567-0100]"
        );
    }

    #[test]
    fn test_initial_headers() {
        let ctx = ServiceContext::new("http://ims/token", "http://api/", Duration::from_secs(5)).unwrap();
        assert!(ctx.header("user-agent").unwrap().starts_with("NGL Client/"));
        assert_eq!(ctx.header("x-ims-clientid"), Some("ps_gentech_diffusion_desktop"));
        assert!(ctx.header("authorization").is_none());
        assert_eq!(ctx.api_url("/services/v2/predict"), "http://api/services/v2/predict");
    }

    #[test]
    fn test_set_header_replaces() {
        let mut ctx = ServiceContext::new("http://ims", "http://api", Duration::from_secs(5)).unwrap();
        ctx.set_header("x-session-id", "a").unwrap();
        ctx.set_header("x-session-id", "b").unwrap();
        assert_eq!(ctx.header("x-session-id"), Some("b"));
        assert!(ctx.set_header("x-session-id", "bad\nvalue").is_err());
    }
}
