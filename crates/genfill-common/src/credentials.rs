use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::FillError;

/// Device credentials read from `config.json`.
///
/// How these are obtained is outside this crate: they are copied from an
/// enrolled desktop install and treated as opaque strings.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub device_id: String,

    /// Long-lived (year-scale) JWT bound to the device id.
    #[serde(default)]
    pub device_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("device_id", &self.device_id)
            .field("device_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_json(raw: &str) -> Result<Self, FillError> {
        let creds: Credentials = serde_json::from_str(raw)
            .map_err(|e| FillError::Config(format!("invalid config: {e}")))?;
        creds.validate()?;
        Ok(creds)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FillError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FillError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), FillError> {
        if self.device_token.trim().is_empty() {
            return Err(FillError::Config("device_token is missing or empty".into()));
        }
        if self.device_id.trim().is_empty() {
            return Err(FillError::Config("device_id is missing or empty".into()));
        }
        Ok(())
    }
}
