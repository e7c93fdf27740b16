// ── Identity service (IMS) ──────────────────────────────────────────

pub const IMS_TOKEN_URL: &str = "https://ims-prod06.adobelogin.com/ims/token/v4";
pub const CLIENT_ID: &str = "ps_gentech_diffusion_desktop";
pub const SCOPE: &str = "AdobeID,openid,creative_cloud";
pub const LOCALE: &str = "en_US";

/// Prefix of the enrollment user agent; the local timestamp is appended in brackets.
pub const USER_AGENT_PREFIX: &str = "NGL Client/1.33.0.11 (WINDOWS_64/10.0.19045.1)";

// ── Sensei content-analyzer API ─────────────────────────────────────

/// Known hosts: `https://sensei.adobe.io`, `https://sensei-ue1.adobe.io`,
/// `https://sensei-stage-ue1.adobe.io`.
pub const DEFAULT_BASE_URL: &str = "https://sensei-ue1.adobe.io";

pub const SESSION_CREATE_PATH: &str = "/services/session/create";
pub const SESSION_LOAD_PATH: &str = "/services/session/load";
pub const PREDICT_PATH: &str = "/services/v2/predict";

pub const SESSION_TTL_SECS: u64 = 600;

pub const DEFAULT_ENGINE: &str = "Feature:autocrop:Service-3f6d0678be864218ad8c89ef48462c17";
pub const DEFAULT_ANALYZER_ID: &str = "Service-398fbb92554d450f9e47b1a8ac8f033a";
pub const GRAPH_URI: &str = "urn:graph:MultiDiffusion_v2";
pub const JOB_NAME: &str = "Multidiffusion";

pub const DEFAULT_WAIT_SECS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ── Headers ─────────────────────────────────────────────────────────

pub const HEADER_IMS_CLIENT_ID: &str = "x-ims-clientid";
pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_SESSION_ID: &str = "x-session-id";
pub const HEADER_SESSION_SIZE: &str = "remaining-session-size";
pub const HEADER_ANALYZER_ID: &str = "x-analyzer-id";
pub const HEADER_PREFER: &str = "prefer";

// ── Multipart field names ───────────────────────────────────────────

pub const FIELD_ANALYZER_REQUESTS: &str = "contentAnalyzerRequests";
pub const FIELD_LOAD_REQUEST: &str = "loadContentRequest";
pub const FIELD_INPUT_IMAGE: &str = "input_image";
pub const FIELD_INPUT_MASK: &str = "input_mask";

pub const PNG: &str = "image/png";
