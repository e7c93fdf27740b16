//! Request schema for the session and predict endpoints.
//!
//! The service expects namespaced keys (`sensei:*`, `dc:*`, `repo:*`) inside
//! JSON strings carried as multipart text fields.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::consts::{FIELD_INPUT_IMAGE, FIELD_INPUT_MASK, GRAPH_URI, JOB_NAME, PNG};
use crate::error::FillError;

pub const FIELD_GENERATED_IMAGE: &str = "generated-image";
pub const FIELD_GENERATED_MASK: &str = "generated-mask";
pub const FIELD_SPL_RESPONSE: &str = "spl:response";

// ── Session ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCreateRequest {
    pub session_ttl: u64,
}

// ── Shared slots ────────────────────────────────────────────────────

/// The two logical assets every job works on.
#[derive(Debug, Clone, Serialize)]
pub struct AssetSlots<T> {
    #[serde(rename = "gi_IMAGE")]
    pub image: T,
    #[serde(rename = "gi_MASK")]
    pub mask: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadSlot {
    #[serde(rename = "dc:format")]
    pub format: String,
    #[serde(rename = "sensei:multipart_field_name")]
    pub field_name: String,
}

impl UploadSlot {
    fn png(field_name: &str) -> Self {
        Self {
            format: PNG.to_string(),
            field_name: field_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadContentRequest {
    #[serde(rename = "sensei:inputs")]
    pub inputs: AssetSlots<UploadSlot>,
}

impl LoadContentRequest {
    pub fn image_and_mask() -> Self {
        Self {
            inputs: AssetSlots {
                image: UploadSlot::png(FIELD_INPUT_IMAGE),
                mask: UploadSlot::png(FIELD_INPUT_MASK),
            },
        }
    }
}

// ── Predict ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    Synchronous,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RepoType {
    #[serde(rename = "SESSION_CACHE")]
    SessionCache,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentAnalyzerRequest {
    #[serde(rename = "sensei:engines")]
    pub engines: Vec<EngineInvocation>,
    #[serde(rename = "sensei:in_response")]
    pub in_response: bool,
    #[serde(rename = "sensei:invocation_batch")]
    pub invocation_batch: bool,
    #[serde(rename = "sensei:invocation_mode")]
    pub invocation_mode: InvocationMode,
    #[serde(rename = "sensei:name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineInvocation {
    #[serde(rename = "sensei:execution_info")]
    pub execution_info: ExecutionInfo,
    #[serde(rename = "sensei:inputs")]
    pub inputs: AssetSlots<CachedInput>,
    #[serde(rename = "sensei:outputs")]
    pub outputs: EngineOutputs,
    #[serde(rename = "sensei:params")]
    pub params: EngineParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionInfo {
    #[serde(rename = "sensei:engine")]
    pub engine: String,
}

/// An input resolved from the session cache by its logical name.
#[derive(Debug, Clone, Serialize)]
pub struct CachedInput {
    #[serde(rename = "dc:format")]
    pub format: String,
    #[serde(rename = "repo:id")]
    pub repo_id: String,
    #[serde(rename = "sensei:repoType")]
    pub repo_type: RepoType,
}

impl CachedInput {
    fn png(repo_id: &str) -> Self {
        Self {
            format: PNG.to_string(),
            repo_id: repo_id.to_string(),
            repo_type: RepoType::SessionCache,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineOutputs {
    #[serde(rename = "gi_GEN_IMAGE")]
    pub image: UploadSlot,
    #[serde(rename = "gi_GEN_MASK")]
    pub mask: UploadSlot,
    #[serde(rename = "spl:response")]
    pub response: UploadSlot,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineParams {
    #[serde(rename = "spl:request")]
    pub spl_request: GraphRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphRequest {
    pub graph: GraphRef,
    pub inputs: AssetSlots<GraphNode>,
    pub outputs: GraphOutputs,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphRef {
    pub uri: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Image,
    Scalar,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    #[serde(rename = "expectedMimeType", skip_serializing_if = "Option::is_none")]
    pub expected_mime_type: Option<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
}

impl GraphNode {
    fn new(id: &str, kind: NodeType, expected_mime_type: Option<&str>) -> Self {
        Self {
            expected_mime_type: expected_mime_type.map(str::to_string),
            id: id.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphOutputs {
    #[serde(rename = "gi_GEN_IMAGE")]
    pub image: GraphNode,
    #[serde(rename = "gi_GEN_MASK")]
    pub mask: GraphNode,
    #[serde(rename = "gi_GEN_STATUS")]
    pub status: GraphNode,
}

// ── Parameters ──────────────────────────────────────────────────────

/// Typed value of one graph parameter; serializes as `"type": …, "value": …`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParamValue {
    String(String),
    Scalar(Number),
    Boolean(bool),
}

impl ParamValue {
    pub fn int(v: i64) -> Self {
        ParamValue::Scalar(Number::from(v))
    }

    /// Whole numbers go out as integers, everything else as floats.
    pub fn number(v: f64) -> Result<Self, FillError> {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Ok(Self::int(v as i64))
        } else {
            Self::float(v)
        }
    }

    /// Always a float, `0.0` stays `0.0`. NaN and infinities have no JSON form.
    pub fn float(v: f64) -> Result<Self, FillError> {
        Number::from_f64(v)
            .map(ParamValue::Scalar)
            .ok_or_else(|| FillError::Config(format!("scalar parameter must be finite, got {v}")))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Param {
    pub name: String,
    #[serde(flatten)]
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: &str, value: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// Knobs of the inpainting graph. Values are passed through uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct InpaintParams {
    /// Must stay within `0..=i32::MAX`; larger seeds fail remotely.
    pub seed: u32,
    pub num_steps: u32,
    pub guidance: f64,
    pub similarity: f64,
    pub crop: bool,
    pub dilate: bool,
    pub content_preserve: f64,
    pub enable_prompt_filter: bool,
    /// Text prompt; switches the graph from `ginp` to `tinp`.
    pub prompt: Option<String>,
}

impl InpaintParams {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            num_steps: 50,
            guidance: 6.0,
            similarity: 0.0,
            crop: false,
            dilate: false,
            content_preserve: 0.0,
            enable_prompt_filter: true,
            prompt: None,
        }
    }

    pub fn mode(&self) -> &'static str {
        if self.prompt.is_some() {
            "tinp"
        } else {
            "ginp"
        }
    }

    pub fn to_params(&self) -> Result<Vec<Param>, FillError> {
        let mut params = vec![
            Param::new("gi_MODE", ParamValue::String(self.mode().to_string())),
            Param::new("gi_SEED", ParamValue::int(self.seed as i64)),
            Param::new("gi_NUM_STEPS", ParamValue::int(self.num_steps as i64)),
            Param::new("gi_GUIDANCE", ParamValue::number(self.guidance)?),
            Param::new("gi_SIMILARITY", ParamValue::number(self.similarity)?),
            Param::new("gi_CROP", ParamValue::Boolean(self.crop)),
            Param::new("gi_DILATE", ParamValue::Boolean(self.dilate)),
            Param::new("gi_CONTENT_PRESERVE", ParamValue::float(self.content_preserve)?),
            Param::new(
                "gi_ENABLE_PROMPT_FILTER",
                ParamValue::Boolean(self.enable_prompt_filter),
            ),
        ];
        if let Some(prompt) = &self.prompt {
            params.push(Param::new("gi_PROMPT", ParamValue::String(prompt.clone())));
        }
        Ok(params)
    }
}

impl ContentAnalyzerRequest {
    /// One synchronous inpainting run over the cached `gi_IMAGE`/`gi_MASK`.
    pub fn inpaint(engine: &str, params: &InpaintParams) -> Result<Self, FillError> {
        let engine = EngineInvocation {
            execution_info: ExecutionInfo {
                engine: engine.to_string(),
            },
            inputs: AssetSlots {
                image: CachedInput::png("gi_IMAGE"),
                mask: CachedInput::png("gi_MASK"),
            },
            outputs: EngineOutputs {
                image: UploadSlot::png(FIELD_GENERATED_IMAGE),
                mask: UploadSlot::png(FIELD_GENERATED_MASK),
                response: UploadSlot {
                    format: "application/json".to_string(),
                    field_name: FIELD_SPL_RESPONSE.to_string(),
                },
            },
            params: EngineParams {
                spl_request: GraphRequest {
                    graph: GraphRef {
                        uri: GRAPH_URI.to_string(),
                    },
                    inputs: AssetSlots {
                        image: GraphNode::new("1", NodeType::Image, None),
                        mask: GraphNode::new("2", NodeType::Image, None),
                    },
                    outputs: GraphOutputs {
                        image: GraphNode::new("5", NodeType::Image, Some(PNG)),
                        mask: GraphNode::new("6", NodeType::Image, Some(PNG)),
                        status: GraphNode::new("7", NodeType::Scalar, None),
                    },
                    params: params.to_params()?,
                },
            },
        };

        Ok(Self {
            engines: vec![engine],
            in_response: false,
            invocation_batch: false,
            invocation_mode: InvocationMode::Synchronous,
            name: JOB_NAME.to_string(),
        })
    }
}
