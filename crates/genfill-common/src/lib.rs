pub mod consts;
pub mod credentials;
pub mod demux;
pub mod error;
pub mod job;
pub mod telemetry;

pub use credentials::Credentials;
pub use demux::{demultiplex, parse_multipart, Artifact, Part, PartKind, Route, ROUTES};
pub use error::{check_status, FillError};
pub use job::{
    ContentAnalyzerRequest, InpaintParams, LoadContentRequest, Param, ParamValue,
    SessionCreateRequest,
};
