//! Multipart result demultiplexing.
//!
//! The predict endpoint answers with one multipart body holding every declared
//! output. Parts are told apart by a marker inside their `Content-Disposition`
//! header, matched as a plain substring against the table in [`ROUTES`].

use bytes::Bytes;
use futures_util::Stream;
use serde::Serialize;

use crate::error::FillError;

// ── Parts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Part {
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Part {
    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn disposition(&self) -> Option<&str> {
        self.header("content-disposition")
    }
}

/// Extract the `boundary` parameter of a `multipart/*` content type.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    multer::parse_boundary(content_type).ok()
}

fn malformed(e: multer::Error) -> FillError {
    FillError::protocol(format!("malformed multipart body: {e}"))
}

/// Collect every part of a multipart body.
///
/// Nothing is returned until the closing delimiter has been read, so a
/// truncated response is a [`FillError::Protocol`] and never a partial result.
pub async fn parse_multipart<S, O, E>(stream: S, boundary: &str) -> Result<Vec<Part>, FillError>
where
    S: Stream<Item = Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let headers = field
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = field.bytes().await.map_err(malformed)?;
        parts.push(Part { headers, body });
    }

    if parts.is_empty() {
        return Err(FillError::protocol("multipart body has no parts"));
    }
    Ok(parts)
}

// ── Routing ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// Parsed and re-serialized with indentation.
    Json,
    /// Written verbatim.
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputName {
    Fixed(&'static str),
    /// `<stem>-<seed>.<ext>`
    Seeded {
        stem: &'static str,
        ext: &'static str,
    },
}

impl OutputName {
    pub fn render(&self, seed: u32) -> String {
        match self {
            OutputName::Fixed(name) => (*name).to_string(),
            OutputName::Seeded { stem, ext } => format!("{stem}-{seed}.{ext}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub marker: &'static str,
    pub kind: PartKind,
    pub output: OutputName,
}

/// Evaluated top to bottom; the first marker found in the disposition wins.
pub const ROUTES: [Route; 4] = [
    Route {
        marker: "\"contentAnalyzerResponse\"",
        kind: PartKind::Json,
        output: OutputName::Fixed("contentAnalyzerResponse.json"),
    },
    Route {
        marker: "\"spl:response\"",
        kind: PartKind::Json,
        output: OutputName::Fixed("spl_response.json"),
    },
    Route {
        marker: "\"generated-mask\"",
        kind: PartKind::Binary,
        output: OutputName::Seeded {
            stem: "generated-mask",
            ext: "png",
        },
    },
    Route {
        marker: "\"generated-image\"",
        kind: PartKind::Binary,
        output: OutputName::Seeded {
            stem: "generated-image",
            ext: "png",
        },
    },
];

pub fn classify(disposition: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| disposition.contains(r.marker))
}

/// A routed part, ready to be written under `file_name`.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub kind: PartKind,
    pub contents: Bytes,
}

fn reindent_json(raw: &[u8]) -> Result<Bytes, FillError> {
    let value: serde_json::Value = serde_json::from_slice(raw)?;
    let mut out = Vec::with_capacity(raw.len() + raw.len() / 4);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(Bytes::from(out))
}

/// Route every part through [`ROUTES`]. Unmatched parts are dropped.
///
/// JSON parts are parsed here, so a bad payload fails the whole batch before
/// anything reaches the disk.
pub fn demultiplex(parts: &[Part], seed: u32) -> Result<Vec<Artifact>, FillError> {
    let mut artifacts = Vec::new();
    for part in parts {
        let Some(disposition) = part.disposition() else {
            tracing::debug!("dropping multipart part without content-disposition");
            continue;
        };
        let Some(route) = classify(disposition) else {
            tracing::debug!(disposition, "dropping unrecognised multipart part");
            continue;
        };

        let contents = match route.kind {
            PartKind::Json => reindent_json(&part.body).map_err(|e| {
                FillError::protocol(format!("part {} is not valid JSON: {e}", route.marker))
            })?,
            PartKind::Binary => part.body.clone(),
        };

        artifacts.push(Artifact {
            file_name: route.output.render(seed),
            kind: route.kind,
            contents,
        });
    }
    Ok(artifacts)
}
