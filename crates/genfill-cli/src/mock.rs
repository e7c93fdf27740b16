//! In-process stand-in for the identity service and the analyzer API.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

pub const BOUNDARY: &str = "mock-boundary-7f3a";
pub const TOKEN: &str = "tok-123";

#[derive(Debug, Clone)]
pub struct Behaviour {
    pub token_status: u16,
    pub token_body: String,
    pub session_headers: Vec<(&'static str, &'static str)>,
    pub load_body: String,
    pub predict_status: u16,
    pub predict_content_type: String,
    pub predict_body: Vec<u8>,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            token_status: 200,
            token_body: format!(r#"{{"access_token":"{TOKEN}","token_type":"bearer"}}"#),
            session_headers: vec![
                ("x-session-id", "abc"),
                ("remaining-session-size", "26214400"),
            ],
            load_body: r#"{"status":200}"#.to_string(),
            predict_status: 200,
            predict_content_type: format!("multipart/form-data; boundary={BOUNDARY}"),
            predict_body: multipart_body(&default_parts()),
        }
    }
}

pub fn default_parts() -> Vec<(String, Vec<u8>)> {
    vec![
        (
            "form-data; name=\"contentAnalyzerResponse\"".to_string(),
            br#"{"statuses":[{"status":"200","element_name":"gi"}]}"#.to_vec(),
        ),
        (
            "form-data; name=\"spl:response\"".to_string(),
            br#"{"outputs":{"gi_GEN_STATUS":{"value":0}}}"#.to_vec(),
        ),
        (
            "form-data; name=\"generated-mask\"; filename=\"mask.png\"".to_string(),
            b"\x89PNG\r\n\x1a\nmask-bytes".to_vec(),
        ),
        (
            "form-data; name=\"generated-image\"; filename=\"image.png\"".to_string(),
            b"\x89PNG\r\n\x1a\nimage-bytes\x00\xff".to_vec(),
        ),
    ]
}

pub fn multipart_body(parts: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (disposition, payload) in parts {
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        out.extend_from_slice(format!("Content-Disposition: {disposition}\r\n\r\n").as_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: &'static str,
    pub headers: HeaderMap,
    /// Multipart fields as `(name, payload)`.
    pub fields: Vec<(String, Vec<u8>)>,
    /// URL-encoded body, for the token call.
    pub form: String,
}

#[derive(Clone)]
struct MockState {
    behaviour: Arc<Behaviour>,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl MockState {
    fn record(&self, path: &'static str, headers: HeaderMap, fields: Vec<(String, Vec<u8>)>, form: String) {
        self.calls.lock().unwrap().push(Recorded {
            path,
            headers,
            fields,
            form,
        });
    }
}

pub struct MockServer {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub async fn start(behaviour: Behaviour) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            behaviour: Arc::new(behaviour),
            calls: calls.clone(),
        };

        let app = Router::new()
            .route("/ims/token", post(token))
            .route("/services/session/create", post(session_create))
            .route("/services/session/load", post(session_load))
            .route("/services/v2/predict", post(predict))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, calls }
    }

    pub fn ims_url(&self) -> String {
        format!("http://{}/ims/token", self.addr)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call(&self, path: &str) -> Recorded {
        self.calls()
            .into_iter()
            .find(|c| c.path == path)
            .unwrap_or_else(|| panic!("no call to {path}"))
    }
}

async fn read_fields(mut multipart: Multipart) -> Vec<(String, Vec<u8>)> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap().to_vec();
        fields.push((name, data));
    }
    fields
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

async fn token(State(state): State<MockState>, headers: HeaderMap, body: String) -> Response {
    state.record("/ims/token", headers, Vec::new(), body);
    (
        status(state.behaviour.token_status),
        [(header::CONTENT_TYPE, "application/json")],
        state.behaviour.token_body.clone(),
    )
        .into_response()
}

async fn session_create(
    State(state): State<MockState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let fields = read_fields(multipart).await;
    state.record("/services/session/create", headers, fields, String::new());

    let mut out = HeaderMap::new();
    for (k, v) in &state.behaviour.session_headers {
        out.insert(*k, v.parse().unwrap());
    }
    (StatusCode::OK, out, "").into_response()
}

async fn session_load(
    State(state): State<MockState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let fields = read_fields(multipart).await;
    state.record("/services/session/load", headers, fields, String::new());
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.behaviour.load_body.clone(),
    )
        .into_response()
}

async fn predict(
    State(state): State<MockState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let fields = read_fields(multipart).await;
    state.record("/services/v2/predict", headers, fields, String::new());
    (
        status(state.behaviour.predict_status),
        [(header::CONTENT_TYPE, state.behaviour.predict_content_type.clone())],
        state.behaviour.predict_body.clone(),
    )
        .into_response()
}
