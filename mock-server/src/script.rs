//! Scripted exchanges.
//!
//! Each incoming request, whatever its route, is answered with the next
//! queued exchange and recorded for later inspection.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::Response,
    Router,
};

/// A canned response.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: u16,
    pub body: String,
}

/// What the script saw on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Default)]
struct Tape {
    pending: VecDeque<Exchange>,
    recorded: Vec<RecordedRequest>,
}

/// Shared handle to a replay server. Clones see the same queue.
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    tape: Arc<Mutex<Tape>>,
}

impl MockScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response for the next request.
    pub fn push(&self, status: u16, body: &str) {
        self.lock().pending.push_back(Exchange {
            status,
            body: body.to_string(),
        });
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().recorded.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().recorded.last().cloned()
    }

    pub fn router(&self) -> Router {
        Router::new().fallback(replay).with_state(self.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tape> {
        self.tape.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn replay(
    State(script): State<MockScript>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let exchange = {
        let mut tape = script.lock();
        tape.recorded.push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers: headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect(),
            body,
        });
        tape.pending.pop_front()
    };

    let exchange = exchange.unwrap_or_else(|| {
        tracing::warn!(%method, %uri, "no exchange queued");
        Exchange {
            status: 500,
            body: r#"{"message":"","data":{},"errors":{"mock":["no exchange queued"]}}"#.to_string(),
        }
    });

    let status = StatusCode::from_u16(exchange.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = Response::new(Body::from(exchange.body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
