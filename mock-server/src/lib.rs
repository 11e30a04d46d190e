//! Stand-in for the bank service.
//!
//! `app()` serves an in-memory bank over the same routes and envelope as the
//! real service. `MockScript` replays queued responses and records what it
//! received, for tests that need exact control over status and body.

use std::net::SocketAddr;

use axum::{http::StatusCode, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub mod bank;
pub mod script;

pub use bank::{app, app_with_token, BankAccount, Item, Tag};
pub use script::{Exchange, MockScript, RecordedRequest};

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

/// Serve `router` on an ephemeral local port from a background thread.
pub fn spawn(router: Router) -> std::io::Result<SocketAddr> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::spawn(move || {
        runtime.block_on(async move {
            let listener = TcpListener::from_std(std_listener)?;
            run(listener, router).await
        })
    });
    Ok(addr)
}

/// `{message, data, errors}` response, the only shape the service speaks.
pub type Reply = (StatusCode, Json<Value>);

pub fn reply(status: StatusCode, message: &str, data: Value) -> Reply {
    (
        status,
        Json(json!({ "message": message, "data": data, "errors": {} })),
    )
}

pub fn reply_error(status: StatusCode, message: &str, field: &str, detail: &str) -> Reply {
    (
        status,
        Json(json!({ "message": message, "data": {}, "errors": { field: [detail] } })),
    )
}

pub(crate) fn keyed<T: Serialize>(key: &str, value: &T) -> Value {
    json!({ key: value })
}
