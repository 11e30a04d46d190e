//! Typed client for the bank service.
//!
//! # Overview
//! Covers bank accounts, transaction items and tags. Every operation builds
//! a request from the service's base URL, optionally encodes a resource as
//! the JSON body, sends it through a `Transport`, decodes the
//! `{message, data, errors}` envelope and classifies the status code into
//! either the typed resource or a `ServiceError` with the field map the
//! service returned.
//!
//! # Design
//! - `BankService` is stateless: it holds the base URL and token and builds
//!   a new `HttpRequest` per call, so one value serves any number of callers.
//! - Each operation is split into `build_*` and `parse_*`; `BankClient`
//!   joins the two around a transport call.
//! - The envelope is always decoded before the status is inspected.
//! - Nothing retries. A failed call returns its error to the caller as is.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod http;
pub mod routes;
pub mod transport;
pub mod types;

pub use client::BankService;
pub use config::{ConfigError, ServiceConfig};
pub use dispatch::BankClient;
pub use envelope::Envelope;
pub use error::{ApiError, Errors, ServiceError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use routes::Route;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{BankAccount, BankAccounts, Item, Owned, Owner, Tag, Tags};
