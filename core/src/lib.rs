//! Fluent, blocking HTTP request builder.
//!
//! # Overview
//! A `Client` hands out a `RequestBuilder` per request. Configuration calls
//! chain on the builder and never fail on the spot; problems are collected
//! and reported together by the terminal call (`end`, `end_struct`,
//! `end_string`), which is also the only place any I/O happens.
//!
//! ```no_run
//! use std::time::Duration;
//! use request_core::Client;
//!
//! let client = Client::new();
//! let (response, text) = client
//!     .post("http://localhost:3000/echo")
//!     .query("debug", "1")
//!     .json(serde_json::json!({ "x": 1 }))
//!     .timeout(Duration::from_secs(2))
//!     .end_string()?;
//! println!("{} {text}", response.status);
//! # Ok::<(), request_core::Error>(())
//! ```
//!
//! # Design
//! - Body strategies (`Body`) encode lazily, at execution time.
//! - A body's content type only applies when the caller set none.
//! - Timeouts derive a child `Context` that lives for the transport call.
//! - `Transport` is the only I/O seam; `UreqTransport` is the default.

pub mod body;
pub mod builder;
pub mod client;
pub mod context;
pub mod error;
mod execute;
pub mod http;
pub mod transport;

pub use body::{Body, BodySource, FormBody, JsonBody};
pub use builder::RequestBuilder;
pub use client::Client;
pub use context::{CancelHandle, Context};
pub use error::{ConstructionError, EncodeError, Error, Errors, TransportError};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse, ResponseHead, TransportResponse};
pub use transport::{Transport, UreqTransport};
