//! The I/O seam between the execution engine and the network.
//!
//! # Design
//! Everything above this module is deterministic: the builder materializes
//! an `HttpRequest` and the engine buffers whatever comes back. A
//! `Transport` is the only place a socket is touched, so tests can swap in a
//! recording implementation and assert that no request went out at all.

use std::time::Duration;

use http::Method;
use ureq::{AsSendBody, SendBody};

use crate::body::BodySource;
use crate::context::Context;
use crate::error::TransportError;
use crate::http::{HttpRequest, ResponseHead, TransportResponse};

/// Sends one request and returns the response head plus an unread body.
///
/// Implementations must be safe to share between threads; independent
/// builders execute through the same transport concurrently.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest, ctx: &Context)
        -> Result<TransportResponse, TransportError>;
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// An agent that treats 4xx/5xx as responses rather than errors.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn run<S: AsSendBody>(
        &self,
        request: Result<http::Request<S>, http::Error>,
        headers: http::HeaderMap,
        timeout: Option<Duration>,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = request.map_err(|e| TransportError::Request(Box::new(e)))?;
        *request.headers_mut() = headers;

        let request = match timeout {
            Some(timeout) => self
                .agent
                .configure_request(request)
                .timeout_global(Some(timeout))
                .build(),
            None => request,
        };

        let response = self.agent.run(request).map_err(map_ureq_error)?;
        let (parts, body) = response.into_parts();
        Ok(TransportResponse {
            head: ResponseHead {
                status: parts.status,
                headers: parts.headers,
            },
            body: Box::new(body.into_reader()),
        })
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(
        &self,
        request: HttpRequest,
        ctx: &Context,
    ) -> Result<TransportResponse, TransportError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let timeout = match ctx.remaining() {
            Some(Duration::ZERO) => return Err(TransportError::DeadlineExceeded),
            remaining => remaining,
        };

        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let builder = http::Request::builder()
            .method(Method::from(method))
            .uri(url.as_str());

        match body {
            None => self.run(builder.body(()), headers, timeout),
            Some(BodySource::Bytes(bytes)) => self.run(builder.body(bytes), headers, timeout),
            Some(BodySource::Reader(reader)) => self.run(
                builder.body(SendBody::from_owned_reader(reader)),
                headers,
                timeout,
            ),
        }
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::DeadlineExceeded,
        other => TransportError::Request(Box::new(other)),
    }
}
