//! Chainable request configuration with deferred errors.
//!
//! # Design
//! Every mutator takes the builder by value and hands it back, so a chain
//! reads top to bottom. Mutators never fail: anything that goes wrong is
//! pushed onto `errors` and the chain keeps going. `end()` (see
//! `execute.rs`) is the single point where those errors are reported.

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde::Serialize;
use url::Url;

use crate::body::{struct_pairs, Body, BodySource, FormBody, JsonBody};
use crate::context::Context;
use crate::error::{ConstructionError, Errors};
use crate::http::HttpMethod;
use crate::transport::Transport;

/// One request being configured. Created by `Client`, consumed by `end()`.
pub struct RequestBuilder {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) ctx: Context,
    pub(crate) method: HttpMethod,
    pub(crate) url: Option<Url>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Body>,
    pub(crate) timeout: Duration,
    pub(crate) errors: Errors,
}

impl RequestBuilder {
    pub(crate) fn new(transport: Arc<dyn Transport>, method: HttpMethod, url: &str) -> Self {
        let mut builder = Self {
            transport,
            ctx: Context::background(),
            method,
            url: None,
            headers: HeaderMap::new(),
            body: None,
            timeout: Duration::ZERO,
            errors: Errors::default(),
        };
        match Url::parse(url) {
            Ok(parsed) => builder.url = Some(parsed),
            Err(source) => builder.record(ConstructionError::InvalidUrl {
                input: url.to_string(),
                source,
            }),
        }
        builder
    }

    fn record(&mut self, err: ConstructionError) {
        self.errors.push(err);
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The URL as rewritten so far. `None` if it failed to parse.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body_strategy(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// Set a header, replacing any previous value under the same name.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name_parsed = HeaderName::from_bytes(name.as_bytes());
        let value_parsed = HeaderValue::from_str(value);
        match (name_parsed, value_parsed) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.record(ConstructionError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            }),
            (_, Err(e)) => self.record(ConstructionError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
        self
    }

    pub fn content_type(self, mime: &str) -> Self {
        self.header(CONTENT_TYPE.as_str(), mime)
    }

    /// Deadline for the transport call. Zero disables it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append a query parameter. Repeated keys keep every value.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        if let Some(url) = self.url.as_mut() {
            url.query_pairs_mut().append_pair(key, value);
        }
        self
    }

    /// Append every field of `value` as a query parameter.
    ///
    /// If `value` cannot be urlencoded the URL is left untouched and one
    /// error is recorded.
    pub fn query_struct<T>(mut self, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        match struct_pairs(value) {
            Ok(pairs) => {
                if let Some(url) = self.url.as_mut() {
                    if !pairs.is_empty() {
                        url.query_pairs_mut().extend_pairs(pairs);
                    }
                }
            }
            Err(e) => self.record(ConstructionError::QueryEncoding(e)),
        }
        self
    }

    /// Stream `reader` as the body. No content type is implied.
    pub fn body<R>(mut self, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        self.body = Some(Body::Raw(BodySource::Reader(Box::new(reader))));
        self
    }

    pub fn body_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::Raw(BodySource::Bytes(bytes.into())));
        self
    }

    /// Send `value` as JSON. Serialization happens in `end()`.
    pub fn json<T>(mut self, value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        self.body = Some(Body::Json(JsonBody::new(value)));
        self
    }

    /// Set one form field, merging into an existing form body.
    ///
    /// Any non-form body is replaced.
    pub fn form(mut self, key: &str, value: &str) -> Self {
        match self.body.as_mut() {
            Some(Body::Form(form)) => form.set(key, value),
            _ => {
                let mut form = FormBody::new();
                form.set(key, value);
                self.body = Some(Body::Form(form));
            }
        }
        self
    }

    /// Replace the body with a form built from `value`'s fields.
    ///
    /// On encoding failure the existing body stays in place.
    pub fn form_struct<T>(mut self, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        match FormBody::from_struct(value) {
            Ok(form) => self.body = Some(Body::Form(form)),
            Err(e) => self.record(ConstructionError::FormEncoding(e)),
        }
        self
    }

    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
