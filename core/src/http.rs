//! Plain-data HTTP types passed between the builder and the transport.
//!
//! # Design
//! `HttpRequest` is the materialized form of a builder chain: everything the
//! transport needs and nothing it has to interpret. `HttpResponse` is what
//! the caller gets back after the execution engine has read the body to the
//! end, so no stream ever outlives `end()`.

use std::fmt;
use std::io::Read;

use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::body::BodySource;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
        }
    }
}

/// A request ready to be handed to a `Transport`.
///
/// Built by `RequestBuilder::end` once all deferred errors have been checked
/// and the body strategy has been encoded.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<BodySource>,
}

/// Status line and headers of a response, available before the body is read.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// What a transport hands back: the head plus an unread body stream.
pub struct TransportResponse {
    pub head: ResponseHead,
    pub body: Box<dyn Read>,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_maps_to_http_method() {
        assert_eq!(Method::from(HttpMethod::Patch), Method::PATCH);
        assert_eq!(Method::from(HttpMethod::Head), Method::HEAD);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "text/plain".parse().unwrap());
        let response = HttpResponse {
            status: StatusCode::OK,
            headers,
            body: Vec::new(),
        };
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.header("x-missing"), None);
    }
}
