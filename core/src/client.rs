//! Entry points: one builder per request, pre-seeded with a verb and URL.
//!
//! # Design
//! `Client` holds nothing but a shared transport, so it is cheap to clone
//! and builders created from it share no mutable state. A URL that fails to
//! parse does not fail here; it is recorded on the builder and reported by
//! `end()`.

use std::fmt;
use std::sync::Arc;

use crate::builder::RequestBuilder;
use crate::http::HttpMethod;
use crate::transport::{Transport, UreqTransport};

/// Creates `RequestBuilder`s bound to one transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// A client over a default `ureq` agent.
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::new())
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self::with_transport(UreqTransport::with_agent(agent))
    }

    pub fn with_transport<T>(transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn request(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        RequestBuilder::new(Arc::clone(&self.transport), method, url)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Get, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Post, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Put, url)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Patch, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Delete, url)
    }

    pub fn head(&self, url: &str) -> RequestBuilder {
        self.request(HttpMethod::Head, url)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_verb_maps_to_its_method() {
        let client = Client::new();
        let url = "http://localhost:3000/";
        assert_eq!(client.get(url).method(), HttpMethod::Get);
        assert_eq!(client.post(url).method(), HttpMethod::Post);
        assert_eq!(client.put(url).method(), HttpMethod::Put);
        assert_eq!(client.patch(url).method(), HttpMethod::Patch);
        assert_eq!(client.delete(url).method(), HttpMethod::Delete);
        assert_eq!(client.head(url).method(), HttpMethod::Head);
    }

    #[test]
    fn malformed_url_surfaces_only_at_end() {
        let builder = Client::new().get("http//missing-colon");
        assert_eq!(builder.errors().len(), 1);
        let err = builder.end().unwrap_err();
        assert!(err.construction_errors().is_some());
        assert!(err.to_string().contains("http//missing-colon"));
    }

    #[test]
    fn clients_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }
}
