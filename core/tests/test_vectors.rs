//! Verify form and query encoding against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Requests go to a recording transport, so the vectors pin down exactly
//! what the builder hands to the network without running a server.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use http::{HeaderMap, StatusCode};
use request_core::{
    Client, Context, HttpRequest, ResponseHead, Transport, TransportError, TransportResponse,
};

#[derive(Clone, Default)]
struct Recorder {
    sent: Arc<Mutex<Vec<(String, HeaderMap, Vec<u8>)>>>,
}

impl Transport for Recorder {
    fn send(&self, request: HttpRequest, _: &Context) -> Result<TransportResponse, TransportError> {
        let body = match request.body {
            Some(source) => source.into_bytes().map_err(TransportError::Read)?,
            None => Vec::new(),
        };
        self.sent
            .lock()
            .unwrap()
            .push((request.url.to_string(), request.headers, body));
        Ok(TransportResponse {
            head: ResponseHead {
                status: StatusCode::NO_CONTENT,
                headers: HeaderMap::new(),
            },
            body: Box::new(Cursor::new(Vec::new())),
        })
    }
}

fn calls(case: &serde_json::Value) -> Vec<(String, String)> {
    case["calls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (
                pair[0].as_str().unwrap().to_string(),
                pair[1].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

#[test]
fn form_test_vectors() {
    let raw = include_str!("../../test-vectors/form.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let recorder = Recorder::default();
    let client = Client::with_transport(recorder.clone());
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let mut builder = client.post("http://localhost:3000/form");
        for (key, value) in calls(case) {
            builder = builder.form(&key, &value);
        }
        let response = builder.end().unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT, "{name}: status");

        let sent = recorder.sent.lock().unwrap();
        let (_, headers, body) = sent.last().unwrap();
        assert_eq!(
            headers.get("content-type").unwrap(),
            "application/x-www-form-urlencoded",
            "{name}: content type"
        );
        assert_eq!(
            String::from_utf8_lossy(body),
            case["expected_body"].as_str().unwrap(),
            "{name}: body"
        );
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let recorder = Recorder::default();
    let client = Client::with_transport(recorder.clone());
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let mut builder = client.get(case["base_url"].as_str().unwrap());
        for (key, value) in calls(case) {
            builder = builder.query(&key, &value);
        }
        builder.end().unwrap();

        let sent = recorder.sent.lock().unwrap();
        let (url, headers, body) = sent.last().unwrap();
        assert_eq!(url, case["expected_url"].as_str().unwrap(), "{name}: url");
        assert!(headers.get("content-type").is_none(), "{name}: content type");
        assert!(body.is_empty(), "{name}: body");
    }
}
