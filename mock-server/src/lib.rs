use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Path, RawQuery},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/inspect` reports about the request it received.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inspection {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/inspect", any(inspect))
        .route("/delay/{ms}", any(delay))
        .route("/status/{code}", any(status))
        .route("/health", get(|| async { "ok" }))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Send the request body back. The content type is echoed only if the
/// request had one.
async fn echo(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let mut response_headers = HeaderMap::new();
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        response_headers.insert(header::CONTENT_TYPE, content_type.clone());
    }
    (response_headers, Body::from(body))
}

async fn inspect(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Inspection> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(Inspection {
        method: method.to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn delay(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "done"
}

async fn status(Path(code): Path<u16>) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspection_serializes_to_json() {
        let inspection = Inspection {
            method: "POST".to_string(),
            query: Some("a=1".to_string()),
            headers: BTreeMap::from([("x-a".to_string(), "1".to_string())]),
            body: "hi".to_string(),
        };
        let json = serde_json::to_value(&inspection).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["query"], "a=1");
        assert_eq!(json["headers"]["x-a"], "1");
        assert_eq!(json["body"], "hi");
    }

    #[test]
    fn missing_query_serializes_as_null() {
        let inspection = Inspection {
            method: "GET".to_string(),
            query: None,
            headers: BTreeMap::new(),
            body: String::new(),
        };
        let json = serde_json::to_value(&inspection).unwrap();
        assert!(json["query"].is_null());
    }
}
