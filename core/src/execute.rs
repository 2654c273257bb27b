//! Terminal operations: turn a builder into a request, send it, buffer the
//! response.

use std::io::Read;

use http::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::builder::RequestBuilder;
use crate::error::{Error, TransportError};
use crate::http::{HttpRequest, HttpResponse, TransportResponse};

impl RequestBuilder {
    /// Execute the request and read the whole response body.
    ///
    /// Fails without any I/O if the chain recorded construction errors or
    /// if the body cannot be encoded. A body's content type is applied only
    /// when none was set explicitly.
    pub fn end(self) -> Result<HttpResponse, Error> {
        let RequestBuilder {
            transport,
            ctx,
            method,
            url,
            mut headers,
            body,
            timeout,
            errors,
        } = self;

        let url = match url {
            Some(url) if errors.is_empty() => url,
            _ => {
                debug!(
                    %method,
                    errors = errors.len(),
                    "refusing to send request with construction errors"
                );
                return Err(Error::Construction(errors));
            }
        };

        let body = match body {
            Some(body) => {
                let mime = body.mime();
                let source = body.into_source()?;
                if let Some(mime) = mime {
                    if !headers.contains_key(CONTENT_TYPE) {
                        headers.insert(CONTENT_TYPE, HeaderValue::from_static(mime));
                    }
                }
                Some(source)
            }
            None => None,
        };

        // The timeout scope only covers the transport call below.
        let scope = if timeout.is_zero() {
            ctx
        } else {
            ctx.child_with_timeout(timeout)
        };

        debug!(%method, %url, ?timeout, "sending request");
        let request = HttpRequest {
            method,
            url,
            headers,
            body,
        };
        let response = transport.send(request, &scope).map_err(|e| {
            debug!(%method, error = %e, "transport failed");
            Error::from(e)
        })?;
        let TransportResponse {
            head,
            body: mut stream,
        } = response;

        let mut bytes = Vec::new();
        let read = stream.read_to_end(&mut bytes);
        drop(stream);

        match read {
            Ok(len) => {
                debug!(%method, status = head.status.as_u16(), len, "response received");
                Ok(HttpResponse {
                    status: head.status,
                    headers: head.headers,
                    body: bytes,
                })
            }
            Err(e) => Err(Error::Transport {
                source: TransportError::Read(e),
                head: Some(head),
            }),
        }
    }

    /// Execute, then decode the body as JSON into `T`.
    pub fn end_struct<T>(self) -> Result<(HttpResponse, T), Error>
    where
        T: DeserializeOwned,
    {
        let response = self.end()?;
        match serde_json::from_slice(&response.body) {
            Ok(value) => Ok((response, value)),
            Err(source) => Err(Error::Decode {
                source,
                response: Box::new(response),
            }),
        }
    }

    /// Execute and return the body as text. Invalid UTF-8 is replaced.
    pub fn end_string(self) -> Result<(HttpResponse, String), Error> {
        let response = self.end()?;
        let text = String::from_utf8_lossy(&response.body).into_owned();
        Ok((response, text))
    }
}
