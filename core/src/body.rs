//! Body strategies: how a request payload is encoded and which content type
//! it proposes.
//!
//! # Design
//! `Body` is a closed enum with one variant per encoding. Nothing is encoded
//! when a strategy is attached; `Body::into_source` runs the encoder once, at
//! execution time, so the first and only place an encoding failure can show
//! up is `RequestBuilder::end`.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::Serialize;
use url::form_urlencoded;

use crate::error::EncodeError;

pub const MIME_JSON: &str = "application/json";
pub const MIME_FORM: &str = "application/x-www-form-urlencoded";

/// A readable payload.
///
/// `Bytes` has a known length and is sent with `Content-Length`; `Reader` is
/// streamed as-is.
pub enum BodySource {
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl BodySource {
    /// Drain the source into memory.
    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        match self {
            BodySource::Bytes(bytes) => Ok(bytes),
            BodySource::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodySource::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            BodySource::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

type JsonEncoder = Box<dyn FnOnce() -> Result<Vec<u8>, serde_json::Error> + Send>;

/// A value that will be serialized to JSON when the request is executed.
pub struct JsonBody {
    encode: JsonEncoder,
}

impl JsonBody {
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Self {
            encode: Box::new(move || serde_json::to_vec(&value)),
        }
    }

    pub fn encode(self) -> Result<Vec<u8>, EncodeError> {
        (self.encode)().map_err(EncodeError::from)
    }
}

impl fmt::Debug for JsonBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonBody(..)")
    }
}

/// Form fields, keyed by name. A key may carry several values.
///
/// Keys encode in sorted order; values of one key keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a form from any value `serde_urlencoded` can serialize.
    pub fn from_struct<T>(value: &T) -> Result<Self, serde_urlencoded::ser::Error>
    where
        T: Serialize + ?Sized,
    {
        let mut form = Self::new();
        for (key, value) in struct_pairs(value)? {
            form.append(key, value);
        }
        Ok(form)
    }

    /// Replace every value of `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), vec![value.into()]);
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(value.into());
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.fields {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

/// The encoding attached to a request.
#[derive(Debug)]
pub enum Body {
    Json(JsonBody),
    Form(FormBody),
    Raw(BodySource),
}

impl Body {
    /// Content type to assume when the caller has not set one.
    pub fn mime(&self) -> Option<&'static str> {
        match self {
            Body::Json(_) => Some(MIME_JSON),
            Body::Form(_) => Some(MIME_FORM),
            Body::Raw(_) => None,
        }
    }

    /// Run the encoder and hand back the bytes to send.
    pub fn into_source(self) -> Result<BodySource, EncodeError> {
        match self {
            Body::Json(json) => json.encode().map(BodySource::Bytes),
            Body::Form(form) => Ok(BodySource::Bytes(form.encode().into_bytes())),
            Body::Raw(source) => Ok(source),
        }
    }
}

/// Flatten a serializable value into urlencoded key/value pairs.
pub(crate) fn struct_pairs<T>(
    value: &T,
) -> Result<Vec<(String, String)>, serde_urlencoded::ser::Error>
where
    T: Serialize + ?Sized,
{
    let encoded = serde_urlencoded::to_string(value)?;
    Ok(form_urlencoded::parse(encoded.as_bytes())
        .into_owned()
        .collect())
}
