use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use url::form_urlencoded;

use crate::client::HttpRequest;
use crate::error::{Error, Result};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Request payload. The variant picks the encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// Sent verbatim, content type left alone.
    Bytes(Vec<u8>),
    /// Sent as its UTF-8 bytes, content type left alone.
    Text(String),
    /// Urlencoded, sent as `application/x-www-form-urlencoded`.
    Form(BTreeMap<String, String>),
    /// Serialized, sent as `application/json`.
    Json(serde_json::Value),
}

impl Body {
    /// Capture any serializable value as a JSON body.
    ///
    /// Field order is kept as the serializer emits it.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(Error::BodyEncoding)
    }

    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Body::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Write the payload into `request`, forcing the content type for form
    /// and JSON bodies.
    ///
    /// Form bodies are always encoded from scratch; nothing already on the
    /// request is merged in.
    pub(crate) fn encode_into(&self, request: &mut HttpRequest) -> Result<()> {
        match self {
            Body::Bytes(bytes) => request.body = bytes.clone(),
            Body::Text(text) => request.body = text.as_bytes().to_vec(),
            Body::Form(fields) => {
                request.body = encode_pairs(fields).into_bytes();
                request.headers.set("Content-Type", FORM_CONTENT_TYPE);
            }
            Body::Json(value) => {
                request.body = serde_json::to_vec(value).map_err(Error::BodyEncoding)?;
                request.headers.set("Content-Type", JSON_CONTENT_TYPE);
            }
        }
        Ok(())
    }
}

/// `application/x-www-form-urlencoded` serialization, keys in map order.
pub(crate) fn encode_pairs(pairs: &BTreeMap<String, String>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Body::Bytes(bytes.to_vec())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<BTreeMap<String, String>> for Body {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Body::Form(fields)
    }
}

impl From<HashMap<String, String>> for Body {
    fn from(fields: HashMap<String, String>) -> Self {
        Body::Form(fields.into_iter().collect())
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}
