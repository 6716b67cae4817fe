//! Raw search response

use crate::error::Result;
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Body of a successful search.
///
/// Blog results are XML and forum and social results are JSON; the body is
/// handed over unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    body: Bytes,
}

impl SearchResponse {
    /// Wrap a response body.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    /// The body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// [`Error::Encoding`](crate::Error::Encoding) if the body is not UTF-8.
    pub fn text(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.body)?)
    }

    /// Deserialize a JSON body.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`](crate::Error::Serialization) if the body does
    /// not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consume into the raw body.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl From<Bytes> for SearchResponse {
    fn from(body: Bytes) -> Self {
        Self::new(body)
    }
}
