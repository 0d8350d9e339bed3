//! The seam between resource handles and whatever moves bytes to the
//! daemon.
//!
//! Handles describe each operation as a [`Call`] and hand it to a
//! [`Transport`]. Socket dialing, HTTP framing, TLS and stream demuxing all
//! live behind that trait; this crate only builds descriptors and judges
//! responses against each endpoint's [`StatusTable`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;

pub mod lines;
pub mod mock;
pub mod status;

pub use lines::JsonLines;
pub use status::{Outcome, StatusTable};

pub(crate) use status::tables;

/// Chunked bytes flowing to or from the daemon.
pub type ByteStream = BoxStream<'static, Result<Bytes, Error>>;

/// The HTTP verbs the Docker API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One REST call to the daemon: everything a transport needs to issue the
/// request and judge the response.
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    /// How each response status code must be interpreted.
    pub statuses: StatusTable,
    /// Resolve with a live [`ByteStream`] instead of a buffered body.
    pub stream: bool,
    /// JSON request body, for endpoints that take one.
    pub body: Option<serde_json::Value>,
    /// Request byte stream, for endpoints that upload an archive.
    pub input: Option<ByteStream>,
}

impl Call {
    pub fn new(method: Method, path: impl Into<String>, statuses: StatusTable) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            statuses,
            stream: false,
            body: None,
            input: None,
        }
    }

    pub fn get(path: impl Into<String>, statuses: StatusTable) -> Self {
        Self::new(Method::Get, path, statuses)
    }

    pub fn post(path: impl Into<String>, statuses: StatusTable) -> Self {
        Self::new(Method::Post, path, statuses)
    }

    pub fn put(path: impl Into<String>, statuses: StatusTable) -> Self {
        Self::new(Method::Put, path, statuses)
    }

    pub fn delete(path: impl Into<String>, statuses: StatusTable) -> Self {
        Self::new(Method::Delete, path, statuses)
    }

    pub fn head(path: impl Into<String>, statuses: StatusTable) -> Self {
        Self::new(Method::Head, path, statuses)
    }

    /// Append one query parameter.
    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Append a batch of query parameters produced by a typed options record.
    pub fn queries(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Append the Docker `filters` parameter, JSON-encoded, when non-empty.
    pub fn filters(self, filters: &HashMap<String, Vec<String>>) -> Result<Self, Error> {
        if filters.is_empty() {
            return Ok(self);
        }
        let encoded = serde_json::to_string(filters)?;
        Ok(self.query("filters", encoded))
    }

    /// Attach a JSON request body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Resolve with a live byte stream instead of a buffered body.
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Attach a request byte stream (tar upload).
    pub fn upload(mut self, input: ByteStream) -> Self {
        self.input = Some(input);
        self
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("stream", &self.stream)
            .field("body", &self.body)
            .field("input", &self.input.is_some())
            .finish()
    }
}

/// What a successful dial resolved to.
///
/// Callers always branch on the shape, so it is a tagged union rather than
/// an overloaded buffered value.
pub enum Payload {
    /// Buffered response body, decoded as JSON.
    Json(serde_json::Value),
    /// Live byte stream, held open until dropped or ended by the daemon.
    Stream(ByteStream),
    /// Buffered textual response (HEAD metadata, buffered export).
    Text(String),
    /// Accepted response with no body.
    Empty,
}

impl Payload {
    pub fn into_json(self) -> Result<serde_json::Value, Error> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Empty => Ok(serde_json::Value::Null),
            Self::Stream(_) => Err(Error::transport("expected a buffered body, got a stream")),
            Self::Text(_) => Err(Error::transport("expected a JSON body, got text")),
        }
    }

    pub fn into_stream(self) -> Result<ByteStream, Error> {
        match self {
            Self::Stream(stream) => Ok(stream),
            _ => Err(Error::transport("expected a stream, got a buffered body")),
        }
    }

    pub fn into_text(self) -> Result<String, Error> {
        match self {
            Self::Text(text) => Ok(text),
            _ => Err(Error::transport("expected a textual body")),
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, Error> {
        Ok(serde_json::from_value(self.into_json()?)?)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

/// Moves one [`Call`] to the daemon and resolves it exactly once.
///
/// Implementations own connection management and demuxing. An accepted
/// status resolves to a [`Payload`]; a status the table maps to a reason
/// resolves to [`Error::Status`]; a status absent from the table resolves
/// to [`Error::UnmappedStatus`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn dial(&self, call: Call) -> Result<Payload, Error>;
}

/// Shared transport handle carried by every manager and resource handle.
///
/// Collapses the per-operation response plumbing into a few helpers so the
/// handle methods stay one descriptor each.
#[derive(Clone)]
pub(crate) struct Remote {
    inner: Arc<dyn Transport>,
}

impl Remote {
    pub(crate) fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }

    pub(crate) async fn dial(&self, call: Call) -> Result<Payload, Error> {
        self.inner.dial(call).await
    }

    /// Dial and hand back the raw decoded body.
    pub(crate) async fn raw(&self, call: Call) -> Result<serde_json::Value, Error> {
        self.dial(call).await?.into_json()
    }

    /// Dial and decode the body into a typed model.
    pub(crate) async fn value<T: DeserializeOwned>(&self, call: Call) -> Result<T, Error> {
        self.dial(call).await?.decode()
    }

    /// Dial an operation whose accepted responses carry no payload.
    pub(crate) async fn unit(&self, call: Call) -> Result<(), Error> {
        self.dial(call).await.map(|_| ())
    }

    pub(crate) async fn stream(&self, call: Call) -> Result<ByteStream, Error> {
        self.dial(call.streaming()).await?.into_stream()
    }

    pub(crate) async fn text(&self, call: Call) -> Result<String, Error> {
        self.dial(call).await?.into_text()
    }
}

impl fmt::Debug for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Remote")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_builder_collects_query_in_order() {
        let call = Call::get("/containers/json", tables::container_list())
            .query("all", true)
            .query("limit", 3);

        assert_eq!(call.method, Method::Get);
        assert_eq!(
            call.query,
            vec![("all", "true".to_string()), ("limit", "3".to_string())]
        );
        assert!(!call.stream);
    }

    #[test]
    fn empty_filters_add_no_parameter() {
        let call = Call::get("/containers/json", tables::container_list())
            .filters(&HashMap::new())
            .unwrap();
        assert!(call.query.is_empty());
    }

    #[test]
    fn payload_shape_mismatch_is_a_transport_error() {
        let payload = Payload::Text("ok".into());
        match payload.into_json() {
            Err(Error::Transport(_)) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
