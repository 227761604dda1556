use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};

use bytes::Bytes;

use crate::http::parser::{Head, find_header};

/// Decoded request entity.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Bytes exactly as received
    Raw(Bytes),
    /// Body sent with `Content-Type: application/json`
    Json(serde_json::Value),
}

/// Represents a parsed HTTP request from a client.
///
/// Method and path are kept as received; the router folds their case when
/// matching. The request lives only as long as the connection it came from.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method token (e.g. "GET")
    pub method: String,
    /// The request path (e.g. "/index.html")
    pub path: String,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Request headers, keys as sent by the client
    pub headers: HashMap<String, String>,
    /// Request body, absent when no `Content-Length` was sent
    pub body: Option<RequestBody>,
    /// Address of the remote peer
    pub peer: SocketAddr,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    body: Option<RequestBody>,
    peer: SocketAddr,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: HashMap::new(),
            body: None,
            peer: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn peer(mut self, peer: SocketAddr) -> Self {
        self.peer = peer;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
            peer: self.peer,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Assembles a request from a parsed header block and its body.
    pub fn from_parts(head: Head, body: Option<RequestBody>, peer: SocketAddr) -> Self {
        Self {
            method: head.method,
            path: head.path,
            version: head.version,
            headers: head.headers,
            body,
            peer,
        }
    }

    /// Retrieves a header value by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        find_header(&self.headers, key)
    }

    /// Raw body bytes, `None` for JSON or absent bodies.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Some(RequestBody::Raw(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Raw body as text, `None` when absent, JSON or not UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        self.body_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Decoded JSON body.
    pub fn json(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }
}
