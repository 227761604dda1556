use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use bytes::Bytes;

use crate::http::parser::JSON_CONTENT_TYPE;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Identity sent in the `Server` header of every response.
pub const SERVER_NAME: &str = "Mote-HTTP-Server";

/// Size of the pieces a stream-backed body is read in.
const STREAM_CHUNK: usize = 512;

/// HTTP status codes the server can produce.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): No handler for method and path
/// - `InternalServerError` (500): Handler failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use mote::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A numeric code outside the supported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStatus(pub u16);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported status code {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl TryFrom<u16> for StatusCode {
    type Error = UnknownStatus;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(StatusCode::Ok),
            400 => Ok(StatusCode::BadRequest),
            404 => Ok(StatusCode::NotFound),
            500 => Ok(StatusCode::InternalServerError),
            other => Err(UnknownStatus(other)),
        }
    }
}

/// Response payload.
pub enum Content {
    /// A single text element
    Text(String),
    /// Elements sent back to back, in order
    Chunks(Vec<Bytes>),
    /// Serialized when the response is encoded
    Json(serde_json::Value),
    /// Read to EOF while encoding, e.g. an opened file
    Stream(Box<dyn Read>),
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Content::Chunks(chunks) => f.debug_tuple("Chunks").field(chunks).finish(),
            Content::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Content::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A response whose header block is fixed at construction.
///
/// Every response closes the connection, so no `Content-Length` is sent;
/// the body runs until the server shuts the socket.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    head: String,
    content: Option<Content>,
}

impl Response {
    /// Creates a response without content.
    pub fn new(status: StatusCode) -> Self {
        Self::with_content(status, None)
    }

    pub fn with_content(status: StatusCode, content: Option<Content>) -> Self {
        let extra: &[(&str, &str)] = match content {
            Some(Content::Json(_)) => &[("Content-Type", JSON_CONTENT_TYPE)],
            _ => &[],
        };

        Self {
            status,
            head: header_block(status, extra),
            content,
        }
    }

    /// Creates a response from a numeric code.
    ///
    /// Fails for codes outside the supported table.
    pub fn from_code(code: u16, content: Option<Content>) -> Result<Self, UnknownStatus> {
        Ok(Self::with_content(StatusCode::try_from(code)?, content))
    }

    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::with_content(status, Some(Content::Text(text.into())))
    }

    pub fn chunks<I, B>(status: StatusCode, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks = chunks.into_iter().map(Into::into).collect();
        Self::with_content(status, Some(Content::Chunks(chunks)))
    }

    /// JSON response: adds the content-type line, serializes on encode.
    pub fn json(status: StatusCode, value: serde_json::Value) -> Self {
        Self::with_content(status, Some(Content::Json(value)))
    }

    /// 200 response streaming `source` as its body.
    pub fn stream(source: impl Read + 'static) -> Self {
        Self::with_content(StatusCode::Ok, Some(Content::Stream(Box::new(source))))
    }

    /// 200 response streaming the file at `path`.
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::stream(File::open(path)?))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The header block, blank line included.
    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    /// Turns the response into its wire chunks: the header block, then
    /// every content element. Single pass.
    pub fn encode(self) -> Encoder {
        let body = match self.content {
            None => Body::Done,
            Some(Content::Text(text)) if text.is_empty() => Body::Done,
            Some(Content::Text(text)) => Body::Chunks(vec![Bytes::from(text)].into_iter()),
            Some(Content::Chunks(chunks)) => Body::Chunks(chunks.into_iter()),
            Some(Content::Json(value)) => Body::Json(value),
            Some(Content::Stream(source)) => Body::Stream(source),
        };

        Encoder {
            head: Some(Bytes::from(self.head)),
            body,
        }
    }
}

fn header_block(status: StatusCode, extra: &[(&str, &str)]) -> String {
    let mut head = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );

    head.push_str("Cache-Control: no-cache, no-store, must-revalidate\r\n");
    head.push_str(&format!("Server: {}\r\n", SERVER_NAME));
    head.push_str("Connection: close\r\n");

    for (key, value) in extra {
        head.push_str(&format!("{}: {}\r\n", key, value));
    }

    // Header/body separator
    head.push_str("\r\n");
    head
}

enum Body {
    Chunks(std::vec::IntoIter<Bytes>),
    Json(serde_json::Value),
    Stream(Box<dyn Read>),
    Done,
}

/// Lazy chunk sequence produced by [`Response::encode`].
pub struct Encoder {
    head: Option<Bytes>,
    body: Body,
}

impl Iterator for Encoder {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(head) = self.head.take() {
            return Some(Ok(head));
        }

        match std::mem::replace(&mut self.body, Body::Done) {
            Body::Done => None,
            Body::Chunks(mut chunks) => {
                let chunk = chunks.next()?;
                self.body = Body::Chunks(chunks);
                Some(Ok(chunk))
            }
            Body::Json(value) => Some(
                serde_json::to_vec(&value)
                    .map(Bytes::from)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            ),
            Body::Stream(mut source) => {
                let mut piece = vec![0u8; STREAM_CHUNK];
                loop {
                    match source.read(&mut piece) {
                        Ok(0) => return None,
                        Ok(n) => {
                            piece.truncate(n);
                            self.body = Body::Stream(source);
                            return Some(Ok(Bytes::from(piece)));
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => return Some(Err(e)),
                    }
                }
            }
        }
    }
}
