//! Incremental request reader.
//!
//! Reads a request off a non-blocking transport in two phases: the header
//! block, accumulated until the `\r\n\r\n` terminator shows up, then exactly
//! `Content-Length` body bytes. A would-block read parks on the transport's
//! readiness and retries; any other transport error ends the read. There is
//! no deadline here, the caller wraps the whole read in one.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use bytes::{Bytes, BytesMut};
use tokio::net::TcpStream;

use crate::http::parser::{self, ParseError};
use crate::http::request::{Request, RequestBody};

/// Byte source for the reader.
///
/// `read_now` never waits: it returns `WouldBlock` when nothing is buffered.
/// `wait_readable` resolves once a read is likely to make progress.
#[allow(async_fn_in_trait)]
pub trait Transport {
    fn read_now(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    async fn wait_readable(&mut self) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_now(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_now(buf)
    }

    async fn wait_readable(&mut self) -> io::Result<()> {
        (**self).wait_readable().await
    }
}

impl Transport for TcpStream {
    fn read_now(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        TcpStream::try_read(self, buf)
    }

    async fn wait_readable(&mut self) -> io::Result<()> {
        TcpStream::readable(self).await
    }
}

#[derive(Debug)]
pub enum ReadError {
    /// Transport failure other than would-block
    Io(io::Error),
    /// Peer closed the connection before the request was complete
    Closed,
    /// Bytes arrived but do not form a valid request
    Malformed(ParseError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Io(e) => write!(f, "transport error: {e}"),
            ReadError::Closed => write!(f, "connection closed mid-request"),
            ReadError::Malformed(e) => write!(f, "malformed request: {e}"),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Io(e) => Some(e),
            ReadError::Malformed(e) => Some(e),
            ReadError::Closed => None,
        }
    }
}

impl From<ParseError> for ReadError {
    fn from(e: ParseError) -> Self {
        ReadError::Malformed(e)
    }
}

/// Reads one complete request from `transport`.
///
/// `chunk` bounds every single read; the body phase never asks for more than
/// the bytes still missing, so nothing past the declared length is consumed.
pub async fn read_request<T: Transport>(
    transport: &mut T,
    peer: SocketAddr,
    chunk: usize,
) -> Result<Request, ReadError> {
    let chunk = chunk.max(1);
    let mut buf = BytesMut::with_capacity(chunk);

    // Header phase
    let mut scanned = 0;
    let headers_end = loop {
        if let Some(pos) = parser::find_headers_end(&buf[scanned..]) {
            break scanned + pos;
        }
        // The terminator may straddle two reads.
        scanned = buf.len().saturating_sub(3);
        fill(transport, &mut buf, chunk).await?;
    };

    let head_bytes = buf.split_to(headers_end + 4);
    let head = parser::parse_head(&head_bytes)?;

    // Body phase
    let body = match head.content_length()? {
        None | Some(0) => None,
        Some(length) => {
            // Whatever followed the terminator in the last header read
            // already belongs to the body.
            buf.truncate(length);
            while buf.len() < length {
                let missing = length - buf.len();
                fill(transport, &mut buf, missing.min(chunk)).await?;
            }
            Some(decode_body(head.is_json(), buf.freeze())?)
        }
    };

    tracing::debug!(
        peer = %peer,
        method = %head.method,
        path = %head.path,
        "Request read"
    );

    Ok(Request::from_parts(head, body, peer))
}

fn decode_body(json: bool, bytes: Bytes) -> Result<RequestBody, ParseError> {
    if !json {
        return Ok(RequestBody::Raw(bytes));
    }

    serde_json::from_slice(&bytes)
        .map(RequestBody::Json)
        .map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// Appends at most `want` bytes to `buf`, waiting out would-block conditions.
/// Returns the number of bytes actually read.
async fn fill<T: Transport>(
    transport: &mut T,
    buf: &mut BytesMut,
    want: usize,
) -> Result<usize, ReadError> {
    let start = buf.len();
    buf.resize(start + want, 0);

    let result = loop {
        match transport.read_now(&mut buf[start..]) {
            Ok(0) => break Err(ReadError::Closed),
            Ok(n) => break Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if let Err(e) = transport.wait_readable().await {
                    break Err(ReadError::Io(e));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => break Err(ReadError::Io(e)),
        }
    };

    buf.truncate(start + *result.as_ref().unwrap_or(&0));
    result
}
