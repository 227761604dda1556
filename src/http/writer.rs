use std::fmt;
use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Encoder, Response, StatusCode};

/// Why a response could not be sent in full.
#[derive(Debug)]
pub enum WriteError {
    /// The response's own content failed to produce bytes, e.g. a file read
    Content(io::Error),
    /// The stream rejected a write or flush
    Transport(io::Error),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Content(e) => write!(f, "response content failed: {e}"),
            WriteError::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteError::Content(e) | WriteError::Transport(e) => Some(e),
        }
    }
}

/// Drains an encoded response into a stream, chunk by chunk.
pub struct ResponseWriter {
    status: StatusCode,
    chunks: Encoder,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        Self {
            status: response.status(),
            chunks: response.encode(),
            written: 0,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Bytes handed to the stream so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Writes every remaining chunk in order and flushes.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> Result<usize, WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        for chunk in self.chunks.by_ref() {
            let chunk = chunk.map_err(WriteError::Content)?;
            stream
                .write_all(&chunk)
                .await
                .map_err(WriteError::Transport)?;
            self.written += chunk.len();
        }

        stream.flush().await.map_err(WriteError::Transport)?;
        Ok(self.written)
    }
}
