use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::reader::{ReadError, Transport, read_request};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{ResponseWriter, WriteError};
use crate::server::router::Router;

/// Per-connection limits, taken from the server configuration.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Deadline for reading the whole request
    pub recv_timeout: Duration,
    /// Deadline for sending the whole response
    pub send_timeout: Duration,
    /// Upper bound for a single read
    pub read_chunk: usize,
}

/// One accepted connection, served exactly once and then closed.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: Transport + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            state: ConnectionState::Reading,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Reads one request, answers it and closes the stream, whatever
    /// happened along the way. Transport errors that end the exchange early
    /// are returned after the stream is closed.
    pub async fn run(mut self, router: &Router, limits: Limits) -> io::Result<()> {
        let outcome = self.drive(router, limits).await;
        self.close().await;
        outcome
    }

    async fn drive(&mut self, router: &Router, limits: Limits) -> io::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = self.read(limits).await?;
                }

                ConnectionState::Processing(req) => {
                    let response = router.dispatch(&req);
                    tracing::info!(
                        peer = %self.peer,
                        method = %req.method,
                        path = %req.path,
                        status = response.status().as_u16(),
                        "Request handled"
                    );
                    self.state = ConnectionState::Writing(ResponseWriter::new(response));
                }

                ConnectionState::Writing(writer) => {
                    self.write(writer, limits).await?;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read(&mut self, limits: Limits) -> io::Result<ConnectionState> {
        let read = tokio::time::timeout(
            limits.recv_timeout,
            read_request(&mut self.stream, self.peer, limits.read_chunk),
        )
        .await;

        match read {
            Ok(Ok(req)) => Ok(ConnectionState::Processing(req)),
            Ok(Err(ReadError::Malformed(e))) => {
                tracing::warn!(peer = %self.peer, error = %e, "Rejecting malformed request");
                let response =
                    Response::text(StatusCode::BadRequest, format!("400 Bad Request ({})", e));
                Ok(ConnectionState::Writing(ResponseWriter::new(response)))
            }
            Ok(Err(ReadError::Closed)) => {
                tracing::debug!(peer = %self.peer, "Peer closed before sending a full request");
                Ok(ConnectionState::Closed)
            }
            Ok(Err(ReadError::Io(e))) => Err(e),
            Err(_elapsed) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no complete request within {:?}", limits.recv_timeout),
            )),
        }
    }

    async fn write(&mut self, mut writer: ResponseWriter, limits: Limits) -> io::Result<()> {
        let sent = tokio::time::timeout(
            limits.send_timeout,
            writer.write_to_stream(&mut self.stream),
        )
        .await;

        match sent {
            Ok(Ok(n)) => {
                tracing::debug!(peer = %self.peer, bytes = n, "Response sent");
                Ok(())
            }
            Ok(Err(WriteError::Content(e))) => {
                tracing::error!(
                    peer = %self.peer,
                    error = %e,
                    written = writer.written(),
                    "Response content failed, dropping connection"
                );
                Ok(())
            }
            Ok(Err(WriteError::Transport(e))) if is_peer_gone(&e) => {
                tracing::warn!(
                    peer = %self.peer,
                    error = %e,
                    written = writer.written(),
                    "Peer went away while writing"
                );
                Ok(())
            }
            Ok(Err(WriteError::Transport(e))) => Err(e),
            Err(_elapsed) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "response not sent within {:?} ({} bytes written)",
                    limits.send_timeout,
                    writer.written()
                ),
            )),
        }
    }

    async fn close(&mut self) {
        self.state = ConnectionState::Closed;
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(peer = %self.peer, error = %e, "Shutdown after exchange failed");
        }
    }
}

fn is_peer_gone(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}
