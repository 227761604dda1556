use std::io;
use std::net::SocketAddr;
use std::task::{Context, Poll, Waker};

use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::info;

/// Pending connections the kernel queues for us. One connection is served
/// at a time, so one is enough.
const BACKLOG: u32 = 1;

type Accepted = io::Result<(TcpStream, SocketAddr)>;

/// The listening socket.
///
/// `poll_pending` looks for a queued connection without waiting; whatever it
/// finds (a connection or an accept error) is held until `accept` takes it.
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
    nonblocking: bool,
    staged: Option<Accepted>,
}

impl Listener {
    /// Creates a socket with address reuse, binds it and starts listening.
    pub async fn bind(host: &str, port: u16) -> io::Result<Self> {
        let addr = tokio::net::lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("{}:{} did not resolve", host, port),
                )
            })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;

        let inner = socket.listen(BACKLOG)?;
        let local_addr = inner.local_addr()?;
        info!("Listening on {}", local_addr);

        Ok(Self {
            inner,
            local_addr,
            nonblocking: false,
            staged: None,
        })
    }

    /// Makes `accept` return `WouldBlock` instead of waiting when nothing
    /// is pending.
    pub fn set_nonblocking(&mut self) {
        self.nonblocking = true;
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblocking
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether a connection is waiting to be accepted. Never waits.
    pub fn poll_pending(&mut self) -> bool {
        if self.staged.is_some() {
            return true;
        }

        let mut cx = Context::from_waker(Waker::noop());
        match self.inner.poll_accept(&mut cx) {
            Poll::Ready(accepted) => {
                self.staged = Some(accepted);
                true
            }
            Poll::Pending => false,
        }
    }

    /// Hands out the connection seen by `poll_pending`.
    pub async fn accept(&mut self) -> Accepted {
        if let Some(accepted) = self.staged.take() {
            return accepted;
        }

        if self.nonblocking {
            return Err(io::ErrorKind::WouldBlock.into());
        }

        self.inner.accept().await
    }
}
