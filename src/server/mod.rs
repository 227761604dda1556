//! Serving loop.
//!
//! ```text
//!   Idle ──activate──▶ Listening ──▶ Polling ◀──▶ Serving
//!                                       │
//!                         continuation false / fatal error
//!                                       ▼
//!                                    Stopped
//! ```
//!
//! The loop polls the listener between connections and serves at most one
//! connection per iteration. Each iteration ends with a cooperative yield and
//! a short sleep, which is where other tasks on the runtime get to run.

pub mod listener;
pub mod router;

use std::io;

use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::http::connection::{Connection, Limits};
use crate::http::request::Request;
use crate::http::response::Response;

pub use listener::Listener;
pub use router::Router;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Listening,
    Polling,
    Serving,
    Stopped,
}

pub struct Server {
    config: ServerConfig,
    router: Router,
    state: ServerState,
    served: u64,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            state: ServerState::Idle,
            served: 0,
        }
    }

    /// See [`Router::register`].
    pub fn register<F>(&mut self, method: &str, path: &str, handler: F)
    where
        F: Fn(&Request) -> anyhow::Result<Response> + 'static,
    {
        self.router.register(method, path, handler);
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Connections accepted since construction.
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Binds the listener and serves until `continuation` returns false.
    ///
    /// `continuation` is checked before every poll, never while a connection
    /// is open. Timeouts and would-block conditions are absorbed; any other
    /// transport error stops the loop and is returned. The listening socket
    /// is released before this returns.
    pub async fn activate<F>(&mut self, mut continuation: F) -> io::Result<()>
    where
        F: FnMut() -> bool,
    {
        let mut listener = Listener::bind(&self.config.host, self.config.port).await?;
        listener.set_nonblocking();
        self.state = ServerState::Listening;

        let outcome = self.poll_loop(&mut listener, &mut continuation).await;

        drop(listener);
        self.state = ServerState::Stopped;
        info!(served = self.served, "Server stopped");
        outcome
    }

    async fn poll_loop<F>(&mut self, listener: &mut Listener, continuation: &mut F) -> io::Result<()>
    where
        F: FnMut() -> bool,
    {
        let limits = Limits {
            recv_timeout: self.config.recv_timeout(),
            send_timeout: self.config.send_timeout(),
            read_chunk: self.config.read_chunk,
        };

        loop {
            if !continuation() {
                return Ok(());
            }
            self.state = ServerState::Polling;

            if listener.poll_pending() {
                self.state = ServerState::Serving;
                match self.serve_one(listener, limits).await {
                    Ok(()) => {}
                    Err(e) if is_transient(&e) => {
                        debug!(error = %e, "Transient transport condition, continuing");
                    }
                    Err(e) => return Err(e),
                }
                self.state = ServerState::Polling;
            }

            tokio::task::yield_now().await;
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn serve_one(&mut self, listener: &mut Listener, limits: Limits) -> io::Result<()> {
        let (stream, peer) = listener.accept().await?;
        self.served += 1;
        debug!(peer = %peer, "Accepted connection");

        Connection::new(stream, peer).run(&self.router, limits).await
    }
}

/// Conditions the loop treats as an empty iteration.
pub fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}
