//! Exact method+path routing.
//!
//! ```text
//! Request → resolve → Handler → invoke → Response
//! ```
//!
//! Keys are case-folded, so `GET /Index` and `get /index` hit the same
//! handler. A request without a handler gets an empty 404; a handler that
//! returns an error gets a 500 carrying the error's description.

use std::collections::HashMap;

use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// A route handler. Errors are turned into 500 responses by the router.
pub type Handler = dyn Fn(&Request) -> anyhow::Result<Response>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: String,
    path: String,
}

impl RouteKey {
    fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_lowercase(),
            path: path.to_lowercase(),
        }
    }
}

/// Route table, filled at startup and read-only while serving.
#[derive(Default)]
pub struct Router {
    routes: HashMap<RouteKey, Box<Handler>>,
}

fn not_found(_request: &Request) -> anyhow::Result<Response> {
    Ok(Response::new(StatusCode::NotFound))
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `method` and `path`. A later registration for the
    /// same key replaces the earlier one.
    pub fn register<F>(&mut self, method: &str, path: &str, handler: F)
    where
        F: Fn(&Request) -> anyhow::Result<Response> + 'static,
    {
        let key = RouteKey::new(method, path);
        if self.routes.insert(key, Box::new(handler)).is_some() {
            tracing::debug!(method, path, "Route handler replaced");
        }
    }

    /// Handler for the request's method and path, or the 404 handler.
    pub fn resolve(&self, request: &Request) -> &Handler {
        self.routes
            .get(&RouteKey::new(&request.method, &request.path))
            .map(|handler| handler.as_ref())
            .unwrap_or(&not_found)
    }

    /// Runs `handler`, mapping a failure to a 500 response.
    pub fn invoke(&self, handler: &Handler, request: &Request) -> Response {
        match handler(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    method = %request.method,
                    path = %request.path,
                    error = %e,
                    "Handler failed"
                );
                Response::text(
                    StatusCode::InternalServerError,
                    format!("500 Server Error ({})", e),
                )
            }
        }
    }

    pub fn dispatch(&self, request: &Request) -> Response {
        self.invoke(self.resolve(request), request)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
