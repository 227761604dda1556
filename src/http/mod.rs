//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one request per connection, body
//! length from `Content-Length` only, and every response closes the
//! connection.
//!
//! # Architecture
//!
//! - **`connection`**: Serves one accepted stream: read, dispatch, write, close
//! - **`reader`**: Incremental request reading over a non-blocking transport
//! - **`parser`**: Header block parsing
//! - **`request`**: Parsed request representation
//! - **`response`**: Responses with a fixed header block and lazy chunk encoding
//! - **`writer`**: Sends an encoded response to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Header block, then Content-Length bytes
//!        └──────┬──────┘
//!               │ Request read          (malformed → 400 → Writing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Router picks and runs the handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Header block, then content chunks
//!        └──────┬───────────┘
//!               ▼
//!            Closed            ← Always, on every path
//! ```

pub mod connection;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;
