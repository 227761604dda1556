//! Mote - single-connection HTTP engine
//!
//! A polling HTTP/1.1 server for small devices: one listener, one connection
//! at a time, handlers bound to exact method and path.

pub mod config;
pub mod diagnostic;
pub mod http;
pub mod server;
