//! outflow - static content HTTP/1.x server
//!
//! Core library: non-blocking response writing, connection handling and
//! document-root content.

pub mod config;
pub mod error;
pub mod http;
pub mod root;
pub mod server;
