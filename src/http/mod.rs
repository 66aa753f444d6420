//! HTTP protocol implementation.
//!
//! This module implements an HTTP/1.x static content server with keep-alive
//! connections and non-blocking response writing.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection request-response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and parsing utilities
//! - **`response`**: Status codes and a builder for non-file responses
//! - **`writer`**: Serializes a response and drives it onto a non-blocking socket
//! - **`context`**: Per-response data the writer receives from its connection
//! - **`completion`**: One-shot handle for responses that need more than one write
//! - **`io`**: The `Transport` and `WriteWatcher` capabilities the writer borrows
//! - **`date`**: HTTP date formatting
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route, decide must-close, prepare writer
//!        └──────┬───────────┘
//!               │ Writer prepared
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← write() until terminal, waiting on
//!        └──────┬───────────┘   writability after partial writes
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Writing a response
//!
//! ```ignore
//! let mut writer = ResponseWriter::new(body, vec!["Content-Type: text/plain".into()]);
//! writer.prepare(ctx);
//!
//! let completion = match writer.write() {
//!     Write::Ready(outcome) => return outcome,
//!     Write::Pending(handle) => handle,
//!     Write::Settled => unreachable!(),
//! };
//! // ... call writer.write() again on every writability event ...
//! ```

pub mod completion;
pub mod connection;
pub mod context;
pub mod date;
pub mod io;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
