use std::io;

/// Failure delivered through a response [`Completion`](crate::http::completion::Completion).
#[derive(thiserror::Error, Debug)]
pub enum ResponderError {
    /// The socket write failed for good: peer closed, reset, or any other
    /// unrecoverable I/O error. Bytes already accepted are not re-sent.
    #[error("write failed: destination stream went away")]
    ClientGone(#[source] io::Error),

    /// The writer was dropped before it resolved the handle it issued.
    #[error("response writer dropped before the response was written")]
    Abandoned,
}

impl ResponderError {
    pub fn is_client_gone(&self) -> bool {
        matches!(self, ResponderError::ClientGone(_))
    }
}
