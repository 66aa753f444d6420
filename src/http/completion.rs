//! One-shot completion handle for a response in flight.
//!
//! A [`Completion`] is only allocated when the first write attempt leaves bytes
//! behind. Responses that finish on the first attempt never touch this module.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::ResponderError;

/// `Ok(must_close)` on success, or the reason the response could not be sent.
pub type Outcome = Result<bool, ResponderError>;

/// Create a linked signal/handle pair.
pub(crate) fn channel() -> (Signal, Completion) {
    let (tx, rx) = oneshot::channel();
    (Signal { tx }, Completion { rx })
}

/// Writer-side half. Consumed by [`Signal::resolve`], so it resolves at most once.
#[derive(Debug)]
pub(crate) struct Signal {
    tx: oneshot::Sender<Outcome>,
}

impl Signal {
    pub(crate) fn resolve(self, outcome: Outcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!("completion handle dropped before the response finished");
        }
    }
}

/// Caller-side half. Resolves once the writer reaches a terminal outcome.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Outcome>,
}

impl Completion {
    /// Non-blocking check. `None` while the response is still being written.
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(ResponderError::Abandoned)),
        }
    }
}

impl Future for Completion {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(ResponderError::Abandoned)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_resolved() {
        let (signal, mut completion) = channel();
        assert!(completion.try_outcome().is_none());

        signal.resolve(Ok(true));
        assert!(matches!(completion.try_outcome(), Some(Ok(true))));
    }

    #[tokio::test]
    async fn dropped_signal_yields_abandoned() {
        let (signal, completion) = channel();
        drop(signal);

        assert!(matches!(completion.await, Err(ResponderError::Abandoned)));
    }
}
