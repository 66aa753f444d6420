//! The two narrow capabilities a response writer borrows from its connection:
//! a non-blocking byte sink and a writability watcher.

use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::TcpStream;

/// A socket that accepts bytes without blocking.
///
/// `Ok(n)` reports how many bytes were taken (possibly fewer than offered).
/// `WouldBlock` means nothing could be taken right now.
pub trait Transport {
    fn try_write(&self, buf: &[u8]) -> io::Result<usize>;
}

impl Transport for TcpStream {
    fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
        TcpStream::try_write(self, buf)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).try_write(buf)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).try_write(buf)
    }
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).try_write(buf)
    }
}

/// Reactor-side registration that asks to be told when the socket can take
/// more bytes. Both calls must be harmless when repeated.
pub trait WriteWatcher {
    fn enable(&self);
    fn disable(&self);
}

impl<W: WriteWatcher + ?Sized> WriteWatcher for &W {
    fn enable(&self) {
        (**self).enable()
    }

    fn disable(&self) {
        (**self).disable()
    }
}

impl<W: WriteWatcher + ?Sized> WriteWatcher for Arc<W> {
    fn enable(&self) {
        (**self).enable()
    }

    fn disable(&self) {
        (**self).disable()
    }
}

impl<W: WriteWatcher + ?Sized> WriteWatcher for Rc<W> {
    fn enable(&self) {
        (**self).enable()
    }

    fn disable(&self) {
        (**self).disable()
    }
}

/// Watcher for tokio sockets.
///
/// tokio already multiplexes readiness, so "enabled" only records that the
/// connection driver should await `TcpStream::writable()` before calling
/// `write()` again.
#[derive(Debug, Default)]
pub struct WriteInterest {
    enabled: AtomicBool,
}

impl WriteInterest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl WriteWatcher for WriteInterest {
    fn enable(&self) {
        if !self.enabled.swap(true, Ordering::AcqRel) {
            tracing::trace!("write interest enabled");
        }
    }

    fn disable(&self) {
        if self.enabled.swap(false, Ordering::AcqRel) {
            tracing::trace!("write interest disabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_toggles_idempotently() {
        let interest = WriteInterest::new();
        assert!(!interest.is_enabled());

        interest.enable();
        interest.enable();
        assert!(interest.is_enabled());

        interest.disable();
        interest.disable();
        assert!(!interest.is_enabled());
    }

    #[test]
    fn forwards_through_arc() {
        let interest = Arc::new(WriteInterest::new());
        let handle = Arc::clone(&interest);

        handle.enable();
        assert!(interest.is_enabled());
    }
}
