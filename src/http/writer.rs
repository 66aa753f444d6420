use std::io;
use std::mem;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ResponderError;
use crate::http::completion::{self, Completion, Outcome, Signal};
use crate::http::context::ResponderContext;
use crate::http::io::{Transport, WriteWatcher};
use crate::http::request::Method;
use crate::http::response::StatusCode;

/// Result of one [`ResponseWriter::write`] call.
#[must_use]
#[derive(Debug)]
pub enum Write {
    /// Finished on the first attempt. No completion handle was ever allocated.
    Ready(Outcome),
    /// Bytes remain and the watcher is enabled; call `write` again once the
    /// socket is writable. Carries the completion handle on the first partial
    /// attempt only.
    Pending(Option<Completion>),
    /// Finished; the outcome went to the handle issued by an earlier call.
    Settled,
}

impl Write {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Write::Pending(_))
    }
}

enum State<T, W> {
    Unprepared,
    Writing(Flight<T, W>),
    Finished,
}

/// Per-response I/O state, present between `prepare` and the terminal write.
struct Flight<T, W> {
    transport: T,
    watcher: W,
    /// Unacknowledged suffix of the serialized response.
    wire: BytesMut,
    must_close: bool,
    watcher_enabled: bool,
    signal: Option<Signal>,
}

enum Attempt {
    Complete,
    Partial(usize),
    Failed(io::Error),
}

enum Step {
    Pending(Option<Completion>),
    Done(Outcome),
}

impl<T: Transport, W: WriteWatcher> Flight<T, W> {
    fn attempt(&self) -> Attempt {
        if self.wire.is_empty() {
            return Attempt::Complete;
        }

        match self.transport.try_write(&self.wire) {
            Ok(n) if n >= self.wire.len() => Attempt::Complete,
            Ok(n) => Attempt::Partial(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                Attempt::Partial(0)
            }
            Err(e) => Attempt::Failed(e),
        }
    }

    fn step(&mut self) -> Step {
        match self.attempt() {
            Attempt::Complete => {
                self.disarm();
                Step::Done(Ok(self.must_close))
            }
            Attempt::Partial(n) => {
                self.wire.advance(n);
                self.arm();

                tracing::debug!(
                    written = n,
                    remaining = self.wire.len(),
                    "partial write, waiting for writability"
                );

                if self.signal.is_some() {
                    return Step::Pending(None);
                }

                let (signal, handle) = completion::channel();
                self.signal = Some(signal);
                Step::Pending(Some(handle))
            }
            Attempt::Failed(e) => {
                self.disarm();
                tracing::debug!(error = %e, remaining = self.wire.len(), "response write failed");
                Step::Done(Err(ResponderError::ClientGone(e)))
            }
        }
    }

    fn arm(&mut self) {
        if !self.watcher_enabled {
            self.watcher_enabled = true;
            self.watcher.enable();
        }
    }

    fn disarm(&mut self) {
        if self.watcher_enabled {
            self.watcher_enabled = false;
            self.watcher.disable();
        }
    }
}

/// Serializes one buffered response and pushes it onto a non-blocking socket.
///
/// Call [`prepare`](Self::prepare) once, then [`write`](Self::write) whenever
/// the socket is writable until a terminal [`Write`] comes back. The writer
/// never blocks and never retries on its own: a partial write enables the
/// watcher and returns.
pub struct ResponseWriter<T, W> {
    status: StatusCode,
    header_lines: Vec<String>,
    body: Bytes,
    state: State<T, W>,
}

impl<T, W> ResponseWriter<T, W> {
    /// A `200 OK` response for `body` with the caller's header lines.
    pub fn new(body: Bytes, header_lines: Vec<String>) -> Self {
        Self::with_status(StatusCode::Ok, body, header_lines)
    }

    pub fn with_status(status: StatusCode, body: Bytes, header_lines: Vec<String>) -> Self {
        Self {
            status,
            header_lines,
            body,
            state: State::Unprepared,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Serialize the full response for `ctx` without touching writer state.
    pub fn assemble(&self, ctx: &ResponderContext<'_, T, W>) -> BytesMut {
        let protocol = ctx.request.protocol();
        let keep_alive = (!ctx.must_close).then(|| ctx.keep_alive_timeout.to_string());
        let body: &[u8] = if ctx.request.method == Method::HEAD {
            &[]
        } else {
            &self.body
        };

        let mut buf = BytesMut::with_capacity(256 + body.len());

        put_line(
            &mut buf,
            &format!(
                "HTTP/{} {} {}",
                protocol,
                self.status.as_u16(),
                self.status.reason_phrase()
            ),
        );

        for line in &self.header_lines {
            put_line(&mut buf, line);
        }

        match &keep_alive {
            None => put_line(&mut buf, "Connection: close"),
            Some(timeout) => {
                put_line(&mut buf, "Connection: keep-alive");
                put_line(&mut buf, &format!("Keep-Alive: {}", timeout));
            }
        }

        put_line(&mut buf, &format!("Date: {}", ctx.http_date));

        if let Some(token) = ctx.server_token.filter(|t| !t.is_empty()) {
            put_line(&mut buf, &format!("Server: {}", token));
        }

        buf.put_slice(b"\r\n");
        buf.put_slice(body);
        buf
    }

    /// Build the wire buffer and take ownership of the socket and watcher
    /// handles for this response.
    ///
    /// # Panics
    ///
    /// If called more than once.
    pub fn prepare(&mut self, ctx: ResponderContext<'_, T, W>) {
        assert!(
            matches!(self.state, State::Unprepared),
            "ResponseWriter::prepare called more than once"
        );

        let wire = self.assemble(&ctx);
        self.state = State::Writing(Flight {
            transport: ctx.transport,
            watcher: ctx.watcher,
            wire,
            must_close: ctx.must_close,
            watcher_enabled: false,
            signal: None,
        });
    }

    /// Bytes still owed to the socket. Empty before `prepare` and once finished.
    pub fn remaining(&self) -> &[u8] {
        match &self.state {
            State::Writing(flight) => &flight.wire,
            _ => &[],
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }
}

impl<T: Transport, W: WriteWatcher> ResponseWriter<T, W> {
    /// Attempt one non-blocking write of everything still owed.
    ///
    /// # Panics
    ///
    /// If called before `prepare` or after a terminal [`Write`].
    pub fn write(&mut self) -> Write {
        let step = match &mut self.state {
            State::Writing(flight) => flight.step(),
            State::Unprepared => panic!("ResponseWriter::write called before prepare"),
            State::Finished => panic!("ResponseWriter::write called after the response finished"),
        };

        match step {
            Step::Pending(handle) => Write::Pending(handle),
            Step::Done(outcome) => self.finish(outcome),
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Write {
        let State::Writing(flight) = mem::replace(&mut self.state, State::Finished) else {
            unreachable!("finish only follows a write attempt");
        };

        match flight.signal {
            Some(signal) => {
                signal.resolve(outcome);
                Write::Settled
            }
            None => Write::Ready(outcome),
        }
    }
}

fn put_line(buf: &mut BytesMut, line: &str) {
    buf.put_slice(line.as_bytes());
    buf.put_slice(b"\r\n");
}
