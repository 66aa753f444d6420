use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

use crate::error::ResponderError;
use crate::http::completion::Outcome;
use crate::http::context::ResponderContext;
use crate::http::date::http_date_now;
use crate::http::io::WriteInterest;
use crate::http::parser::{parse_with_limits, ParseError};
use crate::http::request::{Method, Request};
use crate::http::response::{ResponseBuilder, StatusCode};
use crate::http::writer::{ResponseWriter, Write};
use crate::server::ServerState;

type Writer = ResponseWriter<Arc<TcpStream>, Arc<WriteInterest>>;

pub struct Connection {
    stream: Arc<TcpStream>,
    peer: SocketAddr,
    interest: Arc<WriteInterest>,
    shared: Arc<ServerState>,
    buffer: Vec<u8>,
    served: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(Writer),
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, shared: Arc<ServerState>) -> Self {
        Self {
            stream: Arc::new(stream),
            peer,
            interest: Arc::new(WriteInterest::new()),
            shared,
            buffer: Vec::with_capacity(4096),
            served: 0,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await {
                        Ok(Some(req)) => ConnectionState::Processing(req),
                        Ok(None) => ConnectionState::Closed,
                        Err(e) => match e.downcast_ref::<ParseError>() {
                            Some(parse) => {
                                tracing::debug!(peer = %self.peer, error = %parse, "rejecting request");
                                ConnectionState::Writing(self.reject(rejection_status(parse)))
                            }
                            None => return Err(e),
                        },
                    };
                }

                ConnectionState::Processing(req) => {
                    let writer = self.handle_request(&req).await;
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(mut writer) => {
                    self.state = match self.flush(&mut writer).await {
                        Ok(must_close) => {
                            self.served += 1;
                            if must_close {
                                ConnectionState::Closed
                            } else {
                                ConnectionState::Reading // go back for next request
                            }
                        }
                        Err(e) if e.is_client_gone() => {
                            tracing::debug!(peer = %self.peer, error = %e, "client went away mid-response");
                            ConnectionState::Closed
                        }
                        Err(e) => return Err(e.into()),
                    };
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        tracing::debug!(peer = %self.peer, served = self.served, "connection closed");
        Ok(())
    }

    /// Read until one full request is buffered.
    ///
    /// `Ok(None)` when the peer closed, the keep-alive idle timeout passed,
    /// or a started request was not finished within `request_timeout`.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        let server = &self.shared.config.server;
        let idle = Duration::from_secs(server.keep_alive_timeout);
        let request_timeout = Duration::from_secs(server.request_timeout);
        let limits = self.shared.config.limits();
        let mut deadline = None;

        loop {
            // Try parsing whatever we already have
            match parse_with_limits(&self.buffer, &limits) {
                Ok((request, consumed)) => {
                    self.buffer.drain(..consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {}

                Err(e) => {
                    // Malformed or oversized; answered by the caller
                    return Err(e.into());
                }
            }

            // The deadline is fixed by the first byte of a request; trickling
            // more bytes does not push it back.
            let wait = if self.buffer.is_empty() {
                idle
            } else {
                let deadline = *deadline.get_or_insert_with(|| Instant::now() + request_timeout);
                deadline.saturating_duration_since(Instant::now())
            };

            let n = match timeout(wait, self.read_some()).await {
                Ok(n) => n?,
                Err(_) if self.buffer.is_empty() => {
                    tracing::debug!(peer = %self.peer, "keep-alive idle timeout");
                    return Ok(None);
                }
                Err(_) => {
                    tracing::debug!(peer = %self.peer, buffered = self.buffer.len(), "request timed out");
                    return Ok(None);
                }
            };

            if n == 0 {
                // Client closed connection
                return Ok(None);
            }
        }
    }

    async fn read_some(&mut self) -> io::Result<usize> {
        loop {
            self.stream.readable().await?;

            match self.stream.try_read_buf(&mut self.buffer) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Push a prepared writer to completion, waiting on writability between
    /// partial attempts.
    async fn flush(&self, writer: &mut Writer) -> Outcome {
        let mut completion = None;

        loop {
            match writer.write() {
                Write::Ready(outcome) => return outcome,
                Write::Settled => break,
                Write::Pending(handle) => {
                    if handle.is_some() {
                        completion = handle;
                    }
                    if self.interest.is_enabled() {
                        self.stream
                            .writable()
                            .await
                            .map_err(ResponderError::ClientGone)?;
                    }
                }
            }
        }

        match completion {
            Some(completion) => completion.await,
            None => Err(ResponderError::Abandoned),
        }
    }

    async fn handle_request(&self, req: &Request) -> Writer {
        let mut writer = self.route(req).await;

        tracing::info!(
            peer = %self.peer,
            method = ?req.method,
            path = %req.path,
            status = writer.status().as_u16(),
            "request"
        );

        self.prepare(&mut writer, req, self.must_close(req));
        writer
    }

    async fn route(&self, req: &Request) -> Writer {
        if !req.is_get_or_head() {
            return ResponseBuilder::error(StatusCode::MethodNotAllowed)
                .header("Allow", "GET, HEAD")
                .build();
        }

        match self.shared.root.lookup(&req.path).await {
            Ok(Some(entry)) => entry.responder(),
            Ok(None) => ResponseBuilder::error(StatusCode::NotFound).build(),
            Err(e) => {
                tracing::error!(path = %req.path, error = %e, "failed to load file");
                ResponseBuilder::error(StatusCode::InternalServerError).build()
            }
        }
    }

    fn reject(&self, status: StatusCode) -> Writer {
        let mut writer = ResponseBuilder::error(status).build();
        // Nothing was understood; answer in HTTP/1.1 and hang up.
        let req = Request {
            method: Method::GET,
            path: "/".to_string(),
            version: "HTTP/1.1".to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        };

        self.prepare(&mut writer, &req, true);
        writer
    }

    fn must_close(&self, req: &Request) -> bool {
        let server = &self.shared.config.server;
        let cap_reached =
            server.max_keep_alive_requests > 0 && self.served + 1 >= server.max_keep_alive_requests;

        !server.keep_alive || !req.keep_alive() || cap_reached
    }

    fn prepare(&self, writer: &mut Writer, req: &Request, must_close: bool) {
        let http_date = http_date_now();

        writer.prepare(ResponderContext {
            transport: Arc::clone(&self.stream),
            watcher: Arc::clone(&self.interest),
            must_close,
            keep_alive_timeout: self.shared.config.server.keep_alive_timeout,
            http_date: &http_date,
            server_token: self.shared.config.server_token(),
            request: req,
        });
    }
}

fn rejection_status(error: &ParseError) -> StatusCode {
    match error {
        ParseError::HeadTooLarge(_) => StatusCode::HeaderFieldsTooLarge,
        ParseError::BodyTooLarge(_) => StatusCode::PayloadTooLarge,
        _ => StatusCode::BadRequest,
    }
}
