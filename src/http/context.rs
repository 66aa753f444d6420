use crate::http::request::Request;

/// Everything a response writer needs from its connection, handed over once
/// at [`prepare`](crate::http::writer::ResponseWriter::prepare) time.
///
/// `transport` and `watcher` move into the writer for the life of one
/// response; pass `Arc`/`&` handles when the connection keeps using them.
pub struct ResponderContext<'a, T, W> {
    /// Socket the response is written to.
    pub transport: T,
    /// Writability watcher registered for `transport`.
    pub watcher: W,
    /// Tear the connection down after this response.
    pub must_close: bool,
    /// Seconds an idle keep-alive connection stays open.
    pub keep_alive_timeout: u64,
    /// Current time as an HTTP date.
    pub http_date: &'a str,
    /// Value of the `Server` header; `None` or empty leaves it out.
    pub server_token: Option<&'a str>,
    /// The request being answered.
    pub request: &'a Request,
}
