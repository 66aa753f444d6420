use bytes::Bytes;

use crate::http::writer::ResponseWriter;

/// HTTP status codes the server answers with.
///
/// - `Ok` (200): static content found
/// - `BadRequest` (400): malformed request
/// - `NotFound` (404): nothing under the document root
/// - `MethodNotAllowed` (405): anything but GET or HEAD
/// - `PayloadTooLarge` (413): request body over the configured limit
/// - `HeaderFieldsTooLarge` (431): request head over the configured limit
/// - `InternalServerError` (500): content could not be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 413 Payload Too Large
    PayloadTooLarge,
    /// 431 Request Header Fields Too Large
    HeaderFieldsTooLarge,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use outflow::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::HeaderFieldsTooLarge => 431,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::HeaderFieldsTooLarge => "Request Header Fields Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Builder for responses that are not backed by a cached file.
///
/// Header lines keep insertion order. `Content-Length` is appended on
/// [`build`](ResponseBuilder::build) unless one was given.
///
/// ```ignore
/// let writer = ResponseBuilder::new(StatusCode::MethodNotAllowed)
///     .header("Allow", "GET, HEAD")
///     .body("405 Method Not Allowed")
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    header_lines: Vec<String>,
    body: Bytes,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            header_lines: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Plain-text page for an error status, e.g. `404 Not Found`.
    pub fn error(status: StatusCode) -> Self {
        let text = format!("{} {}", status.as_u16(), status.reason_phrase());
        Self::new(status)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(text)
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.header_lines.push(format!("{}: {}", key, value));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header_lines(&self) -> &[String] {
        &self.header_lines
    }

    pub fn build<T, W>(mut self) -> ResponseWriter<T, W> {
        let has_length = self
            .header_lines
            .iter()
            .any(|line| line.to_ascii_lowercase().starts_with("content-length:"));

        if !has_length {
            self.header_lines
                .push(format!("Content-Length: {}", self.body.len()));
        }

        ResponseWriter::with_status(self.status, self.body, self.header_lines)
    }
}
