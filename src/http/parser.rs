use crate::http::request::{Method, Request};
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("invalid request line")]
    InvalidRequest,
    #[error("unknown request method")]
    InvalidMethod,
    #[error("unsupported protocol version")]
    UnsupportedVersion,
    #[error("invalid header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),
    #[error("request incomplete")]
    Incomplete,
}

/// Size caps applied while a request is still being buffered.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Request line plus headers, including the blank line.
    pub max_head_size: usize,
    pub max_body_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_head_size: 8 * 1024,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Parse one HTTP/1.x request from the front of `buf` with default [`Limits`].
///
/// Returns the request and the number of bytes it occupied, so pipelined
/// requests stay in the buffer. `Incomplete` means more bytes are needed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    parse_with_limits(buf, &Limits::default())
}

/// Like [`parse_http_request`], but fails as soon as `buf` shows the request
/// cannot fit in `limits`, instead of asking for more bytes.
pub fn parse_with_limits(buf: &[u8], limits: &Limits) -> Result<(Request, usize), ParseError> {
    let Some(headers_end) = find_headers_end(buf) else {
        if buf.len() > limits.max_head_size {
            return Err(ParseError::HeadTooLarge(limits.max_head_size));
        }
        return Err(ParseError::Incomplete);
    };
    if headers_end + 4 > limits.max_head_size {
        return Err(ParseError::HeadTooLarge(limits.max_head_size));
    }

    let head = std::str::from_utf8(&buf[..headers_end])
        .map_err(|_| ParseError::InvalidRequest)?;
    let body_start = headers_end + 4;

    let mut lines = head.split("\r\n");

    let (method, path, version) = parse_request_line(lines.next().unwrap_or(""))?;

    let mut headers = HashMap::new();
    for line in lines.filter(|line| !line.is_empty()) {
        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let key = key.trim();

        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(ParseError::InvalidHeader);
        }

        headers.insert(key.to_string(), value.trim().to_string());
    }

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        .map(|(_, v)| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?
        .unwrap_or(0);

    if content_length > limits.max_body_size {
        return Err(ParseError::BodyTooLarge(limits.max_body_size));
    }

    let body_end = body_start
        .checked_add(content_length)
        .ok_or(ParseError::InvalidContentLength)?;
    if buf.len() < body_end {
        return Err(ParseError::Incomplete);
    }

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body: buf[body_start..body_end].to_vec(),
    };

    Ok((request, body_end))
}

fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    let mut parts = line.split_whitespace();

    let (Some(method), Some(path), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidRequest);
    };

    let method = Method::from_str(method).ok_or(ParseError::InvalidMethod)?;

    if !matches!(version, "HTTP/1.0" | "HTTP/1.1") {
        return Err(ParseError::UnsupportedVersion);
    }

    Ok((method, path, version))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_head() {
        let req = b"HEAD /index.html HTTP/1.0\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.method, Method::HEAD);
        assert_eq!(parsed.protocol(), "1.0");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn leaves_pipelined_request_in_buffer() {
        let req = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/a");
        assert_eq!(&req[consumed..], b"GET /b HTTP/1.1\r\n\r\n");
    }
}
