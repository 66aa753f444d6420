use outflow::http::parser::{parse_http_request, parse_with_limits, Limits, ParseError};
use outflow::http::request::Method;

#[test]
fn test_pipelined_requests_parse_one_at_a_time() {
    let mut buf = b"GET /a HTTP/1.1\r\n\r\nHEAD /b HTTP/1.0\r\n\r\nGET /c HTTP/1.1\r\n".to_vec();

    let (first, used) = parse_http_request(&buf).unwrap();
    buf.drain(..used);
    let (second, used) = parse_http_request(&buf).unwrap();
    buf.drain(..used);

    assert_eq!((first.method, first.path.as_str()), (Method::GET, "/a"));
    assert_eq!((second.method, second.path.as_str()), (Method::HEAD, "/b"));
    // Third request has no blank line yet
    assert!(matches!(parse_http_request(&buf), Err(ParseError::Incomplete)));
}

#[test]
fn test_body_is_consumed_before_next_request() {
    let buf = b"POST /form HTTP/1.1\r\ncontent-length: 3\r\n\r\nabcGET / HTTP/1.1\r\n\r\n";

    let (req, used) = parse_http_request(buf).unwrap();

    assert_eq!(req.body, b"abc");
    assert_eq!(&buf[used..], b"GET / HTTP/1.1\r\n\r\n");
}

#[test]
fn test_short_body_waits_for_more() {
    let buf = b"POST /form HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";

    assert!(matches!(parse_http_request(buf), Err(ParseError::Incomplete)));
}

#[test]
fn test_only_http_1x_is_accepted() {
    for version in ["HTTP/2.0", "HTTP/0.9", "http/1.1", "SPDY/3"] {
        let raw = format!("GET / {version}\r\n\r\n");
        assert!(
            matches!(parse_http_request(raw.as_bytes()), Err(ParseError::UnsupportedVersion)),
            "{version} was accepted"
        );
    }
}

#[test]
fn test_request_line_needs_three_tokens() {
    assert!(matches!(
        parse_http_request(b"GET /\r\n\r\n"),
        Err(ParseError::InvalidRequest)
    ));
    assert!(matches!(
        parse_http_request(b"GET / HTTP/1.1 extra\r\n\r\n"),
        Err(ParseError::InvalidRequest)
    ));
}

#[test]
fn test_unknown_method_and_bad_header() {
    assert!(matches!(
        parse_http_request(b"BREW / HTTP/1.1\r\n\r\n"),
        Err(ParseError::InvalidMethod)
    ));
    assert!(matches!(
        parse_http_request(b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n"),
        Err(ParseError::InvalidHeader)
    ));
}

#[test]
fn test_non_numeric_content_length() {
    let buf = b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n";

    assert!(matches!(parse_http_request(buf), Err(ParseError::InvalidContentLength)));
}

#[test]
fn test_content_length_at_usize_max_does_not_overflow() {
    let buf = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", usize::MAX);
    let unlimited = Limits {
        max_body_size: usize::MAX,
        ..Limits::default()
    };

    assert!(matches!(
        parse_with_limits(buf.as_bytes(), &unlimited),
        Err(ParseError::InvalidContentLength)
    ));
    assert!(matches!(
        parse_http_request(buf.as_bytes()),
        Err(ParseError::BodyTooLarge(_))
    ));
}

#[test]
fn test_body_limit_is_checked_before_body_arrives() {
    let limits = Limits {
        max_body_size: 16,
        ..Limits::default()
    };

    let at_limit = b"POST / HTTP/1.1\r\nContent-Length: 16\r\n\r\n";
    assert!(matches!(parse_with_limits(at_limit, &limits), Err(ParseError::Incomplete)));

    let over = b"POST / HTTP/1.1\r\nContent-Length: 17\r\n\r\n";
    assert!(matches!(parse_with_limits(over, &limits), Err(ParseError::BodyTooLarge(16))));
}

#[test]
fn test_head_limit_applies_with_and_without_terminator() {
    let limits = Limits {
        max_head_size: 64,
        ..Limits::default()
    };
    let long_header = format!("GET / HTTP/1.1\r\nX-Filler: {}\r\n", "a".repeat(80));

    // Still unterminated, but already past the limit
    assert!(matches!(
        parse_with_limits(long_header.as_bytes(), &limits),
        Err(ParseError::HeadTooLarge(64))
    ));

    let terminated = format!("{long_header}\r\n");
    assert!(matches!(
        parse_with_limits(terminated.as_bytes(), &limits),
        Err(ParseError::HeadTooLarge(64))
    ));

    // Small unterminated heads keep waiting
    assert!(matches!(
        parse_with_limits(b"GET / HTTP/1.1\r\n", &limits),
        Err(ParseError::Incomplete)
    ));
}
