use mote::http::parser::{ParseError, find_headers_end, parse_head};

#[test]
fn test_parse_simple_get_request() {
    let head = parse_head(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();

    assert_eq!(head.method, "GET");
    assert_eq!(head.path, "/");
    assert_eq!(head.version, "HTTP/1.1");
    assert_eq!(head.headers.get("Host").unwrap(), "example.com");
}

#[test]
fn test_parse_multiple_headers() {
    let head = parse_head(
        b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n",
    )
    .unwrap();

    assert_eq!(head.headers.len(), 3);
    assert_eq!(head.headers.get("User-Agent").unwrap(), "test-client");
    assert_eq!(head.headers.get("Accept").unwrap(), "*/*");
}

#[test]
fn test_parse_keeps_method_and_path_case() {
    let head = parse_head(b"get /Index.HTML HTTP/1.1\r\n\r\n").unwrap();

    assert_eq!(head.method, "get");
    assert_eq!(head.path, "/Index.HTML");
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let head = parse_head(b"GET /search?q=rust HTTP/1.1\r\n\r\n").unwrap();

    assert_eq!(head.path, "/search?q=rust");
}

#[test]
fn test_parse_skips_leading_empty_lines() {
    let head = parse_head(b"\r\n\r\nGET / HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();

    assert_eq!(head.method, "GET");
    assert_eq!(head.headers.get("Host").unwrap(), "a");
}

#[test]
fn test_parse_header_case_preservation() {
    let head = parse_head(b"GET / HTTP/1.1\r\nContent-Type: application/json\r\n\r\n").unwrap();

    assert!(head.headers.contains_key("Content-Type"));
    assert!(!head.headers.contains_key("content-type"));
    assert_eq!(head.header("content-type"), Some("application/json"));
}

#[test]
fn test_parse_request_line_with_two_tokens() {
    let result = parse_head(b"GET /\r\n\r\n");

    assert_eq!(result, Err(ParseError::InvalidRequestLine("GET /".to_string())));
}

#[test]
fn test_parse_request_line_with_four_tokens() {
    let result = parse_head(b"GET / HTTP/1.1 extra\r\n\r\n");

    assert!(matches!(result, Err(ParseError::InvalidRequestLine(_))));
}

#[test]
fn test_parse_empty_head() {
    assert_eq!(parse_head(b"\r\n\r\n"), Err(ParseError::EmptyRequest));
}

#[test]
fn test_parse_malformed_header() {
    let result = parse_head(b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n");

    assert_eq!(result, Err(ParseError::InvalidHeader("BrokenHeader".to_string())));
}

#[test]
fn test_parse_header_needs_space_after_colon() {
    let result = parse_head(b"GET / HTTP/1.1\r\nHost:example.com\r\n\r\n");

    assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
}

#[test]
fn test_parse_invalid_utf8() {
    let result = parse_head(b"GET /\xff HTTP/1.1\r\n\r\n");

    assert_eq!(result, Err(ParseError::InvalidEncoding));
}

#[test]
fn test_content_length() {
    let head = parse_head(b"POST / HTTP/1.1\r\ncontent-length: 12\r\n\r\n").unwrap();
    assert_eq!(head.content_length(), Ok(Some(12)));

    let head = parse_head(b"POST / HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(head.content_length(), Ok(None));

    let head = parse_head(b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n").unwrap();
    assert_eq!(
        head.content_length(),
        Err(ParseError::InvalidContentLength("lots".to_string()))
    );
}

#[test]
fn test_json_content_type_detection() {
    let head = parse_head(b"POST / HTTP/1.1\r\nContent-Type: application/json\r\n\r\n").unwrap();
    assert!(head.is_json());

    let head = parse_head(b"POST / HTTP/1.1\r\nContent-Type: text/plain\r\n\r\n").unwrap();
    assert!(!head.is_json());

    let head = parse_head(b"POST / HTTP/1.1\r\n\r\n").unwrap();
    assert!(!head.is_json());
}

#[test]
fn test_find_headers_end() {
    assert_eq!(find_headers_end(b"\r\n\r\n"), Some(0));
    assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\n\r"), None);
}
