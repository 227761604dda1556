use std::collections::HashMap;
use std::fmt;

/// Media type that switches body decoding to JSON.
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Header block is not valid UTF-8
    InvalidEncoding,
    /// Header block contains no request line
    EmptyRequest,
    /// Request line is not `METHOD PATH VERSION`
    InvalidRequestLine(String),
    /// Header line without a `": "` separator
    InvalidHeader(String),
    InvalidContentLength(String),
    /// Body announced as JSON failed to decode
    InvalidJson(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidEncoding => write!(f, "header block is not valid UTF-8"),
            ParseError::EmptyRequest => write!(f, "empty request"),
            ParseError::InvalidRequestLine(line) => write!(f, "invalid request line: {line:?}"),
            ParseError::InvalidHeader(line) => write!(f, "invalid header: {line:?}"),
            ParseError::InvalidContentLength(value) => {
                write!(f, "invalid Content-Length: {value:?}")
            }
            ParseError::InvalidJson(reason) => write!(f, "invalid JSON body: {reason}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Request line and headers of a request, before the body is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    pub method: String,
    pub path: String,
    pub version: String,
    pub headers: HashMap<String, String>,
}

impl Head {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Declared body length, `None` when no `Content-Length` header was sent.
    pub fn content_length(&self) -> Result<Option<usize>, ParseError> {
        self.header("Content-Length")
            .map(|v| {
                v.trim()
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidContentLength(v.to_string()))
            })
            .transpose()
    }

    /// Whether the body must be decoded as JSON. Parameters such as
    /// `charset` are ignored.
    pub fn is_json(&self) -> bool {
        self.header("Content-Type")
            .and_then(|v| v.split(';').next())
            .map(|media| media.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
            .unwrap_or(false)
    }
}

pub(crate) fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Position of the `\r\n\r\n` terminator in `buf`, if any.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Parses a header block (everything up to, and optionally including, the
/// blank line).
pub fn parse_head(buf: &[u8]) -> Result<Head, ParseError> {
    let text = std::str::from_utf8(buf).map_err(|_| ParseError::InvalidEncoding)?;

    let mut lines = text.split("\r\n").filter(|line| !line.is_empty());

    let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let [method, path, version] = parts.as_slice() else {
        return Err(ParseError::InvalidRequestLine(request_line.to_string()));
    };

    let mut headers: HashMap<String, String> = HashMap::new();
    for line in lines {
        let (key, value) = line
            .split_once(": ")
            .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
        // Names differing only in case are one header; the last one wins.
        headers.retain(|name, _| !name.eq_ignore_ascii_case(key));
        headers.insert(key.to_string(), value.to_string());
    }

    Ok(Head {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let head = parse_head(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();

        assert_eq!(head.method, "GET");
        assert_eq!(head.path, "/");
        assert_eq!(head.headers.get("Host").unwrap(), "example.com");
    }

    #[test]
    fn later_duplicate_header_wins() {
        let head = parse_head(b"GET / HTTP/1.1\r\nX-A: 1\r\nX-A: 2\r\n\r\n").unwrap();

        assert_eq!(head.headers.len(), 1);
        assert_eq!(head.headers.get("X-A").unwrap(), "2");
    }

    #[test]
    fn case_variant_duplicates_collapse_to_the_last() {
        for _ in 0..50 {
            let head = parse_head(
                b"POST / HTTP/1.1\r\nContent-Length: 5\r\ncontent-length: 3\r\n\r\n",
            )
            .unwrap();

            assert_eq!(head.headers.len(), 1);
            assert_eq!(head.headers.get("content-length").unwrap(), "3");
            assert_eq!(head.content_length(), Ok(Some(3)));
        }
    }

    #[test]
    fn value_keeps_everything_after_first_separator() {
        let head = parse_head(b"GET / HTTP/1.1\r\nX-Note: a: b\r\n\r\n").unwrap();

        assert_eq!(head.header("x-note"), Some("a: b"));
    }

    #[test]
    fn json_detection_ignores_parameters() {
        let head =
            parse_head(b"POST / HTTP/1.1\r\ncontent-type: Application/JSON; charset=utf-8\r\n\r\n")
                .unwrap();

        assert!(head.is_json());
    }

    #[test]
    fn headers_end_is_found_mid_buffer() {
        assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\n\r\nbody"), Some(14));
        assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\n"), None);
    }
}
