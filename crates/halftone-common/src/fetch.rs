//! Resource fetching for linked stylesheets and images.
//!
//! Consolidates the three ways a document references external bytes —
//! `http(s)` URLs, `data:` URIs, and local file paths — behind a pair of
//! blocking helpers. Callers treat every failure as a missing resource
//! and degrade (empty stylesheet, placeholder image); nothing here is
//! allowed to abort a render.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = "halftone/0.1 (offline renderer)";

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to obtain the bytes behind a URI.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request could not be built or sent, or returned non-2xx.
    #[error("http fetch failed: {0}")]
    Http(String),
    /// The `data:` URI was malformed or its payload failed to decode.
    #[error("bad data URI: {0}")]
    DataUri(String),
    /// A local path could not be read.
    #[error("file read failed: {0}")]
    File(#[from] std::io::Error),
    /// The bytes were not valid UTF-8 where text was required.
    #[error("response was not valid UTF-8")]
    Encoding,
}

/// Fetch the raw bytes behind a URI (`http(s)`, `data:`, or a file path).
///
/// # Errors
///
/// Returns a [`FetchError`] if the transport fails; callers are expected
/// to substitute a fallback resource rather than propagate.
pub fn fetch_bytes(uri: &str) -> Result<Vec<u8>, FetchError> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        fetch_http_bytes(uri)
    } else if uri.starts_with("data:") {
        fetch_data_uri(uri)
    } else {
        Ok(std::fs::read(uri)?)
    }
}

/// Fetch a URI and decode the body as UTF-8 text.
///
/// # Errors
///
/// Returns a [`FetchError`] on transport failure or non-UTF-8 content.
pub fn fetch_text(uri: &str) -> Result<String, FetchError> {
    let bytes = fetch_bytes(uri)?;
    String::from_utf8(bytes).map_err(|_| FetchError::Encoding)
}

/// Perform a blocking HTTP GET and return the body bytes.
fn fetch_http_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| FetchError::Http(format!("failed to create client: {e}")))?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(|e| FetchError::Http(format!("request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(FetchError::Http(format!("HTTP {}", response.status())));
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| FetchError::Http(format!("failed to read body: {e}")))
}

/// Decode a `data:` URI into its payload bytes.
///
/// [RFC 2397](https://www.rfc-editor.org/rfc/rfc2397):
/// `data:[<mediatype>][;base64],<data>`
///
/// # Errors
///
/// Returns [`FetchError::DataUri`] when the comma separator is missing or
/// the base64 payload is invalid.
pub fn fetch_data_uri(uri: &str) -> Result<Vec<u8>, FetchError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FetchError::DataUri("missing data: prefix".into()))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FetchError::DataUri("missing ',' separator".into()))?;

    if meta.ends_with(";base64") {
        BASE64
            .decode(payload.trim())
            .map_err(|e| FetchError::DataUri(format!("invalid base64: {e}")))
    } else {
        // Percent-decoded text payload.
        Ok(percent_decode(payload))
    }
}

/// Decode `%XX` escapes in a data-URI text payload. Invalid escapes are
/// passed through literally, matching browser tolerance.
fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = &input[i + 1..i + 3];
            if let Ok(v) = u8::from_str_radix(hex, 16) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_plain_text() {
        let bytes = fetch_data_uri("data:text/css,p%20%7B%20color%3A%20red%20%7D").unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "p { color: red }");
    }

    #[test]
    fn data_uri_base64() {
        // "a{color:red}" base64-encoded
        let bytes = fetch_data_uri("data:text/css;base64,YXtjb2xvcjpyZWR9").unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a{color:red}");
    }

    #[test]
    fn data_uri_without_comma_is_rejected() {
        assert!(fetch_data_uri("data:text/css").is_err());
    }

    #[test]
    fn unescaped_literal_passes_through() {
        let bytes = fetch_data_uri("data:text/css,p{}").unwrap();
        assert_eq!(bytes, b"p{}");
    }
}
