//! Network data captured for one fetched resource.
//!
//! Connectors produce one [`NetworkData`] per fetch and attach it to the
//! `fetch::end::<kind>` event. Header lookup is case-insensitive; keys are
//! stored lowercased.

use crate::types::MediaKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// HTTP-style header map with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// Create an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, lowercasing the name. Replaces any previous value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Look up a header value, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Whether a header is present, case-insensitively.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterate over (lowercased name, value) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>, V: Into<String>> FromIterator<(S, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (S, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// The request half of a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Requested URL
    pub url: String,
    /// Request headers sent
    pub headers: Headers,
}

impl Request {
    /// Create a request with no headers.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Headers::new(),
        }
    }
}

/// Decoded response body plus its raw size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    /// Body decoded as text (lossy for non-UTF-8 content)
    pub content: String,
    /// Size in bytes before decoding
    pub raw_byte_len: usize,
}

impl ResponseBody {
    /// Build a body from raw bytes, decoding lossily.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            content: String::from_utf8_lossy(bytes).into_owned(),
            raw_byte_len: bytes.len(),
        }
    }

    /// Build a body from already-decoded text.
    #[must_use]
    pub fn from_text(content: impl Into<String>) -> Self {
        let content = content.into();
        let raw_byte_len = content.len();
        Self {
            content,
            raw_byte_len,
        }
    }
}

/// The response half of a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code (local files report 200)
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Decoded body
    pub body: ResponseBody,
    /// Classified content kind
    pub media_kind: MediaKind,
}

/// Everything captured about one fetched resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkData {
    /// The resource URL as originally requested
    pub resource: String,
    /// Request half
    pub request: Request,
    /// Response half
    pub response: Response,
}

impl NetworkData {
    /// Classified kind of the fetched content.
    #[must_use]
    pub fn media_kind(&self) -> MediaKind {
        self.response.media_kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/html");
        headers.insert("X-Powered-By", "PHP/8.2");

        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(headers.get("x-powered-by"), Some("PHP/8.2"));
        assert!(headers.contains("X-POWERED-BY"));
        assert!(!headers.contains("server"));
    }

    #[test]
    fn test_headers_insert_replaces() {
        let mut headers = Headers::new();
        headers.insert("Cache-Control", "no-cache");
        headers.insert("cache-control", "max-age=3600");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("cache-control"), Some("max-age=3600"));
    }

    #[test]
    fn test_headers_from_iter() {
        let headers: Headers = [("Server", "nginx"), ("Content-Length", "42")]
            .into_iter()
            .collect();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("server"), Some("nginx"));
    }

    #[test]
    fn test_response_body_from_bytes() {
        let body = ResponseBody::from_bytes(b"<html></html>");
        assert_eq!(body.content, "<html></html>");
        assert_eq!(body.raw_byte_len, 13);
    }

    #[test]
    fn test_response_body_lossy_decode() {
        let body = ResponseBody::from_bytes(&[0x68, 0x69, 0xFF]);
        assert_eq!(body.raw_byte_len, 3);
        assert!(body.content.starts_with("hi"));
    }

    #[test]
    fn test_network_data_serialization() {
        let data = NetworkData {
            resource: "https://example.com/style.css".to_string(),
            request: Request::new("https://example.com/style.css"),
            response: Response {
                url: "https://example.com/style.css".to_string(),
                status: 200,
                headers: [("content-type", "text/css")].into_iter().collect(),
                body: ResponseBody::from_text("body { margin: 0 }"),
                media_kind: MediaKind::Css,
            },
        };

        let json = serde_json::to_string(&data).expect("serialize network data");
        let parsed: NetworkData = serde_json::from_str(&json).expect("deserialize network data");
        assert_eq!(parsed, data);
        assert_eq!(parsed.media_kind(), MediaKind::Css);
    }
}
