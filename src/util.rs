//! Utility functions

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC};

/// Characters escaped in a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Characters left as-is in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Extract header value as string
pub fn header_str(headers: &http::HeaderMap, name: &str) -> Option<String> {
    headers.get(name)?.to_str().ok().map(|s| s.to_string())
}

/// Transaction id of a response, from whichever header the service set
pub fn transaction_id(headers: &http::HeaderMap) -> Option<String> {
    header_str(headers, "x-global-transaction-id").or_else(|| header_str(headers, "x-request-id"))
}

/// Generate a new request ID
pub fn generate_request_id() -> String {
    format!("sdk-{}", uuid::Uuid::new_v4())
}

/// URL encode a path segment
pub fn encode_path(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, PATH_SEGMENT).to_string()
}

/// URL encode a query parameter value
pub fn encode_query(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, QUERY_VALUE).to_string()
}

/// MIME type for an upload, guessed from the file extension
pub fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}

/// Accumulates `key=value` query pairs, skipping unset options
#[derive(Debug, Default)]
pub struct QueryParams {
    parts: Vec<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter that is always present
    pub fn push(&mut self, key: &str, value: impl std::fmt::Display) -> &mut Self {
        self.parts
            .push(format!("{}={}", key, encode_query(&value.to_string())));
        self
    }

    /// Add a parameter only when it has a value
    pub fn push_opt<T: std::fmt::Display>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            let _ = self.push(key, value);
        }
        self
    }

    /// Add a comma-joined list, skipped when empty
    pub fn push_list<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        if !values.is_empty() {
            let joined = values.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
            let _ = self.push(key, joined);
        }
        self
    }

    /// Append the accumulated parameters to a URL
    pub fn apply(&self, url: &mut String) {
        if self.parts.is_empty() {
            return;
        }
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&self.parts.join("&"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("hello world"), "hello%20world");
        assert_eq!(encode_path("test/path"), "test%2Fpath");
        assert_eq!(
            encode_path("e15f6424-f887-4f50-b4ea-68267c36fc9c"),
            "e15f6424-f887-4f50-b4ea-68267c36fc9c"
        );
        assert_eq!(encode_path("my_key.html"), "my_key.html");
    }

    #[test]
    fn test_query_params() {
        let mut params = QueryParams::new();
        let _ = params
            .push("version", "2017-10-16")
            .push_opt("name", Some("my collection"))
            .push_opt::<u32>("count", None)
            .push_list("return", &["extracted_metadata.sha1", "text"])
            .push_list::<&str>("collection_ids", &[]);

        let mut url = "https://host/v1/environments".to_string();
        params.apply(&mut url);
        assert_eq!(
            url,
            "https://host/v1/environments?version=2017-10-16&name=my%20collection&return=extracted_metadata.sha1%2Ctext"
        );
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("simple.html"), "text/html");
        assert_eq!(guess_content_type("REPORT.PDF"), "application/pdf");
        assert_eq!(guess_content_type("data.json"), "application/json");
        assert_eq!(guess_content_type("noext"), "application/octet-stream");
    }

    #[test]
    fn test_filter_value_is_escaped() {
        assert_eq!(
            encode_query("extracted_metadata.sha1::9181d244*"),
            "extracted_metadata.sha1%3A%3A9181d244%2A"
        );
    }

    #[test]
    fn test_transaction_id_prefers_global_header() {
        let mut headers = http::HeaderMap::new();
        let _ = headers.insert("x-request-id", http::HeaderValue::from_static("req-1"));
        assert_eq!(transaction_id(&headers), Some("req-1".to_string()));

        let _ = headers.insert(
            "x-global-transaction-id",
            http::HeaderValue::from_static("txn-9"),
        );
        assert_eq!(transaction_id(&headers), Some("txn-9".to_string()));
    }

    proptest! {
        #[test]
        fn encoded_segment_never_contains_separators(s in "\\PC*") {
            let encoded = encode_path(&s);
            prop_assert!(!encoded.contains('/'));
            prop_assert!(!encoded.contains('?'));
            prop_assert!(!encoded.contains('#'));
        }

        #[test]
        fn encoded_query_round_trips(s in "\\PC*") {
            let encoded = encode_query(&s);
            let decoded = percent_encoding::percent_decode_str(&encoded).decode_utf8().unwrap();
            prop_assert_eq!(decoded, s);
        }
    }
}
