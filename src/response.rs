//! PDF response construction
//!
//! Terminal sinks that wrap rendered bytes in an HTTP response. The
//! `filename` parameter carries an ASCII-safe fallback for clients without
//! extended-encoding support; when the requested name needs more than
//! ASCII, the original is retained in an RFC 5987 `filename*` parameter.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Attachment response: forces a save dialog, advertises the byte count
pub fn download(bytes: Vec<u8>, filename: &str) -> Response {
    let length = bytes.len().to_string();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_LENGTH, length),
            (header::CONTENT_DISPOSITION, disposition("attachment", filename)),
        ],
        bytes,
    )
        .into_response()
}

/// Inline response: lets the client display the document, streaming-friendly
/// (no explicit content-length)
pub fn stream(bytes: Vec<u8>, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition("inline", filename)),
        ],
        bytes,
    )
        .into_response()
}

fn disposition(kind: &str, filename: &str) -> String {
    let fallback = ascii_fallback(filename);
    let mut value = format!("{kind}; filename=\"{fallback}\"");
    if fallback != filename {
        value.push_str(&format!(
            "; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        ));
    }
    value
}

/// ASCII-safe fallback filename
///
/// Percent signs are stripped (clients unquote them inconsistently), quote
/// and backslash would break the quoted-string, and anything outside
/// printable ASCII is transliterated to `_`.
fn ascii_fallback(filename: &str) -> String {
    filename
        .chars()
        .filter_map(|c| match c {
            '%' | '"' | '\\' => None,
            c if c.is_ascii_graphic() || c == ' ' => Some(c),
            _ => Some('_'),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
        response.headers().get(name).map(|v| v.to_str().unwrap())
    }

    #[test]
    fn test_download_strips_percent_from_fallback() {
        let response = download(b"%PDF".to_vec(), "invoice%2024.pdf");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_str(&response, header::CONTENT_TYPE),
            Some("application/pdf")
        );
        assert_eq!(header_str(&response, header::CONTENT_LENGTH), Some("4"));
        assert_eq!(
            header_str(&response, header::CONTENT_DISPOSITION),
            Some("attachment; filename=\"invoice2024.pdf\"; filename*=UTF-8''invoice%252024.pdf")
        );
    }

    #[test]
    fn test_ascii_name_has_no_extended_parameter() {
        let response = download(b"%PDF".to_vec(), "report.pdf");
        assert_eq!(
            header_str(&response, header::CONTENT_DISPOSITION),
            Some("attachment; filename=\"report.pdf\"")
        );
    }

    #[test]
    fn test_non_ascii_name_is_transliterated() {
        let value = disposition("attachment", "фактура.pdf");
        assert!(value.starts_with("attachment; filename=\"_______.pdf\""));
        assert!(value.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_stream_is_inline_without_length() {
        let response = stream(b"%PDF".to_vec(), "report.pdf");

        assert_eq!(
            header_str(&response, header::CONTENT_DISPOSITION),
            Some("inline; filename=\"report.pdf\"")
        );
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
    }
}
