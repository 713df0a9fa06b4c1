//! Path segment encoding for name-indexed endpoints.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left untouched when encoding a single path segment. Mirrors the
/// unreserved set browsers use for URI components.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `segment` so it can be appended to a URL path as one segment.
///
/// # Example
/// ```rust
/// use atlas_util::http::encode_path_segment;
///
/// assert_eq!(encode_path_segment("Côte d'Ivoire"), "C%C3%B4te%20d'Ivoire");
/// assert_eq!(encode_path_segment("a/b"), "a%2Fb");
/// ```
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Join a base URL and a relative path without doubling or dropping slashes.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
