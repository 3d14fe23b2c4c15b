//! Small text and time helpers.

/// Longest error body echoed back to the user.
const MAX_ERROR_CHARS: usize = 180;

/// Trimmed value, or `None` when absent or blank.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

/// Trim and cap a server response body for use in an error message.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(MAX_ERROR_CHARS).collect()
}

/// Seconds since the Unix epoch.
pub fn unix_timestamp_now() -> i64 {
    chrono::Utc::now().timestamp()
}
