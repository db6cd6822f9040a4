//! Shared utility functions for the application

use crate::error::{Result, TasklingError};

/// Sanitize a string value for safe use in HTTP headers
///
/// Header values cannot contain control characters, DEL, null bytes, or
/// line breaks.
pub fn sanitize_for_header(value: &str, field_name: &str) -> Result<String> {
    if value.is_empty() {
        return Err(TasklingError::InvalidConfig {
            message: format!("{} cannot be empty", field_name),
        });
    }

    for (index, ch) in value.char_indices() {
        let byte = ch as u8;
        if byte <= 0x1F || byte == 0x7F || ch == '\0' || ch == '\r' || ch == '\n' {
            return Err(TasklingError::InvalidConfig {
                message: format!(
                    "{} contains invalid character at position {} (byte value: {:#04x})",
                    field_name, index, byte
                ),
            });
        }
    }

    Ok(value.to_string())
}

/// Validate an API key can be used in an Authorization header
pub fn validate_api_key(api_key: &str) -> Result<String> {
    let trimmed = api_key.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Err(TasklingError::InvalidConfig {
            message: "API key is empty or set to 'none'".to_string(),
        });
    }

    sanitize_for_header(trimmed, "API key")
}

/// Sanitize a base URL for API requests
///
/// Strips trailing slashes and a trailing `/chat/completions` so endpoint
/// paths can be appended uniformly.
pub fn sanitize_base_url(base_url: &str) -> String {
    let mut url = base_url.trim().trim_end_matches('/').to_string();
    if let Some(stripped) = url.strip_suffix("/chat/completions") {
        url = stripped.to_string();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_base_url() {
        assert_eq!(
            sanitize_base_url("http://localhost:11434/v1/"),
            "http://localhost:11434/v1"
        );
        assert_eq!(
            sanitize_base_url("http://localhost:11434/v1/chat/completions"),
            "http://localhost:11434/v1"
        );
    }

    #[test]
    fn test_validate_api_key_rejects_newlines() {
        assert!(validate_api_key("abc\ndef").is_err());
        assert!(validate_api_key("none").is_err());
        assert_eq!(validate_api_key(" sk-test ").unwrap(), "sk-test");
    }
}
