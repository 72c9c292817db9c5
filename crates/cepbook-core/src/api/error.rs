use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("CEP not found: {0}")]
    NotFound(String),

    #[error("Lookup service error: {0}")]
    Transport(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl LookupError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Map a non-success HTTP response to a transport failure.
    /// ViaCEP answers a malformed CEP with 400, which is still a failed
    /// request rather than a "no such record" answer.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        LookupError::Transport(format!("Status {}: {}", status, Self::truncate_body(body)))
    }

    /// True for the "no such CEP" answer, false for every transport problem
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_is_transport() {
        let err = LookupError::from_status(reqwest::StatusCode::BAD_REQUEST, "<html>Bad Request</html>");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn test_from_status_truncates_long_body() {
        let body = "x".repeat(2000);
        let err = LookupError::from_status(reqwest::StatusCode::BAD_GATEWAY, &body);
        let message = err.to_string();
        assert!(message.contains("truncated, 2000 total bytes"));
        assert!(message.len() < 700);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "ã".repeat(400); // 800 bytes
        let truncated = LookupError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
