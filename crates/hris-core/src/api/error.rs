//! Failures of HRIS backend calls.
//!
//! The backend signals problems through the HTTP status; the body is usually
//! a short plain-text or JSON message and is kept, truncated, for display.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 403: signed in, but the account lacks the module permission.
    #[error("HRIS denied access: {0}")]
    AccessDenied(String),

    /// 401: the token expired or was never accepted.
    #[error("HRIS session expired, run `hris login` again")]
    Unauthorized,

    #[error("HRIS endpoint not found: {0}")]
    NotFound(String),

    /// 429 after every retry was spent.
    #[error("HRIS is throttling requests (HTTP 429)")]
    RateLimited,

    #[error("HRIS server failure: {0}")]
    ServerError(String),

    #[error("Cannot reach the HRIS backend: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Any other status, or a body that does not match the expected shape.
    #[error("Unexpected HRIS response: {0}")]
    InvalidResponse(String),
}

/// Bytes of a response body kept in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Cut a response body down for error messages. Cuts on a char boundary;
    /// the backend answers with Vietnamese text often enough.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "no"),
            ApiError::AccessDenied(body) if body == "no"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "gone"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "bad hash");
        assert_eq!(err.to_string(), "Unexpected HRIS response: Status 400 Bad Request: bad hash");
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(2_000);
        let ApiError::ServerError(message) = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body)
        else {
            panic!("expected a server error");
        };
        assert!(message.starts_with(&"x".repeat(500)));
        assert!(message.ends_with("... (truncated, 2000 total bytes)"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 'ệ' is three bytes; 167 of them straddle the 500-byte cut.
        let body = "ệ".repeat(200);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"ệ".repeat(166)));
        assert!(!truncated.starts_with(&"ệ".repeat(167)));
    }
}
