use thiserror::Error;

/// Transport-level failures. Any of these aborts pagination; records
/// yielded before the failure are preserved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
}

impl FetchError {
    /// Rate-limit / forbidden responses, reported separately from other
    /// transport failures.
    pub fn is_blocked(&self) -> bool {
        matches!(self, FetchError::Status(s) if s.as_u16() == 403 || s.as_u16() == 429)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn blocked_statuses_are_classified() {
        assert!(FetchError::Status(StatusCode::FORBIDDEN).is_blocked());
        assert!(FetchError::Status(StatusCode::TOO_MANY_REQUESTS).is_blocked());
        assert!(!FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR).is_blocked());
        assert!(!FetchError::Status(StatusCode::NOT_FOUND).is_blocked());
    }
}
