/// Errors surfaced by any client operation.
///
/// Every failure is reported exactly once through the call that caused it;
/// nothing in this crate retries, logs-and-swallows, or downgrades an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection-level failure below the HTTP layer (socket, TLS, DNS).
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The daemon answered with a status code the endpoint's table maps to
    /// an error reason.
    #[error("{reason} (status {code})")]
    Status { code: u16, reason: &'static str },

    /// The daemon answered with a status code absent from the endpoint's
    /// table. Never treated as success, even when numerically close to an
    /// accepted code.
    #[error("unexpected status {code} from daemon: {body}")]
    UnmappedStatus { code: u16, body: String },

    /// A buffered response body failed JSON decoding.
    #[error("failed to decode daemon response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A live byte stream failed mid-transfer.
    #[error("stream interrupted: {0}")]
    Stream(String),
}

impl Error {
    /// Wrap an arbitrary connection-level failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Transport(err.into())
    }

    /// True when the daemon reported the target entity as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { code: 404, .. })
    }

    /// True when the daemon rejected the operation as conflicting with the
    /// entity's current state (already paused, still running, ...).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Status { code: 409, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn not_found_only_matches_mapped_404() {
        let missing = Error::Status {
            code: 404,
            reason: "no such container",
        };
        assert!(missing.is_not_found());

        let unmapped = Error::UnmappedStatus {
            code: 404,
            body: String::new(),
        };
        assert!(!unmapped.is_not_found());
    }

    #[test]
    fn display_carries_reason_and_code() {
        let err = Error::Status {
            code: 409,
            reason: "container already paused",
        };
        assert_eq!(err.to_string(), "container already paused (status 409)");
    }
}
