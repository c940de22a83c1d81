//! Error type shared by the three remote services and the combinator that
//! swaps a failed call for its local substitute.

use log::{error, info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0} credentials are not configured")]
    MissingCredentials(&'static str),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("remote returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty response: {0}")]
    Empty(&'static str),
}

/// Coarse grouping used to decide how loudly a fallback is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Expected: the feature simply is not configured.
    MissingCredential,
    /// Transport failure or non-success status.
    Remote,
    /// The remote answered but the payload was unusable.
    Malformed,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::MissingCredentials(_) => FetchErrorKind::MissingCredential,
            FetchError::Transport(_) | FetchError::Status { .. } => FetchErrorKind::Remote,
            FetchError::Malformed(_) | FetchError::Empty(_) => FetchErrorKind::Malformed,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Resolves a best-effort call to a value, logging why the fallback was used.
pub trait Fallback<T> {
    fn or_fallback<F>(self, context: &str, fallback: F) -> T
    where
        F: FnOnce() -> T;
}

impl<T> Fallback<T> for Result<T, FetchError> {
    fn or_fallback<F>(self, context: &str, fallback: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                match err.kind() {
                    FetchErrorKind::MissingCredential => {
                        info!("{context}: {err}; using local fallback")
                    }
                    FetchErrorKind::Remote => error!("{context}: {err}; using local fallback"),
                    FetchErrorKind::Malformed => warn!("{context}: {err}; using local fallback"),
                }
                fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_value_skips_fallback() {
        let result: Result<u32, FetchError> = Ok(7);
        let value = result.or_fallback("test", || panic!("fallback must not run"));
        assert_eq!(value, 7);
    }

    #[test]
    fn every_error_kind_resolves_to_fallback() {
        let errors = vec![
            FetchError::MissingCredentials("photo search"),
            FetchError::Transport("connection refused".into()),
            FetchError::Status {
                status: 503,
                body: "unavailable".into(),
            },
            FetchError::Malformed("expected value".into()),
            FetchError::Empty("no results"),
        ];

        for err in errors {
            let result: Result<&str, FetchError> = Err(err);
            assert_eq!(result.or_fallback("test", || "local"), "local");
        }
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            FetchError::MissingCredentials("x").kind(),
            FetchErrorKind::MissingCredential
        );
        assert_eq!(
            FetchError::Status {
                status: 401,
                body: String::new()
            }
            .kind(),
            FetchErrorKind::Remote
        );
        assert_eq!(FetchError::Empty("x").kind(), FetchErrorKind::Malformed);
    }
}
