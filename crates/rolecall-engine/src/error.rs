//! Error taxonomy returned by every engine operation.

use rolecall_notify::NotifyError;
use rolecall_storage::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced synchronously to the caller. None are retried internally.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input: empty title, non-positive amount, missing message.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown or retired role, unknown invitation or member.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate invitation, or the role already has a selected candidate.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The invitation's current status forbids the transition.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Coarse classification collaborators branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    InvalidState,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::NotFound(_) | EngineError::Notify(NotifyError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            EngineError::Conflict(_) => ErrorKind::Conflict,
            EngineError::InvalidState(_) => ErrorKind::InvalidState,
            EngineError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Text a collaborator can show next to the action that failed.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Validation(msg) | EngineError::InvalidState(msg) => msg.clone(),
            EngineError::NotFound(_) | EngineError::Notify(_) => {
                "This item is no longer available.".to_string()
            }
            EngineError::Conflict(msg) if msg.contains("already filled") => {
                "This role has already been filled by another candidate.".to_string()
            }
            EngineError::Conflict(msg) => msg.clone(),
            EngineError::Store(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Map a store lookup failure to `NotFound` with context, keeping other
/// failures as store errors.
pub(crate) fn lookup_error(
    what: &'static str,
    id: impl std::fmt::Display,
) -> impl FnOnce(StoreError) -> EngineError {
    move |err| match err {
        StoreError::NotFound => EngineError::NotFound(format!("{} {}", what, id)),
        other => EngineError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolecall_notify::NotificationId;

    #[test]
    fn kinds() {
        assert_eq!(
            EngineError::Validation("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(EngineError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(EngineError::Conflict("x".into()).kind(), ErrorKind::Conflict);
        assert_eq!(
            EngineError::InvalidState("x".into()).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            EngineError::Store(StoreError::Backend("down".into())).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            EngineError::Notify(NotifyError::NotFound(NotificationId::new())).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn user_messages() {
        assert_eq!(
            EngineError::NotFound("role 1".into()).user_message(),
            "This item is no longer available."
        );
        assert_eq!(
            EngineError::Conflict("role 'Lead' is already filled".into()).user_message(),
            "This role has already been filled by another candidate."
        );
        assert_eq!(
            EngineError::Validation("title must not be empty".into()).user_message(),
            "title must not be empty"
        );
    }

    #[test]
    fn lookup_error_maps_not_found_only() {
        let err = lookup_error("role", 7)(StoreError::NotFound);
        assert!(matches!(err, EngineError::NotFound(ref m) if m == "role 7"));

        let err = lookup_error("role", 7)(StoreError::Backend("io".into()));
        assert!(matches!(err, EngineError::Store(StoreError::Backend(_))));
    }
}
