use hg_core::ID;
use hg_session::ErrorKind;
use hg_session::Game;
use hg_session::SessionError;

/// Why a table refused or failed an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The session rejected the operation; nothing changed.
    Rejected(SessionError),
    /// No stored game has this id.
    NotFound(ID<Game>),
    /// The repository failed; nothing changed locally and the call may be retried.
    Unavailable(String),
}

impl TableError {
    /// Classifies a repository error. Rows that decode to nonsense are
    /// corrupt; anything else is a storage failure worth retrying.
    pub fn storage(e: anyhow::Error) -> Self {
        match e.downcast::<SessionError>() {
            Ok(rejection) => {
                log::error!("[table] stored game unreadable: {}", rejection);
                Self::Rejected(rejection)
            }
            Err(e) => {
                log::warn!("[table] repository failure: {:#}", e);
                Self::Unavailable(e.to_string())
            }
        }
    }
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
    /// Kind of the underlying rule violation, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Rejected(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl From<SessionError> for TableError {
    fn from(e: SessionError) -> Self {
        Self::Rejected(e)
    }
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "{}", e),
            Self::NotFound(id) => write!(f, "game {} not found", id),
            Self::Unavailable(reason) => write!(f, "storage unavailable, try again: {}", reason),
        }
    }
}

impl std::error::Error for TableError {}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn only_storage_failures_retry() {
        assert!(TableError::Unavailable("timeout".into()).is_retryable());
        assert!(!TableError::NotFound(ID::default()).is_retryable());
        assert!(!TableError::from(SessionError::Locked).is_retryable());
        assert_eq!(
            TableError::from(SessionError::NonPositiveRebuy(0)).kind(),
            Some(ErrorKind::Validation)
        );
    }
    #[test]
    fn unreadable_rows_are_not_retried() {
        let corrupt = TableError::storage(SessionError::Corrupt("negative time -1".into()).into());
        assert!(matches!(corrupt, TableError::Rejected(SessionError::Corrupt(_))));
        assert!(!corrupt.is_retryable());
        let down = TableError::storage(anyhow::anyhow!("connection refused"));
        assert_eq!(down, TableError::Unavailable("connection refused".into()));
        assert!(down.is_retryable());
    }
}
