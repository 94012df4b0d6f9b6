use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivicError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("not authorized")]
    Unauthorized,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("complaint '{0}' not found")]
    ComplaintNotFound(String),

    #[error("another update for complaint '{0}' is still in flight")]
    MutationInFlight(String),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid role '{0}'")]
    InvalidRole(String),

    #[error("invalid view '{0}'")]
    InvalidView(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("draft is not ready to submit: missing {0}")]
    IncompleteDraft(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, CivicError>;

impl CivicError {
    /// Build the error for a transition the lifecycle graph does not allow.
    pub fn invalid_transition(
        from: crate::types::ComplaintStatus,
        to: crate::types::ComplaintStatus,
    ) -> Self {
        CivicError::InvalidTransition(format!("cannot move complaint from {from} to {to}"))
    }

    /// Whether a failed operation is eligible for the pending queue's
    /// retry-on-next-sync behavior. Validation and transition rejections
    /// need user or code changes and must never be retried automatically.
    pub fn is_transient(&self) -> bool {
        matches!(self, CivicError::Network(_) | CivicError::Unavailable(_))
    }
}

/// Coarse classification of a `CivicError`, cloneable for UI snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InvalidTransition,
    Unauthorized,
    Network,
    NotFound,
    Storage,
    Other,
}

/// The single last-error value surfaced to the presentation layer.
///
/// `CivicError` owns non-cloneable sources (io, reqwest), so the store keeps
/// this flattened copy instead. Set on every failed mutation or fetch,
/// cleared by the next operation that settles successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&CivicError> for LastError {
    fn from(err: &CivicError) -> Self {
        let kind = match err {
            CivicError::Validation(_)
            | CivicError::UnknownCategory(_)
            | CivicError::IncompleteDraft(_) => ErrorKind::Validation,
            CivicError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            CivicError::Unauthorized => ErrorKind::Unauthorized,
            CivicError::Network(_) | CivicError::Unavailable(_) => ErrorKind::Network,
            CivicError::ComplaintNotFound(_) => ErrorKind::NotFound,
            CivicError::Io(_) | CivicError::Json(_) | CivicError::Yaml(_) => ErrorKind::Storage,
            _ => ErrorKind::Other,
        };
        LastError {
            kind,
            message: err.to_string(),
        }
    }
}
