use thiserror::Error;

#[derive(Debug, Error)]
pub enum KithError {
    #[error("{field} cannot be blank")]
    BlankField { field: String },

    #[error("{field} must be positive")]
    NonPositive { field: String },

    #[error("{field} cannot be empty")]
    EmptySet { field: String },

    #[error("{field} is invalid: {reason}")]
    Invalid { field: String, reason: String },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{entity_type} already exists: {identifier}")]
    AlreadyExists {
        entity_type: String,
        identifier: String,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Upstream service failed: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl KithError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        KithError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        KithError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The offending field for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            KithError::BlankField { field }
            | KithError::NonPositive { field }
            | KithError::EmptySet { field }
            | KithError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type KithResult<T> = Result<T, KithError>;
