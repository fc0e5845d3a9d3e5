use thiserror::Error;

/// Everything the storage and parsing layers can report back to the UI.
///
/// None of these are fatal; the sidecar maps each variant to an error code
/// and keeps serving requests.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("parameter '{name}' already exists for age group '{age_group}'")]
    DuplicateKey { name: String, age_group: String },

    #[error("parameter '{name}' for age group '{age_group}' not found")]
    NotFound { name: String, age_group: String },

    #[error("import parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn duplicate(name: &str, age_group: &str) -> Self {
        Self::DuplicateKey {
            name: name.to_string(),
            age_group: age_group.to_string(),
        }
    }

    pub fn not_found(name: &str, age_group: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
            age_group: age_group.to_string(),
        }
    }

    /// Stable code used on the IPC wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_failed",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::NotFound { .. } => "not_found",
            Self::Parse(_) => "parse_failed",
            Self::Io(_) => "io_failed",
            Self::Db(_) => "db_failed",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
