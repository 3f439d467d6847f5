use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryError {
    TableNotFound(i64),
    EmptyName,
    DuplicateName(String),
    Storage(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::TableNotFound(id) => write!(f, "table {id} not found"),
            RepositoryError::EmptyName => write!(f, "table name is empty"),
            RepositoryError::DuplicateName(name) => write!(f, "table name '{name}' already exists"),
            RepositoryError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}

/// Failure of a background table load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Repository(RepositoryError),
    /// The loader thread ended without sending a result.
    Interrupted,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Repository(e) => write!(f, "load failed: {e}"),
            LoadError::Interrupted => write!(f, "load interrupted"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Repository(e) => Some(e),
            LoadError::Interrupted => None,
        }
    }
}

impl From<RepositoryError> for LoadError {
    fn from(e: RepositoryError) -> Self {
        LoadError::Repository(e)
    }
}
