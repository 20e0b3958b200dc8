use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FileQueryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Query parse error: {0}")]
    QueryParse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FileQueryError {
    /// Returns true when the search root does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, FileQueryError>;
