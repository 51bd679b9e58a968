use crate::passages::PassageError;

/// Top-level error for controller and application operations
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Login was attempted with a blank username
    #[error("Username cannot be empty")]
    EmptyUsername,

    /// A session operation was requested before login
    #[error("Please log in first")]
    NotLoggedIn,

    /// The passage collection for a tier could not be used
    #[error("Passage configuration error: {0}")]
    Passage(#[from] PassageError),

    /// The score store failed; the request is abandoned and not retried
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Rejections the user can correct on the spot, as opposed to faults
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::EmptyUsername | AppError::NotLoggedIn)
    }
}

pub type AppResult<T> = Result<T, AppError>;
