/// Result type for property-hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the API adapters, storage and store actions
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("You must be logged in to do that")]
    NotLoggedIn,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// True when the server rejected the session credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }
}
