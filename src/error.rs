use thiserror::Error;

use crate::matrix::CellRef;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The backend could not be reached, or the connection failed mid-request.
    #[error("failed to contact backend: {0}")]
    Transport(String),

    /// JSON that could not be produced or understood, e.g. a malformed backend response.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with `{ "error": ... }`. The message is kept verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("cell {cell} is outside the current grid")]
    OutOfBounds { cell: CellRef },

    /// Only produced by the strict coercion policy.
    #[error("invalid cell value {raw:?}")]
    InvalidCell { raw: String },

    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures where no verdict was obtained from the backend at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Json(_))
    }
}
