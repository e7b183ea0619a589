use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or undersized input.
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Insufficient data: got {points} points but at least 3 are needed")]
    InsufficientData { points: usize },

    /// A character with no Braille cell.
    #[error("Unsupported character {character:?} at position {position}")]
    UnsupportedCharacter { character: char, position: usize },

    #[error("Mesh has no triangles")]
    EmptyMesh,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InputValidation(message.into())
    }
}
