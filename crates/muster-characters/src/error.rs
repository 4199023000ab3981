//! Error types for the character registry.

/// Errors that can occur while managing characters.
#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    /// The requested name is empty after sanitizing.
    #[error("invalid character name")]
    InvalidName,

    /// The class name doesn't match any known class.
    #[error("unknown character class: {0}")]
    UnknownClass(String),

    /// A character with this name already exists for the user.
    #[error("character {0} already exists")]
    AlreadyExists(String),

    /// No character with this name exists for the user.
    #[error("character {0} not found")]
    NotFound(String),

    /// Reading or writing save storage failed.
    #[error("save storage error: {0}")]
    Io(#[from] std::io::Error),

    /// The metadata file is unreadable or unwritable as JSON.
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}
