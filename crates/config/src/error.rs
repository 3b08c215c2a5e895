use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("missing required setting: {name}")]
    MissingCredential { name: &'static str },

    #[error("invalid setting: {message}")]
    Invalid { message: String },
}

impl Error {
    #[must_use]
    pub fn missing(name: &'static str) -> Self {
        Self::MissingCredential { name }
    }

    #[must_use]
    pub fn invalid(message: impl std::fmt::Display) -> Self {
        Self::Invalid {
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
