use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Discord(#[from] serenity::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
