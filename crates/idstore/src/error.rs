use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Source read error: {0}")]
    SourceRead(String),

    #[error("Identity cache is not initialized")]
    NotInitialized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Ambiguous credential validator for {credential} and {store}")]
    AmbiguousValidator { credential: String, store: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn source_read(msg: impl Into<String>) -> Self {
        Self::SourceRead(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    #[must_use]
    pub const fn is_source_read(&self) -> bool {
        matches!(self, Self::SourceRead(_))
    }

    #[must_use]
    pub const fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized)
    }

    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    #[must_use]
    pub const fn is_ambiguous_validator(&self) -> bool {
        matches!(self, Self::AmbiguousValidator { .. })
    }

    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::SourceRead(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
