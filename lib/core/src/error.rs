use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A required column is missing, a uid is duplicated or the encoder
    /// configuration is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot fit on an empty corpus")]
    EmptyCorpus,

    #[error("Recommender has not been fitted")]
    NotFitted,

    #[error("Profile not found: {0}")]
    NotFound(String),

    /// A caller-supplied parameter is out of range
    #[error("Invalid parameter: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::EmptyCorpus => "empty_corpus",
            Error::NotFitted => "not_fitted",
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation",
            Error::Internal(_) => "internal",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }
}
