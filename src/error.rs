/// Error types for credential keeper operations
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    #[error("failed to save config: {0}")]
    ConfigSave(String),

    #[error("no refresh token, run the `new` flow first")]
    NoRefreshToken,

    #[error("cannot read authorization code: {0}")]
    AuthorizationInput(String),

    #[error("token endpoint error: {code}, {description}")]
    TokenEndpoint { code: String, description: String },

    #[error("token endpoint returned an empty access token")]
    EmptyToken,

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{name}: {source}")]
    Site { name: String, source: Box<Error> },
}

pub type Result<T> = std::result::Result<T, Error>;
