use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to catalog failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        SourceError::Message(message.into())
    }
}
