use thiserror::Error;

#[derive(Debug, Error)]
pub enum CombyError {
    #[error("comby spawn error: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("comby io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("comby exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("comby output decode error on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid comby arguments: {0}")]
    InvalidArgs(&'static str),
}

pub type CombyResult<T> = std::result::Result<T, CombyError>;
