use thiserror::Error;

/// Terminal failure of the upload stage. There is no partial success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Network-level failure before any response arrived.
    #[error("network error during upload: {0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error("upload rejected with http status {status}")]
    Rejected { status: u16, body: String },
    /// 2xx response whose body carried no usable job id.
    #[error("malformed upload response: {0}")]
    MalformedResponse(String),
    #[error("invalid upload url: {0}")]
    InvalidUrl(String),
}

/// Terminal failure of the status stream. The stream is never reopened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The push channel failed after being opened.
    #[error("status stream transport error: {0}")]
    Transport(String),
    #[error("status stream rejected with http status {status}")]
    Rejected { status: u16 },
    #[error("malformed status payload: {0}")]
    MalformedPayload(String),
    /// The backend sent an explicit error frame instead of a snapshot.
    #[error("server reported: {0}")]
    Server(String),
    #[error("status stream ended before the job finished")]
    EndedEarly,
    #[error("invalid status url: {0}")]
    InvalidUrl(String),
}
