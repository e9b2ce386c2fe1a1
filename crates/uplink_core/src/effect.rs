use crate::{JobHandle, UploadRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartUpload(UploadRequest),
    OpenStatusStream(JobHandle),
    CloseStatusStream { job_id: String, reason: CloseReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Every task reached a terminal status.
    Done,
    /// The stream failed; no reconnect follows.
    Errored,
    /// Torn down from outside, or superseded by a new upload.
    Cancelled,
}
