use crate::{JobHandle, JobSnapshot, MonitorOutcome, UploadError, UploadProgress, UploadRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file (browse or drop).
    FileSelected(UploadRequest),
    /// Transport reported more bytes handed off.
    UploadProgress(UploadProgress),
    /// Backend accepted the upload and created a job.
    UploadSucceeded(JobHandle),
    UploadFailed(UploadError),
    /// A full job snapshot arrived on the status stream.
    SnapshotReceived {
        job_id: String,
        snapshot: JobSnapshot,
    },
    /// The status stream for a job has released its connection.
    StreamClosed {
        job_id: String,
        outcome: MonitorOutcome,
    },
    /// Host is shutting down; release anything still open.
    TearDown,
    /// Fallback for placeholder wiring.
    NoOp,
}
