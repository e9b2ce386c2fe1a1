use bytes::Bytes;

use crate::StreamError;

pub type TaskId = String;

/// A selected file, immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub content: Bytes,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub bytes_total: u64,
}

impl UploadProgress {
    pub fn new(bytes_sent: u64, bytes_total: u64) -> Self {
        Self {
            bytes_sent: bytes_sent.min(bytes_total),
            bytes_total,
        }
    }

    /// Percent complete in `[0, 100]`, or `None` while the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        if self.bytes_total == 0 {
            return None;
        }
        let sent = self.bytes_sent.min(self.bytes_total);
        Some(sent as f64 / self.bytes_total as f64 * 100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_total > 0 && self.bytes_sent >= self.bytes_total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
    pub original_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// Any status the backend sends that this client does not know. Never terminal.
    Other(String),
}

impl TaskStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "pending" => TaskStatus::Pending,
            "processing" => TaskStatus::Processing,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            other => TaskStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub status: TaskStatus,
    pub download_url: Option<String>,
    pub error: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            name: name.into(),
            status,
            download_url: None,
            error: None,
        }
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The retrieval link, only for completed tasks that carry a non-empty URL.
    pub fn download_link(&self) -> Option<&str> {
        if self.status != TaskStatus::Completed {
            return None;
        }
        self.download_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Full job state as pushed by the server. Replaces any earlier snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSnapshot {
    tasks: Vec<(TaskId, Task)>,
}

impl JobSnapshot {
    /// Tasks keep the order in which they were given.
    pub fn new(tasks: Vec<(TaskId, Task)>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[(TaskId, Task)] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// A job is done when it has tasks and all of them are terminal.
    /// An empty snapshot is treated as a transient frame, not as done.
    pub fn is_done(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|(_, task)| task.status.is_terminal())
    }

    pub fn count_where(&self, pred: impl Fn(&TaskStatus) -> bool) -> usize {
        self.tasks.iter().filter(|(_, task)| pred(&task.status)).count()
    }
}

/// How a status stream ended. Exactly one outcome per stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    Done,
    Errored(StreamError),
    Cancelled,
}
