use crate::view_model::AppViewModel;
use crate::{JobHandle, JobSnapshot, StreamError, UploadError, UploadProgress};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    InFlight {
        file_name: String,
        progress: UploadProgress,
    },
    Succeeded {
        handle: JobHandle,
    },
    Failed {
        file_name: String,
        error: UploadError,
    },
}

impl UploadState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadState::InFlight { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorPhase {
    Streaming,
    Done,
    Errored(StreamError),
    Cancelled,
}

impl MonitorPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MonitorPhase::Streaming)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobState {
    pub handle: JobHandle,
    pub phase: MonitorPhase,
    pub snapshot: Option<JobSnapshot>,
    pub snapshots_received: usize,
}

impl JobState {
    pub(crate) fn new(handle: JobHandle) -> Self {
        Self {
            handle,
            phase: MonitorPhase::Streaming,
            snapshot: None,
            snapshots_received: 0,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.handle.job_id
    }

    pub fn is_streaming(&self) -> bool {
        self.phase == MonitorPhase::Streaming
    }
}

/// One-shot user-facing notice that does not change the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SelectionRejected { file_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    upload: UploadState,
    job: Option<JobState>,
    notice: Option<Notice>,
    shutting_down: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&self) -> &UploadState {
        &self.upload
    }

    pub fn job(&self) -> Option<&JobState> {
        self.job.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Nothing further will happen without new user input.
    pub fn is_settled(&self) -> bool {
        if self.shutting_down {
            return true;
        }
        match (&self.upload, &self.job) {
            (UploadState::Failed { .. }, _) => true,
            (_, Some(job)) => job.phase.is_terminal(),
            _ => false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_upload(&mut self, upload: UploadState) {
        self.upload = upload;
        self.mark_dirty();
    }

    pub(crate) fn upload_mut(&mut self) -> &mut UploadState {
        &mut self.upload
    }

    pub(crate) fn set_job(&mut self, job: Option<JobState>) {
        self.job = job;
        self.mark_dirty();
    }

    pub(crate) fn job_mut(&mut self) -> Option<&mut JobState> {
        self.job.as_mut()
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        if self.notice != notice {
            self.notice = notice;
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_shutdown(&mut self) {
        if !self.shutting_down {
            self.shutting_down = true;
            self.mark_dirty();
        }
    }
}
