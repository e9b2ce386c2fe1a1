//! Stateless projection of [`AppState`] into what a front-end displays.
//!
//! Every call rebuilds the whole view from current state; nothing is patched
//! against a previous view.

use crate::{AppState, JobState, MonitorPhase, Notice, Task, UploadError, UploadState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub upload: UploadView,
    pub job: Option<JobView>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadView {
    pub visible: bool,
    pub status_text: String,
    /// `None` leaves the progress bar where it is.
    pub percent: Option<f64>,
    /// Server response body kept for diagnostics on rejection.
    pub detail: Option<String>,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub job_id: String,
    pub original_filename: String,
    pub tasks: Vec<TaskCardView>,
    pub monitor_text: String,
    pub stream_open: bool,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCardView {
    pub task_id: String,
    pub label: String,
    pub badge: String,
    pub status_class: String,
    pub download_url: Option<String>,
    pub detail: Option<String>,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        Self {
            upload: upload_view(state.upload()),
            job: state.job().map(job_view),
            notice: state.notice().map(notice_text),
        }
    }
}

fn upload_view(upload: &UploadState) -> UploadView {
    match upload {
        UploadState::Idle => UploadView {
            visible: false,
            status_text: "Select a file to upload.".to_string(),
            ..UploadView::default()
        },
        UploadState::InFlight {
            file_name,
            progress,
        } => UploadView {
            visible: true,
            status_text: format!("Uploading {file_name}..."),
            percent: progress.percent(),
            ..UploadView::default()
        },
        UploadState::Succeeded { .. } => UploadView {
            visible: true,
            status_text: "Upload complete! Processing...".to_string(),
            percent: Some(100.0),
            ..UploadView::default()
        },
        UploadState::Failed { error, .. } => UploadView {
            visible: true,
            status_text: upload_failure_text(error),
            percent: None,
            detail: match error {
                UploadError::Rejected { body, .. } if !body.is_empty() => Some(body.clone()),
                _ => None,
            },
            failed: true,
        },
    }
}

fn upload_failure_text(error: &UploadError) -> String {
    match error {
        UploadError::Transport(_) => "Network error during upload.".to_string(),
        UploadError::Rejected { status, .. } => format!("Upload failed (HTTP {status})."),
        other => format!("Upload failed: {other}."),
    }
}

fn job_view(job: &JobState) -> JobView {
    let tasks = job
        .snapshot
        .as_ref()
        .map(|snapshot| {
            snapshot
                .tasks()
                .iter()
                .map(|(task_id, task)| task_card(task_id, task))
                .collect()
        })
        .unwrap_or_default();

    JobView {
        job_id: job.handle.job_id.clone(),
        original_filename: job.handle.original_filename.clone(),
        tasks,
        monitor_text: monitor_text(job),
        stream_open: job.is_streaming(),
        done: job.phase == MonitorPhase::Done,
    }
}

fn task_card(task_id: &str, task: &Task) -> TaskCardView {
    TaskCardView {
        task_id: task_id.to_string(),
        label: task.name.clone(),
        badge: task.status.as_str().to_uppercase(),
        status_class: task.status.as_str().to_string(),
        download_url: task.download_link().map(ToOwned::to_owned),
        detail: task.error.clone(),
    }
}

fn monitor_text(job: &JobState) -> String {
    match &job.phase {
        MonitorPhase::Streaming => match &job.snapshot {
            None => "Waiting for job status...".to_string(),
            Some(snapshot) => {
                let finished = snapshot.count_where(|status| status.is_terminal());
                format!("Processing: {finished} of {} tasks finished.", snapshot.len())
            }
        },
        MonitorPhase::Done => "All tasks finished. Status stream closed.".to_string(),
        MonitorPhase::Errored(error) => format!("Status stream error: {error}."),
        MonitorPhase::Cancelled => "Monitoring cancelled.".to_string(),
    }
}

fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::SelectionRejected { file_name } => {
            format!("Ignored {file_name}: an upload is already in progress.")
        }
    }
}
