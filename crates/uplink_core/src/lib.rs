//! Uplink core: pure upload/monitor state machine and view-model helpers.
mod effect;
mod error;
mod model;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{CloseReason, Effect};
pub use error::{StreamError, UploadError};
pub use model::{
    JobHandle, JobSnapshot, MonitorOutcome, Task, TaskId, TaskStatus, UploadProgress,
    UploadRequest,
};
pub use msg::Msg;
pub use state::{AppState, JobState, MonitorPhase, Notice, UploadState};
pub use update::update;
pub use view_model::{AppViewModel, JobView, TaskCardView, UploadView};
