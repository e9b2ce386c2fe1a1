use crate::{
    AppState, CloseReason, Effect, JobHandle, JobSnapshot, JobState, MonitorOutcome, MonitorPhase,
    Msg, Notice, UploadError, UploadProgress, UploadRequest, UploadState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(request) => select_file(&mut state, request),
        Msg::UploadProgress(progress) => {
            apply_progress(&mut state, progress);
            Vec::new()
        }
        Msg::UploadSucceeded(handle) => upload_succeeded(&mut state, handle),
        Msg::UploadFailed(error) => {
            upload_failed(&mut state, error);
            Vec::new()
        }
        Msg::SnapshotReceived { job_id, snapshot } => apply_snapshot(&mut state, &job_id, snapshot),
        Msg::StreamClosed { job_id, outcome } => stream_closed(&mut state, &job_id, outcome),
        Msg::TearDown => {
            state.begin_shutdown();
            close_streaming_job(&mut state, MonitorPhase::Cancelled, CloseReason::Cancelled)
                .into_iter()
                .collect()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn select_file(state: &mut AppState, request: UploadRequest) -> Vec<Effect> {
    // Single flight: a second selection never disturbs the upload in progress.
    if state.upload().is_in_flight() {
        state.set_notice(Some(Notice::SelectionRejected {
            file_name: request.file_name,
        }));
        return Vec::new();
    }

    let mut effects = Vec::with_capacity(2);
    if let Some(close) =
        close_streaming_job(state, MonitorPhase::Cancelled, CloseReason::Cancelled)
    {
        effects.push(close);
    }
    state.set_job(None);
    state.set_notice(None);
    state.set_upload(UploadState::InFlight {
        file_name: request.file_name.clone(),
        progress: UploadProgress::new(0, request.size()),
    });
    effects.push(Effect::StartUpload(request));
    effects
}

fn apply_progress(state: &mut AppState, reported: UploadProgress) {
    let changed = match state.upload_mut() {
        UploadState::InFlight { progress, .. } => {
            let sent = reported.bytes_sent.min(progress.bytes_total);
            if sent > progress.bytes_sent {
                progress.bytes_sent = sent;
                true
            } else {
                false
            }
        }
        _ => false,
    };
    if changed {
        state.mark_dirty();
    }
}

fn upload_succeeded(state: &mut AppState, handle: JobHandle) -> Vec<Effect> {
    let file_name = match state.upload() {
        UploadState::InFlight { file_name, .. } => file_name.clone(),
        _ => return Vec::new(),
    };

    if handle.job_id.trim().is_empty() {
        state.set_upload(UploadState::Failed {
            file_name,
            error: UploadError::MalformedResponse("empty job id".to_string()),
        });
        return Vec::new();
    }

    state.set_upload(UploadState::Succeeded {
        handle: handle.clone(),
    });
    state.set_job(Some(JobState::new(handle.clone())));
    vec![Effect::OpenStatusStream(handle)]
}

fn upload_failed(state: &mut AppState, error: UploadError) {
    let file_name = match state.upload() {
        UploadState::InFlight { file_name, .. } => file_name.clone(),
        _ => return,
    };
    state.set_upload(UploadState::Failed { file_name, error });
}

fn apply_snapshot(state: &mut AppState, job_id: &str, snapshot: JobSnapshot) -> Vec<Effect> {
    let Some(job) = state.job_mut() else {
        return Vec::new();
    };
    if job.job_id() != job_id || !job.is_streaming() {
        return Vec::new();
    }

    let done = snapshot.is_done();
    job.snapshot = Some(snapshot);
    job.snapshots_received += 1;
    let mut effects = Vec::new();
    if done {
        job.phase = MonitorPhase::Done;
        effects.push(Effect::CloseStatusStream {
            job_id: job_id.to_string(),
            reason: CloseReason::Done,
        });
    }
    state.mark_dirty();
    effects
}

fn stream_closed(state: &mut AppState, job_id: &str, outcome: MonitorOutcome) -> Vec<Effect> {
    let is_current = state
        .job()
        .is_some_and(|job| job.job_id() == job_id && job.is_streaming());
    if !is_current {
        return Vec::new();
    }

    let closed = match outcome {
        // The snapshot that completed the job already moved it to Done.
        MonitorOutcome::Done => None,
        MonitorOutcome::Errored(error) => {
            close_streaming_job(state, MonitorPhase::Errored(error), CloseReason::Errored)
        }
        MonitorOutcome::Cancelled => {
            close_streaming_job(state, MonitorPhase::Cancelled, CloseReason::Cancelled)
        }
    };
    closed.into_iter().collect()
}

/// Moves a streaming job to `phase` and returns the matching close effect.
fn close_streaming_job(
    state: &mut AppState,
    phase: MonitorPhase,
    reason: CloseReason,
) -> Option<Effect> {
    let job = state.job_mut().filter(|job| job.is_streaming())?;
    job.phase = phase;
    let job_id = job.job_id().to_string();
    state.mark_dirty();
    Some(Effect::CloseStatusStream { job_id, reason })
}
