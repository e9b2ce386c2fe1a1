use std::sync::Once;

use uplink_core::{
    update, AppState, CloseReason, Effect, JobHandle, JobSnapshot, Msg, Notice, Task, TaskStatus,
    UploadError, UploadProgress, UploadRequest, UploadState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(uplink_logging::initialize_for_tests);
}

fn movie() -> UploadRequest {
    UploadRequest::new("movie.mp4", vec![0u8; 5_000_000])
}

fn handle(job_id: &str) -> JobHandle {
    JobHandle {
        job_id: job_id.to_string(),
        original_filename: "movie.mp4".to_string(),
    }
}

fn progress(sent: u64) -> Msg {
    Msg::UploadProgress(UploadProgress::new(sent, 5_000_000))
}

#[test]
fn file_selection_starts_upload() {
    init_logging();
    let request = movie();
    let (mut state, effects) = update(AppState::new(), Msg::FileSelected(request.clone()));

    assert_eq!(effects, vec![Effect::StartUpload(request)]);
    assert_eq!(
        state.upload(),
        &UploadState::InFlight {
            file_name: "movie.mp4".to_string(),
            progress: UploadProgress::new(0, 5_000_000),
        }
    );
    assert!(state.job().is_none());
    assert!(state.consume_dirty());

    let view = state.view();
    assert!(view.upload.visible);
    assert_eq!(view.upload.status_text, "Uploading movie.mp4...");
    assert_eq!(view.upload.percent, Some(0.0));
}

#[test]
fn upload_progress_reaches_total_then_opens_monitor() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::FileSelected(movie()));
    for sent in [1_000_000, 2_500_000, 5_000_000] {
        let (next, effects) = update(state, progress(sent));
        assert!(effects.is_empty());
        state = next;
    }
    assert_eq!(state.view().upload.percent, Some(100.0));

    let (state, effects) = update(state, Msg::UploadSucceeded(handle("abc123")));

    assert_eq!(effects, vec![Effect::OpenStatusStream(handle("abc123"))]);
    let job = state.job().expect("monitor created");
    assert_eq!(job.job_id(), "abc123");
    assert!(job.is_streaming());
    assert_eq!(
        state.view().upload.status_text,
        "Upload complete! Processing..."
    );
    assert!(!state.is_settled());
}

#[test]
fn progress_never_decreases_or_exceeds_total() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(movie()));
    let (state, _) = update(state, progress(3_000_000));
    let (mut state, _) = update(state, progress(1_000_000));
    assert!(state.consume_dirty());

    match state.upload() {
        UploadState::InFlight { progress, .. } => assert_eq!(progress.bytes_sent, 3_000_000),
        other => panic!("unexpected upload state {other:?}"),
    }

    let (state, _) = update(state, Msg::UploadProgress(UploadProgress {
        bytes_sent: 9_000_000,
        bytes_total: 9_000_000,
    }));
    match state.upload() {
        UploadState::InFlight { progress, .. } => {
            assert_eq!(progress.bytes_sent, 5_000_000);
            assert_eq!(progress.bytes_total, 5_000_000);
        }
        other => panic!("unexpected upload state {other:?}"),
    }
    let percent = state.view().upload.percent.unwrap();
    assert!((0.0..=100.0).contains(&percent));
}

#[test]
fn stale_progress_does_not_mark_dirty() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(movie()));
    let (mut state, _) = update(state, progress(2_000_000));
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, progress(2_000_000));
    assert!(!state.consume_dirty());
}

#[test]
fn empty_file_has_no_percent() {
    init_logging();
    let request = UploadRequest::new("empty.bin", Vec::new());
    let (state, _) = update(AppState::new(), Msg::FileSelected(request));
    let (state, _) = update(state, Msg::UploadProgress(UploadProgress::new(0, 0)));

    assert_eq!(state.view().upload.percent, None);
}

#[test]
fn success_without_any_progress_still_opens_monitor() {
    init_logging();
    let request = UploadRequest::new("tiny.txt", b"hi".to_vec());
    let (state, _) = update(AppState::new(), Msg::FileSelected(request));
    let (state, effects) = update(state, Msg::UploadSucceeded(handle("tiny")));

    assert_eq!(effects, vec![Effect::OpenStatusStream(handle("tiny"))]);
    assert_eq!(state.view().upload.percent, Some(100.0));
}

#[test]
fn server_error_fails_upload_and_never_monitors() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(movie()));
    let (state, _) = update(state, progress(5_000_000));
    let (state, effects) = update(
        state,
        Msg::UploadFailed(UploadError::Rejected {
            status: 500,
            body: "Internal Server Error".to_string(),
        }),
    );

    assert!(effects.is_empty());
    assert!(state.job().is_none());
    assert!(state.is_settled());
    let view = state.view();
    assert!(view.upload.failed);
    assert_eq!(view.upload.status_text, "Upload failed (HTTP 500).");
    assert_eq!(view.upload.detail.as_deref(), Some("Internal Server Error"));
    assert!(view.job.is_none());

    // A late success for the settled upload is ignored.
    let (state, effects) = update(state, Msg::UploadSucceeded(handle("late")));
    assert!(effects.is_empty());
    assert!(state.job().is_none());
}

#[test]
fn transport_failure_is_generic_upload_failure() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(movie()));
    let (state, effects) = update(
        state,
        Msg::UploadFailed(UploadError::Transport("connection refused".to_string())),
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.upload.status_text, "Network error during upload.");
    assert_eq!(view.upload.detail, None);
}

#[test]
fn empty_job_id_is_a_malformed_response() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(movie()));
    let (state, effects) = update(state, Msg::UploadSucceeded(handle("  ")));

    assert!(effects.is_empty());
    assert!(state.job().is_none());
    assert!(matches!(
        state.upload(),
        UploadState::Failed {
            error: UploadError::MalformedResponse(_),
            ..
        }
    ));
}

#[test]
fn selection_while_in_flight_is_rejected() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(movie()));
    let (state, _) = update(state, progress(1_000));
    let before = state.upload().clone();

    let (state, effects) = update(
        state,
        Msg::FileSelected(UploadRequest::new("other.mp4", vec![1u8; 10])),
    );

    assert!(effects.is_empty());
    assert_eq!(state.upload(), &before);
    assert_eq!(
        state.notice(),
        Some(&Notice::SelectionRejected {
            file_name: "other.mp4".to_string()
        })
    );
    assert_eq!(
        state.view().notice.as_deref(),
        Some("Ignored other.mp4: an upload is already in progress.")
    );
}

#[test]
fn new_selection_after_settle_cancels_running_monitor() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(movie()));
    let (state, _) = update(state, Msg::UploadSucceeded(handle("abc123")));
    let (state, _) = update(
        state,
        Msg::SnapshotReceived {
            job_id: "abc123".to_string(),
            snapshot: JobSnapshot::new(vec![(
                "t1".to_string(),
                Task::new("Encode", TaskStatus::Processing),
            )]),
        },
    );

    let next = UploadRequest::new("second.mp4", vec![2u8; 4]);
    let (state, effects) = update(state, Msg::FileSelected(next.clone()));

    assert_eq!(
        effects,
        vec![
            Effect::CloseStatusStream {
                job_id: "abc123".to_string(),
                reason: CloseReason::Cancelled,
            },
            Effect::StartUpload(next),
        ]
    );
    assert!(state.job().is_none());
    assert!(state.upload().is_in_flight());
}
