use uplink_core::{Effect, Msg};
use uplink_engine::{EngineEvent, EngineHandle};
use uplink_logging::{uplink_info, uplink_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartUpload(request) => {
                    uplink_info!(
                        "StartUpload file={} bytes={}",
                        request.file_name,
                        request.size()
                    );
                    self.engine.start_upload(request);
                }
                Effect::OpenStatusStream(handle) => {
                    uplink_info!("OpenStatusStream job_id={}", handle.job_id);
                    self.engine.open_status_stream(handle);
                }
                Effect::CloseStatusStream { job_id, reason } => {
                    uplink_info!("CloseStatusStream job_id={} reason={:?}", job_id, reason);
                    self.engine.close_status_stream(job_id);
                }
            }
        }
    }

    /// Blocks until the engine has something to report.
    pub fn next_msg(&self) -> Option<Msg> {
        self.engine.recv().map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadProgress(progress) => Msg::UploadProgress(progress),
        EngineEvent::UploadFinished(Ok(handle)) => Msg::UploadSucceeded(handle),
        EngineEvent::UploadFinished(Err(error)) => {
            uplink_warn!("Upload failed: {}", error);
            Msg::UploadFailed(error)
        }
        EngineEvent::Snapshot { job_id, snapshot } => Msg::SnapshotReceived { job_id, snapshot },
        EngineEvent::StreamClosed { job_id, outcome } => Msg::StreamClosed { job_id, outcome },
        EngineEvent::Interrupted => {
            uplink_info!("Interrupted; tearing down");
            Msg::TearDown
        }
    }
}
