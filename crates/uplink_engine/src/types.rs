use std::sync::mpsc;

use uplink_core::{JobHandle, JobSnapshot, MonitorOutcome, UploadError, UploadProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadProgress(UploadProgress),
    /// Always the last event of an upload, after all of its progress events.
    UploadFinished(Result<JobHandle, UploadError>),
    Snapshot {
        job_id: String,
        snapshot: JobSnapshot,
    },
    /// Emitted once per stream, after its connection has been released.
    StreamClosed {
        job_id: String,
        outcome: MonitorOutcome,
    },
    Interrupted,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}
