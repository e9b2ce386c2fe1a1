use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio::runtime::Runtime;
use uplink_core::{JobHandle, UploadRequest};
use uplink_logging::{uplink_debug, uplink_info, uplink_warn};

use crate::status::{StatusStreamer, Subscription};
use crate::types::ChannelEventSink;
use crate::upload::{ReqwestUploader, Uploader};
use crate::{ClientSettings, EngineEvent, EventSink};

enum EngineCommand {
    StartUpload(UploadRequest),
    OpenStatusStream(JobHandle),
    CloseStatusStream { job_id: String },
}

/// Runs uploads and status streams on a background tokio runtime.
///
/// Dropping the handle stops the runtime thread and releases every status
/// stream that is still open.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("uplink-engine".to_string())
            .spawn(move || run_engine(runtime, settings, cmd_rx, event_tx))?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
            worker: Some(worker),
        })
    }

    pub fn start_upload(&self, request: UploadRequest) {
        self.send(EngineCommand::StartUpload(request));
    }

    pub fn open_status_stream(&self, handle: JobHandle) {
        self.send(EngineCommand::OpenStatusStream(handle));
    }

    pub fn close_status_stream(&self, job_id: impl Into<String>) {
        self.send(EngineCommand::CloseStatusStream {
            job_id: job_id.into(),
        });
    }

    /// Blocks until the next event. `None` once the engine has stopped.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        if tx.send(command).is_err() {
            uplink_warn!("Engine thread has stopped; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        // Closing the command channel ends the engine loop.
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_engine(
    runtime: Runtime,
    settings: ClientSettings,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
    let uploader = Arc::new(ReqwestUploader::new(settings.clone()));
    let streamer = StatusStreamer::new(settings);
    let mut subscriptions: HashMap<String, Subscription> = HashMap::new();

    let guard = runtime.enter();
    let interrupt_sink = sink.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt_sink.emit(EngineEvent::Interrupted);
        }
    });

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::StartUpload(request) => {
                let uploader = uploader.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    let result = uploader.upload(&request, sink.clone()).await;
                    sink.emit(EngineEvent::UploadFinished(result));
                });
            }
            EngineCommand::OpenStatusStream(handle) => {
                let subscription = streamer.subscribe(&handle, sink.clone());
                if let Some(previous) = subscriptions.insert(handle.job_id.clone(), subscription) {
                    uplink_warn!("Replacing open status stream for job {}", handle.job_id);
                    previous.cancel();
                }
            }
            EngineCommand::CloseStatusStream { job_id } => match subscriptions.remove(&job_id) {
                Some(subscription) => {
                    uplink_debug!(
                        "Closing status stream for job {} (already closed: {})",
                        job_id,
                        subscription.is_closed()
                    );
                    subscription.cancel();
                }
                None => uplink_debug!("No open status stream for job {}", job_id),
            },
        }
    }

    uplink_info!(
        "Engine stopping; releasing {} status stream(s)",
        subscriptions.len()
    );
    drop(subscriptions);
    drop(guard);
    runtime.shutdown_timeout(Duration::from_secs(1));
}
