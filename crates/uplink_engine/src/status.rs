use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uplink_core::{JobHandle, MonitorOutcome, StreamError};
use uplink_logging::{uplink_debug, uplink_info, uplink_trace, uplink_warn};

use crate::wire::parse_status_payload;
use crate::{ClientSettings, EngineEvent, EventSink};

/// Opens receive-only status streams for jobs.
#[derive(Debug, Clone)]
pub struct StatusStreamer {
    settings: ClientSettings,
}

impl StatusStreamer {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    /// Starts streaming immediately. Must be called within a tokio runtime.
    ///
    /// The stream stops on its own once a snapshot reports every task
    /// terminal, or on the first error; otherwise it runs until the returned
    /// [`Subscription`] is cancelled or dropped.
    pub fn subscribe(&self, handle: &JobHandle, sink: Arc<dyn EventSink>) -> Subscription {
        let cancel = CancellationToken::new();
        let closed = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_stream(
            self.settings.clone(),
            handle.job_id.clone(),
            sink,
            cancel.clone(),
            closed.clone(),
        ));

        Subscription {
            job_id: handle.job_id.clone(),
            cancel,
            closed,
            task: Some(task),
        }
    }
}

/// Handle to one open status stream. Dropping it cancels the stream.
pub struct Subscription {
    job_id: String,
    cancel: CancellationToken,
    closed: Arc<AtomicBool>,
    task: Option<JoinHandle<MonitorOutcome>>,
}

impl Subscription {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Idempotent; a no-op once the stream has ended by itself.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the underlying connection has been released.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Waits for the stream to end and release its connection.
    pub async fn join(mut self) -> MonitorOutcome {
        match self.task.take() {
            Some(task) => task.await.unwrap_or(MonitorOutcome::Cancelled),
            None => MonitorOutcome::Cancelled,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_stream(
    settings: ClientSettings,
    job_id: String,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
    closed: Arc<AtomicBool>,
) -> MonitorOutcome {
    let outcome = stream_job(&settings, &job_id, sink.as_ref(), &cancel)
        .await
        .unwrap_or_else(MonitorOutcome::Errored);
    // The response has been dropped by now.
    closed.store(true, Ordering::Release);

    match &outcome {
        MonitorOutcome::Errored(error) => {
            uplink_warn!("Status stream for job {} failed: {}", job_id, error);
        }
        other => uplink_info!("Status stream for job {} closed: {:?}", job_id, other),
    }
    sink.emit(EngineEvent::StreamClosed {
        job_id,
        outcome: outcome.clone(),
    });
    outcome
}

async fn stream_job(
    settings: &ClientSettings,
    job_id: &str,
    sink: &dyn EventSink,
    cancel: &CancellationToken,
) -> Result<MonitorOutcome, StreamError> {
    let url = settings.status_url(job_id).map_err(StreamError::InvalidUrl)?;
    let client = settings
        .build_client()
        .map_err(|err| StreamError::Transport(err.to_string()))?;
    uplink_info!("Opening status stream {}", url);

    let request = client.get(url).header(ACCEPT, "text/event-stream").send();
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(MonitorOutcome::Cancelled),
        response = request => response.map_err(|err| StreamError::Transport(err.to_string()))?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(StreamError::Rejected {
            status: status.as_u16(),
        });
    }

    let mut events = std::pin::pin!(response.bytes_stream().eventsource());
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(MonitorOutcome::Cancelled),
            next = events.next() => next,
        };
        let event = match next {
            Some(Ok(event)) => event,
            Some(Err(err)) => return Err(StreamError::Transport(err.to_string())),
            None => return Err(StreamError::EndedEarly),
        };

        if event.event != "message" {
            uplink_trace!("Ignoring `{}` event on job {}", event.event, job_id);
            continue;
        }
        if event.data.trim().is_empty() {
            continue;
        }

        let snapshot = parse_status_payload(&event.data)?;
        let done = snapshot.is_done();
        uplink_debug!(
            "Job {} snapshot: {} tasks, done={}",
            job_id,
            snapshot.len(),
            done
        );
        sink.emit(EngineEvent::Snapshot {
            job_id: job_id.to_string(),
            snapshot,
        });
        if done {
            return Ok(MonitorOutcome::Done);
        }
    }
}
