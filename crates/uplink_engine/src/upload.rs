use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::{stream, StreamExt};
use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;
use uplink_core::{JobHandle, UploadError, UploadProgress, UploadRequest};
use uplink_logging::{uplink_debug, uplink_info, uplink_warn};

use crate::wire::parse_upload_response;
use crate::{ClientSettings, EngineEvent, EventSink};

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    /// Sends the file and returns the job created for it.
    ///
    /// Progress goes to `sink` while the body streams out; the returned
    /// result is the single terminal outcome of the upload.
    async fn upload(
        &self,
        request: &UploadRequest,
        sink: Arc<dyn EventSink>,
    ) -> Result<JobHandle, UploadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: ClientSettings,
}

impl ReqwestUploader {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(
        &self,
        request: &UploadRequest,
        sink: Arc<dyn EventSink>,
    ) -> Result<JobHandle, UploadError> {
        let gate = Arc::new(ProgressGate::new(sink));
        let result = self.send(request, gate.clone()).await;
        // The connection may still be polling the body after the response
        // arrived; nothing may be reported once the outcome is known.
        gate.close();
        result
    }
}

impl ReqwestUploader {
    async fn send(
        &self,
        request: &UploadRequest,
        gate: Arc<ProgressGate>,
    ) -> Result<JobHandle, UploadError> {
        let url = self.settings.upload_url().map_err(UploadError::InvalidUrl)?;
        let client = self
            .settings
            .build_client()
            .map_err(|err| UploadError::Transport(err.to_string()))?;

        uplink_info!(
            "Uploading {} ({} bytes) to {}",
            request.file_name,
            request.size(),
            url
        );

        let body = progress_body(request.content.clone(), self.settings.chunk_size, gate);
        let part = Part::stream_with_length(body, request.size()).file_name(request.file_name.clone());
        let form = Form::new().part(self.settings.file_field.clone(), part);

        let mut builder = client.post(url).multipart(form);
        if let Some(timeout) = self.settings.upload_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;

        if !status.is_success() {
            uplink_warn!("Upload of {} rejected: {} {}", request.file_name, status, body);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let job_id = parse_upload_response(&body)?;
        uplink_info!("Upload of {} accepted as job {}", request.file_name, job_id);
        Ok(JobHandle {
            job_id,
            original_filename: request.file_name.clone(),
        })
    }
}

/// Forwards progress to the sink until the upload outcome is settled.
struct ProgressGate {
    sink: Mutex<Option<Arc<dyn EventSink>>>,
    token: CancellationToken,
}

impl ProgressGate {
    fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink: Mutex::new(Some(sink)),
            token: CancellationToken::new(),
        }
    }

    fn report(&self, progress: UploadProgress) {
        if let Ok(sink) = self.sink.lock() {
            if let Some(sink) = sink.as_ref() {
                sink.emit(EngineEvent::UploadProgress(progress));
            }
        }
    }

    /// Stops the body stream. Once this returns no further progress is emitted.
    fn close(&self) {
        self.token.cancel();
        match self.sink.lock() {
            Ok(mut sink) => {
                sink.take();
            }
            Err(poisoned) => {
                poisoned.into_inner().take();
            }
        }
    }
}

/// Streams `content` in slices, reporting cumulative bytes as each slice is taken.
fn progress_body(content: Bytes, chunk_size: usize, gate: Arc<ProgressGate>) -> reqwest::Body {
    let total = content.len() as u64;
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<Bytes> = (0..content.len())
        .step_by(chunk_size)
        .map(|start| content.slice(start..(start + chunk_size).min(content.len())))
        .collect();
    uplink_debug!("Upload body split into {} chunks", chunks.len());

    let mut sent = 0u64;
    let stop = gate.token.clone().cancelled_owned();
    let body = stream::iter(chunks).take_until(stop).map(move |chunk| {
        sent += chunk.len() as u64;
        gate.report(UploadProgress::new(sent, total));
        Ok::<Bytes, std::io::Error>(chunk)
    });
    reqwest::Body::wrap_stream(body)
}
