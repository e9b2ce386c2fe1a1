//! JSON payloads exchanged with the processing backend.

use serde::Deserialize;
use serde_json::Value;
use uplink_core::{JobSnapshot, StreamError, Task, TaskStatus, UploadError};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct TaskPayload {
    name: String,
    status: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl From<TaskPayload> for Task {
    fn from(payload: TaskPayload) -> Self {
        Task {
            name: payload.name,
            status: TaskStatus::from_wire(&payload.status),
            download_url: payload.download_url,
            error: payload.error,
        }
    }
}

/// Extracts the job id from a successful upload response body.
pub(crate) fn parse_upload_response(body: &str) -> Result<String, UploadError> {
    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|err| UploadError::MalformedResponse(err.to_string()))?;
    if response.job_id.trim().is_empty() {
        return Err(UploadError::MalformedResponse("empty job_id".to_string()));
    }
    Ok(response.job_id)
}

/// Parses one status message. Task order follows the order of keys in the payload.
pub(crate) fn parse_status_payload(data: &str) -> Result<JobSnapshot, StreamError> {
    let value: Value = serde_json::from_str(data)
        .map_err(|err| StreamError::MalformedPayload(err.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(malformed("payload is not a JSON object"));
    };

    let tasks = match object.remove("tasks") {
        Some(Value::Object(tasks)) => tasks,
        Some(_) => return Err(malformed("`tasks` is not an object")),
        None => {
            return Err(match object.get("error").and_then(Value::as_str) {
                Some(message) => StreamError::Server(message.to_string()),
                None => malformed("missing `tasks`"),
            })
        }
    };

    tasks
        .into_iter()
        .map(|(task_id, raw)| {
            let payload: TaskPayload = serde_json::from_value(raw)
                .map_err(|err| malformed(&format!("task {task_id}: {err}")))?;
            Ok((task_id, Task::from(payload)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(JobSnapshot::new)
}

fn malformed(message: &str) -> StreamError {
    StreamError::MalformedPayload(message.to_string())
}
