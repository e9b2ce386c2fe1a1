use std::time::Duration;

use url::Url;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub upload_path: String,
    /// Prefix; the job id is appended as the final path segment.
    pub status_path: String,
    /// Multipart field name carrying the file.
    pub file_field: String,
    pub connect_timeout: Duration,
    /// Total time allowed for the upload request. Never applied to the status stream.
    pub upload_timeout: Option<Duration>,
    pub chunk_size: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            upload_path: "/upload".to_string(),
            status_path: "/status".to_string(),
            file_field: "file".to_string(),
            connect_timeout: Duration::from_secs(10),
            upload_timeout: None,
            chunk_size: 64 * 1024,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn upload_url(&self) -> Result<Url, String> {
        self.endpoint(&self.upload_path, None)
    }

    pub fn status_url(&self, job_id: &str) -> Result<Url, String> {
        self.endpoint(&self.status_path, Some(job_id))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
    }

    fn endpoint(&self, path: &str, last_segment: Option<&str>) -> Result<Url, String> {
        let mut url = Url::parse(&self.base_url).map_err(|err| err.to_string())?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| format!("{} cannot be a base url", self.base_url))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|part| !part.is_empty()));
            if let Some(segment) = last_segment {
                segments.push(segment);
            }
        }
        Ok(url)
    }
}
