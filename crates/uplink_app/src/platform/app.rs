use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use uplink_core::{update, AppState, MonitorPhase, Msg, UploadRequest};
use uplink_engine::EngineHandle;
use uplink_logging::{uplink_info, uplink_warn};

use super::effects::EffectRunner;
use super::ui::render::render;
use super::ui::terminal::Terminal;
use super::{logging, settings, Cli};

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::initialize(cli.log, cli.verbose);

    let mut settings = settings::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        settings.server = server;
    }
    let server = settings.server.clone();
    let request = read_request(&cli.file)?;

    let engine = EngineHandle::new(settings.into_client_settings())
        .context("failed to start the upload engine")?;
    let mut controller = Controller::new(EffectRunner::new(engine), Terminal::stdout(), server);

    controller.dispatch(Msg::FileSelected(request));
    controller.run_until_settled();

    Ok(controller.exit_code())
}

fn read_request(path: &Path) -> anyhow::Result<UploadRequest> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} does not name a file", path.display()))?;
    let content =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(UploadRequest::new(file_name, content))
}

/// Owns the workflow state; every message goes through `update`, then
/// effects run and the view is redrawn.
struct Controller<W: Write> {
    state: AppState,
    runner: EffectRunner,
    terminal: Terminal<W>,
    server: String,
}

impl<W: Write> Controller<W> {
    fn new(runner: EffectRunner, terminal: Terminal<W>, server: String) -> Self {
        Self {
            state: AppState::new(),
            runner,
            terminal,
            server,
        }
    }

    fn run_until_settled(&mut self) {
        while !self.state.is_settled() {
            match self.runner.next_msg() {
                Some(msg) => self.dispatch(msg),
                None => {
                    uplink_warn!("Engine stopped before the workflow settled");
                    break;
                }
            }
        }
        uplink_info!("Workflow settled");
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);

        if state.consume_dirty() {
            let frame = render(&state.view(), &self.server);
            if let Err(err) = self.terminal.draw(frame) {
                uplink_warn!("Failed to draw view: {}", err);
            }
        }
        self.state = state;
    }

    /// Success only once the job's tasks have all finished.
    fn succeeded(&self) -> bool {
        matches!(
            self.state.job().map(|job| &job.phase),
            Some(MonitorPhase::Done)
        )
    }

    fn exit_code(&self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplink_engine::ClientSettings;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Runs one upload through a real engine and returns (succeeded, printed output).
    async fn run_workflow(server: &MockServer, request: UploadRequest) -> (bool, String) {
        let base_url = server.uri();
        tokio::task::spawn_blocking(move || {
            let settings = ClientSettings {
                chunk_size: 1024,
                ..ClientSettings::with_base_url(base_url.clone())
            };
            let engine = EngineHandle::new(settings).expect("engine");
            let mut controller =
                Controller::new(EffectRunner::new(engine), Terminal::new(Vec::new()), base_url);

            controller.dispatch(Msg::FileSelected(request));
            controller.run_until_settled();

            let succeeded = controller.succeeded();
            let Controller { terminal, .. } = controller;
            let output = String::from_utf8(terminal.into_inner()).expect("utf8 output");
            (succeeded, output)
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upload_then_monitor_until_every_task_finishes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"job_id":"abc123"}"#))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/status/abc123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(concat!(
                        "data: {\"tasks\":{\"t1\":{\"name\":\"Encode\",\"status\":\"processing\"}}}\n\n",
                        "data: {\"tasks\":{\"t1\":{\"name\":\"Encode\",\"status\":\"completed\",\"download_url\":\"/dl/t1\"}}}\n\n",
                    )),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (succeeded, output) =
            run_workflow(&server, UploadRequest::new("movie.mp4", vec![5u8; 4096])).await;

        assert!(succeeded, "output:\n{output}");
        assert!(output.contains("Uploading movie.mp4..."));
        assert!(output.contains("Upload complete! Processing..."));
        assert!(output.contains(&format!("download: {}/dl/t1", server.uri())));
        assert!(output.contains("All tasks finished. Status stream closed."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejected_upload_settles_without_monitoring() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (succeeded, output) =
            run_workflow(&server, UploadRequest::new("movie.mp4", vec![5u8; 4096])).await;

        assert!(!succeeded);
        assert!(output.contains("Upload failed (HTTP 500)."));
        assert!(output.contains("server said: disk full"));
        assert!(!output.contains("Job "));
    }
}
