use std::time::Duration;

use uplink_core::{JobHandle, MonitorOutcome, UploadRequest};
use uplink_engine::{ClientSettings, EngineEvent, EngineHandle};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(10);

/// Collects events until `stop` matches one, or the wait expires.
fn collect_until(engine: &EngineHandle, stop: impl Fn(&EngineEvent) -> bool) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Some(event) = engine.recv_timeout(WAIT) {
        let last = stop(&event);
        events.push(event);
        if last {
            break;
        }
    }
    events
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_then_monitor_through_engine() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"job_id":"abc123"}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(
                    "data: {\"tasks\":{\"t1\":{\"name\":\"Encode\",\"status\":\"completed\",\"download_url\":\"/dl/t1\"}}}\n\n",
                ),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        chunk_size: 1024,
        ..ClientSettings::with_base_url(server.uri())
    };

    let events = tokio::task::spawn_blocking(move || {
        let engine = EngineHandle::new(settings).expect("engine");
        engine.start_upload(UploadRequest::new("movie.mp4", vec![0u8; 4096]));
        let mut events = collect_until(&engine, |event| {
            matches!(event, EngineEvent::UploadFinished(_))
        });

        engine.open_status_stream(JobHandle {
            job_id: "abc123".to_string(),
            original_filename: "movie.mp4".to_string(),
        });
        events.extend(collect_until(&engine, |event| {
            matches!(event, EngineEvent::StreamClosed { .. })
        }));
        engine.close_status_stream("abc123");
        events
    })
    .await
    .unwrap();

    let finished = events
        .iter()
        .position(|event| matches!(event, EngineEvent::UploadFinished(_)))
        .expect("upload finished");
    assert!(events[..finished]
        .iter()
        .all(|event| matches!(event, EngineEvent::UploadProgress(_))));
    assert_eq!(finished, 4);
    assert_eq!(
        events[finished],
        EngineEvent::UploadFinished(Ok(JobHandle {
            job_id: "abc123".to_string(),
            original_filename: "movie.mp4".to_string(),
        }))
    );
    assert!(matches!(
        events[finished + 1],
        EngineEvent::Snapshot { ref job_id, .. } if job_id == "abc123"
    ));
    assert_eq!(
        events.last(),
        Some(&EngineEvent::StreamClosed {
            job_id: "abc123".to_string(),
            outcome: MonitorOutcome::Done,
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn closing_stream_cancels_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_delay(Duration::from_secs(30))
                .set_body_string("data: {\"tasks\":{}}\n\n"),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings::with_base_url(server.uri());
    let events = tokio::task::spawn_blocking(move || {
        let engine = EngineHandle::new(settings).expect("engine");
        engine.open_status_stream(JobHandle {
            job_id: "slow".to_string(),
            original_filename: "movie.mp4".to_string(),
        });
        std::thread::sleep(Duration::from_millis(50));
        engine.close_status_stream("slow");
        collect_until(&engine, |event| {
            matches!(event, EngineEvent::StreamClosed { .. })
        })
    })
    .await
    .unwrap();

    assert_eq!(
        events,
        vec![EngineEvent::StreamClosed {
            job_id: "slow".to_string(),
            outcome: MonitorOutcome::Cancelled,
        }]
    );
}
