//! Uplink engine: upload transport, status streaming and effect execution.
mod engine;
mod settings;
mod status;
mod types;
mod upload;
mod wire;

pub use engine::EngineHandle;
pub use settings::ClientSettings;
pub use status::{StatusStreamer, Subscription};
pub use types::{ChannelEventSink, EngineEvent, EventSink};
pub use upload::{ReqwestUploader, Uploader};
