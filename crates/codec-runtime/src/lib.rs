//! The worker-owned codec engine: control queue, callback channel, codec
//! worker, and per-instance facade (§4), plus the four WebCodecs-shaped
//! wrapper types built on top of them and the in-process `reference`
//! backend used to test the engine without a real codec.

pub mod audio_decoder;
pub mod audio_encoder;
pub mod callback_channel;
pub mod facade;
pub mod message;
pub mod probe;
pub mod queue;
pub mod reference_backend;
pub mod resource_manager;
pub mod runtime_config;
pub mod video_decoder;
pub mod video_encoder;
pub mod worker;

pub use audio_decoder::AudioDecoder;
pub use audio_encoder::AudioEncoder;
pub use facade::{CodecFacade, CodecState, FlushCompletion};
pub use probe::ProbeCompletion;
pub use resource_manager::{ReclaimableFacade, ResourceManager, GLOBAL_RESOURCE_MANAGER};
pub use runtime_config::RuntimeConfig;
pub use video_decoder::VideoDecoder;
pub use video_encoder::VideoEncoder;
