// crates/codec-runtime/src/video_encoder.rs
//
// Thin typed wrapper over `CodecFacade<ReferenceVideoEncoder>`, giving the
// WebCodecs-shaped method names from §6 without re-deriving the state
// machine. A concrete (non-reference) backend would get its own facade
// instantiation identical in shape to this one.

use std::sync::Arc;

use codec_core::{CodecError, CodecKind, EncodedChunk, EncodedChunkMetadata, MediaResource, VideoEncoderConfig};

use crate::facade::{CodecFacade, CodecState, FlushCompletion};
use crate::message::EncodeOptions;
use crate::probe::{is_config_supported, ProbeCompletion};
use crate::reference_backend::ReferenceVideoEncoder;
use crate::resource_manager::ResourceManager;
use crate::runtime_config::RuntimeConfig;

pub struct VideoEncoder {
    facade: Arc<CodecFacade<ReferenceVideoEncoder>>,
}

impl VideoEncoder {
    pub fn new(
        config: RuntimeConfig,
        output_callback: impl Fn(EncodedChunk, EncodedChunkMetadata) + Send + Sync + 'static,
        error_callback: impl Fn(CodecError) + Send + Sync + 'static,
        dequeue_callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let facade = CodecFacade::new(
            CodecKind::VideoEncoder,
            config.callback_capacity,
            output_callback,
            error_callback,
            dequeue_callback,
        );
        VideoEncoder { facade }
    }

    pub fn register_with(&self, manager: &Arc<ResourceManager>, now_micros: i64) {
        self.facade.register_with(manager, now_micros);
    }

    pub fn state(&self) -> CodecState {
        self.facade.state()
    }

    pub fn encode_queue_size(&self) -> usize {
        self.facade.queue_size()
    }

    pub fn configure(&self, config: VideoEncoderConfig) -> Result<(), CodecError> {
        config.validate_shape()?;
        self.facade.configure(config)
    }

    /// Takes `frame` by value and closes the caller's handle synchronously
    /// before returning — the worker gets its own clone, fed and closed on
    /// its own thread after processing (§4.6 Encode).
    pub fn encode(&self, mut frame: MediaResource, options: EncodeOptions, now_micros: i64) -> Result<(), CodecError> {
        let worker_owned = frame.clone_resource()?;
        frame.close();
        self.facade.process((worker_owned, options), now_micros)
    }

    pub fn flush(&self) -> Result<FlushCompletion, CodecError> {
        self.facade.flush()
    }

    pub fn reset(&self) -> Result<(), CodecError> {
        self.facade.reset()
    }

    pub fn close(&self) {
        self.facade.close();
    }

    pub fn pump(&self) {
        self.facade.pump();
    }

    pub fn is_config_supported(config: VideoEncoderConfig) -> Result<ProbeCompletion, CodecError> {
        config.validate_shape()?;
        Ok(is_config_supported::<ReferenceVideoEncoder>(config))
    }
}
