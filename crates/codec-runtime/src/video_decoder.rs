// crates/codec-runtime/src/video_decoder.rs

use std::sync::Arc;

use codec_core::{CodecError, CodecKind, EncodedChunk, EncodedChunkMetadata, MediaResource, VideoDecoderConfig};

use crate::facade::{CodecFacade, CodecState, FlushCompletion};
use crate::probe::{is_config_supported, ProbeCompletion};
use crate::reference_backend::ReferenceVideoDecoder;
use crate::resource_manager::ResourceManager;
use crate::runtime_config::RuntimeConfig;

pub struct VideoDecoder {
    facade: Arc<CodecFacade<ReferenceVideoDecoder>>,
}

impl VideoDecoder {
    pub fn new(
        config: RuntimeConfig,
        output_callback: impl Fn(MediaResource, EncodedChunkMetadata) + Send + Sync + 'static,
        error_callback: impl Fn(CodecError) + Send + Sync + 'static,
        dequeue_callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let facade = CodecFacade::new(
            CodecKind::VideoDecoder,
            config.callback_capacity,
            output_callback,
            error_callback,
            dequeue_callback,
        );
        VideoDecoder { facade }
    }

    pub fn register_with(&self, manager: &Arc<ResourceManager>, now_micros: i64) {
        self.facade.register_with(manager, now_micros);
    }

    pub fn state(&self) -> CodecState {
        self.facade.state()
    }

    pub fn decode_queue_size(&self) -> usize {
        self.facade.queue_size()
    }

    pub fn configure(&self, config: VideoDecoderConfig) -> Result<(), CodecError> {
        config.validate_shape()?;
        self.facade.configure(config)
    }

    /// Chunks are immutable so, unlike `encode`, no clone/close dance is
    /// needed here — the caller's handle and the worker's are the same
    /// refcounted chunk (§4.6 Decode).
    pub fn decode(&self, chunk: EncodedChunk, now_micros: i64) -> Result<(), CodecError> {
        self.facade.process(chunk, now_micros)
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

    pub fn is_config_supported(config: VideoDecoderConfig) -> Result<ProbeCompletion, CodecError> {
        config.validate_shape()?;
        Ok(is_config_supported::<ReferenceVideoDecoder>(config))
    }
}
