// crates/codec-runtime/src/audio_decoder.rs

use std::sync::Arc;

use codec_core::{AudioDecoderConfig, CodecError, CodecKind, EncodedChunk, EncodedChunkMetadata, MediaResource};

use crate::facade::{CodecFacade, CodecState, FlushCompletion};
use crate::probe::{is_config_supported, ProbeCompletion};
use crate::reference_backend::ReferenceAudioDecoder;
use crate::resource_manager::ResourceManager;
use crate::runtime_config::RuntimeConfig;

pub struct AudioDecoder {
    facade: Arc<CodecFacade<ReferenceAudioDecoder>>,
}

impl AudioDecoder {
    pub fn new(
        config: RuntimeConfig,
        output_callback: impl Fn(MediaResource, EncodedChunkMetadata) + Send + Sync + 'static,
        error_callback: impl Fn(CodecError) + Send + Sync + 'static,
        dequeue_callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let facade = CodecFacade::new(
            CodecKind::AudioDecoder,
            config.callback_capacity,
            output_callback,
            error_callback,
            dequeue_callback,
        );
        AudioDecoder { facade }
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

    pub fn configure(&self, config: AudioDecoderConfig) -> Result<(), CodecError> {
        config.validate_shape()?;
        self.facade.configure(config)
    }

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

    pub fn is_config_supported(config: AudioDecoderConfig) -> Result<ProbeCompletion, CodecError> {
        config.validate_shape()?;
        Ok(is_config_supported::<ReferenceAudioDecoder>(config))
    }
}
