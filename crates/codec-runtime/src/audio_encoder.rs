// crates/codec-runtime/src/audio_encoder.rs

use std::sync::Arc;

use codec_core::{AudioEncoderConfig, CodecError, CodecKind, EncodedChunk, EncodedChunkMetadata, MediaResource};

use crate::facade::{CodecFacade, CodecState, FlushCompletion};
use crate::message::EncodeOptions;
use crate::probe::{is_config_supported, ProbeCompletion};
use crate::reference_backend::ReferenceAudioEncoder;
use crate::resource_manager::ResourceManager;
use crate::runtime_config::RuntimeConfig;

pub struct AudioEncoder {
    facade: Arc<CodecFacade<ReferenceAudioEncoder>>,
}

impl AudioEncoder {
    pub fn new(
        config: RuntimeConfig,
        output_callback: impl Fn(EncodedChunk, EncodedChunkMetadata) + Send + Sync + 'static,
        error_callback: impl Fn(CodecError) + Send + Sync + 'static,
        dequeue_callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let facade = CodecFacade::new(
            CodecKind::AudioEncoder,
            config.callback_capacity,
            output_callback,
            error_callback,
            dequeue_callback,
        );
        AudioEncoder { facade }
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

    pub fn configure(&self, config: AudioEncoderConfig) -> Result<(), CodecError> {
        config.validate_shape()?;
        self.facade.configure(config)
    }

    pub fn encode(&self, mut data: MediaResource, now_micros: i64) -> Result<(), CodecError> {
        let worker_owned = data.clone_resource()?;
        data.close();
        self.facade.process((worker_owned, EncodeOptions { force_keyframe: false }), now_micros)
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

    pub fn is_config_supported(config: AudioEncoderConfig) -> Result<ProbeCompletion, CodecError> {
        config.validate_shape()?;
        Ok(is_config_supported::<ReferenceAudioEncoder>(config))
    }
}
