// crates/codec-runtime/src/reference_backend.rs
//
// An in-process, pass-through codec backend used only for testing the
// engine itself. The concrete codec adapter (libaom, libvpx, FFmpeg's own
// encoders, ...) is explicitly out of scope; this stands in for it the way
// `velocut_core::transitions::crossfade` stands in as the one fully worked
// `VideoTransition` example the others are modeled on. It does no real
// compression: an encoder wraps raw bytes into a chunk, a decoder unwraps
// them back, so the round-trip tests in `tests/` exercise real worker
// plumbing (ordering, key-chunk gating, flush draining) without needing an
// actual codec.

use codec_core::{
    AccessOptions, AudioDecoderConfig, AudioEncoderConfig, AudioGeometry, AudioSampleFormat, ChunkType, CodecBackend,
    CodecError, DecoderConfigDescriptor, EncodedChunk, Geometry, MediaFormat, MediaResource, MediaResourceInit,
    PlaneLayout, Rotation, SupportProbeResult, SupportVerdict, VideoDecoderConfig, VideoEncoderConfig, VideoGeometry,
    VideoPixelFormat,
};

use crate::message::EncodeOptions;

fn supported_if_nonempty_codec(codec: &str) -> SupportProbeResult {
    let supported = !codec.trim().is_empty() && codec != "does.not.exist";
    SupportProbeResult {
        verdict: if supported { SupportVerdict::Supported } else { SupportVerdict::Unsupported },
        hardware_accelerated: false,
    }
}

pub struct ReferenceVideoEncoder {
    config: VideoEncoderConfig,
    frames_emitted: u64,
}

impl CodecBackend for ReferenceVideoEncoder {
    type Config = VideoEncoderConfig;
    type Input = (MediaResource, EncodeOptions);
    type Output = EncodedChunk;

    fn configure(config: &Self::Config) -> Result<Self, CodecError> {
        config.validate_shape()?;
        Ok(ReferenceVideoEncoder { config: config.clone(), frames_emitted: 0 })
    }

    fn process(&mut self, input: Self::Input) -> Result<Vec<Self::Output>, CodecError> {
        let (frame, options) = input;
        let ts = frame.timestamp_micros()?;
        let mut bytes = vec![0u8; frame.allocation_size(AccessOptions::default())?];
        frame.copy_to(&mut bytes, AccessOptions::default())?;
        let chunk_type = if self.frames_emitted == 0 || options.force_keyframe { ChunkType::Key } else { ChunkType::Delta };
        self.frames_emitted += 1;
        Ok(vec![EncodedChunk::new(chunk_type, ts, None, bytes)])
    }

    fn drain(&mut self) -> Result<Vec<Self::Output>, CodecError> {
        Ok(Vec::new())
    }

    fn is_config_supported(config: &Self::Config) -> SupportProbeResult {
        supported_if_nonempty_codec(&config.codec)
    }

    fn current_decoder_config(&self) -> Option<DecoderConfigDescriptor> {
        Some(DecoderConfigDescriptor { description: Some(self.config.codec.clone().into_bytes()) })
    }
}

pub struct ReferenceVideoDecoder {
    config: VideoDecoderConfig,
}

impl CodecBackend for ReferenceVideoDecoder {
    type Config = VideoDecoderConfig;
    type Input = EncodedChunk;
    type Output = MediaResource;

    fn configure(config: &Self::Config) -> Result<Self, CodecError> {
        config.validate_shape()?;
        Ok(ReferenceVideoDecoder { config: config.clone() })
    }

    fn process(&mut self, input: Self::Input) -> Result<Vec<Self::Output>, CodecError> {
        let ts = input.timestamp_micros()?;
        let len = input.byte_length()?;
        let mut bytes = vec![0u8; len];
        input.copy_to(&mut bytes)?;
        let geometry = VideoGeometry {
            coded_width: self.config.coded_width,
            coded_height: self.config.coded_height,
            visible_left: 0,
            visible_top: 0,
            visible_width: self.config.coded_width,
            visible_height: self.config.coded_height,
        };
        let frame = MediaResource::new(MediaResourceInit {
            format: MediaFormat::Video(VideoPixelFormat::Rgba),
            geometry: Geometry::Video(geometry),
            timestamp_micros: ts,
            duration_micros: input.duration_micros()?,
            layout: vec![PlaneLayout { offset: 0, stride: (self.config.coded_width as usize) * 4 }],
            data: bytes,
            rotation: self.config.rotation,
            flip: self.config.flip,
            color_space: self.config.color_space,
        })?;
        Ok(vec![frame])
    }

    fn drain(&mut self) -> Result<Vec<Self::Output>, CodecError> {
        Ok(Vec::new())
    }

    fn is_config_supported(config: &Self::Config) -> SupportProbeResult {
        supported_if_nonempty_codec(&config.codec)
    }

    fn gates_on_key_chunk(&self) -> bool {
        true
    }

    fn input_is_key(&self, input: &Self::Input) -> bool {
        matches!(input.chunk_type(), Ok(ChunkType::Key))
    }

    fn output_timestamp_micros(&self, output: &Self::Output) -> Option<i64> {
        output.timestamp_micros().ok()
    }
}

pub struct ReferenceAudioEncoder {
    config: AudioEncoderConfig,
}

impl CodecBackend for ReferenceAudioEncoder {
    type Config = AudioEncoderConfig;
    type Input = (MediaResource, EncodeOptions);
    type Output = EncodedChunk;

    fn configure(config: &Self::Config) -> Result<Self, CodecError> {
        config.validate_shape()?;
        Ok(ReferenceAudioEncoder { config: config.clone() })
    }

    fn process(&mut self, input: Self::Input) -> Result<Vec<Self::Output>, CodecError> {
        let (samples, _options) = input;
        let ts = samples.timestamp_micros()?;
        let mut bytes = vec![0u8; samples.allocation_size(AccessOptions::default())?];
        samples.copy_to(&mut bytes, AccessOptions::default())?;
        // Every audio access unit here decodes independently, so every
        // chunk is a key chunk.
        Ok(vec![EncodedChunk::new(ChunkType::Key, ts, None, bytes)])
    }

    fn drain(&mut self) -> Result<Vec<Self::Output>, CodecError> {
        Ok(Vec::new())
    }

    fn is_config_supported(config: &Self::Config) -> SupportProbeResult {
        supported_if_nonempty_codec(&config.codec)
    }

    fn current_decoder_config(&self) -> Option<DecoderConfigDescriptor> {
        Some(DecoderConfigDescriptor { description: Some(self.config.codec.clone().into_bytes()) })
    }
}

pub struct ReferenceAudioDecoder {
    config: AudioDecoderConfig,
}

impl CodecBackend for ReferenceAudioDecoder {
    type Config = AudioDecoderConfig;
    type Input = EncodedChunk;
    type Output = MediaResource;

    fn configure(config: &Self::Config) -> Result<Self, CodecError> {
        config.validate_shape()?;
        Ok(ReferenceAudioDecoder { config: config.clone() })
    }

    fn process(&mut self, input: Self::Input) -> Result<Vec<Self::Output>, CodecError> {
        let ts = input.timestamp_micros()?;
        let len = input.byte_length()?;
        let mut bytes = vec![0u8; len];
        input.copy_to(&mut bytes)?;
        let bytes_per_sample = AudioSampleFormat::F32.bytes_per_sample();
        let frames = (bytes.len() / bytes_per_sample / self.config.number_of_channels.max(1) as usize) as u32;
        let samples = MediaResource::new(MediaResourceInit {
            format: MediaFormat::Audio(AudioSampleFormat::F32),
            geometry: Geometry::Audio(AudioGeometry {
                sample_rate: self.config.sample_rate,
                number_of_channels: self.config.number_of_channels,
                number_of_frames: frames,
            }),
            timestamp_micros: ts,
            duration_micros: input.duration_micros()?,
            layout: vec![PlaneLayout { offset: 0, stride: bytes.len() }],
            data: bytes,
            rotation: Rotation::Deg0,
            flip: false,
            color_space: None,
        })?;
        Ok(vec![samples])
    }

    fn drain(&mut self) -> Result<Vec<Self::Output>, CodecError> {
        Ok(Vec::new())
    }

    fn is_config_supported(config: &Self::Config) -> SupportProbeResult {
        supported_if_nonempty_codec(&config.codec)
    }

    fn gates_on_key_chunk(&self) -> bool {
        true
    }

    fn input_is_key(&self, input: &Self::Input) -> bool {
        matches!(input.chunk_type(), Ok(ChunkType::Key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ts: i64) -> MediaResource {
        MediaResource::new(MediaResourceInit {
            format: MediaFormat::Video(VideoPixelFormat::Rgba),
            geometry: Geometry::Video(VideoGeometry {
                coded_width: 2,
                coded_height: 2,
                visible_left: 0,
                visible_top: 0,
                visible_width: 2,
                visible_height: 2,
            }),
            timestamp_micros: ts,
            duration_micros: Some(33_333),
            layout: vec![PlaneLayout { offset: 0, stride: 8 }],
            data: vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
            rotation: Rotation::Deg0,
            flip: false,
            color_space: None,
        })
        .unwrap()
    }

    #[test]
    fn first_encoded_chunk_is_key_with_decoder_config() {
        let cfg = VideoEncoderConfig { codec: "avc1.42001e".into(), width: 2, height: 2, ..Default::default() };
        let mut encoder = ReferenceVideoEncoder::configure(&cfg).unwrap();
        let outputs = encoder.process((frame(0), EncodeOptions { force_keyframe: false })).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].chunk_type().unwrap(), ChunkType::Key);
        assert!(encoder.current_decoder_config().is_some());
    }

    #[test]
    fn unsupported_codec_string_reports_unsupported() {
        let cfg = VideoDecoderConfig { codec: "does.not.exist".into(), coded_width: 4, coded_height: 4, ..Default::default() };
        let result = ReferenceVideoDecoder::is_config_supported(&cfg);
        assert_eq!(result.verdict, SupportVerdict::Unsupported);
    }

    #[test]
    fn decoder_round_trips_encoder_bytes() {
        let enc_cfg = VideoEncoderConfig { codec: "avc1.42001e".into(), width: 2, height: 2, ..Default::default() };
        let dec_cfg = VideoDecoderConfig { codec: "avc1.42001e".into(), coded_width: 2, coded_height: 2, ..Default::default() };
        let mut encoder = ReferenceVideoEncoder::configure(&enc_cfg).unwrap();
        let mut decoder = ReferenceVideoDecoder::configure(&dec_cfg).unwrap();
        let chunks = encoder.process((frame(1000), EncodeOptions { force_keyframe: true })).unwrap();
        let mut decoded = Vec::new();
        for chunk in chunks {
            decoded.extend(decoder.process(chunk).unwrap());
        }
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].timestamp_micros().unwrap(), 1000);
    }
}
