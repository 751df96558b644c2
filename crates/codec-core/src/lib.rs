//! Plain data and trait definitions shared by the codec engine. No threads,
//! no channels, no FFmpeg — just the types a backend and the runtime agree
//! on, the same role `velocut-core` plays relative to `velocut-media`.

pub mod backend;
pub mod config;
pub mod encoded_chunk;
pub mod error;
pub mod kind;
pub mod media_resource;

pub use backend::{
    BackendOutput, CodecBackend, DecoderConfigDescriptor, EncodedChunkMetadata, SupportProbeResult, SupportVerdict,
    SvcMetadata,
};
pub use config::{
    AlphaOption, AudioDecoderConfig, AudioEncoderConfig, BitrateMode, ColorMatrix, ColorPrimaries, ColorSpace,
    ColorTransfer, DisplayDimensions, HardwareAcceleration, LatencyMode, Rotation, VideoDecoderConfig,
    VideoEncoderConfig,
};
pub use encoded_chunk::{ChunkType, EncodedChunk};
pub use error::{CodecError, ErrorKind};
pub use kind::CodecKind;
pub use media_resource::{
    AccessOptions, AudioGeometry, AudioSampleFormat, Geometry, MediaFormat, MediaResource, MediaResourceInit,
    MediaResourceMetadata, PlaneLayout, VideoGeometry, VideoPixelFormat,
};
