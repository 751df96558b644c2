// crates/codec-core/src/config.rs
//
// Configuration dictionaries (§6). These are plain data — no FFmpeg, no
// threads — the same role `velocut_core::media_types` plays for the UI
// channel, except here the payload is codec configuration rather than
// decode results.

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HardwareAcceleration {
    #[default]
    NoPreference,
    PreferHardware,
    PreferSoftware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaOption {
    #[default]
    Discard,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitrateMode {
    Constant,
    #[default]
    Variable,
    Quantizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatencyMode {
    #[default]
    Quality,
    Realtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(deg: u32) -> Option<Self> {
        match deg {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// Paired display-aspect or display-dimension hint. Both fields must be
/// present together or both absent — "unpaired display dims" is an
/// *invalid-config* per §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpace {
    pub primaries: ColorPrimaries,
    pub transfer: ColorTransfer,
    pub matrix: ColorMatrix,
    pub full_range: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPrimaries { Bt709, Bt470Bg, Smpte170M, Bt2020, Smpte432 }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTransfer { Bt709, Smpte170M, Iec61966_2_1, Pq, Hlg, Linear }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMatrix { Rgb, Bt709, Bt470Bg, Smpte170M, Bt2020Ncl }

#[derive(Debug, Clone, Default)]
pub struct VideoDecoderConfig {
    pub codec: String,
    pub description: Option<Vec<u8>>,
    pub coded_width: u32,
    pub coded_height: u32,
    pub display_aspect: Option<DisplayDimensions>,
    pub color_space: Option<ColorSpace>,
    pub hardware_acceleration: HardwareAcceleration,
    pub optimize_for_latency: bool,
    pub rotation: Rotation,
    pub flip: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VideoEncoderConfig {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub display: Option<DisplayDimensions>,
    pub bitrate: Option<u64>,
    pub framerate: Option<f64>,
    pub hardware_acceleration: HardwareAcceleration,
    pub alpha: AlphaOption,
    pub scalability_mode: Option<String>,
    pub bitrate_mode: BitrateMode,
    pub latency_mode: LatencyMode,
    pub content_hint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AudioDecoderConfig {
    pub codec: String,
    pub sample_rate: u32,
    pub number_of_channels: u32,
    pub description: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct AudioEncoderConfig {
    pub codec: String,
    pub sample_rate: u32,
    pub number_of_channels: u32,
    pub bitrate: Option<u64>,
    pub bitrate_mode: BitrateMode,
}

fn require_codec(codec: &str) -> Result<(), CodecError> {
    if codec.trim().is_empty() {
        return Err(CodecError::invalid_config("codec string must not be empty"));
    }
    Ok(())
}

impl VideoDecoderConfig {
    /// Structural shape validation — *invalid-config*, distinct from
    /// `supported=false` (§4.5). Does not touch mutable state.
    pub fn validate_shape(&self) -> Result<(), CodecError> {
        require_codec(&self.codec)?;
        if self.coded_width == 0 || self.coded_height == 0 {
            return Err(CodecError::invalid_config("coded dimensions must be > 0"));
        }
        Ok(())
    }
}

impl VideoEncoderConfig {
    pub fn validate_shape(&self) -> Result<(), CodecError> {
        require_codec(&self.codec)?;
        if self.width == 0 || self.height == 0 {
            return Err(CodecError::invalid_config("width/height must be > 0"));
        }
        Ok(())
    }
}

impl AudioDecoderConfig {
    pub fn validate_shape(&self) -> Result<(), CodecError> {
        require_codec(&self.codec)?;
        if self.sample_rate == 0 || self.number_of_channels == 0 {
            return Err(CodecError::invalid_config("sample-rate and channel count must be > 0"));
        }
        Ok(())
    }
}

impl AudioEncoderConfig {
    pub fn validate_shape(&self) -> Result<(), CodecError> {
        require_codec(&self.codec)?;
        if self.sample_rate == 0 || self.number_of_channels == 0 {
            return Err(CodecError::invalid_config("sample-rate and channel count must be > 0"));
        }
        Ok(())
    }
}
