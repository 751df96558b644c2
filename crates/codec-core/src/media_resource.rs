// crates/codec-core/src/media_resource.rs
//
// The owned, refcounted media buffer that flows between a host and a codec
// instance (§5). `velocut_core::media_types::PlaybackFrame` is the nearest
// relative in the teacher: plain data describing a decoded frame, with no
// FFmpeg or thread handles attached. The difference here is ownership —
// a `MediaResource` must support `clone` + independent `close`, so the
// pixel/sample bytes live behind an `Arc` while each handle keeps its own
// detached flag.

use std::sync::Arc;

use crate::config::{ColorSpace, Rotation};
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoPixelFormat {
    I420,
    I420A,
    I422,
    I444,
    Nv12,
    Rgba,
    Bgra,
}

impl VideoPixelFormat {
    pub fn plane_count(self) -> usize {
        match self {
            VideoPixelFormat::I420 => 3,
            VideoPixelFormat::I420A => 4,
            VideoPixelFormat::I422 => 3,
            VideoPixelFormat::I444 => 3,
            VideoPixelFormat::Nv12 => 2,
            VideoPixelFormat::Rgba | VideoPixelFormat::Bgra => 1,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, VideoPixelFormat::I420A | VideoPixelFormat::Rgba | VideoPixelFormat::Bgra)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSampleFormat {
    U8,
    S16,
    S32,
    F32,
    U8Planar,
    S16Planar,
    S32Planar,
    F32Planar,
}

impl AudioSampleFormat {
    pub fn is_planar(self) -> bool {
        matches!(
            self,
            AudioSampleFormat::U8Planar
                | AudioSampleFormat::S16Planar
                | AudioSampleFormat::S32Planar
                | AudioSampleFormat::F32Planar
        )
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            AudioSampleFormat::U8 | AudioSampleFormat::U8Planar => 1,
            AudioSampleFormat::S16 | AudioSampleFormat::S16Planar => 2,
            AudioSampleFormat::S32 | AudioSampleFormat::S32Planar => 4,
            AudioSampleFormat::F32 | AudioSampleFormat::F32Planar => 4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum MediaFormat {
    Video(VideoPixelFormat),
    Audio(AudioSampleFormat),
}

/// Per-plane offset/stride, one entry per plane in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    pub offset: usize,
    pub stride: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoGeometry {
    pub coded_width: u32,
    pub coded_height: u32,
    pub visible_left: u32,
    pub visible_top: u32,
    pub visible_width: u32,
    pub visible_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioGeometry {
    pub sample_rate: u32,
    pub number_of_channels: u32,
    pub number_of_frames: u32,
}

#[derive(Debug, Clone, Copy)]
pub enum Geometry {
    Video(VideoGeometry),
    Audio(AudioGeometry),
}

/// Construction input for a new [`MediaResource`]. The caller supplies the
/// backing bytes once; after that the resource is immutable and sharing
/// happens through `clone`. `rotation`/`flip`/`color_space` only carry
/// meaning for video payloads — audio callers leave them at their defaults.
pub struct MediaResourceInit {
    pub format: MediaFormat,
    pub geometry: Geometry,
    pub timestamp_micros: i64,
    pub duration_micros: Option<i64>,
    pub layout: Vec<PlaneLayout>,
    pub data: Vec<u8>,
    pub rotation: Rotation,
    pub flip: bool,
    pub color_space: Option<ColorSpace>,
}

/// The shared, reference-counted backing store. Every clone of a
/// `MediaResource` points at the same `MediaPayload`; closing one handle
/// drops that handle's `Arc` but leaves the payload alive as long as any
/// other clone still holds a reference.
struct MediaPayload {
    format: MediaFormat,
    geometry: Geometry,
    timestamp_micros: i64,
    duration_micros: Option<i64>,
    layout: Vec<PlaneLayout>,
    data: Vec<u8>,
    rotation: Rotation,
    flip: bool,
    color_space: Option<ColorSpace>,
}

/// Immutable attributes returned by [`MediaResource::metadata`] (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaResourceMetadata {
    pub rotation: Rotation,
    pub flip: bool,
    pub color_space: Option<ColorSpace>,
}

/// Selects the region an `allocation_size`/`copy_to` call targets. Default
/// means "the whole resource, in its own format, plane 0" — the common case
/// for single-plane video and interleaved audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessOptions {
    /// Video only: convert to this pixel format before sizing/copying.
    /// `None` keeps the resource's own format.
    pub video_format: Option<VideoPixelFormat>,
    /// Channel plane for planar audio, or sub-plane for planar video.
    /// Interleaved audio formats only accept 0.
    pub plane_index: usize,
}

/// Row count of one plane for the given format/geometry, used to bound-check
/// `layout` entries and to size `allocation_size`/`copy_to` (§4.1).
fn plane_rows(format: MediaFormat, geometry: &Geometry, plane_index: usize) -> usize {
    match (format, geometry) {
        (MediaFormat::Video(pixel), Geometry::Video(g)) => {
            let chroma_rows = ((g.coded_height + 1) / 2) as usize;
            let luma_rows = g.coded_height as usize;
            match pixel {
                VideoPixelFormat::I420 | VideoPixelFormat::Nv12 => {
                    if plane_index == 0 { luma_rows } else { chroma_rows }
                }
                VideoPixelFormat::I420A => {
                    if plane_index == 0 || plane_index == 3 { luma_rows } else { chroma_rows }
                }
                VideoPixelFormat::I422 | VideoPixelFormat::I444 => luma_rows,
                VideoPixelFormat::Rgba | VideoPixelFormat::Bgra => luma_rows,
            }
        }
        // Audio planes are one contiguous run of samples; "rows" collapses to 1.
        _ => 1,
    }
}

/// A handle to pixel or sample data owned somewhere in the engine. Cloning
/// is cheap (an `Arc` bump); closing one clone never invalidates another.
pub struct MediaResource {
    payload: Option<Arc<MediaPayload>>,
}

impl MediaResource {
    /// Validates `layout` against `data` before constructing: every plane's
    /// `offset + rows*stride` must fit inside the payload, and a video
    /// resource must carry non-zero coded dimensions. Both failures are
    /// *invalid-layout* (§4.1, §8) since plane offsets are `usize` and so are
    /// never negative.
    pub fn new(init: MediaResourceInit) -> Result<Self, CodecError> {
        if let Geometry::Video(g) = &init.geometry {
            if g.coded_width == 0 || g.coded_height == 0 {
                return Err(CodecError::InvalidLayout {
                    message: format!("coded dimensions must be > 0, got {}x{}", g.coded_width, g.coded_height),
                });
            }
        }
        for (index, plane) in init.layout.iter().enumerate() {
            let rows = plane_rows(init.format, &init.geometry, index);
            let needed = plane.offset + rows.saturating_mul(plane.stride);
            if needed > init.data.len() {
                return Err(CodecError::InvalidLayout {
                    message: format!(
                        "plane {index}: offset {} + {rows} rows * stride {} = {needed} exceeds payload length {}",
                        plane.offset,
                        plane.stride,
                        init.data.len()
                    ),
                });
            }
        }
        Ok(MediaResource {
            payload: Some(Arc::new(MediaPayload {
                format: init.format,
                geometry: init.geometry,
                timestamp_micros: init.timestamp_micros,
                duration_micros: init.duration_micros,
                layout: init.layout,
                data: init.data,
                rotation: init.rotation,
                flip: init.flip,
                color_space: init.color_space,
            })),
        })
    }

    pub fn is_detached(&self) -> bool {
        self.payload.is_none()
    }

    fn payload(&self) -> Result<&Arc<MediaPayload>, CodecError> {
        self.payload.as_ref().ok_or(CodecError::Detached)
    }

    pub fn format(&self) -> Result<MediaFormat, CodecError> {
        Ok(self.payload()?.format)
    }

    pub fn geometry(&self) -> Result<Geometry, CodecError> {
        Ok(self.payload()?.geometry)
    }

    pub fn timestamp_micros(&self) -> Result<i64, CodecError> {
        Ok(self.payload()?.timestamp_micros)
    }

    pub fn duration_micros(&self) -> Result<Option<i64>, CodecError> {
        Ok(self.payload()?.duration_micros)
    }

    pub fn layout(&self) -> Result<&[PlaneLayout], CodecError> {
        Ok(self.payload()?.layout.as_slice())
    }

    /// Rotation/flip/color-space attributes (§4.1). Meaningless but harmless
    /// for audio resources, which carry the `MediaResourceInit` defaults.
    pub fn metadata(&self) -> Result<MediaResourceMetadata, CodecError> {
        let payload = self.payload()?;
        Ok(MediaResourceMetadata { rotation: payload.rotation, flip: payload.flip, color_space: payload.color_space })
    }

    fn resolve_plane(payload: &MediaPayload, options: AccessOptions) -> Result<(usize, usize), CodecError> {
        match payload.format {
            MediaFormat::Video(source_format) => {
                if let Some(requested) = options.video_format {
                    if requested != source_format {
                        return Err(CodecError::Unsupported {
                            message: format!("output format conversion to {requested:?} is not implemented"),
                        });
                    }
                }
            }
            MediaFormat::Audio(source_format) => {
                if !source_format.is_planar() && options.plane_index != 0 {
                    return Err(CodecError::InvalidLayout {
                        message: "plane_index must be 0 for interleaved audio formats".into(),
                    });
                }
            }
        }
        let plane = payload.layout.get(options.plane_index).ok_or_else(|| CodecError::InvalidLayout {
            message: format!("plane index {} out of range ({} planes)", options.plane_index, payload.layout.len()),
        })?;
        let rows = plane_rows(payload.format, &payload.geometry, options.plane_index);
        let len = rows.saturating_mul(plane.stride);
        Ok((plane.offset, len))
    }

    /// Bytes required to materialize `options.plane_index` (in
    /// `options.video_format` for video) — must not depend on mutable state
    /// (§4.1).
    pub fn allocation_size(&self, options: AccessOptions) -> Result<usize, CodecError> {
        let payload = self.payload()?;
        let (_, len) = Self::resolve_plane(&payload, options)?;
        Ok(len)
    }

    /// Copies the plane selected by `options` into `dst`. Fails with
    /// `BufferTooSmall` rather than truncating — a host must size its
    /// destination buffer with `allocation_size` first.
    pub fn copy_to(&self, dst: &mut [u8], options: AccessOptions) -> Result<usize, CodecError> {
        let payload = self.payload()?;
        let (offset, len) = Self::resolve_plane(&payload, options)?;
        if dst.len() < len {
            return Err(CodecError::BufferTooSmall { needed: len, got: dst.len() });
        }
        dst[..len].copy_from_slice(&payload.data[offset..offset + len]);
        Ok(len)
    }

    /// Independent clone sharing the same backing `Arc`. Closing the
    /// original afterwards must not affect this clone's readability.
    pub fn clone_resource(&self) -> Result<MediaResource, CodecError> {
        let payload = self.payload()?;
        Ok(MediaResource { payload: Some(Arc::clone(payload)) })
    }

    /// Detaches this handle. Other clones, if any, are unaffected.
    pub fn close(&mut self) {
        self.payload = None;
    }
}

impl Drop for MediaResource {
    fn drop(&mut self) {
        self.payload = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_init() -> MediaResourceInit {
        MediaResourceInit {
            format: MediaFormat::Video(VideoPixelFormat::Rgba),
            geometry: Geometry::Video(VideoGeometry {
                coded_width: 4,
                coded_height: 4,
                visible_left: 0,
                visible_top: 0,
                visible_width: 4,
                visible_height: 4,
            }),
            timestamp_micros: 0,
            duration_micros: Some(16_666),
            layout: vec![PlaneLayout { offset: 0, stride: 4 }],
            data: vec![1, 2, 3, 4],
            rotation: Rotation::Deg0,
            flip: false,
            color_space: None,
        }
    }

    #[test]
    fn close_on_original_does_not_detach_clone() {
        let mut original = MediaResource::new(sample_init()).unwrap();
        let clone = original.clone_resource().expect("clone before close");
        original.close();
        assert!(original.is_detached());
        assert!(!clone.is_detached());
        assert_eq!(clone.allocation_size(AccessOptions::default()).unwrap(), 4);
    }

    #[test]
    fn operations_on_detached_resource_fail() {
        let mut r = MediaResource::new(sample_init()).unwrap();
        r.close();
        assert!(matches!(r.format(), Err(CodecError::Detached)));
        assert!(matches!(r.clone_resource(), Err(CodecError::Detached)));
    }

    #[test]
    fn copy_to_undersized_buffer_reports_needed_size() {
        let r = MediaResource::new(sample_init()).unwrap();
        let mut dst = [0u8; 2];
        let err = r.copy_to(&mut dst, AccessOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::BufferTooSmall { needed: 4, got: 2 }));
    }

    #[test]
    fn zero_coded_dimensions_reject_construction_with_invalid_layout() {
        let mut init = sample_init();
        init.geometry = Geometry::Video(VideoGeometry {
            coded_width: 0,
            coded_height: 4,
            visible_left: 0,
            visible_top: 0,
            visible_width: 0,
            visible_height: 4,
        });
        assert!(matches!(MediaResource::new(init), Err(CodecError::InvalidLayout { .. })));
    }

    #[test]
    fn plane_layout_exceeding_payload_is_rejected() {
        let mut init = sample_init();
        init.layout = vec![PlaneLayout { offset: 0, stride: 100 }];
        assert!(matches!(MediaResource::new(init), Err(CodecError::InvalidLayout { .. })));
    }

    #[test]
    fn plane_offset_exceeding_payload_is_rejected() {
        let mut init = sample_init();
        init.layout = vec![PlaneLayout { offset: 4, stride: 4 }];
        assert!(matches!(MediaResource::new(init), Err(CodecError::InvalidLayout { .. })));
    }

    #[test]
    fn metadata_reports_rotation_and_flip() {
        let mut init = sample_init();
        init.rotation = Rotation::Deg180;
        init.flip = true;
        let r = MediaResource::new(init).unwrap();
        let meta = r.metadata().unwrap();
        assert_eq!(meta.rotation, Rotation::Deg180);
        assert!(meta.flip);
        assert!(meta.color_space.is_none());
    }

    #[test]
    fn requesting_a_different_video_output_format_is_unsupported() {
        let r = MediaResource::new(sample_init()).unwrap();
        let options = AccessOptions { video_format: Some(VideoPixelFormat::I420), plane_index: 0 };
        assert!(matches!(r.copy_to(&mut [0u8; 4], options), Err(CodecError::Unsupported { .. })));
    }

    #[test]
    fn interleaved_audio_rejects_nonzero_plane_index() {
        let init = MediaResourceInit {
            format: MediaFormat::Audio(AudioSampleFormat::F32),
            geometry: Geometry::Audio(AudioGeometry { sample_rate: 48_000, number_of_channels: 2, number_of_frames: 10 }),
            timestamp_micros: 0,
            duration_micros: None,
            layout: vec![PlaneLayout { offset: 0, stride: 80 }],
            data: vec![0u8; 80],
            rotation: Rotation::Deg0,
            flip: false,
            color_space: None,
        };
        let r = MediaResource::new(init).unwrap();
        let options = AccessOptions { video_format: None, plane_index: 1 };
        assert!(matches!(r.allocation_size(options), Err(CodecError::InvalidLayout { .. })));
    }

    #[test]
    fn planar_audio_selects_requested_channel_plane() {
        let init = MediaResourceInit {
            format: MediaFormat::Audio(AudioSampleFormat::F32Planar),
            geometry: Geometry::Audio(AudioGeometry { sample_rate: 48_000, number_of_channels: 2, number_of_frames: 10 }),
            timestamp_micros: 0,
            duration_micros: None,
            layout: vec![
                PlaneLayout { offset: 0, stride: 40 },
                PlaneLayout { offset: 40, stride: 40 },
            ],
            data: vec![0u8; 80],
            rotation: Rotation::Deg0,
            flip: false,
            color_space: None,
        };
        let r = MediaResource::new(init).unwrap();
        let options = AccessOptions { video_format: None, plane_index: 1 };
        assert_eq!(r.allocation_size(options).unwrap(), 40);
        let mut dst = [0u8; 40];
        assert_eq!(r.copy_to(&mut dst, options).unwrap(), 40);
    }
}
