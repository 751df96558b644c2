// crates/codec-core/src/kind.rs

/// Which of the four facade shapes a backend/instance implements. Used by
/// the resource manager and the support probe to group instances without
/// downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    VideoDecoder,
    VideoEncoder,
    AudioDecoder,
    AudioEncoder,
}

impl CodecKind {
    pub fn is_decoder(self) -> bool {
        matches!(self, CodecKind::VideoDecoder | CodecKind::AudioDecoder)
    }

    pub fn is_video(self) -> bool {
        matches!(self, CodecKind::VideoDecoder | CodecKind::VideoEncoder)
    }
}
