// crates/codec-core/src/encoded_chunk.rs
//
// The bitstream-side counterpart to `MediaResource`: bytes produced by an
// encoder or consumed by a decoder, tagged with the metadata needed to
// reorder and key-frame-gate a decode stream (§5, §4.6).

use std::sync::Arc;

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    Key,
    Delta,
}

struct ChunkPayload {
    chunk_type: ChunkType,
    timestamp_micros: i64,
    duration_micros: Option<i64>,
    data: Vec<u8>,
}

/// An encoded chunk of bitstream data. Like [`crate::media_resource::MediaResource`]
/// it is reference-counted internally and supports independent clone/close,
/// since encoders hand chunks to a queue that may outlive the producing call.
pub struct EncodedChunk {
    payload: Option<Arc<ChunkPayload>>,
}

impl EncodedChunk {
    pub fn new(chunk_type: ChunkType, timestamp_micros: i64, duration_micros: Option<i64>, data: Vec<u8>) -> Self {
        EncodedChunk {
            payload: Some(Arc::new(ChunkPayload { chunk_type, timestamp_micros, duration_micros, data })),
        }
    }

    pub fn is_detached(&self) -> bool {
        self.payload.is_none()
    }

    fn payload(&self) -> Result<&Arc<ChunkPayload>, CodecError> {
        self.payload.as_ref().ok_or(CodecError::Detached)
    }

    pub fn chunk_type(&self) -> Result<ChunkType, CodecError> {
        Ok(self.payload()?.chunk_type)
    }

    pub fn timestamp_micros(&self) -> Result<i64, CodecError> {
        Ok(self.payload()?.timestamp_micros)
    }

    pub fn duration_micros(&self) -> Result<Option<i64>, CodecError> {
        Ok(self.payload()?.duration_micros)
    }

    pub fn byte_length(&self) -> Result<usize, CodecError> {
        Ok(self.payload()?.data.len())
    }

    pub fn copy_to(&self, dst: &mut [u8]) -> Result<usize, CodecError> {
        let payload = self.payload()?;
        if dst.len() < payload.data.len() {
            return Err(CodecError::BufferTooSmall { needed: payload.data.len(), got: dst.len() });
        }
        dst[..payload.data.len()].copy_from_slice(&payload.data);
        Ok(payload.data.len())
    }

    pub fn clone_chunk(&self) -> Result<EncodedChunk, CodecError> {
        let payload = self.payload()?;
        Ok(EncodedChunk { payload: Some(Arc::clone(payload)) })
    }

    pub fn close(&mut self) {
        self.payload = None;
    }
}

impl Drop for EncodedChunk {
    fn drop(&mut self) {
        self.payload = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_chunk_round_trips_bytes() {
        let chunk = EncodedChunk::new(ChunkType::Key, 0, Some(33_333), vec![9, 9, 9]);
        let mut dst = [0u8; 3];
        assert_eq!(chunk.copy_to(&mut dst).unwrap(), 3);
        assert_eq!(dst, [9, 9, 9]);
        assert_eq!(chunk.chunk_type().unwrap(), ChunkType::Key);
    }

    #[test]
    fn detached_chunk_reports_detached_error() {
        let mut chunk = EncodedChunk::new(ChunkType::Delta, 1000, None, vec![1]);
        chunk.close();
        assert!(matches!(chunk.byte_length(), Err(CodecError::Detached)));
    }
}
