// crates/codec-runtime/src/message.rs
//
// The tagged record enqueued by the facade and consumed by the worker
// (§3 Control Message, §4.3). Generic over the backend so one queue/worker
// pair serves any of the four codec kinds.

use codec_core::CodecBackend;

pub struct EncodeOptions {
    pub force_keyframe: bool,
}

pub enum ControlMessage<B: CodecBackend> {
    Configure(B::Config),
    Process(B::Input),
    Flush(u64),
    Reset,
    Close,
}
