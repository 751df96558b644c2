// crates/codec-core/src/backend.rs
//
// The seam between the generic engine (queue, worker, facade — all in
// `codec-runtime`) and a concrete codec implementation. Grounded on
// `velocut_core::transitions::VideoTransition`: a small trait plus a
// registry-style lookup, generalized here with associated types so the same
// worker/facade machinery drives four different shapes (video/audio x
// encode/decode) without duplicating the control-queue plumbing per kind.

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportVerdict {
    Supported,
    Unsupported,
}

#[derive(Debug, Clone, Copy)]
pub struct SupportProbeResult {
    pub verdict: SupportVerdict,
    pub hardware_accelerated: bool,
}

/// Decoder-specific descriptor returned alongside key chunks that carry a
/// new configuration (SVC/parameter-set changes mid-stream), mirroring the
/// `DecoderConfig` callback payload in §4.4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfigDescriptor {
    pub description: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct SvcMetadata {
    pub temporal_layer_id: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct EncodedChunkMetadata {
    pub decoder_config: Option<DecoderConfigDescriptor>,
    pub svc: SvcMetadata,
}

/// One unit of work a backend hands back to the worker after processing an
/// input. A decoder yields `Media`, an encoder yields `Chunk`.
pub enum BackendOutput<Media, Chunk> {
    Media(Media),
    Chunk(Chunk, EncodedChunkMetadata),
}

/// Implemented once per concrete codec (out of scope for this engine beyond
/// the in-process `reference` pass-through used for testing). The worker
/// (`codec-runtime::worker::CodecWorker`) owns the only handle to a
/// `CodecBackend` instance and calls it exclusively from its dedicated
/// thread — the trait itself carries no thread-safety bound because nothing
/// outside the worker ever touches it concurrently.
pub trait CodecBackend: Sized {
    type Config: Clone;
    type Input;
    type Output;

    fn configure(config: &Self::Config) -> Result<Self, CodecError>;

    /// Processes one input, returning zero or more outputs. Decoders may
    /// buffer: a key-framed input can legitimately yield nothing until a
    /// later call flushes the backend's internal lookahead.
    fn process(&mut self, input: Self::Input) -> Result<Vec<Self::Output>, CodecError>;

    /// Drains any buffered outputs. Called on `flush()` and on `close()`
    /// via `reset()` beforehand.
    fn drain(&mut self) -> Result<Vec<Self::Output>, CodecError>;

    /// Static probe — must not allocate persistent backend state (§4.5).
    fn is_config_supported(config: &Self::Config) -> SupportProbeResult;

    /// Maximum number of outputs this backend may hold back before the
    /// presentation-order reorder buffer must release them regardless
    /// (0 for formats with no reordering, e.g. the reference backend).
    fn reorder_window(&self) -> usize {
        0
    }

    /// Presentation timestamp of an output, used by the worker's reorder
    /// buffer. Backends with no reordering (reorder_window() == 0) may
    /// leave this at the default; the buffer only consults it when
    /// `reorder_window() > 0`.
    fn output_timestamp_micros(&self, _output: &Self::Output) -> Option<i64> {
        None
    }

    /// Decoders set this once an encoded input requires a preceding key
    /// chunk (§4.6 `key-chunk-required`). Default `false` — only decoder
    /// backends opt in.
    fn gates_on_key_chunk(&self) -> bool {
        false
    }

    /// Whether `input` is a key chunk. Only consulted when
    /// `gates_on_key_chunk()` is true.
    fn input_is_key(&self, _input: &Self::Input) -> bool {
        true
    }

    /// Frame orientation carried by an encoder input, if the backend cares
    /// about orientation consistency (§4.6 `active-orientation`). `None`
    /// means "no orientation check applies" — the default for every kind
    /// except video encoders.
    fn input_orientation(&self, _input: &Self::Input) -> Option<u32> {
        None
    }

    /// Current decoder-config descriptor implied by this backend's active
    /// encoder state, if any. The worker diffs this against the
    /// previously emitted descriptor to decide whether to attach a fresh
    /// one to the next output (§4.6 Encode).
    fn current_decoder_config(&self) -> Option<DecoderConfigDescriptor> {
        None
    }
}
