// crates/codec-runtime/src/worker.rs
//
// The codec worker (§4.6): a single-threaded cooperative loop that owns
// the codec backend exclusively. Grounded on `velocut_media::worker::MediaWorker`
// — a dedicated `thread::spawn` per worker, blocking on a channel, feeding a
// long-lived FFmpeg context, and dispatching results back across a channel —
// generalized here from "media job queue" to "per-instance codec control
// loop" and made generic over `CodecBackend` so the same loop drives every
// codec kind.

use std::sync::Arc;
use std::thread::JoinHandle;

use codec_core::{CodecBackend, CodecError, EncodedChunkMetadata, SupportVerdict, SvcMetadata};

use crate::callback_channel::CallbackChannel;
use crate::message::ControlMessage;
use crate::queue::{ControlQueue, PopBlocking};

/// Events the worker dispatches to the driver thread via the
/// [`CallbackChannel`]. Carried generically so one enum covers all four
/// codec kinds.
pub enum WorkerEvent<B: CodecBackend> {
    Output(B::Output, EncodedChunkMetadata),
    Error(CodecError),
    FlushComplete(u64),
    ResetComplete,
    CloseNotify,
}

/// Buffers backend outputs until they can be released in presentation
/// order. With `window == 0` this degenerates to pass-through, which is
/// the only behavior the in-process `reference` backend exercises.
struct ReorderBuffer<O> {
    window: usize,
    pending: Vec<(i64, O)>,
}

impl<O> ReorderBuffer<O> {
    fn new(window: usize) -> Self {
        ReorderBuffer { window, pending: Vec::new() }
    }

    /// Feeds one newly produced output. Returns outputs now safe to
    /// release in presentation order, oldest first.
    fn push(&mut self, timestamp: Option<i64>, output: O) -> Vec<O> {
        let Some(ts) = timestamp else {
            return vec![output];
        };
        if self.window == 0 {
            return vec![output];
        }
        self.pending.push((ts, output));
        if self.pending.len() <= self.window {
            return Vec::new();
        }
        self.pending.sort_by_key(|(ts, _)| *ts);
        let ready = self.pending.drain(..self.pending.len() - self.window).collect::<Vec<_>>();
        ready.into_iter().map(|(_, o)| o).collect()
    }

    /// Releases everything still buffered, in presentation order. Called
    /// on flush and on teardown.
    fn drain_all(&mut self) -> Vec<O> {
        self.pending.sort_by_key(|(ts, _)| *ts);
        self.pending.drain(..).map(|(_, o)| o).collect()
    }
}

pub struct CodecWorker<B: CodecBackend> {
    queue: Arc<ControlQueue<ControlMessage<B>>>,
    channel: Arc<CallbackChannel<WorkerEvent<B>>>,
    backend: Option<B>,
    key_chunk_required: bool,
    active_orientation: Option<u32>,
    active_output_config: Option<codec_core::DecoderConfigDescriptor>,
    reorder: ReorderBuffer<B::Output>,
}

impl<B: CodecBackend> CodecWorker<B> {
    fn dispatch(&self, event: WorkerEvent<B>) {
        // A dropped/full channel means the output is lost-to-driver but
        // never lost-to-resource: the event (and whatever native handle it
        // carries) is simply dropped here, on the worker thread. When the
        // dropped event was an `Output`, the facade still needs to know —
        // its queue_size counter and dequeue callback must behave as if the
        // output had arrived and been consumed (§5 Backpressure) — so that
        // case is recorded on the channel itself rather than requeued,
        // since requeuing onto a channel that just rejected a send would
        // only repeat the same rejection.
        let is_output = matches!(event, WorkerEvent::Output(..));
        match self.channel.dispatch(event) {
            crate::callback_channel::DispatchResult::Delivered
            | crate::callback_channel::DispatchResult::Queued => {}
            crate::callback_channel::DispatchResult::RejectedReleased(_)
            | crate::callback_channel::DispatchResult::RejectedFull(_) => {
                if is_output {
                    self.channel.note_output_dropped();
                }
                tracing::debug!(target: "codec_runtime::worker", "output dropped: channel released or full");
            }
        }
    }

    fn dispatch_outputs(&mut self, outputs: Vec<B::Output>) {
        let window = self.backend.as_ref().map(|b| b.reorder_window()).unwrap_or(0);
        if self.reorder.window != window {
            self.reorder = ReorderBuffer::new(window);
        }
        for output in outputs {
            let ts = self.backend.as_ref().and_then(|b| b.output_timestamp_micros(&output));
            for ready in self.reorder.push(ts, output) {
                self.dispatch_one_output(ready);
            }
        }
    }

    fn dispatch_one_output(&mut self, output: B::Output) {
        let current = self.backend.as_ref().and_then(|b| b.current_decoder_config());
        let metadata = if current.is_some() && current != self.active_output_config {
            self.active_output_config = current.clone();
            EncodedChunkMetadata { decoder_config: current, svc: SvcMetadata::default() }
        } else {
            EncodedChunkMetadata { decoder_config: None, svc: SvcMetadata::default() }
        };
        self.dispatch(WorkerEvent::Output(output, metadata));
    }

    fn handle_configure(&mut self, config: B::Config) -> bool {
        if self.backend.take().is_some() {
            tracing::debug!(target: "codec_runtime::worker", "tearing down backend for reconfigure");
        }
        if matches!(B::is_config_supported(&config).verdict, SupportVerdict::Unsupported) {
            self.dispatch(WorkerEvent::Error(CodecError::Unsupported { message: "configuration not supported".into() }));
            self.dispatch(WorkerEvent::CloseNotify);
            return false;
        }
        match B::configure(&config) {
            Ok(backend) => {
                self.key_chunk_required = backend.gates_on_key_chunk();
                self.active_orientation = None;
                self.active_output_config = None;
                self.reorder = ReorderBuffer::new(backend.reorder_window());
                self.backend = Some(backend);
                true
            }
            Err(err) => {
                let closes = err.closes_facade();
                self.dispatch(WorkerEvent::Error(err));
                if closes {
                    self.dispatch(WorkerEvent::CloseNotify);
                }
                !closes
            }
        }
    }

    fn handle_process(&mut self, input: B::Input) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return true;
        };

        if backend.gates_on_key_chunk() && self.key_chunk_required && !backend.input_is_key(&input) {
            self.dispatch(WorkerEvent::Error(CodecError::DataError {
                message: "non-key chunk received while a key chunk is required".into(),
            }));
            self.dispatch(WorkerEvent::CloseNotify);
            return false;
        }

        if let Some(orientation) = backend.input_orientation(&input) {
            match self.active_orientation {
                None => self.active_orientation = Some(orientation),
                Some(active) if active == orientation => {}
                Some(_) => {
                    self.dispatch(WorkerEvent::Error(CodecError::OrientationError));
                    self.dispatch(WorkerEvent::CloseNotify);
                    return false;
                }
            }
        }

        match backend.process(input) {
            Ok(outputs) => {
                if self.key_chunk_required && !outputs.is_empty() {
                    self.key_chunk_required = false;
                }
                self.dispatch_outputs(outputs);
                true
            }
            Err(err) => {
                let closes = err.closes_facade();
                self.dispatch(WorkerEvent::Error(err));
                if closes {
                    self.dispatch(WorkerEvent::CloseNotify);
                }
                !closes
            }
        }
    }

    fn handle_flush(&mut self, promise_id: u64) {
        if let Some(backend) = self.backend.as_mut() {
            match backend.drain() {
                Ok(outputs) => self.dispatch_outputs(outputs),
                Err(err) => self.dispatch(WorkerEvent::Error(err)),
            }
        }
        for ready in self.reorder.drain_all() {
            self.dispatch_one_output(ready);
        }
        if self.backend.as_ref().map(|b| b.gates_on_key_chunk()).unwrap_or(false) {
            self.key_chunk_required = true;
        }
        self.dispatch(WorkerEvent::FlushComplete(promise_id));
    }

    fn teardown_backend(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            let _ = backend.drain();
        }
        self.backend = None;
        self.key_chunk_required = false;
        self.active_orientation = None;
        self.active_output_config = None;
        self.reorder = ReorderBuffer::new(0);
    }

    fn handle_reset(&mut self) {
        self.teardown_backend();
        self.dispatch(WorkerEvent::ResetComplete);
    }

    fn run(mut self) {
        loop {
            match self.queue.pop_blocking() {
                PopBlocking::Shutdown => break,
                PopBlocking::Message(ControlMessage::Close) => {
                    self.teardown_backend();
                    self.dispatch(WorkerEvent::CloseNotify);
                    break;
                }
                PopBlocking::Message(ControlMessage::Configure(config)) => {
                    if !self.handle_configure(config) {
                        break;
                    }
                }
                PopBlocking::Message(ControlMessage::Process(input)) => {
                    if !self.handle_process(input) {
                        break;
                    }
                }
                PopBlocking::Message(ControlMessage::Flush(id)) => {
                    self.handle_flush(id);
                }
                PopBlocking::Message(ControlMessage::Reset) => {
                    self.handle_reset();
                }
            }
        }
    }

    /// Spawns the dedicated worker thread and returns its join handle. The
    /// worker is the sole owner of `queue`/`channel` from this point;
    /// the facade only ever reaches it through those two shared handles.
    pub fn spawn(
        queue: Arc<ControlQueue<ControlMessage<B>>>,
        channel: Arc<CallbackChannel<WorkerEvent<B>>>,
    ) -> JoinHandle<()>
    where
        B: Send + 'static,
        B::Config: Send,
        B::Input: Send,
        B::Output: Send,
    {
        let worker = CodecWorker {
            queue,
            channel,
            backend: None,
            key_chunk_required: false,
            active_orientation: None,
            active_output_config: None,
            reorder: ReorderBuffer::new(0),
        };
        std::thread::Builder::new()
            .name("codec-worker".into())
            .spawn(move || worker.run())
            .expect("failed to spawn codec worker thread")
    }
}
