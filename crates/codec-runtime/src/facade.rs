// crates/codec-runtime/src/facade.rs
//
// The driver-thread-facing object per codec instance (§4.7). Mirrors the
// split in `velocut_media::worker::MediaWorker` between the handle the GUI
// thread holds (channels + job bookkeeping) and the thread doing the real
// work — generalized so state-machine and queue-size bookkeeping live here
// while backend-specific work lives entirely on the worker side of the
// channel.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use codec_core::{CodecBackend, CodecError, SupportProbeResult};

use crate::callback_channel::CallbackChannel;
use crate::message::ControlMessage;
use crate::queue::{ControlQueue, PushResult};
use crate::resource_manager::{FacadeHandle, ReclaimableFacade, ResourceManager};
use crate::worker::{CodecWorker, WorkerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecState {
    Unconfigured,
    Configured,
    Closed,
}

/// Completion handle returned by `flush()`. Resolved exactly once, either
/// with `Ok(())` or with `CodecError::Aborted`/whatever error closed the
/// facade meanwhile.
pub struct FlushCompletion {
    inner: Arc<FlushInner>,
}

struct FlushInner {
    done: Mutex<Option<Result<(), CodecError>>>,
    condvar: std::sync::Condvar,
}

impl FlushCompletion {
    fn new() -> (Self, Arc<FlushInner>) {
        let inner = Arc::new(FlushInner { done: Mutex::new(None), condvar: std::sync::Condvar::new() });
        (FlushCompletion { inner: Arc::clone(&inner) }, inner)
    }

    /// Blocks the calling thread until the flush resolves. The facade's own
    /// API never blocks the driver thread this way — this is exposed for
    /// hosts that bridge into a synchronous context.
    pub fn wait(self) -> Result<(), CodecError> {
        let mut guard = self.inner.done.lock().unwrap();
        while guard.is_none() {
            guard = self.inner.condvar.wait(guard).unwrap();
        }
        guard.take().unwrap()
    }

    /// Non-blocking poll, for hosts driving their own event loop.
    pub fn poll(&self) -> Option<Result<(), CodecError>> {
        self.inner.done.lock().unwrap().clone()
    }
}

fn resolve(inner: &Arc<FlushInner>, result: Result<(), CodecError>) {
    let mut guard = inner.done.lock().unwrap();
    if guard.is_none() {
        *guard = Some(result);
        inner.condvar.notify_all();
    }
}

/// The public per-instance object. Generic over the backend so
/// `VideoEncoder`/`VideoDecoder`/`AudioEncoder`/`AudioDecoder` are thin
/// typed wrappers (see their respective modules) around one engine.
pub struct CodecFacade<B: CodecBackend> {
    state: Mutex<CodecState>,
    queue_size: AtomicUsize,
    dequeue_scheduled: AtomicBool,
    queue: Arc<ControlQueue<ControlMessage<B>>>,
    channel: Arc<CallbackChannel<WorkerEvent<B>>>,
    worker_handle: Mutex<Option<JoinHandle<()>>>,
    flush_registry: Mutex<VecDeque<(u64, Arc<FlushInner>)>>,
    next_flush_id: AtomicU64,
    output_callback: Box<dyn Fn(B::Output, codec_core::EncodedChunkMetadata) + Send + Sync>,
    error_callback: Box<dyn Fn(CodecError) + Send + Sync>,
    dequeue_callback: Box<dyn Fn() + Send + Sync>,
    last_activity_micros: AtomicI64,
    resource_manager_handle: Mutex<Option<FacadeHandle>>,
    kind: codec_core::CodecKind,
}

impl<B> CodecFacade<B>
where
    B: CodecBackend + Send + 'static,
    B::Config: Send,
    B::Input: Send,
    B::Output: Send,
{
    pub fn new(
        kind: codec_core::CodecKind,
        callback_capacity: usize,
        output_callback: impl Fn(B::Output, codec_core::EncodedChunkMetadata) + Send + Sync + 'static,
        error_callback: impl Fn(CodecError) + Send + Sync + 'static,
        dequeue_callback: impl Fn() + Send + Sync + 'static,
    ) -> Arc<Self> {
        let queue = Arc::new(ControlQueue::new());
        let channel = Arc::new(CallbackChannel::new(callback_capacity));
        let worker_handle = CodecWorker::spawn(Arc::clone(&queue), Arc::clone(&channel));
        Arc::new(CodecFacade {
            state: Mutex::new(CodecState::Unconfigured),
            queue_size: AtomicUsize::new(0),
            dequeue_scheduled: AtomicBool::new(false),
            queue,
            channel,
            worker_handle: Mutex::new(Some(worker_handle)),
            flush_registry: Mutex::new(VecDeque::new()),
            next_flush_id: AtomicU64::new(0),
            output_callback: Box::new(output_callback),
            error_callback: Box::new(error_callback),
            dequeue_callback: Box::new(dequeue_callback),
            last_activity_micros: AtomicI64::new(0),
            kind,
            resource_manager_handle: Mutex::new(None),
        })
    }

    pub fn register_with(self: &Arc<Self>, manager: &Arc<ResourceManager>, now_micros: i64) {
        let weak: std::sync::Weak<dyn ReclaimableFacade> = Arc::downgrade(self);
        let handle = manager.register(weak, self.kind, now_micros);
        *self.resource_manager_handle.lock().unwrap() = Some(handle);
        self.last_activity_micros.store(now_micros, Ordering::Release);
    }

    pub fn state(&self) -> CodecState {
        *self.state.lock().unwrap()
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size.load(Ordering::Acquire)
    }

    pub fn configure(&self, config: B::Config) -> Result<(), CodecError> {
        let mut state = self.state.lock().unwrap();
        if *state == CodecState::Closed {
            return Err(CodecError::invalid_state("configure called on a closed codec"));
        }
        match self.queue.push(ControlMessage::Configure(config)) {
            PushResult::Accepted => {}
            PushResult::RejectedShutdown => return Err(CodecError::invalid_state("worker already shut down")),
        }
        *state = CodecState::Configured;
        Ok(())
    }

    pub fn process(&self, input: B::Input, now_micros: i64) -> Result<(), CodecError> {
        {
            let state = self.state.lock().unwrap();
            if *state != CodecState::Configured {
                return Err(CodecError::invalid_state("encode/decode called while not configured"));
            }
        }
        self.last_activity_micros.store(now_micros, Ordering::Release);
        match self.queue.push(ControlMessage::Process(input)) {
            PushResult::Accepted => {
                self.queue_size.fetch_add(1, Ordering::AcqRel);
                Ok(())
            }
            PushResult::RejectedShutdown => Err(CodecError::invalid_state("worker already shut down")),
        }
    }

    pub fn flush(&self) -> Result<FlushCompletion, CodecError> {
        let state = self.state.lock().unwrap();
        if *state != CodecState::Configured {
            return Err(CodecError::invalid_state("flush called while not configured"));
        }
        let id = self.next_flush_id.fetch_add(1, Ordering::AcqRel);
        let (completion, inner) = FlushCompletion::new();
        self.flush_registry.lock().unwrap().push_back((id, inner));
        match self.queue.push(ControlMessage::Flush(id)) {
            PushResult::Accepted => Ok(completion),
            PushResult::RejectedShutdown => Err(CodecError::invalid_state("worker already shut down")),
        }
    }

    /// Cancels all pending messages and pending flush completions
    /// synchronously from the driver's perspective (§5 Cancellation).
    pub fn reset(&self) -> Result<(), CodecError> {
        let mut state = self.state.lock().unwrap();
        if *state == CodecState::Closed {
            return Err(CodecError::invalid_state("reset called on a closed codec"));
        }
        let pending = self.queue.clear();
        drop(pending); // any media resources inside are dropped here, on the driver thread
        self.queue_size.store(0, Ordering::Release);
        self.reject_all_flushes(CodecError::Aborted);
        match self.queue.push(ControlMessage::Reset) {
            PushResult::Accepted => {}
            PushResult::RejectedShutdown => {}
        }
        *state = CodecState::Unconfigured;
        Ok(())
    }

    /// Idempotent and non-blocking: the worker join happens on a background
    /// thread so `close()` never makes the driver thread wait on whatever
    /// the worker was mid-processing (§4.7).
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == CodecState::Closed {
            return;
        }
        let pending = self.queue.clear();
        drop(pending);
        self.queue_size.store(0, Ordering::Release);
        self.reject_all_flushes(CodecError::Aborted);
        let _ = self.queue.push(ControlMessage::Close);
        *state = CodecState::Closed;
        drop(state);

        self.channel.release();
        let handle = self.worker_handle.lock().unwrap().take();
        let rm_handle = self.resource_manager_handle.lock().unwrap().take();
        std::thread::spawn(move || {
            if let Some(handle) = handle {
                let _ = handle.join();
            }
            if let Some(rm_handle) = rm_handle {
                rm_handle.unregister();
            }
        });
    }

    fn reject_all_flushes(&self, err: CodecError) {
        let mut registry = self.flush_registry.lock().unwrap();
        for (_, inner) in registry.drain(..) {
            resolve(&inner, Err(err.clone()));
        }
    }

    /// Drains dispatched worker events and applies them to facade state.
    /// A host calls this from its own event loop; in an async host this
    /// would be driven by channel-readiness notification instead of
    /// polling, but the public contract (output/error/dequeue callbacks,
    /// flush-promise resolution) is identical either way.
    pub fn pump(&self) {
        let mut any_output = false;
        while let Some(event) = self.channel.try_recv() {
            match event {
                WorkerEvent::Output(output, metadata) => {
                    self.decrement_queue_size();
                    any_output = true;
                    (self.output_callback)(output, metadata);
                }
                WorkerEvent::Error(err) => {
                    let closes = err.closes_facade();
                    (self.error_callback)(err);
                    if closes {
                        let mut state = self.state.lock().unwrap();
                        *state = CodecState::Closed;
                    }
                }
                WorkerEvent::FlushComplete(id) => {
                    let mut registry = self.flush_registry.lock().unwrap();
                    if let Some(pos) = registry.iter().position(|(rid, _)| *rid == id) {
                        let (_, inner) = registry.remove(pos).unwrap();
                        resolve(&inner, Ok(()));
                    }
                }
                WorkerEvent::ResetComplete => {}
                WorkerEvent::CloseNotify => {
                    let mut state = self.state.lock().unwrap();
                    *state = CodecState::Closed;
                }
            }
        }
        let dropped = self.channel.take_dropped_outputs();
        for _ in 0..dropped {
            self.decrement_queue_size();
        }
        if dropped > 0 {
            any_output = true;
        }
        if any_output {
            self.dequeue_scheduled.store(true, Ordering::Release);
            (self.dequeue_callback)();
            self.dequeue_scheduled.store(false, Ordering::Release);
        }
    }

    fn decrement_queue_size(&self) {
        let _ = self.queue_size.fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
            if cur == 0 {
                None
            } else {
                Some(cur - 1)
            }
        });
    }

    /// Forces this facade closed with `reclamation-error`, as issued by the
    /// [`ResourceManager`]. Idempotent.
    pub fn reclaim(&self) {
        let already_closed = self.state.lock().unwrap().clone() == CodecState::Closed;
        if already_closed {
            return;
        }
        (self.error_callback)(CodecError::ReclamationError);
        self.close();
    }

    pub fn last_activity_micros(&self) -> i64 {
        self.last_activity_micros.load(Ordering::Acquire)
    }
}

impl<B: CodecBackend> Drop for CodecFacade<B> {
    fn drop(&mut self) {
        self.channel.release();
    }
}

impl<B> ReclaimableFacade for CodecFacade<B>
where
    B: CodecBackend + Send + 'static,
    B::Config: Send,
    B::Input: Send,
    B::Output: Send,
{
    fn reclaim(&self) {
        CodecFacade::reclaim(self);
    }

    fn last_activity_micros(&self) -> i64 {
        CodecFacade::last_activity_micros(self)
    }

    fn kind(&self) -> codec_core::CodecKind {
        self.kind
    }
}

pub fn is_config_supported<B: CodecBackend>(config: &B::Config) -> SupportProbeResult {
    B::is_config_supported(config)
}
