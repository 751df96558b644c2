// crates/codec-runtime/src/probe.rs
//
// The static support probe (§4.5, §4.8, §5). Stateless, so unlike
// `configure` it never touches the control queue — it is run on a detached
// background thread and resolved through the same completion-handle shape
// `FlushCompletion` uses, since both are "driver thread never blocks"
// suspension points.

use std::sync::{Arc, Condvar, Mutex};

use codec_core::{CodecBackend, SupportProbeResult};

struct ProbeInner {
    done: Mutex<Option<SupportProbeResult>>,
    condvar: Condvar,
}

pub struct ProbeCompletion {
    inner: Arc<ProbeInner>,
}

impl ProbeCompletion {
    pub fn wait(self) -> SupportProbeResult {
        let mut guard = self.inner.done.lock().unwrap();
        while guard.is_none() {
            guard = self.inner.condvar.wait(guard).unwrap();
        }
        guard.take().unwrap()
    }

    pub fn poll(&self) -> Option<SupportProbeResult> {
        self.inner.done.lock().unwrap().clone()
    }
}

/// Runs `B::is_config_supported` on a background thread and returns a
/// handle resolved once it completes. The probe itself must not allocate
/// persistent backend state — it only ever calls the static trait method.
pub fn is_config_supported<B>(config: B::Config) -> ProbeCompletion
where
    B: CodecBackend + 'static,
    B::Config: Send + 'static,
{
    let inner = Arc::new(ProbeInner { done: Mutex::new(None), condvar: Condvar::new() });
    let inner2 = Arc::clone(&inner);
    std::thread::spawn(move || {
        let result = B::is_config_supported(&config);
        let mut guard = inner2.done.lock().unwrap();
        *guard = Some(result);
        inner2.condvar.notify_all();
    });
    ProbeCompletion { inner }
}
