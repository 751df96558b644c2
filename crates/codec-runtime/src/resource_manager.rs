// crates/codec-runtime/src/resource_manager.rs
//
// Process-wide singleton tracking idle codec instances (§4.9). Grounded on
// the `Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>` cancel-flag registry in
// `velocut_media::worker::MediaWorker` — same shape (mutex-guarded map of
// weak handles keyed by an id), generalized from per-job cancellation to
// per-facade reclamation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use codec_core::CodecKind;
use once_cell::sync::Lazy;

/// Implemented by `CodecFacade<B>` for every backend `B`; lets the manager
/// hold a single `Vec` of heterogeneous facades without generic parameters
/// leaking into this module.
pub trait ReclaimableFacade: Send + Sync {
    fn reclaim(&self);
    fn last_activity_micros(&self) -> i64;
    fn kind(&self) -> CodecKind;
}

struct Registration {
    id: u64,
    target: Weak<dyn ReclaimableFacade>,
    kind: CodecKind,
}

pub struct ResourceManager {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

/// Returned by `register`; drop or call `unregister` explicitly when the
/// facade closes so the manager's registry does not accumulate dead
/// entries between reclaim sweeps.
pub struct FacadeHandle {
    id: u64,
    manager: Arc<ResourceManager>,
}

impl FacadeHandle {
    pub fn unregister(self) {
        let mut registrations = self.manager.registrations.lock().unwrap();
        registrations.retain(|r| r.id != self.id);
    }
}

impl ResourceManager {
    pub fn new() -> Arc<Self> {
        Arc::new(ResourceManager { registrations: Mutex::new(Vec::new()), next_id: AtomicU64::new(0) })
    }

    pub fn register(
        self: &Arc<Self>,
        target: Weak<dyn ReclaimableFacade>,
        kind: CodecKind,
        _now_micros: i64,
    ) -> FacadeHandle {
        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        self.registrations.lock().unwrap().push(Registration { id, target, kind });
        FacadeHandle { id, manager: Arc::clone(self) }
    }

    /// For every registered, still-live facade whose last activity predates
    /// `now - threshold_micros`, issues a reclamation request. Dead weak
    /// references (facade already dropped) are pruned as a side effect.
    pub fn reclaim_inactive(&self, now_micros: i64, threshold_micros: i64) {
        let mut registrations = self.registrations.lock().unwrap();
        registrations.retain(|reg| {
            let Some(target) = reg.target.upgrade() else { return false };
            if now_micros.saturating_sub(target.last_activity_micros()) > threshold_micros {
                target.reclaim();
            }
            true
        });
    }

    pub fn registered_count(&self) -> usize {
        self.registrations.lock().unwrap().len()
    }

    pub fn registered_kinds(&self) -> Vec<CodecKind> {
        self.registrations.lock().unwrap().iter().filter_map(|r| r.target.upgrade().map(|_| r.kind)).collect()
    }
}

/// The process-wide instance. Facades register here by default; tests that
/// need isolation construct their own `ResourceManager::new()` instead.
pub static GLOBAL_RESOURCE_MANAGER: Lazy<Arc<ResourceManager>> = Lazy::new(ResourceManager::new);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    struct FakeFacade {
        reclaimed: AtomicBool,
        last_activity: i64,
        kind: CodecKind,
    }

    impl ReclaimableFacade for FakeFacade {
        fn reclaim(&self) {
            self.reclaimed.store(true, Ordering::Release);
        }
        fn last_activity_micros(&self) -> i64 {
            self.last_activity
        }
        fn kind(&self) -> CodecKind {
            self.kind
        }
    }

    #[test]
    fn reclaims_only_facades_past_threshold() {
        let manager = ResourceManager::new();
        let fresh = Arc::new(FakeFacade { reclaimed: AtomicBool::new(false), last_activity: 900, kind: CodecKind::VideoEncoder });
        let stale = Arc::new(FakeFacade { reclaimed: AtomicBool::new(false), last_activity: 0, kind: CodecKind::VideoDecoder });
        let _h1 = manager.register(Arc::downgrade(&fresh) as Weak<dyn ReclaimableFacade>, fresh.kind(), 900);
        let _h2 = manager.register(Arc::downgrade(&stale) as Weak<dyn ReclaimableFacade>, stale.kind(), 0);

        manager.reclaim_inactive(1000, 500);

        assert!(!fresh.reclaimed.load(Ordering::Acquire));
        assert!(stale.reclaimed.load(Ordering::Acquire));
    }

    #[test]
    fn unregister_removes_entry() {
        let manager = ResourceManager::new();
        let facade = Arc::new(FakeFacade { reclaimed: AtomicBool::new(false), last_activity: 0, kind: CodecKind::AudioDecoder });
        let handle = manager.register(Arc::downgrade(&facade) as Weak<dyn ReclaimableFacade>, facade.kind(), 0);
        assert_eq!(manager.registered_count(), 1);
        handle.unregister();
        assert_eq!(manager.registered_count(), 0);
    }

    #[test]
    fn reclaim_is_idempotent_on_dropped_facade() {
        let manager = ResourceManager::new();
        {
            let facade = Arc::new(FakeFacade { reclaimed: AtomicBool::new(false), last_activity: 0, kind: CodecKind::AudioEncoder });
            let _h = manager.register(Arc::downgrade(&facade) as Weak<dyn ReclaimableFacade>, facade.kind(), 0);
        }
        // facade dropped; sweep should prune it rather than panic
        manager.reclaim_inactive(10_000, 1);
        assert_eq!(manager.registered_count(), 0);
    }
}
