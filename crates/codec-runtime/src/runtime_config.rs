// crates/codec-runtime/src/runtime_config.rs
//
// Process-wide tunables with environment overrides, in the teacher's own
// idiom for reading environment state (`std::env::var(...).ok()` /
// `unwrap_or_else`, as used throughout `velocut-ui::paths` and `app.rs`) —
// no config-file crate is warranted for three numeric knobs.

const DEFAULT_CALLBACK_CAPACITY: usize = 256;
const DEFAULT_RECLAIM_THRESHOLD_MICROS: i64 = 30_000_000;

#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Bound on the Safe Callback Channel's pending capacity per facade.
    pub callback_capacity: usize,
    /// How long a facade may sit idle before the Resource Manager may
    /// reclaim it, in microseconds.
    pub reclaim_threshold_micros: i64,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        RuntimeConfig {
            callback_capacity: std::env::var("CODEC_RUNTIME_CALLBACK_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CALLBACK_CAPACITY),
            reclaim_threshold_micros: std::env::var("CODEC_RUNTIME_RECLAIM_THRESHOLD_MICROS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RECLAIM_THRESHOLD_MICROS),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            callback_capacity: DEFAULT_CALLBACK_CAPACITY,
            reclaim_threshold_micros: DEFAULT_RECLAIM_THRESHOLD_MICROS,
        }
    }
}
