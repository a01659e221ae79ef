//! Resize and invalidation glue
//!
//! Everything here is single-threaded and clock-agnostic: times are plain
//! millisecond values supplied by the caller, so the host's timer (or a test)
//! decides when a pass runs.

mod debounce;
mod observe;

pub use debounce::{Debouncer, GenerationCounter};
pub use observe::{Subscribers, SubscriptionId, Viewport};

/// Milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(a > 0);
        assert!(b >= a);
    }
}
