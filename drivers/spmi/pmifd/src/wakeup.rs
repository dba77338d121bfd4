use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Keeps the system from suspending while interrupt events are handled.
#[derive(Debug)]
pub struct WakeSource {
    name: &'static str,
    active: AtomicUsize,
    events: AtomicU64,
}

impl WakeSource {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            active: AtomicUsize::new(0),
            events: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stay_awake(&self) -> WakeGuard<'_> {
        if self.active.fetch_add(1, Ordering::AcqRel) == 0 {
            log::trace!("{}: stay awake", self.name);
        }
        self.events.fetch_add(1, Ordering::Relaxed);
        WakeGuard { source: self }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) != 0
    }

    /// Number of times the source has been activated.
    pub fn event_count(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    fn relax(&self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            log::trace!("{}: relax", self.name);
        }
    }
}

#[must_use = "the source relaxes as soon as the guard is dropped"]
pub struct WakeGuard<'a> {
    source: &'a WakeSource,
}

impl Drop for WakeGuard<'_> {
    fn drop(&mut self) {
        self.source.relax();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_guards() {
        let source = WakeSource::new("pmif_m_thread");
        assert!(!source.is_active());
        {
            let _outer = source.stay_awake();
            {
                let _inner = source.stay_awake();
                assert!(source.is_active());
            }
            assert!(source.is_active());
        }
        assert!(!source.is_active());
        assert_eq!(source.event_count(), 2);
    }
}
