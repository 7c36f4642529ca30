//! Idle/building state shared by every build entry point.

use std::sync::atomic::{AtomicBool, Ordering};

/// Two-state machine: `Idle -> Building -> Idle`.
///
/// The transition into `Building` is a compare-and-swap, so at most one
/// [`BuildGuard`] exists at a time.
#[derive(Debug, Default)]
pub struct BuildState {
    building: AtomicBool,
}

impl BuildState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `Building`, or `None` if a build is already running.
    pub fn try_begin(&self) -> Option<BuildGuard<'_>> {
        self.building
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BuildGuard { state: self })
    }

    pub fn is_building(&self) -> bool {
        self.building.load(Ordering::Acquire)
    }
}

/// Held for the duration of a build; returns the state to `Idle` on drop.
#[derive(Debug)]
pub struct BuildGuard<'a> {
    state: &'a BuildState,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.state.building.store(false, Ordering::Release);
    }
}
