//! Progress-indicator capability.
//!
//! The executor does not own any UI. It signals `show` when a call starts and
//! `hide` when it ends through whatever `ProgressIndicator` it was given.
//! Signals are fire-and-forget.

use std::sync::atomic::{AtomicBool, Ordering};

pub trait ProgressIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Drops every signal. The default for clients built without an indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressIndicator for NoProgress {
    fn show(&self) {}
    fn hide(&self) {}
}

/// A single process-wide visible/hidden flag.
///
/// There is no reference counting: when calls overlap, the flag reflects
/// whichever signal landed last, so the first call to finish hides the
/// indicator while the other is still in flight.
#[derive(Debug, Default)]
pub struct SharedProgress {
    visible: AtomicBool,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl ProgressIndicator for SharedProgress {
    fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }
}

/// Shows an indicator for as long as the guard lives.
///
/// When `enabled`, `show` is sent on creation and `hide` exactly once on
/// drop, whichever way the owning scope exits (return, `?`, panic, or the
/// enclosing future being dropped). When disabled, nothing is sent.
pub struct ProgressGuard<'a> {
    indicator: Option<&'a dyn ProgressIndicator>,
}

impl<'a> ProgressGuard<'a> {
    pub fn start(indicator: &'a dyn ProgressIndicator, enabled: bool) -> Self {
        if !enabled {
            return Self { indicator: None };
        }
        indicator.show();
        Self {
            indicator: Some(indicator),
        }
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        if let Some(indicator) = self.indicator.take() {
            indicator.hide();
        }
    }
}
