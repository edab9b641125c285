//! Debounced auto-resplit binding.
//!
//! Resize and font-load signals are coalesced into a single pending deadline
//! that every new signal pushes back. The host supplies the clock, so the
//! same signal sequence always produces the same re-split decisions.

use std::time::{Duration, Instant};

/// Delay between the last signal and the re-split it triggers.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(200);

/// A layout-affecting signal from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeSignal {
    /// A target may have changed width.
    Resize,
    /// Web fonts finished loading; glyph metrics may differ.
    FontsLoaded,
}

/// Outcome of a due deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Due {
    /// At least one coalesced signal was a font load.
    pub(crate) fonts_loaded: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ResizeBinding {
    delay: Duration,
    deadline: Option<Instant>,
    fonts_loaded: bool,
    observing: bool,
}

impl Default for ResizeBinding {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

impl ResizeBinding {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            fonts_loaded: false,
            observing: false,
        }
    }

    pub(crate) fn observe(&mut self) {
        self.observing = true;
    }

    /// Stop observing and drop any pending deadline.
    pub(crate) fn disconnect(&mut self) {
        self.observing = false;
        self.deadline = None;
        self.fonts_loaded = false;
    }

    pub(crate) fn is_observing(&self) -> bool {
        self.observing
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record a signal; ignored while disconnected.
    pub(crate) fn signal(&mut self, signal: ResizeSignal, now: Instant) {
        if !self.observing {
            return;
        }
        self.deadline = Some(now + self.delay);
        if signal == ResizeSignal::FontsLoaded {
            self.fonts_loaded = true;
        }
    }

    /// Consume the pending deadline if it has elapsed.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<Due> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(Due {
                    fonts_loaded: std::mem::take(&mut self.fonts_loaded),
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_ignored_until_observing() {
        let mut binding = ResizeBinding::default();
        let now = Instant::now();
        binding.signal(ResizeSignal::Resize, now);
        assert_eq!(binding.deadline(), None);

        binding.observe();
        binding.signal(ResizeSignal::Resize, now);
        assert_eq!(binding.deadline(), Some(now + RESIZE_DEBOUNCE));
    }

    #[test]
    fn test_each_signal_resets_deadline() {
        let mut binding = ResizeBinding::default();
        binding.observe();
        let start = Instant::now();
        binding.signal(ResizeSignal::Resize, start);
        let later = start + Duration::from_millis(150);
        binding.signal(ResizeSignal::Resize, later);

        assert_eq!(binding.take_due(start + RESIZE_DEBOUNCE), None);
        let due = binding.take_due(later + RESIZE_DEBOUNCE);
        assert_eq!(due, Some(Due { fonts_loaded: false }));
        assert_eq!(binding.deadline(), None);
    }

    #[test]
    fn test_font_load_is_coalesced() {
        let mut binding = ResizeBinding::default();
        binding.observe();
        let now = Instant::now();
        binding.signal(ResizeSignal::FontsLoaded, now);
        binding.signal(ResizeSignal::Resize, now);
        let due = binding.take_due(now + RESIZE_DEBOUNCE).unwrap();
        assert!(due.fonts_loaded);
    }

    #[test]
    fn test_disconnect_cancels_pending() {
        let mut binding = ResizeBinding::default();
        binding.observe();
        let now = Instant::now();
        binding.signal(ResizeSignal::FontsLoaded, now);
        binding.disconnect();
        assert!(!binding.is_observing());
        assert_eq!(binding.take_due(now + RESIZE_DEBOUNCE), None);
    }
}
