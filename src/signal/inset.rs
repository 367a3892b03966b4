// SPDX-License-Identifier: GPL-3.0-only

use super::{KeyboardEvent, Threshold};

/// Visibility signal driven by window inset callbacks.
#[derive(Debug, Clone)]
pub struct InsetSignal {
    threshold: Threshold,
    previous_offset: u32,
}

impl InsetSignal {
    /// Creates a signal with no previous offset.
    #[must_use]
    pub fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            previous_offset: 0,
        }
    }

    /// The threshold in use.
    #[must_use]
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Keyboard contribution to the bottom inset.
    ///
    /// Stable insets (system bars) are subtracted from the transient inset. A
    /// transient inset smaller than the stable one is taken as-is.
    #[must_use]
    pub fn offset(raw_bottom: u32, stable_bottom: u32) -> u32 {
        if raw_bottom < stable_bottom {
            raw_bottom
        } else {
            raw_bottom - stable_bottom
        }
    }

    /// Feeds one inset report.
    ///
    /// Emits only when the offset changed since the last report, or when it
    /// is exactly zero so a closing edge is never swallowed.
    pub fn observe(&mut self, raw_bottom: u32, stable_bottom: u32) -> Option<KeyboardEvent> {
        let offset = Self::offset(raw_bottom, stable_bottom);
        if offset == self.previous_offset && offset != 0 {
            return None;
        }
        self.previous_offset = offset;

        let event = self.threshold.classify(offset);
        tracing::trace!(raw_bottom, stable_bottom, offset, ?event, "inset change");
        Some(event)
    }

    /// Forgets the previous offset.
    pub fn reset(&mut self) {
        self.previous_offset = 0;
    }
}
