// SPDX-License-Identifier: GPL-3.0-only

use super::{KeyboardEvent, Threshold};

/// Fallback visibility signal polled on every global layout pass.
///
/// Has no de-duplication: every pass re-derives the state, so repeated
/// identical reports produce repeated events.
#[derive(Debug, Clone)]
pub struct LayoutSignal {
    threshold: Threshold,
}

impl LayoutSignal {
    #[must_use]
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Height of the window hidden below the visible frame.
    #[must_use]
    pub fn offset(visible_bottom: u32, full_height: u32) -> u32 {
        full_height.saturating_sub(visible_bottom)
    }

    pub fn observe(&mut self, visible_bottom: u32, full_height: u32) -> KeyboardEvent {
        let offset = Self::offset(visible_bottom, full_height);
        let event = self.threshold.classify(offset);
        tracing::trace!(visible_bottom, full_height, offset, ?event, "global layout");
        event
    }
}
