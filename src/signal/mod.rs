// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard visibility inference from window layout changes.
//!
//! The host window reports how much of its bottom edge is covered by system
//! UI. This module turns those reports into two discrete events,
//! [`KeyboardEvent::Opened`] and [`KeyboardEvent::Closed`], rejecting offsets
//! at or below a minimum keyboard height so that navigation bars and rounding
//! noise never look like a keyboard.
//!
//! # Implementations
//!
//! - [`InsetSignal`]: the primary path. Consumes raw and stable bottom
//!   insets pushed by the window and de-duplicates repeated offsets.
//! - [`LayoutSignal`]: fallback for hosts without inset callbacks. Recomputes
//!   the covered height on every global layout pass (polled, coarser).
//!
//! [`VisibilitySignal::probe`] picks one of them once, at popup construction.

mod inset;
mod layout;

pub use inset::InsetSignal;
pub use layout::LayoutSignal;

/// Discrete keyboard visibility event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEvent {
    /// The keyboard covers `height` pixels of the window.
    Opened(u32),
    /// The keyboard is closed or too small to count.
    Closed,
}

/// A raw layout report from the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSample {
    /// Window insets: transient bottom inset and stable (system bar) inset.
    Insets { raw_bottom: u32, stable_bottom: u32 },
    /// Global layout pass: bottom of the visible frame and full window height.
    GlobalLayout { visible_bottom: u32, full_height: u32 },
}

/// Minimum keyboard height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    px: u32,
}

impl Threshold {
    /// Converts a threshold in density-independent units to pixels.
    #[must_use]
    pub fn from_dp(dp: u32, density: f32) -> Self {
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        Self {
            px: (dp as f32 * density).round() as u32,
        }
    }

    /// Threshold in pixels.
    #[must_use]
    pub fn px(&self) -> u32 {
        self.px
    }

    /// Classifies an offset: `Opened` strictly above the threshold.
    #[must_use]
    pub fn classify(&self, offset: u32) -> KeyboardEvent {
        if offset > self.px {
            KeyboardEvent::Opened(offset)
        } else {
            KeyboardEvent::Closed
        }
    }
}

/// Which implementation a host supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Insets,
    GlobalLayout,
}

/// The visibility signal selected for a popup.
#[derive(Debug, Clone)]
pub enum VisibilitySignal {
    Insets(InsetSignal),
    GlobalLayout(LayoutSignal),
}

impl VisibilitySignal {
    /// Selects an implementation from the host's capability.
    #[must_use]
    pub fn probe(supports_insets: bool, threshold: Threshold) -> Self {
        if supports_insets {
            VisibilitySignal::Insets(InsetSignal::new(threshold))
        } else {
            tracing::info!("Window insets unavailable, polling global layout instead");
            VisibilitySignal::GlobalLayout(LayoutSignal::new(threshold))
        }
    }

    /// The implementation in use.
    #[must_use]
    pub fn kind(&self) -> SignalKind {
        match self {
            VisibilitySignal::Insets(_) => SignalKind::Insets,
            VisibilitySignal::GlobalLayout(_) => SignalKind::GlobalLayout,
        }
    }

    /// The threshold in use.
    #[must_use]
    pub fn threshold(&self) -> Threshold {
        match self {
            VisibilitySignal::Insets(signal) => signal.threshold(),
            VisibilitySignal::GlobalLayout(signal) => signal.threshold(),
        }
    }

    /// Feeds one layout report, returning an event if one should be emitted.
    pub fn observe(&mut self, sample: LayoutSample) -> Option<KeyboardEvent> {
        match (self, sample) {
            (
                VisibilitySignal::Insets(signal),
                LayoutSample::Insets {
                    raw_bottom,
                    stable_bottom,
                },
            ) => signal.observe(raw_bottom, stable_bottom),
            (
                VisibilitySignal::GlobalLayout(signal),
                LayoutSample::GlobalLayout {
                    visible_bottom,
                    full_height,
                },
            ) => Some(signal.observe(visible_bottom, full_height)),
            (signal, sample) => {
                tracing::debug!(
                    "Ignoring {:?} for {:?} visibility signal",
                    sample,
                    signal.kind()
                );
                None
            }
        }
    }

    /// Forgets de-duplication state, as when the listener is re-installed.
    pub fn reset(&mut self) {
        if let VisibilitySignal::Insets(signal) = self {
            signal.reset();
        }
    }
}
