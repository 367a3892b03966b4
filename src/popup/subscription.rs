// SPDX-License-Identifier: GPL-3.0-only

//! Registry of the host callbacks a popup listens to.
//!
//! Callbacks are delivered to the popup only while the matching subscription
//! is active. Tearing the popup down clears the registry, so a callback that
//! was already in flight is dropped instead of reaching a dead popup.

use std::collections::HashSet;

use crate::signal::SignalKind;

/// A named host callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// Window inset changes.
    WindowInsets,
    /// Global layout passes (fallback visibility source).
    GlobalLayout,
    /// Attach/detach of the host view.
    AttachState,
}

impl From<SignalKind> for Subscription {
    fn from(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Insets => Subscription::WindowInsets,
            SignalKind::GlobalLayout => Subscription::GlobalLayout,
        }
    }
}

/// Active subscriptions of one popup.
#[derive(Debug, Default)]
pub struct Subscriptions {
    active: HashSet<Subscription>,
}

impl Subscriptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates a subscription. Returns `true` if it was not active before.
    pub fn subscribe(&mut self, subscription: Subscription) -> bool {
        let added = self.active.insert(subscription);
        if added {
            tracing::trace!("Subscribed to {:?}", subscription);
        }
        added
    }

    /// Deactivates a subscription. Returns `true` if it was active.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let removed = self.active.remove(&subscription);
        if removed {
            tracing::trace!("Unsubscribed from {:?}", subscription);
        }
        removed
    }

    #[must_use]
    pub fn is_active(&self, subscription: Subscription) -> bool {
        self.active.contains(&subscription)
    }

    /// Deactivates everything, returning how many subscriptions were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.active.len();
        self.active.clear();
        count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
