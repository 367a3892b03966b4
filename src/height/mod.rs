// SPDX-License-Identifier: GPL-3.0-only

//! Last-known keyboard heights, keyed by device and orientation.
//!
//! The cache is a process-wide context object: one instance is created at
//! startup and shared (`Rc<HeightCache>`) with every popup. It is read once
//! when a popup is constructed to pre-size the overlay and overwritten each
//! time a live keyboard height is confirmed.
//!
//! Cached values are hints. They go stale across rotations and display
//! changes, so consumers read them through [`HeightCache::hint`], which
//! re-validates against the current threshold.

pub mod store;

use crate::error::PopupError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// Screen orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Derives the orientation from display dimensions.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Identifies the device/orientation a keyboard height was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeightContext {
    /// Orientation the height was observed in.
    pub orientation: Orientation,
    /// Display width in pixels.
    pub display_width: u32,
    /// Display height in pixels.
    pub display_height: u32,
}

impl HeightContext {
    /// Creates a context from display dimensions.
    #[must_use]
    pub fn from_display(display_width: u32, display_height: u32) -> Self {
        Self {
            orientation: Orientation::from_size(display_width, display_height),
            display_width,
            display_height,
        }
    }
}

/// Process-wide keyboard height cache.
///
/// Single UI thread only; interior mutability lets every popup share one
/// instance through `Rc`.
#[derive(Debug, Default)]
pub struct HeightCache {
    heights: RefCell<HashMap<HeightContext, u32>>,
}

impl HeightCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last height stored for `ctx`, if any.
    pub fn get(&self, ctx: &HeightContext) -> Option<u32> {
        self.heights.borrow().get(ctx).copied()
    }

    /// Stores a confirmed height for `ctx`. Last writer wins.
    pub fn set(&self, ctx: &HeightContext, height: u32) {
        let previous = self.heights.borrow_mut().insert(*ctx, height);
        if previous != Some(height) {
            tracing::debug!(
                "Keyboard height for {:?} updated: {:?} -> {}",
                ctx.orientation,
                previous,
                height
            );
        }
    }

    /// Returns the cached height for `ctx` only if it passes the threshold.
    ///
    /// A value below the threshold is a stale cache miss: it is logged and
    /// the caller falls back to live signals.
    pub fn hint(&self, ctx: &HeightContext, threshold_px: u32) -> Option<u32> {
        let height = self.get(ctx)?;
        if height >= threshold_px {
            Some(height)
        } else {
            let miss = PopupError::StaleCacheMiss {
                height,
                threshold: threshold_px,
            };
            tracing::debug!("Ignoring cached keyboard height: {}", miss);
            None
        }
    }

    /// Number of contexts with a stored height.
    pub fn len(&self) -> usize {
        self.heights.borrow().len()
    }

    /// Returns `true` if no height has been stored.
    pub fn is_empty(&self) -> bool {
        self.heights.borrow().is_empty()
    }
}
