// SPDX-License-Identifier: GPL-3.0-only

use crate::app_settings;
use crate::error::{PopupError, PopupResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Popup configuration, loaded from JSON with every field optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// Minimum keyboard height in density-independent units.
    pub min_keyboard_height_dp: u32,
    /// Bounded wait for keyboard confirmation while opening.
    /// `None` waits indefinitely.
    pub opening_timeout_ms: Option<u64>,
    /// Where the keyboard height cache is persisted, if anywhere.
    pub height_cache_path: Option<PathBuf>,
    /// Use the layout-polling visibility signal even when insets are available.
    pub force_layout_signal: bool,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            min_keyboard_height_dp: app_settings::MIN_KEYBOARD_HEIGHT_DP,
            opening_timeout_ms: Some(app_settings::DEFAULT_OPENING_TIMEOUT_MS),
            height_cache_path: None,
            force_layout_signal: false,
        }
    }
}

impl PopupConfig {
    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> PopupResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| PopupError::io(e, path))?;
        let config: Self = serde_json::from_str(&json).map_err(|e| PopupError::json(e, path))?;
        tracing::debug!("Loaded popup config from {}", path.display());
        Ok(config)
    }

    /// Disables the bounded opening wait.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.opening_timeout_ms = None;
        self
    }

    /// Sets the minimum keyboard height threshold.
    #[must_use]
    pub fn with_min_keyboard_height_dp(mut self, dp: u32) -> Self {
        self.min_keyboard_height_dp = dp;
        self
    }

    /// Sets the bounded opening wait.
    #[must_use]
    pub fn with_opening_timeout_ms(mut self, ms: u64) -> Self {
        self.opening_timeout_ms = Some(ms);
        self
    }
}
