// SPDX-License-Identifier: GPL-3.0-only

//! Centralized application settings and constants.

/// Height in density-independent units below which a bottom inset is treated
/// as "keyboard closed" (navigation bars, rounding noise).
pub const MIN_KEYBOARD_HEIGHT_DP: u32 = 50;

/// Default bounded wait for keyboard confirmation while opening, in milliseconds.
pub const DEFAULT_OPENING_TIMEOUT_MS: u64 = 1500;

/// Input option flag asking the keyboard not to show its fullscreen extract UI.
pub const IME_FLAG_NO_EXTRACT_UI: u32 = 0x1000_0000;

/// Soft input state was already visible and is unchanged.
pub const RESULT_UNCHANGED_SHOWN: i32 = 0;

/// Soft input state was already hidden and is unchanged.
pub const RESULT_UNCHANGED_HIDDEN: i32 = 1;

/// Soft input state changed from hidden to shown.
pub const RESULT_SHOWN: i32 = 2;

/// Soft input state changed from shown to hidden.
pub const RESULT_HIDDEN: i32 = 3;

/// File name of the persisted keyboard height cache.
pub const HEIGHT_CACHE_FILE: &str = "keyboard_heights.json";

/// Capacity of the driver's event channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 32;
