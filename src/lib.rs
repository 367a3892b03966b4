// SPDX-License-Identifier: GPL-3.0-only

//! emoji-popup - an emoji picker overlay that behaves like a soft keyboard
//!
//! This crate provides the state machine behind an in-app emoji panel that
//! takes the place of the platform's soft keyboard: it opens the real
//! keyboard underneath, infers the keyboard's height from window layout
//! changes, and presents the overlay at exactly the keyboard's position once
//! that height is confirmed.
//!
//! # Architecture
//!
//! Leaves first:
//!
//! 1. **Height cache** (`height`): last confirmed keyboard height per
//!    device/orientation, shared process-wide and persisted as JSON.
//!
//! 2. **Visibility signal** (`signal`): turns inset or global-layout reports
//!    into `Opened(height)` / `Closed` events.
//!
//! 3. **Keyboard switch** (`protocol`): asks the input method for the soft
//!    keyboard without its extract UI and tracks the asynchronous result.
//!
//! 4. **Popup** (`popup`): the overlay state machine reconciling the above
//!    with `show`, `dismiss` and `toggle`.
//!
//! # Modules
//!
//! - `app_settings`: Centralized constants
//! - `config`: Popup configuration loaded from JSON
//! - `driver`: Async event loop with the bounded opening wait
//! - `error`: Error types
//! - `headless`: In-memory host used by the simulator and tests
//! - `scenario`: Scripted event sequences for the simulator

pub mod app_settings;
pub mod config;
pub mod driver;
pub mod error;
pub mod headless;
pub mod height;
pub mod popup;
pub mod protocol;
pub mod scenario;
pub mod signal;

pub use crate::config::PopupConfig;
pub use crate::error::{PopupError, PopupResult};
pub use crate::height::{HeightCache, HeightContext};
pub use crate::popup::{EmojiPopup, KeyboardState, OverlayState, PopupState};

// ============================================================================
// Integration Tests
// ============================================================================
