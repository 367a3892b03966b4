// SPDX-License-Identifier: GPL-3.0-only

//! Request/response protocol for surfacing the real keyboard.
//!
//! While the emoji overlay substitutes for the soft keyboard, the keyboard
//! must still be open underneath it (that is what reserves the space), but it
//! must not take over the screen with its fullscreen extract UI. Showing the
//! overlay therefore:
//!
//! 1. Captures the edit surface's input options (once per show cycle).
//! 2. Adds [`ImeOptions::NO_EXTRACT_UI`] when the extract UI could appear,
//!    and restarts input so the keyboard picks the flag up.
//! 3. Asks the input method to show the soft keyboard, handing it a
//!    [`ReceiverToken`]. The answer arrives later as a result code.
//!
//! The result code only confirms that the request was honored. Whether the
//! keyboard is actually visible, and how tall it is, comes from the
//! visibility signal.

use crate::app_settings;
use crate::popup::host::{Autofill, EditSurface, HostWindow, InputMethod};
use crate::height::Orientation;

/// Input options bitmask of an edit surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImeOptions(pub u32);

impl ImeOptions {
    /// Suppresses the keyboard's fullscreen extract UI.
    pub const NO_EXTRACT_UI: u32 = app_settings::IME_FLAG_NO_EXTRACT_UI;

    #[must_use]
    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    #[must_use]
    pub fn with(self, flag: u32) -> Self {
        Self(self.0 | flag)
    }
}

/// Result codes delivered by the input method after `show_soft_input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftInputResult {
    UnchangedShown,
    UnchangedHidden,
    Shown,
    Hidden,
}

impl SoftInputResult {
    /// Parses a raw result code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            app_settings::RESULT_UNCHANGED_SHOWN => Some(SoftInputResult::UnchangedShown),
            app_settings::RESULT_UNCHANGED_HIDDEN => Some(SoftInputResult::UnchangedHidden),
            app_settings::RESULT_SHOWN => Some(SoftInputResult::Shown),
            app_settings::RESULT_HIDDEN => Some(SoftInputResult::Hidden),
            _ => None,
        }
    }

    /// Whether the soft input is now visible (unchanged or newly shown).
    #[must_use]
    pub fn is_visible(self) -> bool {
        matches!(self, SoftInputResult::UnchangedShown | SoftInputResult::Shown)
    }
}

/// Identifies one result channel handed to the input method.
///
/// Only the most recently issued token is live; results carrying any other
/// token are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverToken(u64);

impl ReceiverToken {
    /// Raw generation number.
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Keyboard switch state for one popup.
#[derive(Debug, Default)]
pub struct KeyboardSwitch {
    original_options: Option<ImeOptions>,
    receiver: Option<ReceiverToken>,
    generation: u64,
}

impl KeyboardSwitch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the keyboard would otherwise show its extract UI.
    ///
    /// Requires device support, a landscape display, and a surface that has
    /// not already opted out.
    pub fn is_extract_prone(surface: &dyn EditSurface, window: &dyn HostWindow) -> bool {
        let (width, height) = window.display_size();
        window.supports_extract_ui()
            && Orientation::from_size(width, height) == Orientation::Landscape
            && !surface.ime_options().contains(ImeOptions::NO_EXTRACT_UI)
    }

    /// Requests the real keyboard in a mode without extract UI.
    ///
    /// Returns the token the result will carry, or `None` if the input
    /// method is unavailable.
    pub fn request(
        &mut self,
        surface: &dyn EditSurface,
        extract_prone: bool,
        input_method: Option<&mut (dyn InputMethod + 'static)>,
    ) -> Option<ReceiverToken> {
        if extract_prone && self.original_options.is_none() {
            self.original_options = Some(surface.ime_options());
        }

        let Some(input_method) = input_method else {
            tracing::warn!("Input method service unavailable, waiting for live keyboard signal");
            if extract_prone {
                surface.set_ime_options(surface.ime_options().with(ImeOptions::NO_EXTRACT_UI));
            }
            return None;
        };

        if extract_prone {
            surface.set_ime_options(surface.ime_options().with(ImeOptions::NO_EXTRACT_UI));
            input_method.restart_input(surface);
            tracing::debug!("Suppressed extract UI and restarted input");
        }

        self.generation += 1;
        let token = ReceiverToken(self.generation);
        self.receiver = Some(token);
        input_method.show_soft_input(surface, token);
        tracing::debug!("Requested soft input (receiver {})", token.0);
        Some(token)
    }

    /// Accepts a result delivered on `token`.
    ///
    /// Returns `None` for results on a cleared or superseded receiver and for
    /// unknown codes.
    pub fn accept(&self, token: ReceiverToken, code: i32) -> Option<SoftInputResult> {
        if self.receiver != Some(token) {
            tracing::debug!("Discarding soft input result {} on stale receiver {}", code, token.0);
            return None;
        }
        let result = SoftInputResult::from_code(code);
        if result.is_none() {
            tracing::warn!("Unknown soft input result code {}", code);
        }
        result
    }

    /// The live receiver, if any.
    #[must_use]
    pub fn receiver(&self) -> Option<ReceiverToken> {
        self.receiver
    }

    /// Detaches the result receiver. Later results are discarded.
    pub fn clear_receiver(&mut self) {
        self.receiver = None;
    }

    /// Original options captured this cycle, if they were overridden.
    #[must_use]
    pub fn captured_options(&self) -> Option<ImeOptions> {
        self.original_options
    }

    /// Restores the captured options exactly and lets the input system
    /// re-evaluate. Returns `true` if anything was restored.
    pub fn restore(
        &mut self,
        surface: &dyn EditSurface,
        input_method: Option<&mut (dyn InputMethod + 'static)>,
        autofill: Option<&mut (dyn Autofill + 'static)>,
    ) -> bool {
        let Some(original) = self.original_options.take() else {
            return false;
        };

        surface.set_ime_options(original);
        if let Some(input_method) = input_method {
            input_method.restart_input(surface);
        }
        if let Some(autofill) = autofill {
            autofill.cancel_pending_ui();
        }
        tracing::debug!("Restored input options {:#x}", original.0);
        true
    }
}
