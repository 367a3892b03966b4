// SPDX-License-Identifier: GPL-3.0-only

//! Platform collaborators the popup drives.
//!
//! Everything here runs on the single UI thread. Long-lived platform handles
//! (the edit surface and its window) are shared through `Rc` and take `&self`;
//! services owned by the popup take `&mut self`.

use std::rc::Rc;

use crate::height::HeightContext;
use crate::protocol::{ImeOptions, ReceiverToken};

/// The text field the emoji overlay types into.
pub trait EditSurface {
    /// Current input options bitmask.
    fn ime_options(&self) -> ImeOptions;

    /// Replaces the input options bitmask.
    fn set_ime_options(&self, options: ImeOptions);

    /// Whether the surface currently has input focus.
    fn has_focus(&self) -> bool;

    /// Asks for input focus (focusable in touch mode).
    fn request_focus(&self);

    /// The window hosting the surface, if it can be resolved.
    fn host_window(&self) -> Option<Rc<dyn HostWindow>>;
}

/// The window (activity) hosting the edit surface and the overlay.
pub trait HostWindow {
    /// Display density, pixels per density-independent unit.
    fn density(&self) -> f32;

    /// Display size in pixels as `(width, height)`.
    fn display_size(&self) -> (u32, u32);

    /// Width the overlay should span.
    fn proper_width(&self) -> u32 {
        self.display_size().0
    }

    /// Whether the window delivers inset callbacks.
    fn supports_window_insets(&self) -> bool;

    /// Whether keyboards on this device may show a fullscreen extract UI.
    fn supports_extract_ui(&self) -> bool;

    /// Context the keyboard height is cached under.
    fn height_context(&self) -> HeightContext {
        let (width, height) = self.display_size();
        HeightContext::from_display(width, height)
    }
}

/// The platform input method service.
pub trait InputMethod {
    /// Re-reads the surface's input options.
    fn restart_input(&mut self, surface: &dyn EditSurface);

    /// Requests the soft keyboard. The service answers later through
    /// `EmojiPopup::on_soft_input_result` with `token`.
    fn show_soft_input(&mut self, surface: &dyn EditSurface, token: ReceiverToken);

    /// Hides the soft keyboard.
    fn hide_soft_input(&mut self);
}

/// Best-effort autofill service.
pub trait Autofill {
    /// Cancels any pending autofill UI.
    fn cancel_pending_ui(&mut self);
}

/// The window presenting the overlay.
pub trait OverlayWindow {
    /// Presents the overlay anchored at the bottom of the host window.
    fn present_at_bottom(&mut self);

    /// Hides the overlay.
    fn hide(&mut self);

    /// Resizes the overlay.
    fn set_size(&mut self, width: u32, height: u32);
}

/// The paged emoji content shown in the overlay.
pub trait PopupContent {
    fn refresh(&mut self);
    fn dismiss(&mut self);
    fn on_show(&mut self);
}

/// Observer of popup and keyboard transitions.
pub trait PopupListener {
    fn on_show(&mut self) {}
    fn on_keyboard_opened(&mut self, _height: u32) {}
    fn on_keyboard_closed(&mut self) {}
    fn on_dismiss(&mut self) {}
}

/// Optional platform services. A missing service degrades the flow instead
/// of failing it.
#[derive(Default)]
pub struct Services {
    pub input_method: Option<Box<dyn InputMethod>>,
    pub autofill: Option<Box<dyn Autofill>>,
}

impl Services {
    #[must_use]
    pub fn new(input_method: Box<dyn InputMethod>, autofill: Box<dyn Autofill>) -> Self {
        Self {
            input_method: Some(input_method),
            autofill: Some(autofill),
        }
    }

    /// No services at all.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("input_method", &self.input_method.is_some())
            .field("autofill", &self.autofill.is_some())
            .finish()
    }
}
