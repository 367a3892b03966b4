// SPDX-License-Identifier: GPL-3.0-only

//! Emoji overlay presented in place of the soft keyboard.
//!
//! [`EmojiPopup`] owns the overlay lifecycle and reconciles two asynchronous
//! sources: layout reports from the host window (through the visibility
//! signal) and the result code of the soft input request (through the
//! keyboard switch). User intents (`show`, `dismiss`, `toggle`) may arrive at
//! any point in between.
//!
//! # States
//!
//! ```text
//!            show()                 keyboard opened
//!   Idle ─────────────▶ Opening ───────────────────▶ Shown
//!    ▲                    │                            │
//!    │      dismiss()     │      keyboard closed       ▼
//!    └────────────────────┴──────────────────── Dismissing
//! ```
//!
//! The overlay is presented only once the keyboard's height is confirmed by
//! the visibility signal, so it never pops up at a wrong size. The result
//! code is advisory: it is recorded, and it presents the overlay only when
//! the keyboard is already known to be open (no new layout report will come).
//!
//! Everything runs on the UI thread; callbacks are plain method calls.

pub mod host;
pub mod subscription;

use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::PopupConfig;
use crate::error::{PopupError, PopupResult};
use crate::height::{HeightCache, HeightContext};
use crate::protocol::{KeyboardSwitch, ReceiverToken, SoftInputResult};
use crate::signal::{KeyboardEvent, LayoutSample, Threshold, VisibilitySignal};

use host::{EditSurface, HostWindow, OverlayWindow, PopupContent, PopupListener, Services};
use subscription::{Subscription, Subscriptions};

/// What the popup knows about the real keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardState {
    Closed,
    /// Requested but not yet visible. `pending` until the input method
    /// acknowledges the request.
    Opening { pending: bool },
    /// Visible, covering `height` pixels.
    Open(u32),
}

/// Lifecycle of the overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Hidden,
    PendingShow,
    Shown,
}

/// Confirmations gathered while opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmations {
    /// The visibility signal confirmed an open keyboard.
    pub inset: bool,
    /// Result reported by the input method, if any.
    pub result: Option<SoftInputResult>,
    /// When the show cycle started.
    pub started: Instant,
}

/// Popup state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Idle,
    Opening(Confirmations),
    Shown,
    Dismissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active,
    TornDown,
}

/// The emoji overlay state machine.
pub struct EmojiPopup {
    surface: Rc<dyn EditSurface>,
    window: Rc<dyn HostWindow>,
    overlay: Box<dyn OverlayWindow>,
    content: Box<dyn PopupContent>,
    services: Services,
    listener: Option<Box<dyn PopupListener>>,
    cache: Rc<HeightCache>,
    height_context: HeightContext,
    signal: VisibilitySignal,
    switch: KeyboardSwitch,
    subscriptions: Subscriptions,
    state: PopupState,
    keyboard: KeyboardState,
    lifecycle: Lifecycle,
    /// Current overlay size as `(width, height)`.
    size: (u32, u32),
    /// Height the overlay is sized to, adopted from the first confirmed open.
    stored_height: Option<u32>,
    opening_timeout: Option<Duration>,
}

impl std::fmt::Debug for EmojiPopup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmojiPopup")
            .field("state", &self.state)
            .field("keyboard", &self.keyboard)
            .field("size", &self.size)
            .field("stored_height", &self.stored_height)
            .finish_non_exhaustive()
    }
}

impl EmojiPopup {
    /// Creates a popup for `surface`.
    ///
    /// Fails with [`PopupError::Configuration`] if the surface has no host
    /// window. The overlay is pre-sized from the cached keyboard height when
    /// the cache holds a plausible value.
    pub fn new(
        surface: Rc<dyn EditSurface>,
        mut overlay: Box<dyn OverlayWindow>,
        content: Box<dyn PopupContent>,
        services: Services,
        cache: Rc<HeightCache>,
        config: &PopupConfig,
    ) -> PopupResult<Self> {
        let window = surface.host_window().ok_or_else(|| {
            PopupError::Configuration("edit surface has no host window".to_string())
        })?;

        let threshold = Threshold::from_dp(config.min_keyboard_height_dp, window.density());
        let supports_insets = window.supports_window_insets() && !config.force_layout_signal;
        let signal = VisibilitySignal::probe(supports_insets, threshold);
        let height_context = window.height_context();

        let mut size = (0, 0);
        if let Some(hint) = cache.hint(&height_context, threshold.px()) {
            size = (window.proper_width(), hint);
            overlay.set_size(size.0, size.1);
            tracing::debug!("Pre-sized overlay from cached keyboard height {}", hint);
        }

        let mut subscriptions = Subscriptions::new();
        subscriptions.subscribe(Subscription::AttachState);

        tracing::info!(
            "Emoji popup created ({:?} signal, threshold {}px)",
            signal.kind(),
            threshold.px()
        );

        Ok(Self {
            surface,
            window,
            overlay,
            content,
            services,
            listener: None,
            cache,
            height_context,
            signal,
            switch: KeyboardSwitch::new(),
            subscriptions,
            state: PopupState::Idle,
            keyboard: KeyboardState::Closed,
            lifecycle: Lifecycle::Active,
            size,
            stored_height: None,
            opening_timeout: config.opening_timeout_ms.map(Duration::from_millis),
        })
    }

    /// Sets the listener notified of popup and keyboard transitions.
    pub fn set_listener(&mut self, listener: Box<dyn PopupListener>) {
        self.listener = Some(listener);
    }

    // ------------------------------------------------------------------
    // Host lifecycle
    // ------------------------------------------------------------------

    /// The host view was attached to its window: start listening for layout.
    pub fn attach(&mut self) {
        if !self.subscriptions.is_active(Subscription::AttachState) {
            tracing::debug!("Ignoring attach after teardown");
            return;
        }
        self.install_visibility_listener();
    }

    /// The host view was detached: dismiss and drop every subscription.
    ///
    /// Terminal. Callbacks still in flight are discarded silently.
    pub fn detach(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.dismiss();
        let dropped = self.subscriptions.clear();
        self.lifecycle = Lifecycle::TornDown;
        tracing::info!("Emoji popup torn down ({} subscriptions dropped)", dropped);
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Requests the overlay. It appears once the keyboard height is confirmed.
    pub fn show(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            tracing::debug!("Ignoring show on torn down popup");
            return;
        }
        if self.state == PopupState::Shown {
            return;
        }

        self.content.refresh();
        let extract_prone = KeyboardSwitch::is_extract_prone(&*self.surface, &*self.window);

        if !self.surface.has_focus() {
            self.surface.request_focus();
        }
        self.install_visibility_listener();

        if !matches!(self.state, PopupState::Opening(_)) {
            self.state = PopupState::Opening(Confirmations {
                inset: false,
                result: None,
                started: Instant::now(),
            });
        }
        if self.keyboard == KeyboardState::Closed {
            self.keyboard = KeyboardState::Opening { pending: true };
        }
        tracing::debug!("Show requested, waiting for keyboard confirmation");

        let token = self.switch.request(
            &*self.surface,
            extract_prone,
            self.services.input_method.as_deref_mut(),
        );

        // Nothing will acknowledge the request; a keyboard that is already
        // up is all the confirmation there is going to be.
        if token.is_none() {
            if let KeyboardState::Open(height) = self.keyboard {
                self.confirm_and_present(height);
            }
        }
    }

    /// Hides the overlay. Safe from any state; repeated calls are no-ops.
    pub fn dismiss(&mut self) {
        let was_shown = matches!(self.state, PopupState::Shown | PopupState::Dismissing);
        self.state = PopupState::Idle;

        if was_shown {
            self.overlay.hide();
            if let Some(listener) = self.listener.as_mut() {
                listener.on_dismiss();
            }
            tracing::debug!("Overlay dismissed");
        }
        self.content.dismiss();

        self.switch.clear_receiver();
        let visibility = self.visibility_subscription();
        self.subscriptions.unsubscribe(visibility);
        if self.switch.restore(
            &*self.surface,
            self.services.input_method.as_deref_mut(),
            self.services.autofill.as_deref_mut(),
        ) && self.services.input_method.is_none()
        {
            tracing::warn!("Input options restored without an input method to restart");
        }
    }

    /// Shows the overlay if it is not presented, dismisses it otherwise.
    pub fn toggle(&mut self) {
        if self.is_showing() {
            self.dismiss();
        } else {
            self.show();
        }
    }

    /// Dismisses the overlay and hides the real keyboard as well.
    pub fn close_keyboard(&mut self) {
        self.dismiss();
        match self.services.input_method.as_deref_mut() {
            Some(input_method) => input_method.hide_soft_input(),
            None => tracing::warn!("Input method service unavailable, cannot hide keyboard"),
        }
    }

    // ------------------------------------------------------------------
    // Host callbacks
    // ------------------------------------------------------------------

    /// Layout report from the host window.
    pub fn on_layout_sample(&mut self, sample: LayoutSample) {
        if !self.subscriptions.is_active(self.visibility_subscription()) {
            tracing::trace!("Discarding {:?} without an active listener", sample);
            return;
        }
        match self.signal.observe(sample) {
            Some(KeyboardEvent::Opened(height)) => self.keyboard_opened(height),
            Some(KeyboardEvent::Closed) => self.keyboard_closed(),
            None => {}
        }
    }

    /// Result code delivered by the input method on `token`.
    pub fn on_soft_input_result(&mut self, token: ReceiverToken, code: i32) {
        if self.lifecycle == Lifecycle::TornDown {
            tracing::trace!("Discarding soft input result {} after teardown", code);
            return;
        }
        let Some(result) = self.switch.accept(token, code) else {
            return;
        };

        let PopupState::Opening(confirmations) = &mut self.state else {
            tracing::debug!("Soft input result {:?} outside of a show cycle", result);
            return;
        };
        confirmations.result = Some(result);

        if !result.is_visible() {
            tracing::debug!("Soft input reported {:?}, still waiting", result);
            return;
        }
        match self.keyboard {
            KeyboardState::Open(height) => self.confirm_and_present(height),
            _ => {
                self.keyboard = KeyboardState::Opening { pending: false };
                tracing::debug!("Soft input request honored, waiting for keyboard height");
            }
        }
    }

    /// Forces a decision when the bounded opening wait has elapsed.
    ///
    /// Returns `Ok(true)` if the overlay was presented at the best known
    /// height, `Ok(false)` if nothing was due. With no plausible height to
    /// fall back to, the show cycle is abandoned with
    /// [`PopupError::ProtocolTimeout`].
    pub fn poll_opening_timeout(&mut self, now: Instant) -> PopupResult<bool> {
        let Some(deadline) = self.opening_deadline() else {
            return Ok(false);
        };
        if now < deadline {
            return Ok(false);
        }

        let waited_ms = self
            .opening_timeout
            .map_or(0, |timeout| timeout.as_millis() as u64);
        let fallback = self.stored_height.or_else(|| {
            self.cache
                .hint(&self.height_context, self.signal.threshold().px())
        });

        match fallback {
            Some(height) => {
                tracing::warn!(
                    "Keyboard unconfirmed after {}ms, presenting at {}px",
                    waited_ms,
                    height
                );
                self.resize(height);
                self.present();
                Ok(true)
            }
            None => {
                self.dismiss();
                Err(PopupError::ProtocolTimeout { waited_ms })
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether the overlay is presented.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.state == PopupState::Shown
    }

    #[must_use]
    pub fn state(&self) -> PopupState {
        self.state
    }

    #[must_use]
    pub fn overlay_state(&self) -> OverlayState {
        match self.state {
            PopupState::Idle | PopupState::Dismissing => OverlayState::Hidden,
            PopupState::Opening(_) => OverlayState::PendingShow,
            PopupState::Shown => OverlayState::Shown,
        }
    }

    #[must_use]
    pub fn keyboard_state(&self) -> KeyboardState {
        self.keyboard
    }

    /// Whether a show was accepted and awaits keyboard confirmation.
    #[must_use]
    pub fn is_pending_open(&self) -> bool {
        matches!(self.state, PopupState::Opening(_))
    }

    /// Overlay size as `(width, height)`.
    #[must_use]
    pub fn overlay_size(&self) -> (u32, u32) {
        self.size
    }

    /// The live soft input receiver, if a request is outstanding.
    #[must_use]
    pub fn receiver(&self) -> Option<ReceiverToken> {
        self.switch.receiver()
    }

    /// When the bounded opening wait expires, if opening with a timeout.
    #[must_use]
    pub fn opening_deadline(&self) -> Option<Instant> {
        match (self.state, self.opening_timeout) {
            (PopupState::Opening(confirmations), Some(timeout)) => {
                Some(confirmations.started + timeout)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.lifecycle == Lifecycle::TornDown
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn keyboard_opened(&mut self, height: u32) {
        self.resize(height);
        self.cache.set(&self.height_context, height);

        let was_open = matches!(self.keyboard, KeyboardState::Open(_));
        self.keyboard = KeyboardState::Open(height);
        if !was_open {
            tracing::debug!("Keyboard opened at {}px", height);
            if let Some(listener) = self.listener.as_mut() {
                listener.on_keyboard_opened(height);
            }
        }

        if let PopupState::Opening(confirmations) = &mut self.state {
            confirmations.inset = true;
            self.present();
        }
    }

    fn keyboard_closed(&mut self) {
        if matches!(self.keyboard, KeyboardState::Open(_)) {
            self.keyboard = KeyboardState::Closed;
            tracing::debug!("Keyboard closed");
            if let Some(listener) = self.listener.as_mut() {
                listener.on_keyboard_closed();
            }
        }

        // A forced presentation may still see the keyboard as opening; a
        // shown overlay never outlives a closed report.
        if self.state == PopupState::Shown {
            self.keyboard = KeyboardState::Closed;
            self.state = PopupState::Dismissing;
            self.dismiss();
        }
    }

    fn confirm_and_present(&mut self, height: u32) {
        if let PopupState::Opening(confirmations) = &mut self.state {
            confirmations.inset = true;
        }
        self.resize(height);
        self.present();
    }

    /// Sizes the overlay to the stored height and proper width. No-op when
    /// both already match.
    fn resize(&mut self, height: u32) {
        let height = *self.stored_height.get_or_insert(height);
        let width = self.window.proper_width();
        if self.size != (width, height) {
            self.size = (width, height);
            self.overlay.set_size(width, height);
        }
    }

    fn present(&mut self) {
        if self.state == PopupState::Shown {
            return;
        }
        self.state = PopupState::Shown;
        self.overlay.present_at_bottom();
        self.content.on_show();
        if let Some(listener) = self.listener.as_mut() {
            listener.on_show();
        }
        tracing::info!("Overlay shown at {}x{}", self.size.0, self.size.1);
    }

    fn visibility_subscription(&self) -> Subscription {
        Subscription::from(self.signal.kind())
    }

    /// Installs the layout listener. A fresh install forgets de-duplication
    /// state so the next report is always delivered, and forgets the
    /// keyboard state, which went unobserved while unsubscribed.
    fn install_visibility_listener(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        let visibility = self.visibility_subscription();
        if self.subscriptions.subscribe(visibility) {
            self.signal.reset();
            if self.keyboard != KeyboardState::Closed {
                tracing::debug!("Keyboard state {:?} unconfirmed, reset", self.keyboard);
                self.keyboard = KeyboardState::Closed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessHost, HeadlessWindow};
    use crate::protocol::ImeOptions;

    fn config() -> PopupConfig {
        PopupConfig::default().with_min_keyboard_height_dp(50).without_timeout()
    }

    fn host() -> HeadlessHost {
        HeadlessHost::new(HeadlessWindow::new(1080, 2340), ImeOptions(0x06))
    }

    fn insets(raw_bottom: u32, stable_bottom: u32) -> LayoutSample {
        LayoutSample::Insets {
            raw_bottom,
            stable_bottom,
        }
    }

    #[test]
    fn test_construction_requires_host_window() {
        let surface = Rc::new(crate::headless::HeadlessSurface::new(ImeOptions(0)));
        let recorder = crate::headless::Recorder::new();
        let result = EmojiPopup::new(
            surface,
            Box::new(crate::headless::HeadlessOverlay::new(recorder.clone())),
            Box::new(crate::headless::HeadlessContent::new(recorder)),
            Services::unavailable(),
            Rc::new(HeightCache::new()),
            &config(),
        );
        assert!(matches!(result, Err(PopupError::Configuration(_))));
    }

    #[test]
    fn test_presize_from_cache() {
        let host = host();
        let cache = Rc::new(HeightCache::new());
        cache.set(&host.window.height_context(), 700);

        let popup = host.popup(cache, &config()).unwrap();
        assert_eq!(popup.overlay_size(), (1080, 700));
        assert!(host.recorder.contains("set_size(1080, 700)"));
    }

    /// A cached height under the threshold is ignored.
    #[test]
    fn test_stale_cache_not_used() {
        let host = host();
        let cache = Rc::new(HeightCache::new());
        cache.set(&host.window.height_context(), 20);

        let popup = host.popup(cache, &config()).unwrap();
        assert_eq!(popup.overlay_size(), (0, 0));
        assert_eq!(host.recorder.count("set_size"), 0);
    }

    #[test]
    fn test_show_requests_focus_and_keyboard() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        assert!(host.surface.has_focus());
        assert!(popup.is_pending_open());
        assert_eq!(popup.overlay_state(), OverlayState::PendingShow);
        assert_eq!(popup.keyboard_state(), KeyboardState::Opening { pending: true });
        assert!(host.recorder.contains("content.refresh"));
        assert!(host.recorder.contains("show_soft_input(1)"));
        assert!(!popup.is_showing());
    }

    #[test]
    fn test_opened_presents_once() {
        let host = host();
        let cache = Rc::new(HeightCache::new());
        let mut popup = host.popup(cache.clone(), &config()).unwrap();

        popup.show();
        popup.on_layout_sample(insets(250, 0));
        assert_eq!(popup.state(), PopupState::Shown);
        assert_eq!(popup.overlay_size(), (1080, 250));
        assert_eq!(cache.get(&host.window.height_context()), Some(250));

        popup.on_layout_sample(insets(260, 0));
        popup.show();
        assert_eq!(host.recorder.count("on_show"), 1);
        assert_eq!(host.recorder.count("present_at_bottom"), 1);
        assert_eq!(host.recorder.count("content.on_show"), 1);
    }

    /// Repeated identical heights never resize the overlay again.
    #[test]
    fn test_no_resize_on_identical_height() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        popup.on_layout_sample(insets(250, 0));
        popup.on_layout_sample(insets(300, 50));
        popup.on_layout_sample(insets(251, 0));
        popup.on_layout_sample(insets(250, 0));

        assert_eq!(host.recorder.count("set_size"), 1);
        // The stored height stays at the first confirmed value.
        assert_eq!(popup.overlay_size(), (1080, 250));
    }

    /// The keyboard-opened callback fires on the closed-to-open edge only.
    #[test]
    fn test_keyboard_opened_edge_only() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();
        popup.attach();

        popup.on_layout_sample(insets(250, 0));
        popup.on_layout_sample(insets(270, 0));
        assert_eq!(host.recorder.count("on_keyboard_opened"), 1);

        popup.on_layout_sample(insets(0, 0));
        popup.on_layout_sample(insets(0, 0));
        assert_eq!(host.recorder.count("on_keyboard_closed"), 1);

        popup.on_layout_sample(insets(250, 0));
        assert_eq!(host.recorder.count("on_keyboard_opened"), 2);
        assert_eq!(popup.state(), PopupState::Idle);
    }

    #[test]
    fn test_small_inset_keeps_opening() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        popup.on_layout_sample(insets(30, 0));
        assert!(popup.is_pending_open());
        assert_eq!(host.recorder.count("on_show"), 0);
        assert_eq!(host.recorder.count("on_keyboard_closed"), 0);
    }

    #[test]
    fn test_keyboard_closed_dismisses() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        popup.on_layout_sample(insets(250, 0));
        popup.on_layout_sample(insets(0, 0));

        assert_eq!(popup.state(), PopupState::Idle);
        assert_eq!(popup.keyboard_state(), KeyboardState::Closed);
        assert_eq!(host.recorder.count("on_dismiss"), 1);
        assert_eq!(host.recorder.count("hide"), 1);
    }

    /// Result before the inset: advisory only, presentation waits.
    #[test]
    fn test_result_then_inset() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        let token = popup.receiver().unwrap();
        popup.on_soft_input_result(token, 2);
        assert!(popup.is_pending_open());
        assert_eq!(popup.keyboard_state(), KeyboardState::Opening { pending: false });
        match popup.state() {
            PopupState::Opening(c) => {
                assert!(!c.inset);
                assert_eq!(c.result, Some(SoftInputResult::Shown));
            }
            other => panic!("unexpected state {:?}", other),
        }

        popup.on_layout_sample(insets(300, 0));
        assert!(popup.is_showing());
        assert_eq!(host.recorder.count("on_show"), 1);
    }

    /// Inset before the result: the late result changes nothing.
    #[test]
    fn test_inset_then_result() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        let token = popup.receiver().unwrap();
        popup.on_layout_sample(insets(300, 0));
        assert!(popup.is_showing());

        popup.on_soft_input_result(token, 0);
        assert!(popup.is_showing());
        assert_eq!(host.recorder.count("on_show"), 1);
    }

    /// Keyboard already up: no new inset arrives, the result presents.
    #[test]
    fn test_already_open_keyboard_presents_on_result() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();
        popup.attach();
        popup.on_layout_sample(insets(300, 0));

        popup.show();
        assert!(popup.is_pending_open());
        popup.on_soft_input_result(popup.receiver().unwrap(), 0);
        assert!(popup.is_showing());
        assert_eq!(popup.overlay_size(), (1080, 300));
    }

    #[test]
    fn test_hidden_result_ignored() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();
        popup.attach();
        popup.on_layout_sample(insets(300, 0));

        popup.show();
        popup.on_soft_input_result(popup.receiver().unwrap(), 3);
        popup.on_soft_input_result(popup.receiver().unwrap(), 1);
        assert!(popup.is_pending_open());
    }

    #[test]
    fn test_result_after_dismiss_discarded() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();
        popup.attach();
        popup.on_layout_sample(insets(300, 0));

        popup.show();
        let token = popup.receiver().unwrap();
        popup.dismiss();
        assert_eq!(popup.receiver(), None);

        popup.on_soft_input_result(token, 0);
        assert_eq!(popup.state(), PopupState::Idle);
        assert_eq!(host.recorder.count("on_show"), 0);
    }

    /// A dismissed opening never reopens from a late inset.
    #[test]
    fn test_dismiss_while_opening_cancels() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        popup.dismiss();
        assert!(!popup.is_pending_open());
        assert_eq!(host.recorder.count("on_dismiss"), 0);

        popup.on_layout_sample(insets(300, 0));
        assert_eq!(popup.state(), PopupState::Idle);
        assert_eq!(host.recorder.count("on_show"), 0);
    }

    #[test]
    fn test_toggle() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.toggle();
        assert!(popup.is_pending_open());
        popup.on_layout_sample(insets(300, 0));
        assert!(popup.is_showing());

        popup.toggle();
        assert_eq!(popup.state(), PopupState::Idle);
        assert_eq!(host.recorder.count("on_dismiss"), 1);

        // Re-installing the listener delivers the same offset again.
        popup.toggle();
        popup.on_layout_sample(insets(300, 0));
        assert!(popup.is_showing());
        assert_eq!(host.recorder.count("on_show"), 2);
    }

    #[test]
    fn test_extract_ui_options_round_trip() {
        let host = HeadlessHost::new(
            HeadlessWindow::new(2340, 1080).with_extract_ui(true),
            ImeOptions(0x06),
        );
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        assert!(host.surface.ime_options().contains(ImeOptions::NO_EXTRACT_UI));
        popup.show();
        popup.on_layout_sample(insets(400, 0));
        popup.dismiss();

        assert_eq!(host.surface.ime_options(), ImeOptions(0x06));
        assert_eq!(host.recorder.count("cancel_pending_ui"), 1);
        // Override restart + restore restart.
        assert_eq!(host.recorder.count("restart_input"), 2);
    }

    #[test]
    fn test_no_services_degrades() {
        let host = host();
        let mut popup = host
            .popup_with_services(Services::unavailable(), Rc::new(HeightCache::new()), &config())
            .unwrap();

        popup.show();
        assert_eq!(popup.receiver(), None);
        popup.on_layout_sample(insets(300, 0));
        assert!(popup.is_showing());

        popup.close_keyboard();
        assert_eq!(popup.state(), PopupState::Idle);
    }

    /// Without an input method, an already open keyboard presents at once.
    #[test]
    fn test_no_services_keyboard_already_open() {
        let host = host();
        let mut popup = host
            .popup_with_services(Services::unavailable(), Rc::new(HeightCache::new()), &config())
            .unwrap();
        popup.attach();
        popup.on_layout_sample(insets(300, 0));

        popup.show();
        assert!(popup.is_showing());
    }

    #[test]
    fn test_close_keyboard_hides_soft_input() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        popup.on_layout_sample(insets(300, 0));
        popup.close_keyboard();
        assert!(!popup.is_showing());
        assert_eq!(host.recorder.count("hide_soft_input"), 1);
    }

    #[test]
    fn test_detach_is_terminal() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();
        popup.attach();

        popup.detach();
        assert!(popup.is_torn_down());
        popup.attach();
        popup.show();
        popup.on_layout_sample(insets(300, 0));
        assert_eq!(popup.state(), PopupState::Idle);
        assert_eq!(host.recorder.count("on_keyboard_opened"), 0);
        assert_eq!(host.recorder.count("show_soft_input"), 0);
    }

    #[test]
    fn test_global_layout_fallback() {
        let host = HeadlessHost::new(
            HeadlessWindow::new(1080, 2340).with_insets(false).with_density(2.0),
            ImeOptions(0),
        );
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        // Inset reports are not what this host delivers.
        popup.on_layout_sample(insets(900, 0));
        assert!(popup.is_pending_open());

        // 90px is below the 100px threshold at density 2.
        popup.on_layout_sample(LayoutSample::GlobalLayout {
            visible_bottom: 2250,
            full_height: 2340,
        });
        assert!(popup.is_pending_open());

        popup.on_layout_sample(LayoutSample::GlobalLayout {
            visible_bottom: 1600,
            full_height: 2340,
        });
        assert!(popup.is_showing());
        assert_eq!(popup.overlay_size(), (1080, 740));
    }

    #[test]
    fn test_force_layout_signal() {
        let host = host();
        let config = PopupConfig {
            force_layout_signal: true,
            ..config()
        };
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config).unwrap();

        popup.show();
        popup.on_layout_sample(LayoutSample::GlobalLayout {
            visible_bottom: 2000,
            full_height: 2340,
        });
        assert!(popup.is_showing());
    }

    #[test]
    fn test_timeout_disabled() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        assert_eq!(popup.opening_deadline(), None);
        let later = Instant::now() + Duration::from_secs(60);
        assert_eq!(popup.poll_opening_timeout(later), Ok(false));
        assert!(popup.is_pending_open());
    }

    /// An elapsed wait presents at the cached height.
    #[test]
    fn test_timeout_presents_at_cached_height() {
        let host = host();
        let cache = Rc::new(HeightCache::new());
        cache.set(&host.window.height_context(), 640);
        let config = config().with_opening_timeout_ms(100);
        let mut popup = host.popup(cache, &config).unwrap();

        popup.show();
        let deadline = popup.opening_deadline().unwrap();
        assert_eq!(
            popup.poll_opening_timeout(deadline - Duration::from_millis(1)),
            Ok(false)
        );
        assert_eq!(popup.poll_opening_timeout(deadline), Ok(true));
        assert!(popup.is_showing());
        assert_eq!(popup.overlay_size(), (1080, 640));
    }

    /// A closed report dismisses a forced presentation even though the
    /// keyboard was never confirmed open.
    #[test]
    fn test_closed_dismisses_forced_presentation() {
        let host = host();
        let cache = Rc::new(HeightCache::new());
        cache.set(&host.window.height_context(), 640);
        let config = config().with_opening_timeout_ms(100);
        let mut popup = host.popup(cache, &config).unwrap();
        popup.attach();

        popup.show();
        let deadline = popup.opening_deadline().unwrap();
        assert_eq!(popup.poll_opening_timeout(deadline), Ok(true));
        assert_eq!(popup.keyboard_state(), KeyboardState::Opening { pending: true });

        popup.on_layout_sample(insets(0, 0));
        assert_eq!(popup.state(), PopupState::Idle);
        assert_eq!(popup.keyboard_state(), KeyboardState::Closed);
        assert_eq!(host.recorder.count("on_dismiss"), 1);
        // Never observed open, so no closed edge to report.
        assert_eq!(host.recorder.count("on_keyboard_closed"), 0);
    }

    /// A keyboard that closed while the overlay was dismissed is not
    /// trusted on the next show; the result code alone cannot present.
    #[test]
    fn test_reshow_waits_for_inset_after_unobserved_close() {
        let host = host();
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config()).unwrap();

        popup.show();
        popup.on_layout_sample(insets(300, 0));
        popup.dismiss();
        // Unsubscribed: this report is never seen.
        popup.on_layout_sample(insets(0, 0));
        assert_eq!(popup.keyboard_state(), KeyboardState::Open(300));

        popup.show();
        assert_eq!(popup.keyboard_state(), KeyboardState::Opening { pending: true });
        popup.on_soft_input_result(popup.receiver().unwrap(), 2);
        assert!(popup.is_pending_open());
        assert_eq!(host.recorder.count("on_show"), 1);

        popup.on_layout_sample(insets(320, 0));
        assert!(popup.is_showing());
        assert_eq!(host.recorder.count("on_show"), 2);
    }

    /// An elapsed wait with no plausible height abandons the show.
    #[test]
    fn test_timeout_without_height_abandons() {
        let host = host();
        let config = config().with_opening_timeout_ms(100);
        let mut popup = host.popup(Rc::new(HeightCache::new()), &config).unwrap();

        popup.show();
        let deadline = popup.opening_deadline().unwrap();
        assert_eq!(
            popup.poll_opening_timeout(deadline),
            Err(PopupError::ProtocolTimeout { waited_ms: 100 })
        );
        assert_eq!(popup.state(), PopupState::Idle);
        assert_eq!(popup.receiver(), None);
    }
}
