// SPDX-License-Identifier: GPL-3.0-only

//! In-memory host for running the popup without a platform.
//!
//! Every collaborator records the calls it receives into a shared
//! [`Recorder`], which the simulator prints and tests assert on.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::PopupConfig;
use crate::error::PopupResult;
use crate::height::HeightCache;
use crate::popup::EmojiPopup;
use crate::popup::host::{
    Autofill, EditSurface, HostWindow, InputMethod, OverlayWindow, PopupContent, PopupListener,
    Services,
};
use crate::protocol::{ImeOptions, ReceiverToken};

/// Shared, ordered log of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        let call = call.into();
        tracing::trace!("headless: {}", call);
        self.calls.borrow_mut().push(call);
    }

    /// Snapshot of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Counts calls named `name`, with or without arguments.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        let with_args = format!("{}(", name);
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.as_str() == name || call.starts_with(&with_args))
            .count()
    }

    /// Whether `call` was recorded verbatim.
    #[must_use]
    pub fn contains(&self, call: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == call)
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

/// Host window with fixed display metrics.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    density: f32,
    width: u32,
    height: u32,
    insets: bool,
    extract_ui: bool,
}

impl HeadlessWindow {
    /// Density 1.0, inset callbacks available, no extract UI.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            density: 1.0,
            width,
            height,
            insets: true,
            extract_ui: false,
        }
    }

    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    #[must_use]
    pub fn with_insets(mut self, insets: bool) -> Self {
        self.insets = insets;
        self
    }

    #[must_use]
    pub fn with_extract_ui(mut self, extract_ui: bool) -> Self {
        self.extract_ui = extract_ui;
        self
    }
}

impl HostWindow for HeadlessWindow {
    fn density(&self) -> f32 {
        self.density
    }

    fn display_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn supports_window_insets(&self) -> bool {
        self.insets
    }

    fn supports_extract_ui(&self) -> bool {
        self.extract_ui
    }
}

/// Edit surface holding options and focus in cells.
pub struct HeadlessSurface {
    options: Cell<ImeOptions>,
    focused: Cell<bool>,
    window: Option<Rc<dyn HostWindow>>,
}

impl HeadlessSurface {
    /// A detached surface with no host window.
    #[must_use]
    pub fn new(options: ImeOptions) -> Self {
        Self {
            options: Cell::new(options),
            focused: Cell::new(false),
            window: None,
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: Rc<dyn HostWindow>) -> Self {
        self.window = Some(window);
        self
    }
}

impl EditSurface for HeadlessSurface {
    fn ime_options(&self) -> ImeOptions {
        self.options.get()
    }

    fn set_ime_options(&self, options: ImeOptions) {
        self.options.set(options);
    }

    fn has_focus(&self) -> bool {
        self.focused.get()
    }

    fn request_focus(&self) {
        self.focused.set(true);
    }

    fn host_window(&self) -> Option<Rc<dyn HostWindow>> {
        self.window.clone()
    }
}

/// Input method that records requests and never answers on its own.
#[derive(Debug)]
pub struct HeadlessInputMethod {
    recorder: Recorder,
}

impl HeadlessInputMethod {
    #[must_use]
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

impl InputMethod for HeadlessInputMethod {
    fn restart_input(&mut self, _surface: &dyn EditSurface) {
        self.recorder.record("restart_input");
    }

    fn show_soft_input(&mut self, _surface: &dyn EditSurface, token: ReceiverToken) {
        self.recorder
            .record(format!("show_soft_input({})", token.generation()));
    }

    fn hide_soft_input(&mut self) {
        self.recorder.record("hide_soft_input");
    }
}

#[derive(Debug)]
pub struct HeadlessAutofill {
    recorder: Recorder,
}

impl HeadlessAutofill {
    #[must_use]
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

impl Autofill for HeadlessAutofill {
    fn cancel_pending_ui(&mut self) {
        self.recorder.record("cancel_pending_ui");
    }
}

#[derive(Debug)]
pub struct HeadlessOverlay {
    recorder: Recorder,
}

impl HeadlessOverlay {
    #[must_use]
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

impl OverlayWindow for HeadlessOverlay {
    fn present_at_bottom(&mut self) {
        self.recorder.record("present_at_bottom");
    }

    fn hide(&mut self) {
        self.recorder.record("hide");
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.recorder.record(format!("set_size({}, {})", width, height));
    }
}

#[derive(Debug)]
pub struct HeadlessContent {
    recorder: Recorder,
}

impl HeadlessContent {
    #[must_use]
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

impl PopupContent for HeadlessContent {
    fn refresh(&mut self) {
        self.recorder.record("content.refresh");
    }

    fn dismiss(&mut self) {
        self.recorder.record("content.dismiss");
    }

    fn on_show(&mut self) {
        self.recorder.record("content.on_show");
    }
}

/// Listener that records every callback.
#[derive(Debug)]
pub struct RecordingListener {
    recorder: Recorder,
}

impl RecordingListener {
    #[must_use]
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }
}

impl PopupListener for RecordingListener {
    fn on_show(&mut self) {
        self.recorder.record("on_show");
    }

    fn on_keyboard_opened(&mut self, height: u32) {
        self.recorder.record(format!("on_keyboard_opened({})", height));
    }

    fn on_keyboard_closed(&mut self) {
        self.recorder.record("on_keyboard_closed");
    }

    fn on_dismiss(&mut self) {
        self.recorder.record("on_dismiss");
    }
}

/// A complete headless host: one window, one edit surface, all services.
pub struct HeadlessHost {
    pub recorder: Recorder,
    pub window: Rc<HeadlessWindow>,
    pub surface: Rc<HeadlessSurface>,
}

impl HeadlessHost {
    #[must_use]
    pub fn new(window: HeadlessWindow, options: ImeOptions) -> Self {
        let window = Rc::new(window);
        let surface = HeadlessSurface::new(options).with_window(window.clone());
        Self {
            recorder: Recorder::new(),
            window,
            surface: Rc::new(surface),
        }
    }

    /// Builds a popup wired to recording collaborators and listener.
    pub fn popup(&self, cache: Rc<HeightCache>, config: &PopupConfig) -> PopupResult<EmojiPopup> {
        self.popup_with_services(
            Services::new(
                Box::new(HeadlessInputMethod::new(self.recorder.clone())),
                Box::new(HeadlessAutofill::new(self.recorder.clone())),
            ),
            cache,
            config,
        )
    }

    /// Builds a popup with the given services.
    pub fn popup_with_services(
        &self,
        services: Services,
        cache: Rc<HeightCache>,
        config: &PopupConfig,
    ) -> PopupResult<EmojiPopup> {
        let mut popup = EmojiPopup::new(
            self.surface.clone(),
            Box::new(HeadlessOverlay::new(self.recorder.clone())),
            Box::new(HeadlessContent::new(self.recorder.clone())),
            services,
            cache,
            config,
        )?;
        popup.set_listener(Box::new(RecordingListener::new(self.recorder.clone())));
        Ok(popup)
    }
}
