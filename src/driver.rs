// SPDX-License-Identifier: GPL-3.0-only

//! Async event loop feeding a popup from a channel.
//!
//! Host callbacks and user intents are sent as [`PopupEvent`]s and applied to
//! the popup one at a time, on the task running [`run`]. While the popup is
//! opening with a bounded wait, the loop also sleeps until the deadline and
//! then forces a decision through `EmojiPopup::poll_opening_timeout`.
//!
//! The popup is not `Send`; drive [`run`] on the UI task itself (await it or
//! join it), never with `tokio::spawn`.

use std::time::Instant;

use futures::StreamExt;
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};

use crate::app_settings;
use crate::popup::EmojiPopup;
use crate::signal::LayoutSample;

/// Everything that can happen to a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PopupEvent {
    /// Host view attached to its window.
    Attach,
    /// Host view detached; the popup is torn down.
    Detach,
    Show,
    Dismiss,
    Toggle,
    /// Dismiss and hide the real keyboard too.
    CloseKeyboard,
    /// Window inset change.
    Insets { raw_bottom: u32, stable_bottom: u32 },
    /// Global layout pass.
    GlobalLayout { visible_bottom: u32, full_height: u32 },
    /// Result code for the outstanding soft input request.
    SoftInputResult { code: i32 },
    /// Stop the loop and hand the popup back.
    Shutdown,
}

/// Creates the event channel for [`run`].
#[must_use]
pub fn channel() -> (mpsc::Sender<PopupEvent>, mpsc::Receiver<PopupEvent>) {
    mpsc::channel(app_settings::DEFAULT_EVENT_CHANNEL_CAPACITY)
}

/// Applies one event. Returns `false` when the loop should stop.
pub fn apply(popup: &mut EmojiPopup, event: PopupEvent) -> bool {
    tracing::debug!("Event: {:?}", event);
    match event {
        PopupEvent::Attach => popup.attach(),
        PopupEvent::Detach => popup.detach(),
        PopupEvent::Show => popup.show(),
        PopupEvent::Dismiss => popup.dismiss(),
        PopupEvent::Toggle => popup.toggle(),
        PopupEvent::CloseKeyboard => popup.close_keyboard(),
        PopupEvent::Insets {
            raw_bottom,
            stable_bottom,
        } => popup.on_layout_sample(LayoutSample::Insets {
            raw_bottom,
            stable_bottom,
        }),
        PopupEvent::GlobalLayout {
            visible_bottom,
            full_height,
        } => popup.on_layout_sample(LayoutSample::GlobalLayout {
            visible_bottom,
            full_height,
        }),
        PopupEvent::SoftInputResult { code } => match popup.receiver() {
            Some(token) => popup.on_soft_input_result(token, code),
            None => tracing::debug!("No receiver for soft input result {}, discarding", code),
        },
        PopupEvent::Shutdown => return false,
    }
    true
}

/// Runs the popup until the channel closes or a `Shutdown` arrives.
pub async fn run(mut popup: EmojiPopup, mut rx: mpsc::Receiver<PopupEvent>) -> EmojiPopup {
    loop {
        let next = match popup.opening_deadline() {
            Some(deadline) => {
                tokio::select! {
                    event = rx.next() => event,
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                        if let Err(e) = popup.poll_opening_timeout(Instant::now()) {
                            tracing::warn!("Abandoned show: {}", e);
                        }
                        continue;
                    }
                }
            }
            None => rx.next().await,
        };

        let Some(event) = next else {
            tracing::debug!("Event channel closed");
            break;
        };
        if !apply(&mut popup, event) {
            tracing::debug!("Shutdown requested");
            break;
        }
    }
    popup
}
