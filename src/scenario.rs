// SPDX-License-Identifier: GPL-3.0-only

//! Scripted event sequences for the simulator.
//!
//! A scenario describes a headless display and a list of timed events:
//!
//! ```json
//! {
//!   "display": { "width": 1080, "height": 2340, "density": 2.75 },
//!   "ime_options": 6,
//!   "steps": [
//!     { "event": "attach" },
//!     { "event": "show" },
//!     { "after_ms": 30, "event": "soft_input_result", "code": 2 },
//!     { "after_ms": 50, "event": "insets", "raw_bottom": 900, "stable_bottom": 132 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use futures::SinkExt;
use serde::{Deserialize, Serialize};

use crate::config::PopupConfig;
use crate::driver::{self, PopupEvent};
use crate::error::{PopupError, PopupResult};
use crate::headless::{HeadlessHost, HeadlessWindow};
use crate::height::HeightCache;
use crate::popup::EmojiPopup;
use crate::protocol::ImeOptions;

/// Display of the simulated host window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySpec {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_density")]
    pub density: f32,
    #[serde(default = "default_insets")]
    pub insets: bool,
    #[serde(default)]
    pub extract_ui: bool,
}

fn default_density() -> f32 {
    1.0
}

fn default_insets() -> bool {
    true
}

/// One timed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Delay before the event is delivered.
    #[serde(default)]
    pub after_ms: u64,
    #[serde(flatten)]
    pub event: PopupEvent,
}

/// A complete scripted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub display: DisplaySpec,
    #[serde(default)]
    pub ime_options: u32,
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Loads a scenario file.
    pub fn load(path: impl AsRef<Path>) -> PopupResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| PopupError::io(e, path))?;
        serde_json::from_str(&json).map_err(|e| PopupError::json(e, path))
    }

    /// Builds the headless host this scenario runs against.
    #[must_use]
    pub fn host(&self) -> HeadlessHost {
        let window = HeadlessWindow::new(self.display.width, self.display.height)
            .with_density(self.display.density)
            .with_insets(self.display.insets)
            .with_extract_ui(self.display.extract_ui);
        HeadlessHost::new(window, ImeOptions(self.ime_options))
    }

    /// Replays the steps through the driver and returns the final popup.
    pub async fn play(
        &self,
        host: &HeadlessHost,
        cache: Rc<HeightCache>,
        config: &PopupConfig,
    ) -> PopupResult<EmojiPopup> {
        let popup = host.popup(cache, config)?;
        let (mut tx, rx) = driver::channel();
        let steps = self.steps.clone();

        let feeder = async move {
            for step in steps {
                if step.after_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(step.after_ms)).await;
                }
                if tx.send(step.event).await.is_err() {
                    tracing::warn!("Driver stopped before {:?}", step.event);
                    break;
                }
            }
        };

        let (popup, ()) = tokio::join!(driver::run(popup, rx), feeder);
        Ok(popup)
    }
}
