// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the emoji popup.
//!
//! Only construction and persistence surface errors to callers. The public
//! intents (`show`, `dismiss`, `toggle`) never fail; degraded paths are logged.

use std::path::Path;

/// Result type for popup operations.
pub type PopupResult<T> = Result<T, PopupError>;

/// Errors that can occur while building or driving the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupError {
    /// No host window could be resolved from the edit surface.
    Configuration(String),
    /// The keyboard never confirmed its height within the bounded wait.
    ProtocolTimeout {
        /// How long the popup waited before giving up.
        waited_ms: u64,
    },
    /// A cached keyboard height was below the threshold and was ignored.
    StaleCacheMiss {
        /// The cached height in pixels.
        height: u32,
        /// The threshold it failed against, in pixels.
        threshold: u32,
    },
    /// Failed to read or write a file.
    Io {
        /// Path of the file.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// Failed to parse or serialize JSON.
    Json {
        /// Path of the file.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

impl PopupError {
    /// Creates an I/O error with file path context.
    pub fn io(err: std::io::Error, path: &Path) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Creates a JSON error with file path context.
    pub fn json(err: serde_json::Error, path: &Path) -> Self {
        Self::Json {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for PopupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PopupError::Configuration(msg) => write!(f, "popup configuration error: {}", msg),
            PopupError::ProtocolTimeout { waited_ms } => {
                write!(f, "keyboard did not confirm visibility within {}ms", waited_ms)
            }
            PopupError::StaleCacheMiss { height, threshold } => write!(
                f,
                "cached keyboard height {}px is below threshold {}px",
                height, threshold
            ),
            PopupError::Io { path, message } => write!(f, "I/O error at '{}': {}", path, message),
            PopupError::Json { path, message } => {
                write!(f, "JSON error at '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for PopupError {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: error variants render readable messages.
    #[test]
    fn test_error_display() {
        let config = PopupError::Configuration("no host window".to_string());
        let timeout = PopupError::ProtocolTimeout { waited_ms: 1500 };
        let stale = PopupError::StaleCacheMiss {
            height: 20,
            threshold: 50,
        };

        assert!(config.to_string().contains("no host window"));
        assert!(timeout.to_string().contains("1500ms"));
        assert!(stale.to_string().contains("20px"));
        assert!(stale.to_string().contains("50px"));
    }

    /// Test: I/O errors keep the path they failed on.
    #[test]
    fn test_io_error_with_path() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let popup_err = PopupError::io(err, Path::new("/tmp/heights.json"));

        assert!(matches!(popup_err, PopupError::Io { .. }));
        assert!(popup_err.to_string().contains("/tmp/heights.json"));
        assert!(popup_err.to_string().contains("missing"));
    }
}
