//! Error kinds surfaced by control editing and the preset store.

use std::fmt;
use thiserror::Error;

use crate::preset::PresetId;

/// Result type for preset store operations.
pub type PresetResult<T> = Result<T, PresetError>;

/// Which store-facing operation failed. Used to pick the user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    List,
    Search,
    Load,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Save => write!(f, "save"),
            Operation::List => write!(f, "list"),
            Operation::Search => write!(f, "search"),
            Operation::Load => write!(f, "load"),
        }
    }
}

/// A save request that the store refuses to persist.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("preset name is required")]
    EmptyName,

    #[error("preset name is {len} characters long, maximum is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("song code is required")]
    EmptyRawCode,

    #[error("controls JSON is required")]
    EmptyControlsJson,

    #[error("controls JSON is not a valid object: {0}")]
    MalformedControlsJson(String),

    #[error("CPS must be in the format int/int/int (for example 120/60/4), got '{0}'")]
    InvalidCps(String),

    /// Rejection reported by a remote store, carrying its detail text.
    #[error("rejected by server: {0}")]
    Rejected(String),
}

impl ValidationError {
    /// Name of the request field the error refers to, as it appears on the wire.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyName | ValidationError::NameTooLong { .. } => "name",
            ValidationError::EmptyRawCode => "raw",
            ValidationError::EmptyControlsJson | ValidationError::MalformedControlsJson(_) => {
                "controlsJson"
            }
            ValidationError::InvalidCps(_) => "cps",
            ValidationError::Rejected(_) => "request",
        }
    }
}

/// Failures of the preset store gateway.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("invalid preset: {0}")]
    Validation(#[from] ValidationError),

    #[error("preset {id} not found")]
    NotFound { id: PresetId },

    #[error("{operation} failed: {message}")]
    Transport { operation: Operation, message: String },

    #[error("stored controls are malformed: {0}")]
    MalformedStoredData(#[source] serde_json::Error),
}

impl PresetError {
    pub fn transport(operation: Operation, err: impl fmt::Display) -> Self {
        PresetError::Transport {
            operation,
            message: err.to_string(),
        }
    }

    /// Short message suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            PresetError::Validation(e) => format!("Preset not saved: {e}."),
            PresetError::NotFound { .. } => "Could not load preset: it no longer exists.".into(),
            PresetError::Transport { operation, .. } => match operation {
                Operation::Save => "Error saving preset, check the log for details.".into(),
                Operation::List => "Error listing presets, check the log for details.".into(),
                Operation::Search => "Error searching presets, check the log for details.".into(),
                Operation::Load => "Error loading preset, check the log for details.".into(),
            },
            PresetError::MalformedStoredData(_) => {
                "Preset controls could not be read; keeping the current controls.".into()
            }
        }
    }
}

/// Rejected interactive control edits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// The tempo field was reverted to `restored`.
    #[error("CPS must be in the format int/int/int (for example 120/60/4), got '{input}'")]
    InvalidCps { input: String, restored: String },
}

/// Failures reading a song/settings file.
#[derive(Debug, Error)]
pub enum SongFileError {
    #[error("song file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("song file must contain a JSON object")]
    NotAnObject,
}
