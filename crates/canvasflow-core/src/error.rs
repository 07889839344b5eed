//! Error types for the editor core.

use crate::shape::ShapeId;
use thiserror::Error;

/// Errors raised by the state tree, the shortcut registry and tool states.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("State {0} has no child states, cannot transition to {1}")]
    NoChildren(String, String),
    #[error("Could not find a state named {to} under {parent}")]
    UnknownState { parent: String, to: String },
    #[error("State {parent} already has a child named {id}")]
    DuplicateState { parent: String, id: String },
    #[error("State handle no longer refers to a registered state")]
    StaleState,
    #[error("Cannot deregister {0} while it is active")]
    ActiveState(String),
    #[error("State {0} expected a selection bounds")]
    MissingSelectionBounds(&'static str),
    #[error("State {0} was entered without the {1} it needs")]
    MissingTransitionData(&'static str, &'static str),
    #[error("Malformed shortcut chord {chord:?}: {reason}")]
    MalformedChord { chord: String, reason: &'static str },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Result type for state tree operations and handlers.
pub type StateResult<T = ()> = Result<T, StateError>;

/// Errors raised by shape collaborators.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("Invalid props for {kind} shape: {source}")]
    Props {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Could not encode props of {kind} shape: {source}")]
    Encode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("No shape kind registered for {0}")]
    UnknownKind(String),
    #[error("Shape not found: {0}")]
    NotFound(ShapeId),
}

/// Errors raised while loading editor settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
