use thiserror::Error;
use wasm_bindgen::JsValue;

/// Structural lookup failures raised by layout mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("container {0} not found")]
    ContainerNotFound(String),

    #[error("control {0} not found")]
    ControlNotFound(String),

    #[error("position {index} out of range for {len} controls")]
    PositionOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("control \"{label}\" of kind {kind} has no wire type")]
    UnmappedControl { kind: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Form cannot be empty")]
    EmptyForm,

    #[error("You need to have controls inside containers before updating.")]
    EmptyContainer { heading: String },

    #[error("Save the form before updating this {0}")]
    MissingServerId(&'static str),

    #[error("Form name cannot be empty")]
    EmptyFormName,

    #[error("Form ID already exists")]
    DuplicateFormId(i64),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("local storage is unavailable")]
    StorageUnavailable,

    #[error("storage access failed: {0}")]
    Storage(String),

    #[error("stored templates are corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template {0} not found")]
    NotFound(i64),
}

impl From<JsValue> for RepositoryError {
    fn from(err: JsValue) -> Self {
        RepositoryError::Storage(err.as_string().unwrap_or_else(|| format!("{err:?}")))
    }
}

/// Everything an editor session operation can fail with.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Drop(#[from] crate::form_builder::drag::DropRejection),

    #[error("deletion was not confirmed")]
    Declined,

    #[error("nothing is selected")]
    NothingSelected,
}
