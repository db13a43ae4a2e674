pub mod config;
pub mod error;
pub mod form_builder;
pub mod services;
pub mod visual_editor;

pub use config::BuilderConfig;
pub use error::{BackendError, EditorError, LayoutError, RepositoryError, SchemaError, ValidationError};
