mod component;
mod form_picker;
mod preview;
mod properties_editor;

pub use component::{FormBuilder, FormBuilderApp, NoticeSignal};
