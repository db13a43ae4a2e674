use dioxus::logger::tracing::{warn, Level};
use form_builder::visual_editor::FormBuilderApp;

fn main() {
    if let Err(err) = dioxus::logger::init(Level::INFO) {
        // Whatever subscriber got there first still receives this.
        warn!(%err, "logger already initialized");
    }
    dioxus::launch(FormBuilderApp);
}
