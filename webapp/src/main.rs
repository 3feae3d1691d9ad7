use tracing::Level;
use wasm_bindgen::{JsCast, closure::Closure};

mod exports;
mod gallery;
mod hero;
mod nav;
mod page;
mod platform;
mod sidebar;

fn main() {
    dioxus_logger::init(Level::DEBUG).expect("failed to init logger");

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        tracing::error!("no document to attach to");
        return;
    };

    // the module may be loaded before or after the document finished parsing
    if document.ready_state() == "loading" {
        let boot = Closure::once_into_js(page::boot);
        if let Err(err) = document.add_event_listener_with_callback("DOMContentLoaded", boot.unchecked_ref()) {
            tracing::error!("failed to wait for the document: {err:?}");
        }
    } else {
        page::boot();
    }
}
