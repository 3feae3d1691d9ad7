use std::rc::Rc;

use tracing::{Level, debug, instrument};
use web_sys::{Element, Event};

use common::{
    Mounted,
    config::SiteConfig,
    input::Key,
    mount,
    portfolio::{BasicGallery, CATALOG, Gallery},
    runtime::Runtime,
};

use crate::platform::{
    dom::WebDom,
    events::{Listeners, key_name, target_element},
};

pub type GalleryLayer = Mounted<Gallery<WebDom>, BasicGallery<WebDom>>;

const TILE_SELECTOR: &str = ".gallery-item";

#[instrument(level=Level::DEBUG, skip_all)]
pub fn mount_gallery(dom: &Rc<WebDom>, runtime: &Runtime, config: &SiteConfig, listeners: &Listeners) -> Rc<GalleryLayer> {
    let layer = Rc::new(mount(
        "portfolio",
        || Gallery::attach(dom.clone(), runtime, &config.portfolio, CATALOG.to_vec()),
        || BasicGallery::attach(dom.clone(), CATALOG.to_vec()),
    ));

    match &*layer {
        Mounted::Enhanced(gallery) => wire_gallery(gallery, dom, listeners),
        Mounted::Basic(_) => wire_basic_gallery(&layer, listeners),
        Mounted::Absent => {}
    }

    layer
}

// tiles are rebuilt on every filter, so clicks are resolved from the grid
fn tile_index(event: &Event) -> Option<usize> {
    let tile: Element = target_element(event)?.closest(TILE_SELECTOR).ok().flatten()?;
    let index = tile.get_attribute("data-index")?;

    match index.parse() {
        Ok(index) => Some(index),
        Err(err) => {
            debug!(index, "ignoring tile with a bad index: {err}");
            None
        }
    }
}

fn wire_gallery(gallery: &Gallery<WebDom>, dom: &WebDom, listeners: &Listeners) {
    for button in gallery.buttons() {
        let handle = gallery.clone();
        let target = button.clone();
        listeners.listen(button, "click", move |_| {
            handle.filter_clicked(&target);
        });
    }

    if let Some(grid) = gallery.grid() {
        let handle = gallery.clone();
        listeners.listen(grid, "click", move |event| {
            if let Some(index) = tile_index(&event) {
                handle.tile_activated(index);
            }
        });

        let handle = gallery.clone();
        listeners.listen(grid, "keydown", move |event| {
            let key = key_name(&event).map(|name| Key::from(name.as_str()));
            if !key.is_some_and(|key| key.activates()) {
                return;
            }
            if let Some(index) = tile_index(&event) {
                event.prevent_default();
                handle.tile_activated(index);
            }
        });
    }

    if let Some(prev) = gallery.prev_button() {
        let handle = gallery.clone();
        listeners.listen(prev, "click", move |event| {
            event.stop_propagation();
            handle.navigate_modal(-1);
        });
    }

    if let Some(next) = gallery.next_button() {
        let handle = gallery.clone();
        listeners.listen(next, "click", move |event| {
            event.stop_propagation();
            handle.navigate_modal(1);
        });
    }

    if let Some(close) = gallery.close_button() {
        let handle = gallery.clone();
        listeners.listen(close, "click", move |_| {
            handle.close_modal();
        });
    }

    if let Some(root) = gallery.modal_root() {
        let handle = gallery.clone();
        listeners.listen(root, "click", move |event| {
            if let Some(target) = target_element(&event) {
                handle.backdrop_clicked(&target);
            }
        });
    }

    let handle = gallery.clone();
    listeners.listen(dom.document(), "keydown", move |event| {
        let Some(name) = key_name(&event) else {
            return;
        };
        if handle.handle_key(Key::from(name.as_str())) {
            event.prevent_default();
        }
    });

    for link in gallery.cross_page_links() {
        let handle = gallery.clone();
        let href = link.get_attribute("href").unwrap_or_default();
        listeners.listen(link, "click", move |event| {
            if handle.cross_page_link_clicked(&href) {
                event.prevent_default();
            }
        });
    }
}

fn wire_basic_gallery(layer: &Rc<GalleryLayer>, listeners: &Listeners) {
    let Some(basic) = layer.basic() else {
        return;
    };

    for button in basic.buttons() {
        let handle = layer.clone();
        let target = button.clone();
        listeners.listen(button, "click", move |_| {
            if let Some(basic) = handle.basic() {
                basic.filter_clicked(&target);
            }
        });
    }

    if let Some(close) = basic.close_button() {
        let handle = layer.clone();
        listeners.listen(close, "click", move |_| {
            if let Some(basic) = handle.basic() {
                basic.close_clicked();
            }
        });
    }
}
