use std::rc::Rc;

use tracing::{Level, instrument};

use common::{
    Mounted,
    config::SiteConfig,
    input::Key,
    mount,
    navigation::{BasicNavigation, LinkAction, Navigation},
    runtime::Runtime,
};

use crate::platform::{
    dom::WebDom,
    events::{Listeners, key_name, target_element, touch_point},
};

pub type NavigationLayer = Mounted<Navigation<WebDom>, BasicNavigation<WebDom>>;

#[instrument(level=Level::DEBUG, skip_all)]
pub fn mount_navigation(
    dom: &Rc<WebDom>,
    runtime: &Runtime,
    config: &SiteConfig,
    listeners: &Listeners,
) -> Rc<NavigationLayer> {
    let layer = Rc::new(mount(
        "navigation",
        || Navigation::attach(dom.clone(), runtime, &config.navigation),
        || BasicNavigation::attach(dom.clone()),
    ));

    match &*layer {
        Mounted::Enhanced(navigation) => wire_navigation(navigation, dom, listeners),
        Mounted::Basic(_) => wire_basic_navigation(&layer, listeners),
        Mounted::Absent => {}
    }

    layer
}

fn wire_navigation(navigation: &Navigation<WebDom>, dom: &WebDom, listeners: &Listeners) {
    let handle = navigation.clone();
    listeners.listen_passive(dom.window(), "scroll", move |_| handle.on_scroll());

    let handle = navigation.clone();
    listeners.listen_passive(dom.window(), "resize", move |_| handle.on_resize());

    for link in navigation.links() {
        let handle = navigation.clone();
        let href = link.get_attribute("href").unwrap_or_default();
        listeners.listen(link, "click", move |event| {
            if handle.link_clicked(&href) == LinkAction::Handled {
                event.prevent_default();
            }
        });
    }

    if let Some(hamburger) = navigation.hamburger() {
        let handle = navigation.clone();
        listeners.listen(hamburger, "click", move |event| {
            event.stop_propagation();
            handle.toggle_menu();
        });
    }

    if let Some(panel) = navigation.menu_panel() {
        let handle = navigation.clone();
        listeners.listen_passive(panel, "touchstart", move |event| {
            if let Some(point) = touch_point(&event) {
                handle.menu_touch_start(point.y);
            }
        });

        let handle = navigation.clone();
        listeners.listen_passive(panel, "touchmove", move |event| {
            if let Some(point) = touch_point(&event) {
                handle.menu_touch_move(point.y);
            }
        });
    }

    let handle = navigation.clone();
    listeners.listen(dom.document(), "click", move |event| {
        if let Some(target) = target_element(&event) {
            handle.document_clicked(&target);
        }
    });

    let handle = navigation.clone();
    listeners.listen(dom.document(), "keydown", move |event| {
        let Some(name) = key_name(&event) else {
            return;
        };
        if handle.handle_key(Key::from(name.as_str())) {
            event.prevent_default();
        }
    });

    if let Some(button) = navigation.back_to_top_button() {
        let handle = navigation.clone();
        listeners.listen(button, "click", move |event| {
            event.prevent_default();
            handle.back_to_top();
        });

        let handle = navigation.clone();
        listeners.listen(button, "keydown", move |event| {
            let key = key_name(&event).map(|name| Key::from(name.as_str()));
            if key.is_some_and(|key| key.activates()) {
                event.prevent_default();
                handle.back_to_top();
            }
        });
    }
}

fn wire_basic_navigation(layer: &Rc<NavigationLayer>, listeners: &Listeners) {
    let Some(basic) = layer.basic() else {
        return;
    };

    for link in basic.links() {
        let handle = layer.clone();
        let href = link.get_attribute("href").unwrap_or_default();
        listeners.listen(link, "click", move |event| {
            let Some(basic) = handle.basic() else {
                return;
            };
            if basic.link_clicked(&href) == LinkAction::Handled {
                event.prevent_default();
            }
        });
    }

    if let Some(hamburger) = basic.hamburger() {
        let handle = layer.clone();
        listeners.listen(hamburger, "click", move |_| {
            if let Some(basic) = handle.basic() {
                basic.toggle_menu();
            }
        });
    }

    if let Some(button) = basic.back_to_top_button() {
        let handle = layer.clone();
        listeners.listen(button, "click", move |event| {
            event.prevent_default();
            if let Some(basic) = handle.basic() {
                basic.back_to_top();
            }
        });
    }
}
