use std::rc::Rc;

use tracing::{Level, instrument};

use common::{
    Mounted,
    config::SiteConfig,
    mount,
    runtime::Runtime,
    sidebar::{BasicSocialButtons, SocialSidebar},
};

use crate::platform::{dom::WebDom, events::Listeners};

pub type SidebarLayer = Mounted<SocialSidebar<WebDom>, BasicSocialButtons<WebDom>>;

#[instrument(level=Level::DEBUG, skip_all)]
pub fn mount_sidebar(dom: &Rc<WebDom>, runtime: &Runtime, config: &SiteConfig, listeners: &Listeners) -> Rc<SidebarLayer> {
    let layer = Rc::new(mount(
        "sidebar",
        || SocialSidebar::attach(dom.clone(), runtime, &config.sidebar),
        || BasicSocialButtons::attach(dom.clone(), runtime),
    ));

    match &*layer {
        Mounted::Enhanced(sidebar) => wire_sidebar(sidebar, dom, listeners),
        Mounted::Basic(_) => wire_basic_buttons(&layer, listeners),
        Mounted::Absent => {}
    }

    layer
}

fn wire_sidebar(sidebar: &SocialSidebar<WebDom>, dom: &WebDom, listeners: &Listeners) {
    let handle = sidebar.clone();
    listeners.listen_passive(dom.window(), "scroll", move |_| handle.on_scroll());

    let handle = sidebar.clone();
    listeners.listen_passive(dom.window(), "resize", move |_| handle.on_resize());

    if let Some(navbar) = sidebar.navbar() {
        let handle = sidebar.clone();
        listeners.observe_resize(navbar, move || handle.on_navbar_resized());
    }

    for button in sidebar.buttons() {
        for event in ["click", "touchstart"] {
            let handle = sidebar.clone();
            let target = button.clone();
            listeners.listen_passive(&button, event, move |_| {
                handle.press(&target);
            });
        }

        let handle = sidebar.clone();
        let target = button.clone();
        listeners.listen(&button, "focus", move |_| handle.focused(&target));

        let handle = sidebar.clone();
        let target = button.clone();
        listeners.listen(&button, "blur", move |_| handle.blurred(&target));
    }
}

fn wire_basic_buttons(layer: &Rc<SidebarLayer>, listeners: &Listeners) {
    let Some(basic) = layer.basic() else {
        return;
    };

    for button in basic.buttons() {
        let handle = layer.clone();
        let target = button.clone();
        listeners.listen_passive(&button, "click", move |_| {
            if let Some(basic) = handle.basic() {
                basic.press(&target);
            }
        });
    }
}
