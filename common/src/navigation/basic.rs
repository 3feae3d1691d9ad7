use std::rc::Rc;

use tracing::info;

use super::{BACK_TO_TOP_ID, HAMBURGER_ID, LINK_SELECTOR, LinkAction, MENU_ID};
use crate::{Teardown, dom::Dom};

// plain anchor scrolling and menu toggling, used when the full controller fails to set up
pub struct BasicNavigation<D: Dom> {
    dom: Rc<D>,
    links: Vec<D::Node>,
    hamburger: Option<D::Node>,
    panel: Option<D::Node>,
    back_to_top: Option<D::Node>,
}

impl<D: Dom> BasicNavigation<D> {
    pub fn attach(dom: Rc<D>) -> Option<Self> {
        let links = dom.query_all(LINK_SELECTOR);
        let hamburger = dom.by_id(HAMBURGER_ID);
        let panel = dom.by_id(MENU_ID);
        let back_to_top = dom.by_id(BACK_TO_TOP_ID);

        if links.is_empty() && hamburger.is_none() && back_to_top.is_none() {
            return None;
        }

        info!("activating basic navigation");
        Some(BasicNavigation {
            dom,
            links,
            hamburger,
            panel,
            back_to_top,
        })
    }

    pub fn links(&self) -> &[D::Node] {
        &self.links
    }

    pub fn hamburger(&self) -> Option<&D::Node> {
        self.hamburger.as_ref()
    }

    pub fn back_to_top_button(&self) -> Option<&D::Node> {
        self.back_to_top.as_ref()
    }

    pub fn link_clicked(&self, href: &str) -> LinkAction {
        let Some(id) = href.strip_prefix('#') else {
            return LinkAction::Follow;
        };

        if let Some(section) = self.dom.by_id(id) {
            self.dom.scroll_into_view(&section);
        }
        LinkAction::Handled
    }

    pub fn toggle_menu(&self) {
        let (Some(hamburger), Some(panel)) = (&self.hamburger, &self.panel) else {
            return;
        };

        let open = !self.dom.has_class(panel, "open");
        self.dom.set_class(hamburger, "active", open);
        self.dom.set_class(panel, "open", open);
        if let Some(body) = self.dom.body() {
            self.dom.set_class(&body, "no-scroll", open);
        }
    }

    pub fn back_to_top(&self) {
        self.dom.scroll_to(0.0, true);
    }
}

impl<D: Dom> Teardown for BasicNavigation<D> {
    fn teardown(&self) {}
}
