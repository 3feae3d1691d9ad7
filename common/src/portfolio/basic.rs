use std::rc::Rc;

use tracing::{info, warn};

use super::{CLOSE_SELECTOR, FILTER_BUTTON_SELECTOR, Filter, GRID_ID, MODAL_ID, PortfolioItem};
use crate::{Teardown, dom::Dom};

// unanimated filtering plus a working close button
pub struct BasicGallery<D: Dom> {
    dom: Rc<D>,
    items: Vec<PortfolioItem>,
    buttons: Vec<D::Node>,
    grid: Option<D::Node>,
    modal: Option<D::Node>,
    close: Option<D::Node>,
}

impl<D: Dom> BasicGallery<D> {
    pub fn attach(dom: Rc<D>, items: Vec<PortfolioItem>) -> Option<Self> {
        let buttons = dom.query_all(FILTER_BUTTON_SELECTOR);
        let modal = dom.by_id(MODAL_ID);
        let close = dom.query(CLOSE_SELECTOR);

        if buttons.is_empty() && (modal.is_none() || close.is_none()) {
            return None;
        }

        info!("activating basic gallery");
        Some(BasicGallery {
            grid: dom.by_id(GRID_ID),
            dom,
            items,
            buttons,
            modal,
            close,
        })
    }

    pub fn buttons(&self) -> &[D::Node] {
        &self.buttons
    }

    pub fn close_button(&self) -> Option<&D::Node> {
        self.close.as_ref()
    }

    pub fn filter_clicked(&self, button: &D::Node) {
        let tag = self.dom.attribute(button, "data-filter").unwrap_or_default();
        let filter: Filter = match tag.parse() {
            Ok(filter) => filter,
            Err(err) => {
                warn!("ignoring filter button: {err}");
                return;
            }
        };

        for other in &self.buttons {
            self.dom.set_class(other, "active", false);
        }
        self.dom.set_class(button, "active", true);

        let Some(grid) = &self.grid else {
            return;
        };

        self.dom.clear_children(grid);
        for item in filter.apply(&self.items) {
            let (Some(tile), Some(image)) = (self.dom.create_element("div"), self.dom.create_element("img")) else {
                return;
            };

            self.dom.set_class(&tile, "gallery-item", true);
            self.dom.set_attribute(&image, "src", item.image);
            self.dom.set_attribute(&image, "alt", &item.alt_text());
            self.dom.append_child(&tile, &image);
            self.dom.append_child(grid, &tile);
        }
    }

    pub fn close_clicked(&self) {
        if let Some(modal) = &self.modal {
            self.dom.set_style(modal, "display", "none");
        }
        if let Some(body) = self.dom.body() {
            self.dom.set_style(&body, "overflow", "");
        }
    }
}

impl<D: Dom> Teardown for BasicGallery<D> {
    fn teardown(&self) {}
}
