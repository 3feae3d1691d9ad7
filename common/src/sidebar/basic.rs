use std::rc::Rc;

use tracing::info;

use super::{BUTTON_SELECTOR, MOBILE_BUTTON_SELECTOR};
use crate::{
    Teardown,
    dom::Dom,
    runtime::{Runtime, Slot},
};

const BASIC_PRESS_MS: u32 = 150;

// press feedback only
pub struct BasicSocialButtons<D: Dom> {
    inner: Rc<BasicInner<D>>,
}

struct BasicInner<D: Dom> {
    dom: Rc<D>,
    buttons: Vec<(D::Node, Slot)>,
}

impl<D: Dom + 'static> BasicSocialButtons<D> {
    pub fn attach(dom: Rc<D>, runtime: &Runtime) -> Option<Self> {
        let mut nodes = dom.query_all(BUTTON_SELECTOR);
        nodes.extend(dom.query_all(MOBILE_BUTTON_SELECTOR));

        if nodes.is_empty() {
            return None;
        }

        info!(buttons = nodes.len(), "activating basic social buttons");
        let buttons = nodes
            .into_iter()
            .map(|node| (node, Slot::new(&runtime.scheduler)))
            .collect();

        Some(BasicSocialButtons {
            inner: Rc::new(BasicInner { dom, buttons }),
        })
    }

    pub fn buttons(&self) -> Vec<D::Node> {
        self.inner.buttons.iter().map(|(node, _)| node.clone()).collect()
    }

    pub fn press(&self, node: &D::Node) {
        let Some((button, slot)) = self.inner.buttons.iter().find(|(n, _)| n == node) else {
            return;
        };

        self.inner.dom.set_style(button, "transform", "scale(0.95)");

        let target = button.clone();
        let weak = Rc::downgrade(&self.inner);
        slot.timeout(BASIC_PRESS_MS, move || {
            if let Some(inner) = weak.upgrade() {
                inner.dom.set_style(&target, "transform", "");
            }
        });
    }
}

impl<D: Dom> Teardown for BasicSocialButtons<D> {
    fn teardown(&self) {
        for (_, slot) in &self.inner.buttons {
            slot.clear();
        }
    }
}
