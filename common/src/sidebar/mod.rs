use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use serde::Serialize;
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    Teardown,
    config::SidebarConfig,
    dom::Dom,
    runtime::{Runtime, Slot},
};

mod basic;
pub mod policy;

pub use basic::BasicSocialButtons;
use policy::{ScrollGate, footer_entered, hero_end, past_hero};

pub const SIDEBAR_SELECTOR: &str = ".social-sidebar";
pub const FOOTER_SELECTOR: &str = ".footer-social";
pub const BUTTON_SELECTOR: &str = ".social-btn";
pub const MOBILE_BUTTON_SELECTOR: &str = ".mobile-social-btn";

const PRESS_TRANSITION: &str = "transform 0.2s ease";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SidebarState {
    #[serde(rename = "isScrolled")]
    pub scrolled: bool,
    #[serde(rename = "isHidden")]
    pub hidden: bool,
}

// the blocks whose heights decide when the sidebar turns dark
struct Landmarks<N> {
    hero: N,
    about: N,
    portfolio: Option<N>,
    navbar: N,
}

struct Button<N> {
    node: N,
    mobile: bool,
    revert: Slot,
    settle: Slot,
}

// floating social links: colour follows the page, hidden over the footer
pub struct SocialSidebar<D: Dom> {
    inner: Rc<Inner<D>>,
}

impl<D: Dom> Clone for SocialSidebar<D> {
    fn clone(&self) -> Self {
        SocialSidebar {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<D: Dom> {
    dom: Rc<D>,
    config: SidebarConfig,

    sidebar: Option<D::Node>,
    landmarks: Option<Landmarks<D::Node>>,
    footer: Option<D::Node>,
    buttons: Vec<Button<D::Node>>,

    scrolled: Cell<bool>,
    hidden: Cell<bool>,
    gate: RefCell<ScrollGate>,

    colors_frame: Slot,
    footer_frame: Slot,
    resize: Slot,
    initial_frame: Slot,
    initial_delay: Slot,
}

impl<D: Dom + 'static> SocialSidebar<D> {
    #[instrument(level=Level::DEBUG, skip_all)]
    pub fn attach(dom: Rc<D>, runtime: &Runtime, config: &SidebarConfig) -> anyhow::Result<Option<Self>> {
        let sidebar = dom.query(SIDEBAR_SELECTOR);

        let scheduler = &runtime.scheduler;
        let button = |node: D::Node, mobile: bool| Button {
            node,
            mobile,
            revert: Slot::new(scheduler),
            settle: Slot::new(scheduler),
        };

        let mut buttons: Vec<Button<D::Node>> =
            dom.query_all(BUTTON_SELECTOR).into_iter().map(|n| button(n, false)).collect();
        buttons.extend(dom.query_all(MOBILE_BUTTON_SELECTOR).into_iter().map(|n| button(n, true)));

        if sidebar.is_none() && buttons.is_empty() {
            debug!("no social sidebar on this page");
            return Ok(None);
        }

        if config.breakpoint <= 0.0 {
            return Err(anyhow::Error::msg("sidebar breakpoint must be positive"));
        }

        let landmarks = match (dom.by_id("home"), dom.by_id("about"), dom.by_id("navbar"), &sidebar) {
            (Some(hero), Some(about), Some(navbar), Some(_)) => Some(Landmarks {
                hero,
                about,
                portfolio: dom.by_id("portfolio"),
                navbar,
            }),
            _ => {
                warn!("elements for the scroll colour change not found");
                None
            }
        };

        let footer = dom.query(FOOTER_SELECTOR);
        if sidebar.is_some() && footer.is_none() {
            warn!("footer not found, the sidebar will stay visible");
        }

        let inner = Rc::new(Inner {
            dom,
            config: config.clone(),
            sidebar,
            landmarks,
            footer,
            buttons,
            scrolled: Cell::new(false),
            hidden: Cell::new(false),
            gate: RefCell::new(ScrollGate::new(config.footer_min_delta)),
            colors_frame: Slot::new(scheduler),
            footer_frame: Slot::new(scheduler),
            resize: Slot::new(scheduler),
            initial_frame: Slot::new(scheduler),
            initial_delay: Slot::new(scheduler),
        });

        info!(buttons = inner.buttons.len(), "social sidebar ready");

        if inner.landmarks.is_some() {
            let weak = Rc::downgrade(&inner);
            let delay = inner.config.initial_delay_ms;
            inner.initial_frame.frame(move |_| {
                if let Some(inner) = weak.upgrade() {
                    let weak = Rc::downgrade(&inner);
                    inner.initial_delay.timeout(delay, move || {
                        if let Some(inner) = weak.upgrade() {
                            inner.update_colors();
                        }
                    });
                }
            });
        }
        Inner::schedule_footer(&inner);

        Ok(Some(SocialSidebar { inner }))
    }

    pub fn state(&self) -> SidebarState {
        SidebarState {
            scrolled: self.inner.scrolled.get(),
            hidden: self.inner.hidden.get(),
        }
    }

    pub fn sidebar(&self) -> Option<&D::Node> {
        self.inner.sidebar.as_ref()
    }

    pub fn navbar(&self) -> Option<&D::Node> {
        self.inner.landmarks.as_ref().map(|l| &l.navbar)
    }

    pub fn buttons(&self) -> Vec<D::Node> {
        self.inner.buttons.iter().map(|b| b.node.clone()).collect()
    }

    // re-evaluate both policies right away
    pub fn refresh(&self) {
        self.inner.update_colors();
        self.inner.evaluate_footer();
    }

    pub fn on_scroll(&self) {
        let inner = &self.inner;

        if inner.landmarks.is_some() && !inner.colors_frame.is_armed() {
            let weak = Rc::downgrade(inner);
            inner.colors_frame.frame(move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.update_colors();
                }
            });
        }

        let scroll_y = inner.dom.viewport().scroll_y;
        if inner.gate.borrow_mut().admit(scroll_y) && !inner.footer_frame.is_armed() {
            Inner::schedule_footer(inner);
        }
    }

    pub fn on_resize(&self) {
        let inner = &self.inner;

        if inner.landmarks.is_some() {
            let weak = Rc::downgrade(inner);
            inner.resize.timeout(inner.config.resize_debounce_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    let weak = Rc::downgrade(&inner);
                    inner.colors_frame.frame(move |_| {
                        if let Some(inner) = weak.upgrade() {
                            inner.update_colors();
                        }
                    });
                }
            });
        }

        inner.footer_frame.clear();
        if inner.dom.viewport().width <= inner.config.breakpoint {
            if inner.hidden.get() {
                debug!("narrow viewport, showing sidebar again");
                inner.set_hidden(false);
            }
        } else {
            Inner::schedule_footer(inner);
        }
    }

    pub fn on_navbar_resized(&self) {
        if self.inner.landmarks.is_none() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.colors_frame.frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.update_colors();
            }
        });
    }

    // returns false when the button is still animating from the previous press
    pub fn press(&self, node: &D::Node) -> bool {
        let inner = &self.inner;
        let Some(button) = inner.buttons.iter().find(|b| &b.node == node) else {
            return false;
        };

        let dom = &inner.dom;
        if !dom.style(&button.node, "transform").is_empty() {
            return false;
        }

        let transform = if button.mobile {
            &inner.config.mobile_press
        } else {
            &inner.config.desktop_press
        };
        dom.set_style(&button.node, "transform", transform);
        dom.set_style(&button.node, "transition", PRESS_TRANSITION);

        let press_ms = inner.config.press_ms;
        let target = button.node.clone();
        let weak = Rc::downgrade(inner);
        button.revert.timeout(press_ms, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.dom.set_style(&target, "transform", "");

            let Some(button) = inner.buttons.iter().find(|b| b.node == target) else {
                return;
            };
            let weak = Rc::downgrade(&inner);
            button.settle.timeout(press_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.dom.set_style(&target, "transition", "");
                }
            });
        });

        true
    }

    pub fn focused(&self, node: &D::Node) {
        if self.is_desktop_button(node) {
            self.inner.dom.set_style(node, "color", &self.inner.config.focus_color);
        }
    }

    pub fn blurred(&self, node: &D::Node) {
        if self.is_desktop_button(node) {
            self.inner.dom.set_style(node, "color", "");
        }
    }

    fn is_desktop_button(&self, node: &D::Node) -> bool {
        self.inner.buttons.iter().any(|b| !b.mobile && &b.node == node)
    }
}

impl<D: Dom + 'static> Inner<D> {
    fn schedule_footer(this: &Rc<Self>) {
        if this.footer.is_none() || this.sidebar.is_none() {
            return;
        }

        let weak = Rc::downgrade(this);
        this.footer_frame.frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.evaluate_footer();
            }
        });
    }

    fn update_colors(&self) {
        let (Some(landmarks), Some(sidebar)) = (&self.landmarks, &self.sidebar) else {
            return;
        };

        let viewport = self.dom.viewport();
        let scrolled = if viewport.width <= self.config.breakpoint {
            false
        } else {
            let height = |node: &D::Node| self.dom.layout(node).height;
            let end = hero_end(
                height(&landmarks.hero),
                height(&landmarks.about),
                landmarks.portfolio.as_ref().map(height).unwrap_or(0.0),
                height(&landmarks.navbar),
            );
            past_hero(viewport.scroll_y, end)
        };

        if scrolled != self.scrolled.get() {
            debug!(scrolled, "sidebar colour changed");
            self.scrolled.set(scrolled);
            self.dom.set_class(sidebar, "scrolled", scrolled);
        }
    }

    fn evaluate_footer(&self) {
        let Some(footer) = &self.footer else {
            return;
        };

        let viewport = self.dom.viewport();
        if viewport.width <= self.config.breakpoint {
            return;
        }

        let hidden = footer_entered(self.dom.rect(footer).top, viewport.height);
        if hidden != self.hidden.get() {
            debug!(hidden, "sidebar footer visibility changed");
            self.set_hidden(hidden);
        }
    }

    fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
        if let Some(sidebar) = &self.sidebar {
            self.dom.set_class(sidebar, "hide-at-footer", hidden);
        }
    }
}

impl<D: Dom> Teardown for SocialSidebar<D> {
    fn teardown(&self) {
        let inner = &self.inner;
        for slot in [
            &inner.colors_frame,
            &inner.footer_frame,
            &inner.resize,
            &inner.initial_frame,
            &inner.initial_delay,
        ] {
            slot.clear();
        }
        for button in &inner.buttons {
            button.revert.clear();
            button.settle.clear();
        }
        debug!("social sidebar torn down");
    }
}
