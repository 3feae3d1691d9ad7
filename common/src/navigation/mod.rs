use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures::channel::oneshot;
use serde_json::json;
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    Teardown,
    config::NavigationConfig,
    dom::{Dom, Layout},
    input::Key,
    runtime::{Runtime, Slot},
    storage::take_scroll_request,
};

mod basic;
pub mod visibility;

pub use basic::BasicNavigation;
use visibility::{Band, ease_out_cubic, pick_active, scroll_destination};

pub const NAVBAR_ID: &str = "navbar";
pub const HAMBURGER_ID: &str = "hamburger";
pub const MENU_ID: &str = "nav-menu";
pub const BACK_TO_TOP_ID: &str = "footerBackToTop";
pub const LINK_SELECTOR: &str = ".nav-link";
pub const SECTION_CHANGED_EVENT: &str = "sectionChanged";

// what the caller should do with a clicked navigation link
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkAction {
    // let the browser follow the href
    Follow,
    // handled here; prevent the default action
    Handled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section<N> {
    pub id: String,
    pub node: N,
    pub layout: Layout,
}

struct Menu<N> {
    hamburger: N,
    panel: N,
}

struct ScrollAnimation {
    start: f64,
    distance: f64,
    started_at: Option<f64>,
    recheck: bool,
    done: oneshot::Sender<()>,
}

// tracks the section in view, drives smooth scrolling and owns the mobile menu
pub struct Navigation<D: Dom> {
    inner: Rc<Inner<D>>,
}

impl<D: Dom> Clone for Navigation<D> {
    fn clone(&self) -> Self {
        Navigation {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<D: Dom> {
    dom: Rc<D>,
    config: NavigationConfig,

    navbar: D::Node,
    links: Vec<D::Node>,
    menu: Option<Menu<D::Node>>,
    back_to_top: Option<D::Node>,

    sections: RefCell<Vec<Section<D::Node>>>,
    active: RefCell<String>,
    observers: RefCell<Vec<Rc<dyn Fn(&str)>>>,

    menu_open: Cell<bool>,
    menu_animating: Cell<bool>,
    menu_touch_y: Cell<Option<f64>>,

    scroll_frame: Slot,
    resize_frame: Slot,
    animation: Slot,
    recheck: Slot,
    menu_timer: Slot,
    external_frame: Slot,
    external_delay: Slot,
    press_grow: Slot,
    press_reset: Slot,
}

impl<D: Dom + 'static> Navigation<D> {
    #[instrument(level=Level::DEBUG, skip_all)]
    pub fn attach(dom: Rc<D>, runtime: &Runtime, config: &NavigationConfig) -> anyhow::Result<Option<Self>> {
        let Some(navbar) = dom.by_id(NAVBAR_ID) else {
            debug!("no navbar on this page");
            return Ok(None);
        };

        let Some(first) = config.sections.first() else {
            return Err(anyhow::Error::msg("navigation needs at least one section"));
        };

        let menu = match (dom.by_id(HAMBURGER_ID), dom.by_id(MENU_ID)) {
            (Some(hamburger), Some(panel)) => Some(Menu { hamburger, panel }),
            _ => {
                warn!("hamburger menu elements not found");
                None
            }
        };

        let scheduler = &runtime.scheduler;
        let inner = Rc::new(Inner {
            links: dom.query_all(LINK_SELECTOR),
            back_to_top: dom.by_id(BACK_TO_TOP_ID),
            dom,
            config: config.clone(),
            navbar,
            menu,
            sections: RefCell::new(Vec::new()),
            active: RefCell::new(first.clone()),
            observers: RefCell::new(Vec::new()),
            menu_open: Cell::new(false),
            menu_animating: Cell::new(false),
            menu_touch_y: Cell::new(None),
            scroll_frame: Slot::new(scheduler),
            resize_frame: Slot::new(scheduler),
            animation: Slot::new(scheduler),
            recheck: Slot::new(scheduler),
            menu_timer: Slot::new(scheduler),
            external_frame: Slot::new(scheduler),
            external_delay: Slot::new(scheduler),
            press_grow: Slot::new(scheduler),
            press_reset: Slot::new(scheduler),
        });

        inner.refresh_metrics();
        info!(sections = inner.sections.borrow().len(), "navigation ready");

        if !inner.update_active() {
            inner.highlight();
        }

        if let Some(target) = take_scroll_request(runtime.session.as_ref()) {
            info!(section = %target, "resuming cross-page navigation");

            let weak = Rc::downgrade(&inner);
            let delay = inner.config.external_scroll_delay_ms;
            inner.external_frame.frame(move |_| {
                if let Some(inner) = weak.upgrade() {
                    let weak = Rc::downgrade(&inner);
                    inner.external_delay.timeout(delay, move || {
                        if let Some(inner) = weak.upgrade() {
                            Inner::scroll_to_section(&inner, &target);
                        }
                    });
                }
            });
        }

        Ok(Some(Navigation { inner }))
    }

    pub fn current_section(&self) -> String {
        self.inner.active.borrow().clone()
    }

    pub fn sections(&self) -> Vec<Section<D::Node>> {
        self.inner.sections.borrow().clone()
    }

    pub fn is_menu_open(&self) -> bool {
        self.inner.menu_open.get()
    }

    pub fn links(&self) -> &[D::Node] {
        &self.inner.links
    }

    pub fn hamburger(&self) -> Option<&D::Node> {
        self.inner.menu.as_ref().map(|m| &m.hamburger)
    }

    pub fn menu_panel(&self) -> Option<&D::Node> {
        self.inner.menu.as_ref().map(|m| &m.panel)
    }

    pub fn back_to_top_button(&self) -> Option<&D::Node> {
        self.inner.back_to_top.as_ref()
    }

    pub fn navbar(&self) -> &D::Node {
        &self.inner.navbar
    }

    pub fn on_section_change(&self, observer: impl Fn(&str) + 'static) {
        self.inner.observers.borrow_mut().push(Rc::new(observer));
    }

    // re-read section metrics and re-evaluate right away
    pub fn refresh(&self) {
        self.inner.refresh_metrics();
        self.inner.update_active();
    }

    pub fn on_scroll(&self) {
        if self.inner.scroll_frame.is_armed() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.scroll_frame.frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                let scrolled = inner.dom.viewport().scroll_y > inner.config.scrolled_threshold;
                inner.dom.set_class(&inner.navbar, "scrolled", scrolled);
                inner.update_active();
            }
        });
    }

    pub fn on_resize(&self) {
        if self.inner.resize_frame.is_armed() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.resize_frame.frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.refresh_metrics();
                if inner.dom.viewport().width > inner.config.desktop_breakpoint {
                    inner.close_menu();
                }
                inner.update_active();
            }
        });
    }

    // resolves once the scroll animation reaches the section; None for unknown sections
    pub fn scroll_to_section(&self, id: &str) -> Option<oneshot::Receiver<()>> {
        Inner::scroll_to_section(&self.inner, id)
    }

    // eased scroll to an absolute offset; the receiver is cancelled if another scroll
    // supersedes this one
    pub fn smooth_scroll_to(&self, target: f64) -> oneshot::Receiver<()> {
        Inner::smooth_scroll(&self.inner, target, false)
    }

    pub fn link_clicked(&self, href: &str) -> LinkAction {
        let external = self
            .inner
            .config
            .external_link_patterns
            .iter()
            .any(|pattern| href.contains(pattern.as_str()));

        if external {
            self.inner.close_menu();
            return LinkAction::Follow;
        }

        if let Some(section) = href.strip_prefix('#') {
            self.scroll_to_section(section);
            self.inner.close_menu();
            return LinkAction::Handled;
        }

        self.inner.close_menu();
        LinkAction::Follow
    }

    pub fn toggle_menu(&self) {
        if self.inner.menu_animating.get() {
            return;
        }

        if self.inner.menu_open.get() {
            self.inner.close_menu();
        } else {
            Inner::open_menu(&self.inner);
        }
    }

    pub fn open_menu(&self) -> bool {
        Inner::open_menu(&self.inner)
    }

    pub fn close_menu(&self) -> bool {
        self.inner.close_menu()
    }

    pub fn document_clicked(&self, target: &D::Node) {
        let Some(menu) = &self.inner.menu else {
            return;
        };

        if !self.inner.menu_open.get() {
            return;
        }

        let dom = &self.inner.dom;
        if !dom.contains(&menu.panel, target) && !dom.contains(&menu.hamburger, target) {
            self.inner.close_menu();
        }
    }

    // returns true when the key was consumed
    pub fn handle_key(&self, key: Key) -> bool {
        key == Key::Escape && self.inner.menu_open.get() && self.inner.close_menu()
    }

    pub fn menu_touch_start(&self, y: f64) {
        if self.inner.menu_open.get() {
            self.inner.menu_touch_y.set(Some(y));
        }
    }

    // an upward swipe on the open menu closes it
    pub fn menu_touch_move(&self, y: f64) {
        if !self.inner.menu_open.get() {
            return;
        }

        if let Some(start) = self.inner.menu_touch_y.get() {
            if y - start < -self.inner.config.menu_swipe_close {
                self.inner.menu_touch_y.set(None);
                self.inner.close_menu();
            }
        }
    }

    pub fn back_to_top(&self) {
        debug!("scrolling back to top");
        Inner::smooth_scroll(&self.inner, 0.0, false);

        let Some(button) = &self.inner.back_to_top else {
            return;
        };

        let dom = &self.inner.dom;
        dom.set_style(button, "transform", "scale(0.9)");
        dom.set_style(button, "transition", "transform 0.1s ease");

        let press = self.inner.config.press_feedback_ms;

        let weak = Rc::downgrade(&self.inner);
        self.inner.press_grow.timeout(press, move || {
            if let Some(inner) = weak.upgrade() {
                if let Some(button) = &inner.back_to_top {
                    inner.dom.set_style(button, "transform", "scale(1.05)");
                }
            }
        });

        let weak = Rc::downgrade(&self.inner);
        self.inner.press_reset.timeout(press * 2, move || {
            if let Some(inner) = weak.upgrade() {
                if let Some(button) = &inner.back_to_top {
                    inner.dom.set_style(button, "transform", "");
                    inner.dom.set_style(button, "transition", "");
                }
            }
        });
    }
}

impl<D: Dom + 'static> Inner<D> {
    fn refresh_metrics(&self) {
        let sections = self
            .config
            .sections
            .iter()
            .filter_map(|id| {
                let node = self.dom.by_id(id)?;
                let layout = self.dom.layout(&node);
                Some(Section {
                    id: id.clone(),
                    node,
                    layout,
                })
            })
            .collect();

        *self.sections.borrow_mut() = sections;
    }

    // returns true when the active section changed
    fn update_active(&self) -> bool {
        let viewport = self.dom.viewport();
        let navbar_height = self.dom.layout(&self.navbar).height;
        let band = Band::below_navbar(viewport, navbar_height);

        let next = {
            let sections = self.sections.borrow();
            let previous = self.active.borrow();
            let fractions: Vec<(&str, f64)> = sections
                .iter()
                .map(|section| (section.id.as_str(), band.fraction(section.layout)))
                .collect();

            match pick_active(&fractions, &previous) {
                Some(id) if id != previous.as_str() => id.to_string(),
                _ => return false,
            }
        };

        debug!(section = %next, "active section changed");
        *self.active.borrow_mut() = next.clone();

        self.highlight();
        self.dom.dispatch(None, SECTION_CHANGED_EVENT, json!({ "section": next }));

        let observers: Vec<Rc<dyn Fn(&str)>> = self.observers.borrow().clone();
        for observer in observers {
            observer(&next);
        }

        true
    }

    fn highlight(&self) {
        let active = self.active.borrow();
        let anchor = format!("#{active}");
        let page = format!("{active}.html");

        for link in &self.links {
            let matches = self
                .dom
                .attribute(link, "href")
                .is_some_and(|href| href == anchor || href == page);
            self.dom.set_class(link, "active", matches);
        }
    }

    fn scroll_to_section(this: &Rc<Self>, id: &str) -> Option<oneshot::Receiver<()>> {
        let top = this
            .sections
            .borrow()
            .iter()
            .find(|section| section.id == id)
            .map(|section| section.layout.top);

        let Some(top) = top else {
            warn!(section = id, "unknown section");
            return None;
        };

        let navbar_height = this.dom.layout(&this.navbar).height;
        let target = scroll_destination(top, navbar_height);
        debug!(section = id, target, "scrolling to section");

        Some(Inner::smooth_scroll(this, target, true))
    }

    fn smooth_scroll(this: &Rc<Self>, target: f64, recheck: bool) -> oneshot::Receiver<()> {
        let (done, receiver) = oneshot::channel();
        let start = this.dom.viewport().scroll_y;

        Inner::step(
            this,
            ScrollAnimation {
                start,
                distance: target - start,
                started_at: None,
                recheck,
                done,
            },
        );
        receiver
    }

    // one eased step per frame; arming the slot drops any animation already running
    fn step(this: &Rc<Self>, animation: ScrollAnimation) {
        let weak = Rc::downgrade(this);
        this.animation.frame(move |timestamp| {
            let Some(inner) = weak.upgrade() else {
                return;
            };

            let mut animation = animation;
            let started_at = *animation.started_at.get_or_insert(timestamp);
            let elapsed = timestamp - started_at;
            let duration = inner.config.scroll_duration_ms as f64;
            let progress = if duration > 0.0 { elapsed / duration } else { 1.0 };

            inner
                .dom
                .scroll_to(animation.start + animation.distance * ease_out_cubic(progress), false);

            if elapsed < duration {
                Inner::step(&inner, animation);
                return;
            }

            let _ = animation.done.send(());

            if animation.recheck {
                let weak = Rc::downgrade(&inner);
                inner.recheck.timeout(inner.config.recheck_ms, move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.update_active();
                    }
                });
            }
        });
    }

    fn open_menu(this: &Rc<Self>) -> bool {
        let Some(menu) = &this.menu else {
            return false;
        };

        if this.menu_animating.get() || this.menu_open.get() {
            return false;
        }

        debug!("opening menu");
        this.menu_animating.set(true);
        this.menu_open.set(true);
        this.set_menu_classes(menu, true);

        let weak = Rc::downgrade(this);
        this.menu_timer.timeout(this.config.menu_transition_ms, move || {
            if let Some(inner) = weak.upgrade() {
                if let Some(menu) = &inner.menu {
                    if let Some(first) = inner.dom.query_within(&menu.panel, LINK_SELECTOR).first() {
                        inner.dom.focus(first);
                    }
                }
                inner.menu_animating.set(false);
            }
        });

        true
    }

    fn close_menu(self: &Rc<Self>) -> bool {
        let Some(menu) = &self.menu else {
            return false;
        };

        if self.menu_animating.get() || !self.menu_open.get() {
            return false;
        }

        debug!("closing menu");
        self.menu_animating.set(true);
        self.menu_open.set(false);
        self.set_menu_classes(menu, false);

        let weak = Rc::downgrade(self);
        self.menu_timer.timeout(self.config.menu_transition_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.menu_animating.set(false);
            }
        });

        true
    }

    fn set_menu_classes(&self, menu: &Menu<D::Node>, open: bool) {
        self.dom.set_class(&menu.hamburger, "active", open);
        self.dom.set_class(&menu.panel, "open", open);
        self.dom.set_class(&self.navbar, "menu-open", open);
        if let Some(body) = self.dom.body() {
            self.dom.set_class(&body, "no-scroll", open);
        }
    }
}

impl<D: Dom> Teardown for Navigation<D> {
    fn teardown(&self) {
        let inner = &self.inner;
        for slot in [
            &inner.scroll_frame,
            &inner.resize_frame,
            &inner.animation,
            &inner.recheck,
            &inner.menu_timer,
            &inner.external_frame,
            &inner.external_delay,
            &inner.press_grow,
            &inner.press_reset,
        ] {
            slot.clear();
        }
        inner.observers.borrow_mut().clear();
        debug!("navigation torn down");
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use futures::FutureExt;

    use super::*;
    use crate::{
        fake::{BODY, Harness, MemoryDom},
        storage::{SCROLL_TARGET_KEY, SessionStore, request_scroll},
    };

    struct Page {
        harness: Harness,
        navbar: usize,
        hamburger: usize,
        panel: usize,
        links: Vec<usize>,
        back_to_top: usize,
    }

    const SECTIONS: [&str; 5] = ["home", "about", "portfolio", "info", "contact"];

    // 80 px navbar, 1000 px sections, 880 px viewport
    fn page() -> Page {
        let harness = Harness::new();
        let dom: &MemoryDom = &harness.dom;
        dom.resize(1280.0, 880.0);

        let navbar = dom.add("nav#navbar");
        dom.set_layout(navbar, 0.0, 80.0);
        let hamburger = dom.add_to(navbar, "button#hamburger");
        let panel = dom.add_to(navbar, "ul#nav-menu");

        let links = SECTIONS
            .iter()
            .map(|id| dom.add_to(panel, &format!(r##"a.nav-link[href="#{id}"]"##)))
            .collect();

        for (i, id) in SECTIONS.iter().enumerate() {
            let section = dom.add(&format!("section#{id}"));
            dom.set_layout(section, i as f64 * 1000.0, 1000.0);
        }

        let back_to_top = dom.add("button#footerBackToTop");

        Page {
            harness,
            navbar,
            hamburger,
            panel,
            links,
            back_to_top,
        }
    }

    fn attach(page: &Page) -> Navigation<MemoryDom> {
        Navigation::attach(page.harness.dom.clone(), &page.harness.runtime, &NavigationConfig::default())
            .unwrap()
            .unwrap()
    }

    fn active_links(page: &Page) -> Vec<usize> {
        page.links
            .iter()
            .enumerate()
            .filter(|(_, link)| page.harness.dom.has_class(link, "active"))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn missing_navbar_skips_the_module() {
        let harness = Harness::new();
        let attached =
            Navigation::attach(harness.dom.clone(), &harness.runtime, &NavigationConfig::default()).unwrap();
        assert!(attached.is_none());
    }

    #[test]
    fn empty_section_list_is_a_setup_error() {
        let harness = Harness::new();
        harness.dom.add("nav#navbar");
        let config = NavigationConfig {
            sections: Vec::new(),
            ..NavigationConfig::default()
        };
        assert!(Navigation::attach(harness.dom.clone(), &harness.runtime, &config).is_err());
    }

    #[test]
    fn initial_state_highlights_home() {
        let page = page();
        let navigation = attach(&page);

        assert_eq!(navigation.current_section(), "home");
        assert_eq!(navigation.sections().len(), 5);
        assert_eq!(active_links(&page), vec![0]);
        assert!(page.harness.dom.events().is_empty());
    }

    #[test]
    fn most_visible_section_becomes_active() {
        let page = page();
        let navigation = attach(&page);
        let dom = &page.harness.dom;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        navigation.on_section_change(move |id| log.borrow_mut().push(id.to_string()));

        // home shows 16%, about 64%
        dom.scroll(760.0);
        navigation.on_scroll();
        navigation.on_scroll();
        page.harness.frame();

        assert_eq!(navigation.current_section(), "about");
        assert_eq!(active_links(&page), vec![1]);
        assert_eq!(*seen.borrow(), vec![String::from("about")]);
        assert_eq!(
            dom.events(),
            vec![(None, String::from(SECTION_CHANGED_EVENT), json!({ "section": "about" }))]
        );
        assert!(dom.has_class(&page.navbar, "scrolled"));

        // small moves that keep about on top are silent
        dom.scroll(800.0);
        navigation.on_scroll();
        page.harness.frame();
        assert_eq!(seen.borrow().len(), 1);

        dom.scroll(50.0);
        navigation.on_scroll();
        page.harness.frame();
        assert_eq!(navigation.current_section(), "home");
        assert!(!dom.has_class(&page.navbar, "scrolled"));
    }

    #[test]
    fn page_links_match_by_name() {
        let page = page();
        let dom = &page.harness.dom;
        let portfolio_page = dom.add_to(page.panel, r#"a.nav-link[href="portfolio.html"]"#);

        let navigation = attach(&page);
        dom.scroll(1900.0);
        navigation.on_scroll();
        page.harness.frame();

        assert_eq!(navigation.current_section(), "portfolio");
        assert!(dom.has_class(&portfolio_page, "active"));
        assert_eq!(active_links(&page), vec![2]);
    }

    #[test]
    fn section_scroll_eases_and_resolves() {
        let page = page();
        let navigation = attach(&page);
        let dom = &page.harness.dom;

        let mut done = navigation.scroll_to_section("info").unwrap();
        assert_eq!(done.try_recv(), Ok(None));

        page.harness.advance(300.0);
        assert_eq!(done.now_or_never(), Some(Ok(())));

        let scrolls = dom.scrolls();
        assert_eq!(scrolls.last(), Some(&(2920.0, false)));
        // monotonic ease towards the target
        assert!(scrolls.windows(2).all(|w| w[0].0 <= w[1].0));

        // re-evaluated after the settle delay
        assert_eq!(navigation.current_section(), "info");
    }

    #[test]
    fn superseded_scroll_is_cancelled() {
        let page = page();
        let navigation = attach(&page);

        let first = navigation.scroll_to_section("contact").unwrap();
        page.harness.frame();
        let second = navigation.smooth_scroll_to(0.0);

        page.harness.advance(200.0);
        assert!(first.now_or_never().unwrap().is_err());
        assert_eq!(second.now_or_never(), Some(Ok(())));
        assert_eq!(page.harness.dom.viewport().scroll_y, 0.0);
    }

    #[test]
    fn unknown_sections_do_not_scroll() {
        let page = page();
        let navigation = attach(&page);

        assert!(navigation.scroll_to_section("pricing").is_none());
        page.harness.advance(200.0);
        assert!(page.harness.dom.scrolls().is_empty());
    }

    #[test]
    fn link_clicks() {
        let page = page();
        let navigation = attach(&page);

        assert_eq!(navigation.link_clicked("#about"), LinkAction::Handled);
        assert_eq!(navigation.link_clicked("portfolio.html"), LinkAction::Follow);
        assert_eq!(navigation.link_clicked("https://instagram.com"), LinkAction::Follow);
        assert_eq!(navigation.link_clicked("mailto:hola@example.com"), LinkAction::Follow);

        page.harness.advance(200.0);
        assert_eq!(page.harness.dom.viewport().scroll_y, 920.0);
    }

    #[test]
    fn menu_opens_closes_and_guards_the_animation() {
        let page = page();
        let navigation = attach(&page);
        let dom = &page.harness.dom;

        navigation.toggle_menu();
        assert!(navigation.is_menu_open());
        assert!(dom.has_class(&page.hamburger, "active"));
        assert!(dom.has_class(&page.panel, "open"));
        assert!(dom.has_class(&page.navbar, "menu-open"));
        assert!(dom.has_class(&BODY, "no-scroll"));

        // ignored mid-animation
        navigation.toggle_menu();
        assert!(!navigation.handle_key(Key::Escape));
        assert!(navigation.is_menu_open());

        page.harness.advance(300.0);
        assert_eq!(dom.focused(), Some(page.links[0]));

        assert!(navigation.handle_key(Key::Escape));
        assert!(!navigation.is_menu_open());
        assert!(!dom.has_class(&BODY, "no-scroll"));
        assert!(!dom.has_class(&page.hamburger, "active"));

        page.harness.advance(300.0);
        assert!(!navigation.handle_key(Key::Escape));
    }

    #[test]
    fn outside_clicks_and_swipes_close_the_menu() {
        let page = page();
        let navigation = attach(&page);
        let dom = &page.harness.dom;
        let outside = dom.add("div.content");

        navigation.open_menu();
        page.harness.advance(300.0);

        navigation.document_clicked(&page.links[2]);
        navigation.document_clicked(&page.hamburger);
        assert!(navigation.is_menu_open());

        navigation.document_clicked(&outside);
        assert!(!navigation.is_menu_open());
        page.harness.advance(300.0);

        navigation.open_menu();
        page.harness.advance(300.0);
        navigation.menu_touch_start(500.0);
        navigation.menu_touch_move(450.0);
        assert!(navigation.is_menu_open());
        navigation.menu_touch_move(399.0);
        assert!(!navigation.is_menu_open());
    }

    #[test]
    fn wide_resize_closes_the_menu_and_reads_new_metrics() {
        let page = page();
        let navigation = attach(&page);
        let dom = &page.harness.dom;

        dom.resize(600.0, 880.0);
        navigation.open_menu();
        page.harness.advance(300.0);

        navigation.on_resize();
        page.harness.frame();
        assert!(navigation.is_menu_open());

        let about = dom.by_id("about").unwrap();
        dom.set_layout(about, 0.0, 1000.0);
        dom.resize(1024.0, 880.0);
        navigation.on_resize();
        page.harness.frame();

        assert!(!navigation.is_menu_open());
        assert_eq!(navigation.sections()[1].layout.top, 0.0);
    }

    #[test]
    fn back_to_top_plays_press_feedback() {
        let page = page();
        let navigation = attach(&page);
        let dom = &page.harness.dom;
        dom.scroll(3000.0);

        navigation.back_to_top();
        assert_eq!(dom.style(&page.back_to_top, "transform"), "scale(0.9)");

        page.harness.advance(100.0);
        assert_eq!(dom.style(&page.back_to_top, "transform"), "scale(1.05)");

        page.harness.advance(100.0);
        assert_eq!(dom.style(&page.back_to_top, "transform"), "");
        assert_eq!(dom.style(&page.back_to_top, "transition"), "");
        assert_eq!(dom.viewport().scroll_y, 0.0);
    }

    #[test]
    fn cross_page_request_scrolls_after_load() {
        let page = page();
        request_scroll(page.harness.session.as_ref(), "contact", Utc::now());

        let navigation = attach(&page);
        assert!(page.harness.session.get(SCROLL_TARGET_KEY).is_none());

        // one frame, then the delay, then the animation
        page.harness.advance(100.0);
        assert!(page.harness.dom.scrolls().is_empty());

        page.harness.advance(300.0);
        assert_eq!(page.harness.dom.viewport().scroll_y, 3920.0);
        assert_eq!(navigation.current_section(), "contact");
    }

    #[test]
    fn teardown_releases_every_timer() {
        let page = page();
        let navigation = attach(&page);

        navigation.open_menu();
        navigation.scroll_to_section("about");
        navigation.back_to_top();
        navigation.on_scroll();

        navigation.teardown();
        assert_eq!(page.harness.clock.pending(), 0);
    }
}
