use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

use tracing::{Level, debug, info, instrument};

use crate::{
    Teardown,
    config::SlideshowConfig,
    dom::Dom,
    images::{Preloader, css_url},
    input::{Key, Point, Swipe, horizontal_swipe},
    runtime::{Runtime, Slot},
};

mod basic;
pub use basic::BasicSlideshow;

pub const SLIDE_SELECTOR: &str = ".slide";
pub const INDICATOR_SELECTOR: &str = ".indicator";
pub const HERO_SELECTOR: &str = ".hero";

// hero slideshow
//
// the handle is cheap to clone; every clone drives the same slideshow.  timer callbacks
// only hold weak references, so dropping the last handle (or calling teardown) stops
// everything
pub struct Slideshow<D: Dom> {
    inner: Rc<Inner<D>>,
}

impl<D: Dom> Clone for Slideshow<D> {
    fn clone(&self) -> Self {
        Slideshow {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<D: Dom> {
    dom: Rc<D>,
    runtime: Runtime,
    config: SlideshowConfig,

    slides: Vec<D::Node>,
    indicators: Vec<D::Node>,
    hero: Option<D::Node>,

    current: Cell<usize>,
    paused: Cell<bool>,
    transitioning: Cell<bool>,
    touch_start: Cell<Option<Point>>,

    autoplay: Slot,
    restart: Slot,
    fade: Slot,
    settle: Slot,

    preloader: Preloader,
}

impl<D: Dom + 'static> Slideshow<D> {
    #[instrument(level=Level::DEBUG, skip_all)]
    pub fn attach(dom: Rc<D>, runtime: &Runtime, config: &SlideshowConfig) -> anyhow::Result<Option<Self>> {
        let slides = dom.query_all(SLIDE_SELECTOR);

        if slides.is_empty() {
            debug!("no slides on this page");
            return Ok(None);
        }

        if config.autoplay_ms == 0 {
            return Err(anyhow::Error::msg("slideshow autoplay interval must be positive"));
        }

        let indicators = dom.query_all(INDICATOR_SELECTOR);
        let hero = dom.query(HERO_SELECTOR);

        let inner = Rc::new(Inner {
            dom: dom.clone(),
            runtime: runtime.clone(),
            config: config.clone(),
            slides,
            indicators,
            hero,
            current: Cell::new(0),
            paused: Cell::new(false),
            transitioning: Cell::new(false),
            touch_start: Cell::new(None),
            autoplay: Slot::new(&runtime.scheduler),
            restart: Slot::new(&runtime.scheduler),
            fade: Slot::new(&runtime.scheduler),
            settle: Slot::new(&runtime.scheduler),
            preloader: Preloader::new(),
        });

        info!(slides = inner.slides.len(), "starting slideshow");

        for (i, slide) in inner.slides.iter().enumerate() {
            let first = i == 0;
            dom.set_style(slide, "opacity", if first { "1" } else { "0" });
            dom.set_style(slide, "transition", &inner.config.fade_transition);
            dom.set_style(slide, "z-index", if first { "2" } else { "1" });
        }
        inner.sync_indicators();

        let slideshow = Slideshow { inner };
        slideshow.start_autoplay();

        Ok(Some(slideshow))
    }

    pub fn current(&self) -> usize {
        self.inner.current.get()
    }

    pub fn total(&self) -> usize {
        self.inner.slides.len()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.get()
    }

    pub fn is_transitioning(&self) -> bool {
        self.inner.transitioning.get()
    }

    pub fn is_autoplaying(&self) -> bool {
        self.inner.autoplay.is_armed()
    }

    pub fn hero(&self) -> Option<&D::Node> {
        self.inner.hero.as_ref()
    }

    pub fn indicators(&self) -> &[D::Node] {
        &self.inner.indicators
    }

    // returns false when the request was ignored
    pub fn go_to(&self, index: usize) -> bool {
        Inner::go_to(&self.inner, index)
    }

    pub fn next(&self) -> bool {
        Inner::next(&self.inner)
    }

    pub fn previous(&self) -> bool {
        Inner::previous(&self.inner)
    }

    pub fn toggle_autoplay(&self) {
        if self.inner.paused.get() {
            self.inner.paused.set(false);
            self.start_autoplay();
            debug!("autoplay resumed");
        } else {
            self.inner.paused.set(true);
            self.stop_autoplay();
            debug!("autoplay paused");
        }
    }

    pub fn start_autoplay(&self) {
        Inner::start_autoplay(&self.inner);
    }

    pub fn stop_autoplay(&self) {
        self.inner.autoplay.clear();
    }

    // manual navigation stops the timer and brings it back after a short debounce, so rapid
    // input never fights an auto-advance
    pub fn restart_autoplay(&self) {
        self.stop_autoplay();

        let weak = Rc::downgrade(&self.inner);
        self.inner.restart.timeout(self.inner.config.restart_debounce_ms, move || {
            if let Some(inner) = weak.upgrade() {
                if !inner.paused.get() {
                    Inner::start_autoplay(&inner);
                }
            }
        });
    }

    pub fn indicator_activated(&self, index: usize) {
        debug!(index, "indicator activated");
        self.go_to(index);
        self.restart_autoplay();
    }

    // returns true when the key was handled and its default action should be prevented
    pub fn handle_key(&self, key: Key) -> bool {
        match key {
            Key::ArrowLeft => {
                self.previous();
                self.restart_autoplay();
            }
            Key::ArrowRight => {
                self.next();
                self.restart_autoplay();
            }
            Key::Space => self.toggle_autoplay(),
            Key::Home => {
                self.go_to(0);
                self.restart_autoplay();
            }
            Key::End => {
                self.go_to(self.total() - 1);
                self.restart_autoplay();
            }
            _ => return false,
        }
        true
    }

    pub fn touch_start(&self, point: Point) {
        self.inner.touch_start.set(Some(point));
    }

    pub fn touch_end(&self, point: Point) {
        let Some(start) = self.inner.touch_start.take() else {
            return;
        };

        let config = &self.inner.config;
        if let Some(swipe) = horizontal_swipe(start, point, config.swipe_min_x, config.swipe_max_y) {
            match swipe {
                Swipe::Left => self.next(),
                Swipe::Right => self.previous(),
            };
            self.restart_autoplay();
        }
    }

    pub fn pointer_entered(&self) {
        debug!("pausing for hover");
        self.inner.paused.set(true);
        self.stop_autoplay();
    }

    pub fn pointer_left(&self) {
        debug!("resuming after hover");
        self.inner.paused.set(false);
        if !self.inner.dom.document_hidden() {
            self.start_autoplay();
        }
    }

    pub fn visibility_changed(&self) {
        if self.inner.dom.document_hidden() {
            self.stop_autoplay();
        } else if !self.inner.paused.get() {
            self.start_autoplay();
        }
    }

    // background images of every slide, as resolved by the stylesheet
    pub fn image_sources(&self) -> Vec<String> {
        self.inner
            .slides
            .iter()
            .filter_map(|slide| self.inner.dom.computed_style(slide, "background-image"))
            .filter_map(|value| css_url(&value))
            .collect()
    }

    pub fn preload_images(&self) {
        let sources = self.image_sources();
        if sources.is_empty() {
            return;
        }

        info!(images = sources.len(), "preloading slideshow images");
        let preload = self.inner.preloader.preload(
            self.inner.runtime.images.as_ref(),
            &sources,
            self.inner.config.preload_timeout_ms,
        );

        self.inner.runtime.spawner.spawn_local(Box::pin(async move {
            preload.await;
        }));
    }
}

impl<D: Dom + 'static> Inner<D> {
    fn go_to(this: &Rc<Self>, index: usize) -> bool {
        let from = this.current.get();

        if index >= this.slides.len() || index == from || this.transitioning.get() {
            return false;
        }

        debug!(from, to = index, "changing slide");

        this.transitioning.set(true);
        this.current.set(index);

        let incoming = &this.slides[index];
        this.dom.set_style(incoming, "z-index", "3");
        this.dom.set_style(incoming, "opacity", "0");

        let weak = Rc::downgrade(this);
        this.fade.frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.fade_between(from, index);
            }
        });

        true
    }

    fn fade_between(self: Rc<Self>, from: usize, to: usize) {
        self.dom.set_style(&self.slides[from], "opacity", "0");
        self.dom.set_style(&self.slides[to], "opacity", "1");

        let weak: Weak<Self> = Rc::downgrade(&self);
        self.settle.timeout(self.config.settle_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.dom.set_style(&inner.slides[from], "z-index", "1");
                inner.dom.set_style(&inner.slides[to], "z-index", "2");
                inner.transitioning.set(false);
                inner.sync_indicators();
            }
        });
    }

    fn next(this: &Rc<Self>) -> bool {
        let next = (this.current.get() + 1) % this.slides.len();
        Inner::go_to(this, next)
    }

    fn previous(this: &Rc<Self>) -> bool {
        let total = this.slides.len();
        let previous = (this.current.get() + total - 1) % total;
        Inner::go_to(this, previous)
    }

    fn start_autoplay(this: &Rc<Self>) {
        this.autoplay.clear();

        if this.paused.get() || this.dom.document_hidden() {
            return;
        }

        let weak = Rc::downgrade(this);
        this.autoplay.interval(this.config.autoplay_ms, move || {
            if let Some(inner) = weak.upgrade() {
                if !inner.paused.get() && !inner.transitioning.get() && !inner.dom.document_hidden() {
                    debug!("auto-advancing");
                    Inner::next(&inner);
                }
            }
        });
        debug!("autoplay started");
    }

    fn sync_indicators(&self) {
        let current = self.current.get();
        for (i, indicator) in self.indicators.iter().enumerate() {
            self.dom.set_class(indicator, "active", i == current);
        }
    }
}

impl<D: Dom> Teardown for Slideshow<D> {
    fn teardown(&self) {
        self.inner.autoplay.clear();
        self.inner.restart.clear();
        self.inner.fade.clear();
        self.inner.settle.clear();
        self.inner.preloader.cancel_all();
        debug!("slideshow torn down");
    }
}
