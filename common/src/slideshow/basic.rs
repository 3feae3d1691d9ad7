use std::{cell::Cell, rc::Rc};

use tracing::info;

use super::{INDICATOR_SELECTOR, SLIDE_SELECTOR};
use crate::{
    Teardown,
    dom::Dom,
    runtime::{Runtime, Slot},
};

const DEFAULT_INTERVAL_MS: u32 = 5000;

// class-toggling slideshow used when the animated one cannot be set up
pub struct BasicSlideshow<D: Dom> {
    inner: Rc<BasicInner<D>>,
}

impl<D: Dom> Clone for BasicSlideshow<D> {
    fn clone(&self) -> Self {
        BasicSlideshow {
            inner: self.inner.clone(),
        }
    }
}

struct BasicInner<D: Dom> {
    dom: Rc<D>,
    slides: Vec<D::Node>,
    indicators: Vec<D::Node>,
    current: Cell<usize>,
    interval: Slot,
}

impl<D: Dom + 'static> BasicSlideshow<D> {
    pub fn attach(dom: Rc<D>, runtime: &Runtime, autoplay_ms: u32) -> Option<Self> {
        let slides = dom.query_all(SLIDE_SELECTOR);
        if slides.is_empty() {
            return None;
        }

        info!("activating basic slideshow");

        let inner = Rc::new(BasicInner {
            indicators: dom.query_all(INDICATOR_SELECTOR),
            dom,
            slides,
            current: Cell::new(0),
            interval: Slot::new(&runtime.scheduler),
        });

        // the enhanced layer refuses a zero interval, so this is often what we were given
        let interval_ms = if autoplay_ms == 0 { DEFAULT_INTERVAL_MS } else { autoplay_ms };

        let weak = Rc::downgrade(&inner);
        inner.interval.interval(interval_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.current.set((inner.current.get() + 1) % inner.slides.len());
                inner.update();
            }
        });
        inner.update();

        Some(BasicSlideshow { inner })
    }

    pub fn indicators(&self) -> &[D::Node] {
        &self.inner.indicators
    }

    pub fn current(&self) -> usize {
        self.inner.current.get()
    }

    pub fn total(&self) -> usize {
        self.inner.slides.len()
    }

    pub fn next(&self) {
        self.select((self.current() + 1) % self.total());
    }

    pub fn previous(&self) {
        self.select((self.current() + self.total() - 1) % self.total());
    }

    pub fn select(&self, index: usize) {
        if index < self.inner.slides.len() {
            self.inner.current.set(index);
            self.inner.update();
        }
    }
}

impl<D: Dom> BasicInner<D> {
    fn update(&self) {
        let current = self.current.get();
        for (i, slide) in self.slides.iter().enumerate() {
            self.dom.set_class(slide, "active", i == current);
        }
        for (i, indicator) in self.indicators.iter().enumerate() {
            self.dom.set_class(indicator, "active", i == current);
        }
    }
}

impl<D: Dom> Teardown for BasicSlideshow<D> {
    fn teardown(&self) {
        self.inner.interval.clear();
    }
}
