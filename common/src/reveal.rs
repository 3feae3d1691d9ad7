use std::{cell::RefCell, rc::Rc};

use serde_json::json;
use tracing::{Level, debug, info, instrument};

use crate::{
    Teardown,
    config::{PreviewConfig, RevealConfig},
    dom::{Dom, Rect},
    images::Preloader,
    runtime::{Runtime, Slot},
};

pub const ANIMATED_EVENT: &str = "elementAnimated";
pub const PORTFOLIO_BUTTON_ID: &str = "portfolio-btn";
pub const PORTFOLIO_GRID_ID: &str = "portfolio-grid";
pub const PORTFOLIO_PHOTO_SELECTOR: &str = ".portfolio-photo";

#[derive(Clone, Debug, PartialEq)]
pub struct RevealOptions {
    pub class: String,
    pub threshold: f64,
    // distances cut from the top and bottom of the viewport; negative values extend it
    pub inset_top: f64,
    pub inset_bottom: f64,
    // dispatch ANIMATED_EVENT and honour data-animate-delay
    pub announce: bool,
}

impl From<&RevealConfig> for RevealOptions {
    fn from(config: &RevealConfig) -> Self {
        RevealOptions {
            class: config.class.clone(),
            threshold: config.threshold,
            inset_top: 0.0,
            inset_bottom: config.bottom_margin,
            announce: true,
        }
    }
}

// fraction of an element's height inside [inset_top, viewport_height - inset_bottom]
pub fn visible_fraction(rect: Rect, viewport_height: f64, inset_top: f64, inset_bottom: f64) -> f64 {
    if rect.height <= 0.0 {
        return 0.0;
    }

    let top = inset_top;
    let bottom = viewport_height - inset_bottom;
    let visible = (bottom.min(rect.top + rect.height) - top.max(rect.top)).max(0.0);
    visible / rect.height
}

// adds a class to each watched element the first time enough of it scrolls into view
pub struct Reveal<D: Dom> {
    inner: Rc<RevealInner<D>>,
}

impl<D: Dom> Clone for Reveal<D> {
    fn clone(&self) -> Self {
        Reveal {
            inner: self.inner.clone(),
        }
    }
}

struct RevealInner<D: Dom> {
    dom: Rc<D>,
    options: RevealOptions,
    watching: RefCell<Vec<D::Node>>,
    frame: Slot,
}

impl<D: Dom + 'static> Reveal<D> {
    #[instrument(level=Level::DEBUG, skip_all)]
    pub fn attach(dom: Rc<D>, runtime: &Runtime, config: &RevealConfig) -> Option<Self> {
        let mut targets: Vec<D::Node> = Vec::new();
        for selector in &config.selectors {
            for node in dom.query_all(selector) {
                if !targets.contains(&node) {
                    targets.push(node);
                }
            }
        }

        if targets.is_empty() {
            return None;
        }

        info!(elements = targets.len(), "watching elements for reveal");
        Some(Reveal::watch(dom, runtime, targets, RevealOptions::from(config)))
    }

    // the first check runs on the next frame
    pub fn watch(dom: Rc<D>, runtime: &Runtime, targets: Vec<D::Node>, options: RevealOptions) -> Self {
        let reveal = Reveal {
            inner: Rc::new(RevealInner {
                dom,
                options,
                watching: RefCell::new(targets),
                frame: Slot::new(&runtime.scheduler),
            }),
        };
        reveal.on_scroll();
        reveal
    }

    pub fn on_scroll(&self) {
        if self.inner.frame.is_armed() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.frame.frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.check();
            }
        });
    }

    pub fn check(&self) {
        self.inner.check();
    }

    pub fn watching(&self) -> usize {
        self.inner.watching.borrow().len()
    }
}

impl<D: Dom> RevealInner<D> {
    fn check(&self) {
        let height = self.dom.viewport().height;
        let options = &self.options;

        let revealed: Vec<D::Node> = {
            let mut watching = self.watching.borrow_mut();
            let (visible, hidden): (Vec<D::Node>, Vec<D::Node>) = watching.drain(..).partition(|node| {
                let fraction = visible_fraction(self.dom.rect(node), height, options.inset_top, options.inset_bottom);
                fraction > 0.0 && fraction >= options.threshold
            });
            *watching = hidden;
            visible
        };

        for node in &revealed {
            self.dom.set_class(node, &options.class, true);

            if options.announce {
                if let Some(delay) = self.dom.attribute(node, "data-animate-delay") {
                    self.dom.set_style(node, "animation-delay", &format!("{delay}ms"));
                }
                self.dom.dispatch(Some(node), ANIMATED_EVENT, json!({}));
            }
        }

        if !revealed.is_empty() {
            debug!(revealed = revealed.len(), class = %options.class, "revealed elements");
        }
    }
}

impl<D: Dom> Teardown for Reveal<D> {
    fn teardown(&self) {
        self.inner.frame.clear();
        self.inner.watching.borrow_mut().clear();
    }
}

// colour preview of the portfolio strip on the landing page
pub struct PortfolioPreview<D: Dom> {
    inner: Rc<PreviewInner<D>>,
}

impl<D: Dom> Clone for PortfolioPreview<D> {
    fn clone(&self) -> Self {
        PortfolioPreview {
            inner: self.inner.clone(),
        }
    }
}

struct PreviewInner<D: Dom> {
    dom: Rc<D>,
    button: D::Node,
    grid: D::Node,
    photos: Vec<D::Node>,
    in_view: Option<Reveal<D>>,
    hover: Slot,
    preloader: Preloader,
}

impl<D: Dom + 'static> PortfolioPreview<D> {
    #[instrument(level=Level::DEBUG, skip_all)]
    pub fn attach(dom: Rc<D>, runtime: &Runtime, config: &PreviewConfig) -> Option<Self> {
        let button = dom.by_id(PORTFOLIO_BUTTON_ID)?;
        let grid = dom.by_id(PORTFOLIO_GRID_ID)?;
        let photos = dom.query_all(PORTFOLIO_PHOTO_SELECTOR);

        let in_view = if photos.is_empty() {
            None
        } else {
            let options = RevealOptions {
                class: String::from("in-viewport"),
                threshold: config.photo_threshold,
                inset_top: config.photo_margin,
                inset_bottom: config.photo_margin,
                announce: false,
            };
            Some(Reveal::watch(dom.clone(), runtime, photos.clone(), options))
        };

        let preview = PortfolioPreview {
            inner: Rc::new(PreviewInner {
                dom,
                button,
                grid,
                photos,
                in_view,
                hover: Slot::new(&runtime.scheduler),
                preloader: Preloader::new(),
            }),
        };

        if !config.images.is_empty() {
            info!(images = config.images.len(), "preloading portfolio preview images");
            let preload =
                preview
                    .inner
                    .preloader
                    .preload(runtime.images.as_ref(), &config.images, config.preload_timeout_ms);
            runtime.spawner.spawn_local(Box::pin(async move {
                preload.await;
            }));
        }

        Some(preview)
    }

    pub fn button(&self) -> &D::Node {
        &self.inner.button
    }

    // hover or focus
    pub fn highlight(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.hover.frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.dom.set_class(&inner.grid, "colorized", true);
            }
        });
    }

    // hover out or blur
    pub fn unhighlight(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.hover.frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.dom.set_class(&inner.grid, "colorized", false);
                for photo in &inner.photos {
                    inner.dom.set_style(photo, "transform", "");
                }
            }
        });
    }

    pub fn on_scroll(&self) {
        if let Some(in_view) = &self.inner.in_view {
            in_view.on_scroll();
        }
    }
}

impl<D: Dom> Teardown for PortfolioPreview<D> {
    fn teardown(&self) {
        self.inner.hover.clear();
        self.inner.preloader.cancel_all();
        if let Some(in_view) = &self.inner.in_view {
            in_view.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Harness, MemoryDom};

    fn rect(top: f64, height: f64) -> Rect {
        Rect { top, height }
    }

    #[test]
    fn fraction_respects_the_insets() {
        // 40 of 100 px above the shrunk bottom edge
        assert_eq!(visible_fraction(rect(710.0, 100.0), 800.0, 0.0, 50.0), 0.4);
        assert_eq!(visible_fraction(rect(760.0, 100.0), 800.0, 0.0, 50.0), 0.0);
        // an expanded viewport sees elements just below the fold
        assert_eq!(visible_fraction(rect(820.0, 100.0), 800.0, -50.0, -50.0), 0.3);
        assert_eq!(visible_fraction(rect(-90.0, 100.0), 800.0, 0.0, 0.0), 0.1);
        assert_eq!(visible_fraction(rect(100.0, 0.0), 800.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn elements_reveal_once() {
        let harness = Harness::new();
        let dom: &MemoryDom = &harness.dom;

        let step = dom.add("div.step-container");
        let package = dom.add(r#"div.package[data-animate-delay="200"]"#);
        dom.set_layout(step, 100.0, 200.0);
        dom.set_layout(package, 1500.0, 300.0);

        let reveal = Reveal::attach(harness.dom.clone(), &harness.runtime, &RevealConfig::default()).unwrap();
        assert_eq!(reveal.watching(), 2);
        assert!(!dom.has_class(&step, "animate"));

        harness.frame();
        assert!(dom.has_class(&step, "animate"));
        assert!(!dom.has_class(&package, "animate"));
        assert_eq!(reveal.watching(), 1);

        dom.scroll(800.0);
        reveal.on_scroll();
        reveal.on_scroll();
        harness.frame();

        assert!(dom.has_class(&package, "animate"));
        assert_eq!(dom.style(&package, "animation-delay"), "200ms");
        assert_eq!(reveal.watching(), 0);

        let announced: Vec<Option<usize>> = dom
            .events()
            .into_iter()
            .filter(|(_, name, _)| name == ANIMATED_EVENT)
            .map(|(target, _, _)| target)
            .collect();
        assert_eq!(announced, vec![Some(step), Some(package)]);

        // scrolling back and forth does not announce again
        dom.scroll(0.0);
        reveal.on_scroll();
        harness.frame();
        assert_eq!(dom.events().len(), 2);
    }

    #[test]
    fn nothing_to_watch_skips_the_module() {
        let harness = Harness::new();
        assert!(Reveal::attach(harness.dom.clone(), &harness.runtime, &RevealConfig::default()).is_none());
    }

    #[test]
    fn preview_colorizes_on_hover() {
        let harness = Harness::new();
        let dom: &MemoryDom = &harness.dom;

        let button = dom.add("a#portfolio-btn");
        let grid = dom.add("div#portfolio-grid");
        let photo = dom.add_to(grid, "div.portfolio-photo");
        dom.set_layout(photo, 820.0, 100.0);
        dom.set_style(&photo, "transform", "scale(1.1)");

        let preview =
            PortfolioPreview::attach(harness.dom.clone(), &harness.runtime, &PreviewConfig::default()).unwrap();
        assert_eq!(preview.button(), &button);

        preview.highlight();
        assert!(!dom.has_class(&grid, "colorized"));
        harness.frame();
        assert!(dom.has_class(&grid, "colorized"));
        // within the expanded margin
        assert!(dom.has_class(&photo, "in-viewport"));

        preview.unhighlight();
        harness.frame();
        assert!(!dom.has_class(&grid, "colorized"));
        assert_eq!(dom.style(&photo, "transform"), "");

        assert_eq!(harness.images.requested().len(), 3);
        assert!(dom.events().is_empty());

        preview.teardown();
        assert_eq!(harness.clock.pending(), 0);
    }
}
