use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use chrono::Utc;
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    Teardown,
    config::PortfolioConfig,
    dom::Dom,
    images::{ImageLoad, Preloader},
    input::Key,
    runtime::{Runtime, Slot},
    storage::{request_scroll, split_cross_page},
};

mod basic;
pub mod catalog;

pub use basic::BasicGallery;
pub use catalog::{CATALOG, Category, Filter, PortfolioItem};

pub const GRID_ID: &str = "portfolio-gallery-grid";
pub const FILTER_BUTTON_SELECTOR: &str = ".filter-btn";
pub const MODAL_ID: &str = "imageModal";
pub const MODAL_IMAGE_ID: &str = "modalImage";
pub const PREV_ID: &str = "prevBtn";
pub const NEXT_ID: &str = "nextBtn";
pub const CLOSE_SELECTOR: &str = ".close";
pub const LOAD_MORE_ID: &str = "loadMoreBtn";
pub const CROSS_PAGE_SELECTOR: &str = r##"a[href^="index.html#"]"##;

struct Modal<N> {
    root: N,
    image: N,
    prev: Option<N>,
    next: Option<N>,
    close: Option<N>,
}

// filterable gallery with a lightbox
pub struct Gallery<D: Dom> {
    inner: Rc<Inner<D>>,
}

impl<D: Dom> Clone for Gallery<D> {
    fn clone(&self) -> Self {
        Gallery {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<D: Dom> {
    dom: Rc<D>,
    runtime: Runtime,
    config: PortfolioConfig,
    items: Vec<PortfolioItem>,

    grid: Option<D::Node>,
    buttons: Vec<D::Node>,
    modal: Option<Modal<D::Node>>,
    load_more: Option<D::Node>,
    cross_page_links: Vec<D::Node>,

    filter: Cell<Filter>,
    filtered: RefCell<Vec<PortfolioItem>>,
    tiles: RefCell<Vec<D::Node>>,
    filtering: Cell<bool>,

    modal_open: Cell<bool>,
    modal_index: Cell<usize>,
    // bumped whenever the modal moves or closes so late image loads can tell they are stale
    modal_generation: Cell<u64>,

    render: Slot,
    stagger: Slot,
    filter_frame: Slot,
    filter_unlock: Slot,
    modal_swap: Slot,
    leave: Slot,

    preloader: Preloader,
}

impl<D: Dom + 'static> Gallery<D> {
    #[instrument(level=Level::DEBUG, skip_all)]
    pub fn attach(
        dom: Rc<D>,
        runtime: &Runtime,
        config: &PortfolioConfig,
        items: Vec<PortfolioItem>,
    ) -> anyhow::Result<Option<Self>> {
        let grid = dom.by_id(GRID_ID);
        let buttons = dom.query_all(FILTER_BUTTON_SELECTOR);

        if grid.is_none() && buttons.is_empty() {
            debug!("no gallery on this page");
            return Ok(None);
        }

        if config.items_per_page == 0 {
            return Err(anyhow::Error::msg("gallery page size must be positive"));
        }

        if buttons.is_empty() {
            warn!("no filter buttons found");
        }

        let modal = match (dom.by_id(MODAL_ID), dom.by_id(MODAL_IMAGE_ID)) {
            (Some(root), Some(image)) => Some(Modal {
                root,
                image,
                prev: dom.by_id(PREV_ID),
                next: dom.by_id(NEXT_ID),
                close: dom.query(CLOSE_SELECTOR),
            }),
            _ => {
                warn!("modal elements not found");
                None
            }
        };

        let scheduler = &runtime.scheduler;
        let inner = Rc::new(Inner {
            load_more: dom.by_id(LOAD_MORE_ID),
            cross_page_links: dom.query_all(CROSS_PAGE_SELECTOR),
            dom,
            runtime: runtime.clone(),
            config: config.clone(),
            items,
            grid,
            buttons,
            modal,
            filter: Cell::new(Filter::All),
            filtered: RefCell::new(Vec::new()),
            tiles: RefCell::new(Vec::new()),
            filtering: Cell::new(false),
            modal_open: Cell::new(false),
            modal_index: Cell::new(0),
            modal_generation: Cell::new(0),
            render: Slot::new(scheduler),
            stagger: Slot::new(scheduler),
            filter_frame: Slot::new(scheduler),
            filter_unlock: Slot::new(scheduler),
            modal_swap: Slot::new(scheduler),
            leave: Slot::new(scheduler),
            preloader: Preloader::new(),
        });

        info!(items = inner.items.len(), "gallery ready");

        let gallery = Gallery { inner };
        gallery.filter(Filter::All);

        Ok(Some(gallery))
    }

    pub fn current_filter(&self) -> Filter {
        self.inner.filter.get()
    }

    pub fn filtered(&self) -> Vec<PortfolioItem> {
        self.inner.filtered.borrow().clone()
    }

    pub fn modal_index(&self) -> usize {
        self.inner.modal_index.get()
    }

    pub fn is_modal_open(&self) -> bool {
        self.inner.modal_open.get()
    }

    pub fn is_filtering(&self) -> bool {
        self.inner.filtering.get()
    }

    pub fn buttons(&self) -> &[D::Node] {
        &self.inner.buttons
    }

    pub fn grid(&self) -> Option<&D::Node> {
        self.inner.grid.as_ref()
    }

    pub fn modal_root(&self) -> Option<&D::Node> {
        self.inner.modal.as_ref().map(|m| &m.root)
    }

    pub fn prev_button(&self) -> Option<&D::Node> {
        self.inner.modal.as_ref().and_then(|m| m.prev.as_ref())
    }

    pub fn next_button(&self) -> Option<&D::Node> {
        self.inner.modal.as_ref().and_then(|m| m.next.as_ref())
    }

    pub fn close_button(&self) -> Option<&D::Node> {
        self.inner.modal.as_ref().and_then(|m| m.close.as_ref())
    }

    pub fn cross_page_links(&self) -> &[D::Node] {
        &self.inner.cross_page_links
    }

    // the grid is rebuilt on the next frame; a render still pending is replaced
    pub fn filter(&self, filter: Filter) {
        Inner::filter(&self.inner, filter);
    }

    pub fn filter_tag(&self, tag: &str) -> anyhow::Result<()> {
        let filter = tag.parse()?;
        self.filter(filter);
        Ok(())
    }

    // returns false when the click was ignored
    pub fn filter_clicked(&self, button: &D::Node) -> bool {
        let inner = &self.inner;

        if inner.filtering.get() || inner.dom.is_disabled(button) {
            return false;
        }

        let tag = inner.dom.attribute(button, "data-filter").unwrap_or_default();
        let filter: Filter = match tag.parse() {
            Ok(filter) => filter,
            Err(err) => {
                warn!("ignoring filter button: {err}");
                return false;
            }
        };

        inner.filtering.set(true);
        for other in &inner.buttons {
            inner.dom.set_disabled(other, true);
        }

        let button = button.clone();
        let weak = Rc::downgrade(inner);
        inner.filter_frame.frame(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };

            for other in &inner.buttons {
                inner.dom.set_class(other, "active", false);
            }
            inner.dom.set_class(&button, "active", true);

            Inner::filter(&inner, filter);

            let weak = Rc::downgrade(&inner);
            inner.filter_unlock.timeout(inner.config.filter_lock_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    for other in &inner.buttons {
                        inner.dom.set_disabled(other, false);
                    }
                    inner.filtering.set(false);
                }
            });
        });

        true
    }

    // a grid tile was clicked or activated from the keyboard
    pub fn tile_activated(&self, index: usize) -> bool {
        self.open_modal(index)
    }

    pub fn open_modal(&self, index: usize) -> bool {
        Inner::open_modal(&self.inner, index)
    }

    pub fn navigate_modal(&self, delta: isize) -> bool {
        Inner::navigate_modal(&self.inner, delta)
    }

    pub fn close_modal(&self) -> bool {
        self.inner.close_modal()
    }

    // returns true when the key was consumed
    pub fn handle_key(&self, key: Key) -> bool {
        if !self.inner.modal_open.get() {
            return false;
        }

        match key {
            Key::ArrowLeft => {
                self.navigate_modal(-1);
            }
            Key::ArrowRight => {
                self.navigate_modal(1);
            }
            Key::Escape => {
                self.close_modal();
            }
            _ => return false,
        }
        true
    }

    // clicks on the dimmed area around the image land on the modal itself
    pub fn backdrop_clicked(&self, target: &D::Node) {
        if self.modal_root() == Some(target) {
            self.close_modal();
        }
    }

    // returns true when the navigation was taken over
    pub fn cross_page_link_clicked(&self, href: &str) -> bool {
        let Some((page, section)) = split_cross_page(href) else {
            return false;
        };

        let inner = &self.inner;
        request_scroll(inner.runtime.session.as_ref(), section, Utc::now());

        if let Some(body) = inner.dom.body() {
            inner.dom.set_style(&body, "opacity", "0.9");
        }

        let page = page.to_string();
        let weak = Rc::downgrade(inner);
        inner.leave.timeout(inner.config.navigate_delay_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.dom.navigate(&page);
            }
        });

        true
    }
}

impl<D: Dom + 'static> Inner<D> {
    fn filter(this: &Rc<Self>, filter: Filter) {
        info!(%filter, "filtering gallery");

        this.filter.set(filter);
        *this.filtered.borrow_mut() = filter.apply(&this.items);

        if this.grid.is_some() {
            let weak = Rc::downgrade(this);
            this.render.frame(move |_| {
                if let Some(inner) = weak.upgrade() {
                    Inner::render_grid(&inner);
                }
            });
        }

        this.update_load_more();
    }

    fn render_grid(this: &Rc<Self>) {
        let Some(grid) = &this.grid else {
            return;
        };

        let dom = &this.dom;
        this.stagger.clear();
        dom.clear_children(grid);

        let filtered = this.filtered.borrow();
        let page = &filtered[..filtered.len().min(this.config.items_per_page)];

        let mut tiles = Vec::with_capacity(page.len());
        for (index, item) in page.iter().enumerate() {
            let (Some(tile), Some(image)) = (dom.create_element("div"), dom.create_element("img")) else {
                warn!("could not create gallery elements");
                break;
            };

            dom.set_class(&tile, "gallery-item", true);
            dom.set_attribute(&tile, "data-category", item.category.tag());
            dom.set_attribute(&tile, "data-index", &index.to_string());
            dom.set_attribute(&tile, "tabindex", "0");
            dom.set_attribute(&tile, "role", "button");
            dom.set_attribute(&tile, "aria-label", &format!("Ver imagen {}", index + 1));

            dom.set_class(&image, "portfolio-item-image", true);
            dom.set_attribute(&image, "src", item.image);
            dom.set_attribute(&image, "alt", &item.alt_text());
            dom.set_attribute(&image, "loading", "lazy");

            dom.append_child(&tile, &image);
            dom.append_child(grid, &tile);
            tiles.push(tile);
        }

        debug!(tiles = tiles.len(), "rendered gallery");
        *this.tiles.borrow_mut() = tiles;
        drop(filtered);

        Inner::reveal_tile(this, 0);
    }

    // each tile animates in a short while after the previous one
    fn reveal_tile(this: &Rc<Self>, index: usize) {
        let count = {
            let tiles = this.tiles.borrow();
            let Some(tile) = tiles.get(index) else {
                return;
            };
            this.dom.set_class(tile, "animate", true);
            tiles.len()
        };

        if index + 1 < count {
            let weak = Rc::downgrade(this);
            this.stagger.timeout(this.config.stagger_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    Inner::reveal_tile(&inner, index + 1);
                }
            });
        }
    }

    fn update_load_more(&self) {
        if let Some(button) = &self.load_more {
            let more = self.filtered.borrow().len() > self.config.items_per_page;
            self.dom.set_style(button, "display", if more { "block" } else { "none" });
        }
    }

    fn open_modal(this: &Rc<Self>, index: usize) -> bool {
        let Some(modal) = &this.modal else {
            warn!("modal elements not found");
            return false;
        };

        if this.modal_open.get() {
            return false;
        }

        let Some(item) = this.filtered.borrow().get(index).cloned() else {
            return false;
        };

        info!(index, total = this.filtered.borrow().len(), "opening modal");

        this.modal_open.set(true);
        this.modal_index.set(index);
        let generation = this.bump_generation();

        let dom = &this.dom;
        dom.set_style(&modal.image, "transform", "");
        dom.set_style(&modal.image, "opacity", "");
        dom.set_style(&modal.image, "transition", "");
        dom.set_style(&modal.root, "display", "block");

        let load = this.preloader.track(
            this.runtime.images.as_ref(),
            item.image,
            this.config.modal_load_timeout_ms,
        );
        let weak = Rc::downgrade(this);
        this.runtime.spawner.spawn_local(Box::pin(async move {
            let outcome = load.await;

            let Some(inner) = weak.upgrade() else {
                return;
            };

            match outcome {
                ImageLoad::Cancelled => return,
                ImageLoad::Failed | ImageLoad::TimedOut => {
                    warn!(src = item.image, ?outcome, "modal image did not preload")
                }
                ImageLoad::Loaded => (),
            }

            if inner.modal_open.get() && inner.modal_generation.get() == generation {
                inner.show_item(&item);
            }
        }));

        this.update_controls(index);

        if let Some(body) = dom.body() {
            dom.set_style(&body, "overflow", "hidden");
        }
        dom.set_attribute(&modal.root, "aria-hidden", "false");
        if let Some(close) = &modal.close {
            dom.focus(close);
        }

        true
    }

    fn navigate_modal(this: &Rc<Self>, delta: isize) -> bool {
        let Some(modal) = &this.modal else {
            return false;
        };

        if !this.modal_open.get() {
            return false;
        }

        let len = this.filtered.borrow().len();
        let Some(index) = this.modal_index.get().checked_add_signed(delta).filter(|i| *i < len) else {
            return false;
        };

        debug!(index, "modal navigating");
        this.modal_index.set(index);
        this.bump_generation();

        this.dom.set_style(&modal.image, "opacity", &this.config.modal_fade_opacity);

        let weak = Rc::downgrade(this);
        this.modal_swap.timeout(this.config.modal_fade_ms, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };

            let item = inner.filtered.borrow().get(index).cloned();
            if let (Some(item), Some(modal)) = (item, &inner.modal) {
                inner.show_item(&item);
                inner.update_controls(index);
                inner.dom.set_style(&modal.image, "opacity", "1");
            }
        });

        true
    }

    fn close_modal(&self) -> bool {
        let Some(modal) = &self.modal else {
            return false;
        };

        if !self.modal_open.get() {
            return false;
        }

        info!("closing modal");
        self.modal_open.set(false);
        self.bump_generation();
        self.modal_swap.clear();

        let dom = &self.dom;
        dom.set_style(&modal.root, "display", "none");
        dom.set_style(&modal.image, "transform", "");
        dom.set_style(&modal.image, "opacity", "");
        dom.set_style(&modal.image, "transition", "");
        if let Some(body) = dom.body() {
            dom.set_style(&body, "overflow", "");
        }
        dom.set_attribute(&modal.root, "aria-hidden", "true");

        true
    }

    fn show_item(&self, item: &PortfolioItem) {
        if let Some(modal) = &self.modal {
            self.dom.set_attribute(&modal.image, "src", item.image);
            self.dom.set_attribute(&modal.image, "alt", &item.alt_text());
        }
    }

    fn update_controls(&self, index: usize) {
        let Some(modal) = &self.modal else {
            return;
        };

        let len = self.filtered.borrow().len();
        if let Some(prev) = &modal.prev {
            self.dom.set_style(prev, "display", if index > 0 { "flex" } else { "none" });
        }
        if let Some(next) = &modal.next {
            self.dom.set_style(next, "display", if index + 1 < len { "flex" } else { "none" });
        }
    }

    fn bump_generation(&self) -> u64 {
        let generation = self.modal_generation.get() + 1;
        self.modal_generation.set(generation);
        generation
    }
}

impl<D: Dom> Teardown for Gallery<D> {
    fn teardown(&self) {
        let inner = &self.inner;
        for slot in [
            &inner.render,
            &inner.stagger,
            &inner.filter_frame,
            &inner.filter_unlock,
            &inner.modal_swap,
            &inner.leave,
        ] {
            slot.clear();
        }
        inner.preloader.cancel_all();
        debug!("gallery torn down");
    }
}
