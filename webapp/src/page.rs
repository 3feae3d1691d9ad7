use std::{cell::RefCell, rc::Rc};

use tracing::{Level, debug, error, info, instrument, warn};

use common::{
    Teardown,
    config::{SiteConfig, read_config},
};

use crate::{
    gallery::{GalleryLayer, mount_gallery},
    hero::{Hero, mount_hero},
    nav::{NavigationLayer, mount_navigation},
    platform::{self, dom::WebDom, events::Listeners},
    sidebar::{SidebarLayer, mount_sidebar},
};

const CONFIG_ELEMENT_ID: &str = "site-config";

// every controller mounted on the current page
pub struct Page {
    pub hero: Hero,
    pub navigation: Rc<NavigationLayer>,
    pub gallery: Rc<GalleryLayer>,
    pub sidebar: Rc<SidebarLayer>,
    listeners: Listeners,
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

// run f against the mounted page, if the page scripts have started
pub fn with_page<R>(f: impl FnOnce(&Page) -> R) -> Option<R> {
    PAGE.with_borrow(|page| page.as_ref().map(f))
}

// an inline <script type="application/toml" id="site-config"> overrides the defaults
fn load_config(dom: &WebDom) -> SiteConfig {
    let Some(doc) = dom
        .document()
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|node| node.text_content())
    else {
        debug!("no inline site config, using defaults");
        return SiteConfig::default();
    };

    match read_config(&doc) {
        Ok(config) => config,
        Err(err) => {
            warn!("ignoring inline site config: {err:#}");
            SiteConfig::default()
        }
    }
}

#[instrument(level=Level::DEBUG)]
pub fn start() -> anyhow::Result<()> {
    if PAGE.with_borrow(|page| page.is_some()) {
        debug!("page scripts already running");
        return Ok(());
    }

    let dom = Rc::new(WebDom::new()?);
    let config = load_config(&dom);
    let runtime = platform::runtime(&dom);
    let listeners = Listeners::default();

    let page = Page {
        hero: mount_hero(&dom, &runtime, &config, &listeners),
        navigation: mount_navigation(&dom, &runtime, &config, &listeners),
        gallery: mount_gallery(&dom, &runtime, &config, &listeners),
        sidebar: mount_sidebar(&dom, &runtime, &config, &listeners),
        listeners,
    };

    page.listeners.listen(dom.window(), "beforeunload", move |_| stop());

    PAGE.with_borrow_mut(|slot| *slot = Some(page));
    info!("page scripts started");
    Ok(())
}

pub fn stop() {
    let Some(page) = PAGE.with_borrow_mut(Option::take) else {
        return;
    };

    debug!("tearing down page scripts");
    page.teardown();
}

impl Teardown for Page {
    fn teardown(&self) {
        self.hero.teardown();
        self.navigation.teardown();
        self.gallery.teardown();
        self.sidebar.teardown();
        self.listeners.clear();
    }
}

pub fn boot() {
    if let Err(err) = start() {
        error!("failed to start page scripts: {err:#}");
    }
}
