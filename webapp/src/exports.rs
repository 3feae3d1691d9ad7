// functions exposed to the page's own scripts
//
// every call is a no-op returning a neutral value when the matching module is not mounted
use futures::channel::oneshot;
use js_sys::Promise;
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::{JsError, JsValue, prelude::wasm_bindgen};

use common::{
    Mounted,
    portfolio::{Filter, PortfolioItem},
};

use crate::page::with_page;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    let json = serde_json::to_string(value).map_err(|err| JsError::new(&err.to_string()))?;
    js_sys::JSON::parse(&json).map_err(|err| JsError::new(&format!("{err:?}")))
}

#[wasm_bindgen]
pub fn slideshow_go_to(index: u32) -> bool {
    with_page(|page| match &*page.hero.slideshow {
        Mounted::Enhanced(slideshow) => {
            let moved = slideshow.go_to(index as usize);
            if moved {
                slideshow.restart_autoplay();
            }
            moved
        }
        Mounted::Basic(basic) => {
            basic.select(index as usize);
            basic.current() == index as usize
        }
        Mounted::Absent => false,
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn slideshow_next() -> bool {
    with_page(|page| match &*page.hero.slideshow {
        Mounted::Enhanced(slideshow) => slideshow.next(),
        Mounted::Basic(basic) => {
            basic.next();
            true
        }
        Mounted::Absent => false,
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn slideshow_previous() -> bool {
    with_page(|page| match &*page.hero.slideshow {
        Mounted::Enhanced(slideshow) => slideshow.previous(),
        Mounted::Basic(basic) => {
            basic.previous();
            true
        }
        Mounted::Absent => false,
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn slideshow_toggle_autoplay() {
    with_page(|page| {
        if let Some(slideshow) = page.hero.slideshow.enhanced() {
            slideshow.toggle_autoplay();
        }
    });
}

#[wasm_bindgen]
pub fn slideshow_current() -> Option<u32> {
    with_page(|page| match &*page.hero.slideshow {
        Mounted::Enhanced(slideshow) => Some(slideshow.current() as u32),
        Mounted::Basic(basic) => Some(basic.current() as u32),
        Mounted::Absent => None,
    })
    .flatten()
}

#[wasm_bindgen]
pub fn slideshow_total() -> u32 {
    with_page(|page| match &*page.hero.slideshow {
        Mounted::Enhanced(slideshow) => slideshow.total() as u32,
        Mounted::Basic(basic) => basic.total() as u32,
        Mounted::Absent => 0,
    })
    .unwrap_or(0)
}

// resolves once the scroll animation finishes; rejects if it was superseded or the
// section does not exist
#[wasm_bindgen]
pub fn navigation_scroll_to(section: String) -> Promise {
    let done: Option<oneshot::Receiver<()>> = with_page(|page| {
        page.navigation
            .enhanced()
            .and_then(|navigation| navigation.scroll_to_section(&section))
    })
    .flatten();

    wasm_bindgen_futures::future_to_promise(async move {
        let Some(done) = done else {
            return Err(JsValue::from_str(&format!("cannot scroll to section {section}")));
        };

        done.await
            .map(|()| JsValue::UNDEFINED)
            .map_err(|_| JsValue::from_str("scroll superseded"))
    })
}

#[wasm_bindgen]
pub fn navigation_close_menu() -> bool {
    with_page(|page| page.navigation.enhanced().is_some_and(|navigation| navigation.close_menu())).unwrap_or(false)
}

#[wasm_bindgen]
pub fn navigation_refresh() {
    with_page(|page| {
        if let Some(navigation) = page.navigation.enhanced() {
            navigation.refresh();
        }
    });
}

#[wasm_bindgen]
pub fn navigation_current_section() -> Option<String> {
    with_page(|page| page.navigation.enhanced().map(|navigation| navigation.current_section())).flatten()
}

#[wasm_bindgen]
pub fn portfolio_filter(tag: &str) -> Result<(), JsError> {
    let filter: Filter = tag.parse().map_err(|err: anyhow::Error| JsError::new(&format!("{err:#}")))?;

    with_page(|page| match page.gallery.enhanced() {
        Some(gallery) => gallery.filter(filter),
        None => warn!(%filter, "portfolio gallery is not mounted"),
    });
    Ok(())
}

#[wasm_bindgen]
pub fn portfolio_open_modal(index: u32) -> bool {
    with_page(|page| page.gallery.enhanced().is_some_and(|gallery| gallery.open_modal(index as usize))).unwrap_or(false)
}

#[wasm_bindgen]
pub fn portfolio_close_modal() -> bool {
    with_page(|page| page.gallery.enhanced().is_some_and(|gallery| gallery.close_modal())).unwrap_or(false)
}

#[wasm_bindgen]
pub fn portfolio_current_filter() -> Option<String> {
    with_page(|page| page.gallery.enhanced().map(|gallery| gallery.current_filter().to_string())).flatten()
}

// a copy of the filtered items, as plain objects
#[wasm_bindgen]
pub fn portfolio_filtered_data() -> Result<JsValue, JsError> {
    let items: Vec<PortfolioItem> =
        with_page(|page| page.gallery.enhanced().map(|gallery| gallery.filtered()).unwrap_or_default())
            .unwrap_or_default();
    to_js(&items)
}

#[wasm_bindgen]
pub fn portfolio_modal_index() -> Option<u32> {
    with_page(|page| page.gallery.enhanced().map(|gallery| gallery.modal_index() as u32)).flatten()
}

#[wasm_bindgen]
pub fn sidebar_state() -> Result<JsValue, JsError> {
    let state = with_page(|page| page.sidebar.enhanced().map(|sidebar| sidebar.state())).flatten();
    to_js(&state.unwrap_or_default())
}

#[wasm_bindgen]
pub fn sidebar_refresh() {
    with_page(|page| {
        if let Some(sidebar) = page.sidebar.enhanced() {
            sidebar.refresh();
        }
    });
}
