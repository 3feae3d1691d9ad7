use chrono::{DateTime, Utc};
use tracing::debug;

// session-scoped keys used by one page to ask another to scroll to a section on load
pub const SCROLL_TARGET_KEY: &str = "scrollToSection";
pub const SCROLL_FLAG_KEY: &str = "scrollFromExternal";
pub const SCROLL_TIMESTAMP_KEY: &str = "navigationTimestamp";

pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

pub fn request_scroll(store: &dyn SessionStore, section: &str, now: DateTime<Utc>) {
    debug!(section, "storing cross-page scroll request");

    store.set(SCROLL_TARGET_KEY, section);
    store.set(SCROLL_FLAG_KEY, "true");
    store.set(SCROLL_TIMESTAMP_KEY, &now.timestamp_millis().to_string());
}

// one-shot: a complete request is deleted as soon as it is read
pub fn take_scroll_request(store: &dyn SessionStore) -> Option<String> {
    let section = store.get(SCROLL_TARGET_KEY)?;

    if section.is_empty() || store.get(SCROLL_FLAG_KEY).as_deref() != Some("true") {
        return None;
    }

    store.remove(SCROLL_TARGET_KEY);
    store.remove(SCROLL_FLAG_KEY);
    store.remove(SCROLL_TIMESTAMP_KEY);

    debug!(%section, "consumed cross-page scroll request");
    Some(section)
}

// "index.html#about" -> ("index.html", "about")
pub fn split_cross_page(href: &str) -> Option<(&str, &str)> {
    let (page, hash) = href.split_once('#')?;

    if page.is_empty() || hash.is_empty() {
        None
    } else {
        Some((page, hash))
    }
}
