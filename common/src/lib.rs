use tracing::{debug, error, info};

pub mod config;
pub mod dom;
pub mod images;
pub mod input;
pub mod navigation;
pub mod portfolio;
pub mod reveal;
pub mod runtime;
pub mod sidebar;
pub mod slideshow;
pub mod storage;

#[cfg(test)]
pub(crate) mod fake;

// every controller owns timers, frames or in-flight loads that must be released
// when the page goes away
pub trait Teardown {
    fn teardown(&self);
}

// layered capabilities
//
// each page module is mounted as an enhanced controller when its preconditions hold.  if
// the required elements are not on the page the module is simply skipped, but if setting up
// the enhanced layer fails we fall back to a basic layer that only toggles classes, so the
// page never ends up without any interactivity
pub enum Mounted<E, B> {
    Enhanced(E),
    Basic(B),
    Absent,
}

impl<E, B> Mounted<E, B> {
    pub fn enhanced(&self) -> Option<&E> {
        match self {
            Mounted::Enhanced(e) => Some(e),
            _ => None,
        }
    }

    pub fn basic(&self) -> Option<&B> {
        match self {
            Mounted::Basic(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Mounted::Absent)
    }
}

impl<E: Teardown, B: Teardown> Teardown for Mounted<E, B> {
    fn teardown(&self) {
        match self {
            Mounted::Enhanced(e) => e.teardown(),
            Mounted::Basic(b) => b.teardown(),
            Mounted::Absent => {}
        }
    }
}

pub fn mount<E, B>(
    module: &str,
    enhanced: impl FnOnce() -> anyhow::Result<Option<E>>,
    basic: impl FnOnce() -> Option<B>,
) -> Mounted<E, B> {
    match enhanced() {
        Ok(Some(e)) => {
            info!(module, "mounted enhanced layer");
            Mounted::Enhanced(e)
        }
        Ok(None) => {
            debug!(module, "required elements not found, skipping");
            Mounted::Absent
        }
        Err(err) => {
            error!(module, "failed to set up enhanced layer: {err:#}");

            match basic() {
                Some(b) => {
                    info!(module, "mounted basic layer");
                    Mounted::Basic(b)
                }
                None => Mounted::Absent,
            }
        }
    }
}
