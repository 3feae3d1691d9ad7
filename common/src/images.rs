use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::Rc,
};

use futures::future::{AbortHandle, LocalBoxFuture, abortable, join_all};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageLoad {
    Loaded,
    Failed,
    TimedOut,
    Cancelled,
}

// eager image fetch with an application-level timeout
pub trait ImageLoader {
    fn load(&self, src: &str, timeout_ms: u32) -> LocalBoxFuture<'static, ImageLoad>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: Vec<String>,
    pub timed_out: Vec<String>,
    pub cancelled: usize,
}

impl PreloadReport {
    pub fn attempted(&self) -> usize {
        self.loaded + self.failed.len() + self.timed_out.len() + self.cancelled
    }
}

// a load in flight; settled once its future resolved
struct Tracked {
    handle: AbortHandle,
    settled: Rc<Cell<bool>>,
}

impl Tracked {
    fn outstanding(&self) -> bool {
        !self.settled.get() && !self.handle.is_aborted()
    }
}

// the set of loads a controller has in flight
//
// each load is wrapped in an abort handle so teardown can drop everything still
// outstanding; aborted loads resolve as ImageLoad::Cancelled.  settled and aborted loads
// are pruned whenever a new one is tracked
#[derive(Default)]
pub struct Preloader {
    tracked: RefCell<Vec<Tracked>>,
}

impl Preloader {
    pub fn new() -> Self {
        Preloader::default()
    }

    pub fn track(
        &self,
        loader: &dyn ImageLoader,
        src: &str,
        timeout_ms: u32,
    ) -> impl Future<Output = ImageLoad> + 'static {
        let (load, handle) = abortable(loader.load(src, timeout_ms));
        let settled = Rc::new(Cell::new(false));

        let mut tracked = self.tracked.borrow_mut();
        tracked.retain(Tracked::outstanding);
        tracked.push(Tracked {
            handle,
            settled: settled.clone(),
        });

        async move {
            let outcome = load.await.unwrap_or(ImageLoad::Cancelled);
            settled.set(true);
            outcome
        }
    }

    pub fn preload(
        &self,
        loader: &dyn ImageLoader,
        sources: &[String],
        timeout_ms: u32,
    ) -> impl Future<Output = PreloadReport> + 'static {
        let loads: Vec<_> = sources
            .iter()
            .map(|src| {
                let load = self.track(loader, src, timeout_ms);
                let src = src.clone();

                async move {
                    let outcome = load.await;
                    match outcome {
                        ImageLoad::Loaded => debug!(%src, "image preloaded"),
                        ImageLoad::Failed => warn!(%src, "failed to preload image"),
                        ImageLoad::TimedOut => warn!(%src, timeout_ms, "timed out preloading image"),
                        ImageLoad::Cancelled => debug!(%src, "image preload cancelled"),
                    }
                    (src, outcome)
                }
            })
            .collect();

        async move {
            let mut report = PreloadReport::default();

            for (src, outcome) in join_all(loads).await {
                match outcome {
                    ImageLoad::Loaded => report.loaded += 1,
                    ImageLoad::Failed => report.failed.push(src),
                    ImageLoad::TimedOut => report.timed_out.push(src),
                    ImageLoad::Cancelled => report.cancelled += 1,
                }
            }

            info!(
                loaded = report.loaded,
                attempted = report.attempted(),
                "image preload finished"
            );
            report
        }
    }

    pub fn cancel_all(&self) {
        for tracked in self.tracked.borrow_mut().drain(..) {
            tracked.handle.abort();
        }
    }

    pub fn outstanding(&self) -> usize {
        let mut tracked = self.tracked.borrow_mut();
        tracked.retain(Tracked::outstanding);
        tracked.len()
    }
}

// extract the target of a css url() value, e.g. the computed background-image
pub fn css_url(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?;
    let url: String = inner.chars().filter(|c| *c != '"' && *c != '\'').collect();
    let url = url.trim();

    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}
