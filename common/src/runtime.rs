use std::{cell::Cell, rc::Rc};

use futures::future::LocalBoxFuture;

use crate::{images::ImageLoader, storage::SessionStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

// browser timers
//
// callbacks are never run synchronously from inside timeout/interval/frame, and
// cancelling an id that already fired is a no-op
pub trait Scheduler {
    fn timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> TimerId;

    fn interval(&self, millis: u32, callback: Box<dyn FnMut()>) -> TimerId;

    // display-refresh tick; the callback receives the frame timestamp in ms
    fn frame(&self, callback: Box<dyn FnOnce(f64)>) -> TimerId;

    fn cancel(&self, id: TimerId);
}

pub trait Spawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}

// everything a controller needs from the page besides the document itself
#[derive(Clone)]
pub struct Runtime {
    pub scheduler: Rc<dyn Scheduler>,
    pub spawner: Rc<dyn Spawner>,
    pub images: Rc<dyn ImageLoader>,
    pub session: Rc<dyn SessionStore>,
}

// a single re-armable timer
//
// arming always clears whatever the slot held before, so a controller can never end up with
// two copies of the same timer running.  one-shot timers and frames release the slot just
// before their callback runs, which makes is_armed() usable as a "frame already pending"
// flag for coalescing scroll and resize work
pub struct Slot {
    scheduler: Rc<dyn Scheduler>,
    id: Rc<Cell<Option<TimerId>>>,
    generation: Rc<Cell<u64>>,
}

impl Slot {
    pub fn new(scheduler: &Rc<dyn Scheduler>) -> Self {
        Slot {
            scheduler: scheduler.clone(),
            id: Rc::new(Cell::new(None)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn timeout(&self, millis: u32, callback: impl FnOnce() + 'static) {
        let release = self.rearm();
        let id = self.scheduler.timeout(
            millis,
            Box::new(move || {
                release();
                callback();
            }),
        );
        self.id.set(Some(id));
    }

    pub fn interval(&self, millis: u32, callback: impl FnMut() + 'static) {
        self.rearm();
        let id = self.scheduler.interval(millis, Box::new(callback));
        self.id.set(Some(id));
    }

    pub fn frame(&self, callback: impl FnOnce(f64) + 'static) {
        let release = self.rearm();
        let id = self.scheduler.frame(Box::new(move |timestamp| {
            release();
            callback(timestamp);
        }));
        self.id.set(Some(id));
    }

    pub fn clear(&self) {
        self.generation.set(self.generation.get() + 1);
        if let Some(id) = self.id.take() {
            self.scheduler.cancel(id);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.id.get().is_some()
    }

    fn rearm(&self) -> impl FnOnce() + 'static {
        self.clear();

        let id = self.id.clone();
        let generation = self.generation.clone();
        let armed = generation.get();

        // only release if nothing re-armed the slot in the meantime
        move || {
            if generation.get() == armed {
                id.set(None);
            }
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.clear();
    }
}
