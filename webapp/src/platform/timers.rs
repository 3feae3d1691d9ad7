use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use gloo_timers::callback::{Interval, Timeout};
use tracing::warn;
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::Window;

use common::runtime::{Scheduler, TimerId};

enum Pending {
    Timeout(Timeout),
    Interval(Interval),
    Frame {
        handle: i32,
        _callback: Closure<dyn FnMut(f64)>,
    },
}

// timers are owned by the scheduler until they fire or are cancelled; dropping a gloo
// handle clears the underlying browser timer
pub struct WebScheduler {
    window: Window,
    next: Cell<u64>,
    pending: Rc<RefCell<HashMap<u64, Pending>>>,
}

impl WebScheduler {
    pub fn new(window: Window) -> Self {
        WebScheduler {
            window,
            next: Cell::new(1),
            pending: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    fn allocate(&self) -> u64 {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }

    // the finished entry is returned so it is dropped after the callback, not during it
    fn release(pending: &std::rc::Weak<RefCell<HashMap<u64, Pending>>>, id: u64) -> Option<Pending> {
        pending.upgrade().and_then(|pending| pending.borrow_mut().remove(&id))
    }
}

impl Scheduler for WebScheduler {
    fn timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.allocate();
        let pending = Rc::downgrade(&self.pending);

        let timeout = Timeout::new(millis, move || {
            let _finished = WebScheduler::release(&pending, id);
            callback();
        });

        self.pending.borrow_mut().insert(id, Pending::Timeout(timeout));
        TimerId(id)
    }

    fn interval(&self, millis: u32, mut callback: Box<dyn FnMut()>) -> TimerId {
        let id = self.allocate();
        let interval = Interval::new(millis, move || callback());

        self.pending.borrow_mut().insert(id, Pending::Interval(interval));
        TimerId(id)
    }

    fn frame(&self, callback: Box<dyn FnOnce(f64)>) -> TimerId {
        let id = self.allocate();
        let pending = Rc::downgrade(&self.pending);

        let closure = Closure::once(move |timestamp: f64| {
            let _finished = WebScheduler::release(&pending, id);
            callback(timestamp);
        });

        match self.window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => {
                self.pending.borrow_mut().insert(
                    id,
                    Pending::Frame {
                        handle,
                        _callback: closure,
                    },
                );
            }
            Err(err) => warn!("failed to request animation frame: {err:?}"),
        }

        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        let Some(pending) = self.pending.borrow_mut().remove(&id.0) else {
            return;
        };

        if let Pending::Frame { handle, .. } = pending {
            if let Err(err) = self.window.cancel_animation_frame(handle) {
                warn!("failed to cancel animation frame: {err:?}");
            }
        }
    }
}
