use std::cell::RefCell;

use tracing::{debug, warn};
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget, ResizeObserver};

use common::input::Point;

struct Bound {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

struct Observed {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

// every listener the page scripts install, so they can all be removed on unload
#[derive(Default)]
pub struct Listeners {
    bound: RefCell<Vec<Bound>>,
    observed: RefCell<Vec<Observed>>,
}

impl Listeners {
    pub fn listen(&self, target: &EventTarget, event: &'static str, handler: impl FnMut(Event) + 'static) {
        self.bind(target, event, false, handler);
    }

    // for scroll and touch handlers that never prevent the default action
    pub fn listen_passive(&self, target: &EventTarget, event: &'static str, handler: impl FnMut(Event) + 'static) {
        self.bind(target, event, true, handler);
    }

    fn bind(&self, target: &EventTarget, event: &'static str, passive: bool, handler: impl FnMut(Event) + 'static) {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);

        let options = AddEventListenerOptions::new();
        options.set_passive(passive);

        if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        ) {
            warn!(event, "failed to add listener: {err:?}");
            return;
        }

        self.bound.borrow_mut().push(Bound {
            target: target.clone(),
            event,
            callback,
        });
    }

    pub fn observe_resize(&self, target: &Element, mut handler: impl FnMut() + 'static) {
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| handler());

        let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(err) => {
                warn!("resize observer unavailable: {err:?}");
                return;
            }
        };

        observer.observe(target);
        self.observed.borrow_mut().push(Observed {
            observer,
            _callback: callback,
        });
    }

    pub fn clear(&self) {
        let bound: Vec<Bound> = self.bound.borrow_mut().drain(..).collect();
        let observed: Vec<Observed> = self.observed.borrow_mut().drain(..).collect();
        debug!(listeners = bound.len(), observers = observed.len(), "removing listeners");

        for Bound { target, event, callback } in bound {
            if let Err(err) = target.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
                warn!(event, "failed to remove listener: {err:?}");
            }
        }

        for Observed { observer, .. } in observed {
            observer.disconnect();
        }
    }
}

// the element an event was dispatched on, if it is one
pub fn target_element(event: &Event) -> Option<Element> {
    event.target().and_then(|target| target.dyn_into::<Element>().ok())
}

pub fn key_name(event: &Event) -> Option<String> {
    event.dyn_ref::<web_sys::KeyboardEvent>().map(|event| event.key())
}

// first changed touch of a touchstart/touchmove/touchend event
pub fn touch_point(event: &Event) -> Option<Point> {
    let touch = event.dyn_ref::<web_sys::TouchEvent>()?.changed_touches().get(0)?;
    Some(Point::new(f64::from(touch.client_x()), f64::from(touch.client_y())))
}
