pub mod dom;
pub mod events;
pub mod images;
pub mod storage;
pub mod timers;

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use common::runtime::{Runtime, Spawner};

use dom::WebDom;
use images::WebImageLoader;
use storage::PageSession;
use timers::WebScheduler;

pub struct PageSpawner;

impl Spawner for PageSpawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}

pub fn runtime(dom: &WebDom) -> Runtime {
    Runtime {
        scheduler: Rc::new(WebScheduler::new(dom.window().clone())),
        spawner: Rc::new(PageSpawner),
        images: Rc::new(WebImageLoader),
        session: Rc::new(PageSession),
    }
}
