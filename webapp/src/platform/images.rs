use std::{cell::RefCell, pin::pin, rc::Rc};

use futures::{
    channel::oneshot,
    future::{self, Either, LocalBoxFuture},
};
use gloo_timers::future::TimeoutFuture;
use tracing::warn;
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::HtmlImageElement;

use common::images::{ImageLoad, ImageLoader};

// an image element with its load handlers attached
//
// the handlers are detached before the closures are dropped, so a load that settles after
// the future was abandoned does not call into freed memory
struct PendingImage {
    image: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl Drop for PendingImage {
    fn drop(&mut self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
    }
}

pub struct WebImageLoader;

impl ImageLoader for WebImageLoader {
    fn load(&self, src: &str, timeout_ms: u32) -> LocalBoxFuture<'static, ImageLoad> {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                warn!(src, "failed to create image element: {err:?}");
                return Box::pin(future::ready(ImageLoad::Failed));
            }
        };

        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let settle = |loaded: bool| {
            let tx = tx.clone();
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(loaded);
                }
            })
        };

        let onload = settle(true);
        let onerror = settle(false);
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        image.set_src(src);

        let pending = PendingImage {
            image,
            _onload: onload,
            _onerror: onerror,
        };

        Box::pin(async move {
            let _pending = pending;
            let timeout = pin!(TimeoutFuture::new(timeout_ms));

            match future::select(rx, timeout).await {
                Either::Left((Ok(true), _)) => ImageLoad::Loaded,
                Either::Left((Ok(false), _)) | Either::Left((Err(_), _)) => ImageLoad::Failed,
                Either::Right(_) => ImageLoad::TimedOut,
            }
        })
    }
}
