use std::rc::Rc;

use tracing::{Level, instrument};

use common::{
    Mounted, Teardown,
    config::SiteConfig,
    input::Key,
    mount,
    reveal::{PortfolioPreview, Reveal},
    runtime::Runtime,
    slideshow::{BasicSlideshow, Slideshow},
};

use crate::platform::{
    dom::WebDom,
    events::{Listeners, key_name, touch_point},
};

pub type SlideshowLayer = Mounted<Slideshow<WebDom>, BasicSlideshow<WebDom>>;

// everything on the landing page above and around the fold
pub struct Hero {
    pub slideshow: Rc<SlideshowLayer>,
    pub reveal: Option<Reveal<WebDom>>,
    pub preview: Option<PortfolioPreview<WebDom>>,
}

#[instrument(level=Level::DEBUG, skip_all)]
pub fn mount_hero(dom: &Rc<WebDom>, runtime: &Runtime, config: &SiteConfig, listeners: &Listeners) -> Hero {
    let slideshow = Rc::new(mount(
        "slideshow",
        || Slideshow::attach(dom.clone(), runtime, &config.slideshow),
        || BasicSlideshow::attach(dom.clone(), runtime, config.slideshow.autoplay_ms),
    ));

    match &*slideshow {
        Mounted::Enhanced(enhanced) => wire_slideshow(enhanced, dom, listeners),
        Mounted::Basic(basic) => wire_basic_slideshow(basic, listeners),
        Mounted::Absent => {}
    }

    let reveal = Reveal::attach(dom.clone(), runtime, &config.reveal);
    let preview = PortfolioPreview::attach(dom.clone(), runtime, &config.preview);

    if reveal.is_some() || preview.is_some() {
        let (reveal, preview) = (reveal.clone(), preview.clone());
        listeners.listen_passive(dom.window(), "scroll", move |_| {
            if let Some(reveal) = &reveal {
                reveal.on_scroll();
            }
            if let Some(preview) = &preview {
                preview.on_scroll();
            }
        });
    }

    if let Some(preview) = &preview {
        wire_preview(preview, listeners);
    }

    Hero {
        slideshow,
        reveal,
        preview,
    }
}

fn wire_slideshow(slideshow: &Slideshow<WebDom>, dom: &WebDom, listeners: &Listeners) {
    for (index, indicator) in slideshow.indicators().iter().enumerate() {
        let handle = slideshow.clone();
        listeners.listen(indicator, "click", move |_| handle.indicator_activated(index));

        let handle = slideshow.clone();
        listeners.listen(indicator, "keydown", move |event| {
            let key = key_name(&event).map(|name| Key::from(name.as_str()));
            if key.is_some_and(|key| key.activates()) {
                event.prevent_default();
                handle.indicator_activated(index);
            }
        });
    }

    let handle = slideshow.clone();
    listeners.listen(dom.document(), "keydown", move |event| {
        let Some(name) = key_name(&event) else {
            return;
        };
        if handle.handle_key(Key::from(name.as_str())) {
            event.prevent_default();
        }
    });

    let handle = slideshow.clone();
    listeners.listen(dom.document(), "visibilitychange", move |_| handle.visibility_changed());

    if let Some(hero) = slideshow.hero() {
        let handle = slideshow.clone();
        listeners.listen_passive(hero, "touchstart", move |event| {
            if let Some(point) = touch_point(&event) {
                handle.touch_start(point);
            }
        });

        let handle = slideshow.clone();
        listeners.listen_passive(hero, "touchend", move |event| {
            if let Some(point) = touch_point(&event) {
                handle.touch_end(point);
            }
        });

        let handle = slideshow.clone();
        listeners.listen(hero, "mouseenter", move |_| handle.pointer_entered());

        let handle = slideshow.clone();
        listeners.listen(hero, "mouseleave", move |_| handle.pointer_left());
    }

    slideshow.preload_images();
}

fn wire_basic_slideshow(basic: &BasicSlideshow<WebDom>, listeners: &Listeners) {
    for (index, indicator) in basic.indicators().iter().enumerate() {
        let handle = basic.clone();
        listeners.listen(indicator, "click", move |_| handle.select(index));
    }
}

fn wire_preview(preview: &PortfolioPreview<WebDom>, listeners: &Listeners) {
    let button = preview.button();

    for event in ["mouseenter", "focus"] {
        let handle = preview.clone();
        listeners.listen(button, event, move |_| handle.highlight());
    }

    for event in ["mouseleave", "blur"] {
        let handle = preview.clone();
        listeners.listen(button, event, move |_| handle.unhighlight());
    }
}

impl Teardown for Hero {
    fn teardown(&self) {
        self.slideshow.teardown();
        if let Some(reveal) = &self.reveal {
            reveal.teardown();
        }
        if let Some(preview) = &self.preview {
            preview.teardown();
        }
    }
}
