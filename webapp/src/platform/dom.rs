use anyhow::Context;
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, HtmlElement, NodeList, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Window,
};

use common::dom::{Dom, Layout, Rect, Viewport};

// log and drop a failed dom call; the controllers treat every write as best effort
fn report(op: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        warn!(op, "dom call failed: {err:?}");
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    pub fn new() -> anyhow::Result<Self> {
        let window = web_sys::window().context("no window")?;
        let document = window.document().context("no document")?;

        Ok(WebDom { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query(&self, selector: &str) -> Option<Element> {
        match self.document.query_selector(selector) {
            Ok(node) => node,
            Err(err) => {
                warn!(selector, "bad selector: {err:?}");
                None
            }
        }
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        match self.document.query_selector_all(selector) {
            Ok(list) => elements(list),
            Err(err) => {
                warn!(selector, "bad selector: {err:?}");
                Vec::new()
            }
        }
    }

    fn query_within(&self, root: &Element, selector: &str) -> Vec<Element> {
        match root.query_selector_all(selector) {
            Ok(list) => elements(list),
            Err(err) => {
                warn!(selector, "bad selector: {err:?}");
                Vec::new()
            }
        }
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn set_class(&self, node: &Element, class: &str, on: bool) {
        let result = node.class_list().toggle_with_force(class, on).map(|_| ());
        report("classList.toggle", result);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        let Some(node) = node.dyn_ref::<HtmlElement>() else {
            return;
        };

        let style = node.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        report("style", result);
    }

    fn style(&self, node: &Element, property: &str) -> String {
        node.dyn_ref::<HtmlElement>()
            .and_then(|node| node.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn computed_style(&self, node: &Element, property: &str) -> Option<String> {
        let style = self.window.get_computed_style(node).ok().flatten()?;
        style.get_property_value(property).ok()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        report("setAttribute", node.set_attribute(name, value));
    }

    fn set_disabled(&self, node: &Element, disabled: bool) {
        let result = node.toggle_attribute_with_force("disabled", disabled).map(|_| ());
        report("toggleAttribute", result);
    }

    fn is_disabled(&self, node: &Element) -> bool {
        node.has_attribute("disabled")
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        match self.document.create_element(tag) {
            Ok(node) => Some(node),
            Err(err) => {
                warn!(tag, "failed to create element: {err:?}");
                None
            }
        }
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        report("appendChild", parent.append_child(child).map(|_| ()));
    }

    fn clear_children(&self, parent: &Element) {
        parent.set_inner_html("");
    }

    fn focus(&self, node: &Element) {
        if let Some(node) = node.dyn_ref::<HtmlElement>() {
            report("focus", node.focus());
        }
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &web_sys::Node = node;
        ancestor.contains(Some(node))
    }

    fn layout(&self, node: &Element) -> Layout {
        match node.dyn_ref::<HtmlElement>() {
            Some(node) => Layout {
                top: f64::from(node.offset_top()),
                height: f64::from(node.offset_height()),
            },
            None => Layout::default(),
        }
    }

    fn rect(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();
        Rect {
            top: rect.top(),
            height: rect.height(),
        }
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);

        Viewport {
            scroll_y: self.window.scroll_y().unwrap_or(0.0),
            width: dimension(self.window.inner_width()),
            height: dimension(self.window.inner_height()),
        }
    }

    fn scroll_to(&self, y: f64, smooth: bool) {
        let options = ScrollToOptions::new();
        options.set_top(y);
        options.set_behavior(if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn scroll_into_view(&self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn document_hidden(&self) -> bool {
        self.document.hidden()
    }

    fn dispatch(&self, target: Option<&Element>, event: &str, detail: Value) {
        let detail = match js_sys::JSON::parse(&detail.to_string()) {
            Ok(detail) => detail,
            Err(err) => {
                warn!(event, "failed to encode event detail: {err:?}");
                JsValue::NULL
            }
        };

        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_detail(&detail);

        let custom = match CustomEvent::new_with_event_init_dict(event, &init) {
            Ok(custom) => custom,
            Err(err) => {
                warn!(event, "failed to create event: {err:?}");
                return;
            }
        };

        let result = match target {
            Some(node) => node.dispatch_event(&custom),
            None => self.document.dispatch_event(&custom),
        };
        report("dispatchEvent", result.map(|_| ()));
    }

    fn navigate(&self, href: &str) {
        report("location.href", self.window.location().set_href(href));
    }
}
