use serde_json::Value;

// layout metrics relative to the document, i.e. offsetTop/offsetHeight
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Layout {
    pub top: f64,
    pub height: f64,
}

impl Layout {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

// bounding rect relative to the viewport
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

// the slice of the document the controllers are allowed to touch
//
// the browser implementation lives in the webapp crate; tests use an in-memory document.
// nothing here can fail from the caller's point of view -- a missing element is an
// Option, and a failed write is logged by the implementation and otherwise ignored
pub trait Dom {
    type Node: Clone + PartialEq + 'static;

    fn by_id(&self, id: &str) -> Option<Self::Node>;
    fn query(&self, selector: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    fn query_within(&self, root: &Self::Node, selector: &str) -> Vec<Self::Node>;
    fn body(&self) -> Option<Self::Node>;

    fn set_class(&self, node: &Self::Node, class: &str, on: bool);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    // an empty value removes the inline property
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn style(&self, node: &Self::Node, property: &str) -> String;
    fn computed_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn set_disabled(&self, node: &Self::Node, disabled: bool);
    fn is_disabled(&self, node: &Self::Node) -> bool;

    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn clear_children(&self, parent: &Self::Node);

    fn focus(&self, node: &Self::Node);
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    fn layout(&self, node: &Self::Node) -> Layout;
    fn rect(&self, node: &Self::Node) -> Rect;
    fn viewport(&self) -> Viewport;

    fn scroll_to(&self, y: f64, smooth: bool);
    fn scroll_into_view(&self, node: &Self::Node);

    fn document_hidden(&self) -> bool;

    // custom event with a json detail, dispatched on the node or on the document
    fn dispatch(&self, target: Option<&Self::Node>, event: &str, detail: Value);

    fn navigate(&self, href: &str);
}
