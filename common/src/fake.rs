// in-memory stand-ins for the browser, used by the controller tests
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    rc::Rc,
};

use futures::{
    executor::{LocalPool, LocalSpawner},
    future::{self, FutureExt, LocalBoxFuture},
    task::LocalSpawnExt,
};
use serde_json::Value;

use crate::{
    dom::{Dom, Layout, Rect, Viewport},
    images::{ImageLoad, ImageLoader},
    runtime::{Runtime, Scheduler, Spawner, TimerId},
    storage::SessionStore,
};

pub const FRAME_MS: f64 = 16.0;

// scheduler driven by a virtual clock
//
// frames land on multiples of FRAME_MS; tasks due at the same instant run in the order they
// were scheduled
enum Job {
    Once(Box<dyn FnOnce()>),
    Repeat(Box<dyn FnMut()>, f64),
    Frame(Box<dyn FnOnce(f64)>),
}

struct Task {
    id: TimerId,
    due: f64,
    seq: u64,
    job: Job,
}

#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<f64>,
    next_id: Cell<u64>,
    next_seq: Cell<u64>,
    tasks: RefCell<Vec<Task>>,
    cancelled: RefCell<HashSet<TimerId>>,
}

impl ManualScheduler {
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    fn seq(&self) -> u64 {
        let seq = self.next_seq.get() + 1;
        self.next_seq.set(seq);
        seq
    }

    fn push(&self, due: f64, job: Job) -> TimerId {
        let id = TimerId(self.next_id.get() + 1);
        self.next_id.set(id.0);

        let seq = self.seq();
        self.tasks.borrow_mut().push(Task { id, due, seq, job });
        id
    }

    pub fn advance(&self, millis: f64) {
        let target = self.now.get() + millis;

        loop {
            let task = {
                let mut tasks = self.tasks.borrow_mut();
                let next = tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
                    .map(|(i, _)| i);

                match next {
                    Some(i) => tasks.swap_remove(i),
                    None => break,
                }
            };

            self.now.set(task.due.max(self.now.get()));

            match task.job {
                Job::Once(callback) => callback(),
                Job::Frame(callback) => callback(task.due),
                Job::Repeat(mut callback, period) => {
                    callback();
                    if !self.cancelled.borrow().contains(&task.id) {
                        let seq = self.seq();
                        self.tasks.borrow_mut().push(Task {
                            id: task.id,
                            due: task.due + period,
                            seq,
                            job: Job::Repeat(callback, period),
                        });
                    }
                }
            }
        }

        self.now.set(target);
    }
}

impl Scheduler for ManualScheduler {
    fn timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        self.push(self.now.get() + millis as f64, Job::Once(callback))
    }

    fn interval(&self, millis: u32, callback: Box<dyn FnMut()>) -> TimerId {
        let period = (millis as f64).max(1.0);
        self.push(self.now.get() + period, Job::Repeat(callback, period))
    }

    fn frame(&self, callback: Box<dyn FnOnce(f64)>) -> TimerId {
        let due = ((self.now.get() / FRAME_MS).floor() + 1.0) * FRAME_MS;
        self.push(due, Job::Frame(callback))
    }

    fn cancel(&self, id: TimerId) {
        self.tasks.borrow_mut().retain(|t| t.id != id);
        self.cancelled.borrow_mut().insert(id);
    }
}

pub struct PoolSpawner {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl Default for PoolSpawner {
    fn default() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        PoolSpawner {
            pool: RefCell::new(pool),
            spawner,
        }
    }
}

impl PoolSpawner {
    pub fn run(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl Spawner for PoolSpawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        self.spawner.spawn_local(future).expect("local pool shut down");
    }
}

// resolves immediately, Loaded unless told otherwise
#[derive(Default)]
pub struct ReadyLoader {
    outcomes: RefCell<HashMap<String, ImageLoad>>,
    requested: RefCell<Vec<String>>,
}

impl ReadyLoader {
    pub fn fail(&self, src: &str) {
        self.outcomes.borrow_mut().insert(src.to_string(), ImageLoad::Failed);
    }

    pub fn time_out(&self, src: &str) {
        self.outcomes.borrow_mut().insert(src.to_string(), ImageLoad::TimedOut);
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl ImageLoader for ReadyLoader {
    fn load(&self, src: &str, _timeout_ms: u32) -> LocalBoxFuture<'static, ImageLoad> {
        self.requested.borrow_mut().push(src.to_string());
        let outcome = self
            .outcomes
            .borrow()
            .get(src)
            .copied()
            .unwrap_or(ImageLoad::Loaded);
        future::ready(outcome).boxed_local()
    }
}

// never resolves on its own
#[derive(Default)]
pub struct PendingLoader {}

impl ImageLoader for PendingLoader {
    fn load(&self, _src: &str, _timeout_ms: u32) -> LocalBoxFuture<'static, ImageLoad> {
        future::pending().boxed_local()
    }
}

#[derive(Default)]
pub struct MemorySession {
    entries: RefCell<HashMap<String, String>>,
}

impl MemorySession {
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

// a tiny document
//
// nodes are indices into an arena and node 0 is the body.  selectors support a single
// compound selector: tag, #id, .class and [attr], [attr="v"], [attr^="v"]
pub const BODY: usize = 0;

#[derive(Clone, Debug, Default)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
    computed: HashMap<String, String>,
    parent: Option<usize>,
    layout: Layout,
    disabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum AttrOp {
    Present,
    Exact,
    Prefix,
}

#[derive(Debug, Default)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, AttrOp, String)>,
}

fn is_boundary(c: char) -> bool {
    matches!(c, '.' | '#' | '[')
}

fn parse_selector(selector: &str) -> Selector {
    let mut parsed = Selector::default();
    let mut rest = selector.trim();

    let end = rest.find(is_boundary).unwrap_or(rest.len());
    if end > 0 {
        parsed.tag = Some(rest[..end].to_string());
    }
    rest = &rest[end..];

    while let Some(first) = rest.chars().next() {
        if first == '[' {
            let body = &rest[1..];
            let close = body.find(']').unwrap_or(body.len());
            let inner = &body[..close];

            let (name, op, value) = if let Some((name, value)) = inner.split_once("^=") {
                (name, AttrOp::Prefix, value)
            } else if let Some((name, value)) = inner.split_once('=') {
                (name, AttrOp::Exact, value)
            } else {
                (inner, AttrOp::Present, "")
            };

            parsed.attributes.push((
                name.trim().to_string(),
                op,
                value.trim().trim_matches('"').to_string(),
            ));
            rest = body.get(close + 1..).unwrap_or("");
        } else {
            let body = &rest[1..];
            let end = body.find(is_boundary).unwrap_or(body.len());
            let name = body[..end].to_string();

            if first == '.' {
                parsed.classes.push(name);
            } else {
                parsed.id = Some(name);
            }
            rest = &body[end..];
        }
    }

    parsed
}

fn matches(element: &Element, selector: &Selector) -> bool {
    if let Some(tag) = &selector.tag {
        if &element.tag != tag {
            return false;
        }
    }

    if let Some(id) = &selector.id {
        if element.id.as_ref() != Some(id) {
            return false;
        }
    }

    if !selector.classes.iter().all(|c| element.classes.contains(c)) {
        return false;
    }

    selector.attributes.iter().all(|(name, op, value)| {
        match (element.attributes.get(name), op) {
            (None, _) => false,
            (Some(_), AttrOp::Present) => true,
            (Some(v), AttrOp::Exact) => v == value,
            (Some(v), AttrOp::Prefix) => v.starts_with(value.as_str()),
        }
    })
}

pub struct MemoryDom {
    elements: RefCell<Vec<Element>>,
    viewport: Cell<Viewport>,
    hidden: Cell<bool>,
    focused: Cell<Option<usize>>,
    events: RefCell<Vec<(Option<usize>, String, Value)>>,
    navigations: RefCell<Vec<String>>,
    scrolls: RefCell<Vec<(f64, bool)>>,
    scrolled_into_view: RefCell<Vec<usize>>,
    class_writes: RefCell<HashMap<usize, usize>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        MemoryDom {
            elements: RefCell::new(vec![Element {
                tag: String::from("body"),
                ..Element::default()
            }]),
            viewport: Cell::new(Viewport {
                scroll_y: 0.0,
                width: 1280.0,
                height: 800.0,
            }),
            hidden: Cell::new(false),
            focused: Cell::new(None),
            events: RefCell::new(Vec::new()),
            navigations: RefCell::new(Vec::new()),
            scrolls: RefCell::new(Vec::new()),
            scrolled_into_view: RefCell::new(Vec::new()),
            class_writes: RefCell::new(HashMap::new()),
        }
    }
}

impl MemoryDom {
    // "div#id.first.second"
    pub fn add(&self, selector: &str) -> usize {
        self.add_to(BODY, selector)
    }

    pub fn add_to(&self, parent: usize, selector: &str) -> usize {
        let parsed = parse_selector(selector);
        let mut elements = self.elements.borrow_mut();

        elements.push(Element {
            tag: parsed.tag.unwrap_or_else(|| String::from("div")),
            id: parsed.id,
            classes: parsed.classes,
            attributes: parsed
                .attributes
                .into_iter()
                .map(|(name, _, value)| (name, value))
                .collect(),
            parent: Some(parent),
            ..Element::default()
        });
        elements.len() - 1
    }

    pub fn set_layout(&self, node: usize, top: f64, height: f64) {
        self.elements.borrow_mut()[node].layout = Layout { top, height };
    }

    pub fn set_computed(&self, node: usize, property: &str, value: &str) {
        self.elements.borrow_mut()[node]
            .computed
            .insert(property.to_string(), value.to_string());
    }

    pub fn scroll(&self, y: f64) {
        let mut viewport = self.viewport.get();
        viewport.scroll_y = y;
        self.viewport.set(viewport);
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut viewport = self.viewport.get();
        viewport.width = width;
        viewport.height = height;
        self.viewport.set(viewport);
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    pub fn children(&self, parent: usize) -> Vec<usize> {
        self.elements
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.parent == Some(parent))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn events(&self) -> Vec<(Option<usize>, String, Value)> {
        self.events.borrow().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    pub fn scrolls(&self) -> Vec<(f64, bool)> {
        self.scrolls.borrow().clone()
    }

    pub fn scrolled_into_view(&self) -> Vec<usize> {
        self.scrolled_into_view.borrow().clone()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused.get()
    }

    pub fn class_writes(&self, node: usize) -> usize {
        self.class_writes.borrow().get(&node).copied().unwrap_or(0)
    }

    fn attached_under(&self, node: usize, root: usize) -> bool {
        let elements = self.elements.borrow();
        let mut current = Some(node);

        while let Some(i) = current {
            if i == root {
                return true;
            }
            current = elements[i].parent;
        }
        false
    }

    fn select(&self, root: usize, selector: &str, include_root: bool) -> Vec<usize> {
        let parsed = parse_selector(selector);
        let candidates: Vec<usize> = self
            .elements
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, e)| matches(e, &parsed))
            .map(|(i, _)| i)
            .collect();

        candidates
            .into_iter()
            .filter(|&i| (include_root || i != root) && self.attached_under(i, root))
            .collect()
    }
}

impl Dom for MemoryDom {
    type Node = usize;

    fn by_id(&self, id: &str) -> Option<usize> {
        self.select(BODY, &format!("#{id}"), true).into_iter().next()
    }

    fn query(&self, selector: &str) -> Option<usize> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<usize> {
        self.select(BODY, selector, true)
    }

    fn query_within(&self, root: &usize, selector: &str) -> Vec<usize> {
        self.select(*root, selector, false)
    }

    fn body(&self) -> Option<usize> {
        Some(BODY)
    }

    fn set_class(&self, node: &usize, class: &str, on: bool) {
        *self.class_writes.borrow_mut().entry(*node).or_insert(0) += 1;

        let mut elements = self.elements.borrow_mut();
        let classes = &mut elements[*node].classes;
        let present = classes.iter().any(|c| c == class);

        if on && !present {
            classes.push(class.to_string());
        } else if !on && present {
            classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: &usize, class: &str) -> bool {
        self.elements.borrow()[*node].classes.iter().any(|c| c == class)
    }

    fn set_style(&self, node: &usize, property: &str, value: &str) {
        let mut elements = self.elements.borrow_mut();
        let styles = &mut elements[*node].styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn style(&self, node: &usize, property: &str) -> String {
        self.elements.borrow()[*node]
            .styles
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn computed_style(&self, node: &usize, property: &str) -> Option<String> {
        self.elements.borrow()[*node].computed.get(property).cloned()
    }

    fn attribute(&self, node: &usize, name: &str) -> Option<String> {
        self.elements.borrow()[*node].attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: &usize, name: &str, value: &str) {
        self.elements.borrow_mut()[*node]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn set_disabled(&self, node: &usize, disabled: bool) {
        self.elements.borrow_mut()[*node].disabled = disabled;
    }

    fn is_disabled(&self, node: &usize) -> bool {
        self.elements.borrow()[*node].disabled
    }

    fn create_element(&self, tag: &str) -> Option<usize> {
        let mut elements = self.elements.borrow_mut();
        elements.push(Element {
            tag: tag.to_string(),
            ..Element::default()
        });
        Some(elements.len() - 1)
    }

    fn append_child(&self, parent: &usize, child: &usize) {
        self.elements.borrow_mut()[*child].parent = Some(*parent);
    }

    fn clear_children(&self, parent: &usize) {
        for element in self.elements.borrow_mut().iter_mut() {
            if element.parent == Some(*parent) {
                element.parent = None;
            }
        }
    }

    fn focus(&self, node: &usize) {
        self.focused.set(Some(*node));
    }

    fn contains(&self, ancestor: &usize, node: &usize) -> bool {
        self.attached_under(*node, *ancestor)
    }

    fn layout(&self, node: &usize) -> Layout {
        self.elements.borrow()[*node].layout
    }

    fn rect(&self, node: &usize) -> Rect {
        let layout = self.layout(node);
        Rect {
            top: layout.top - self.viewport.get().scroll_y,
            height: layout.height,
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn scroll_to(&self, y: f64, smooth: bool) {
        self.scroll(y);
        self.scrolls.borrow_mut().push((y, smooth));
    }

    fn scroll_into_view(&self, node: &usize) {
        self.scrolled_into_view.borrow_mut().push(*node);
    }

    fn document_hidden(&self) -> bool {
        self.hidden.get()
    }

    fn dispatch(&self, target: Option<&usize>, event: &str, detail: Value) {
        self.events
            .borrow_mut()
            .push((target.copied(), event.to_string(), detail));
    }

    fn navigate(&self, href: &str) {
        self.navigations.borrow_mut().push(href.to_string());
    }
}

pub struct Harness {
    pub dom: Rc<MemoryDom>,
    pub clock: Rc<ManualScheduler>,
    pub pool: Rc<PoolSpawner>,
    pub images: Rc<ReadyLoader>,
    pub session: Rc<MemorySession>,
    pub runtime: Runtime,
}

impl Harness {
    pub fn new() -> Self {
        let dom = Rc::new(MemoryDom::default());
        let clock = Rc::new(ManualScheduler::default());
        let pool = Rc::new(PoolSpawner::default());
        let images = Rc::new(ReadyLoader::default());
        let session = Rc::new(MemorySession::default());

        let runtime = Runtime {
            scheduler: clock.clone(),
            spawner: pool.clone(),
            images: images.clone(),
            session: session.clone(),
        };

        Harness {
            dom,
            clock,
            pool,
            images,
            session,
            runtime,
        }
    }

    pub fn advance(&self, millis: f64) {
        self.pool.run();
        self.clock.advance(millis);
        self.pool.run();
    }

    pub fn frame(&self) {
        self.advance(FRAME_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_cover_what_the_controllers_use() {
        let dom = MemoryDom::default();
        let nav = dom.add("nav#navbar");
        let link = dom.add_to(nav, r##"a.nav-link[href="#about"]"##);
        let cross = dom.add(r#"a[href="index.html#contact"]"#);

        assert_eq!(dom.by_id("navbar"), Some(nav));
        assert_eq!(dom.query(r##".nav-link[href="#about"]"##), Some(link));
        assert_eq!(dom.query_all(r#"a[href^="index.html#"]"#), vec![cross]);
        assert_eq!(dom.query_within(&nav, ".nav-link"), vec![link]);
        assert!(dom.contains(&nav, &link));
        assert!(!dom.contains(&link, &nav));
    }

    #[test]
    fn frames_and_timeouts_interleave_by_due_time() {
        let clock = ManualScheduler::default();
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = order.clone();
        clock.timeout(20, Box::new(move || log.borrow_mut().push("timeout")));
        let log = order.clone();
        clock.frame(Box::new(move |ts| {
            assert_eq!(ts, FRAME_MS);
            log.borrow_mut().push("frame");
        }));

        clock.advance(40.0);
        assert_eq!(*order.borrow(), vec!["frame", "timeout"]);
        assert_eq!(clock.pending(), 0);
    }
}
