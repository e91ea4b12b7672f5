//! Host-page model
//!
//! A lightweight element tree standing in for the host application's page:
//! enough structure (tags, ids, classes, text, attributes, child order) for
//! the injection policy to select insertion points, plus mutation
//! observation. Only child-list changes are observable, and notifications
//! are delivered after the outermost mutation completes, so observer
//! callbacks never see a half-applied change and may safely mutate the page
//! themselves.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::trace;

/// Handle to an element of a [`Page`]. Only valid for the page that created
/// it.
pub type NodeId = usize;

/// A mutation-observation handler
pub type MutationHandler = dyn Fn(&Page);

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    dom_id: Option<String>,
    classes: Vec<String>,
    text: Option<String>,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Copy)]
enum Position {
    First,
    Last,
    Before(NodeId),
}

/// The currently displayed page
pub struct Page {
    location: RefCell<String>,
    nodes: RefCell<Vec<Element>>,
    root: NodeId,
    subscribers: RefCell<Vec<(u64, Weak<MutationHandler>)>>,
    next_subscriber: Cell<u64>,
    dispatching: Cell<bool>,
    pending: Cell<usize>,
}

impl Page {
    /// Creates a page with an empty body element at the given address
    pub fn new(location: impl Into<String>) -> Rc<Self> {
        let body = Element {
            tag: "body".to_string(),
            ..Element::default()
        };
        Rc::new(Self {
            location: RefCell::new(location.into()),
            nodes: RefCell::new(vec![body]),
            root: 0,
            subscribers: RefCell::new(Vec::new()),
            next_subscriber: Cell::new(0),
            dispatching: Cell::new(false),
            pending: Cell::new(0),
        })
    }

    /// The page's current address
    pub fn location(&self) -> String {
        self.location.borrow().clone()
    }

    /// Navigation: changes the address without touching the tree
    pub fn set_location(&self, location: impl Into<String>) {
        *self.location.borrow_mut() = location.into();
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a detached element
    pub fn create_element(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Element {
            tag: tag.to_string(),
            ..Element::default()
        });
        nodes.len() - 1
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> String {
        self.nodes.borrow()[node].tag.clone()
    }

    pub fn dom_id(&self, node: NodeId) -> Option<String> {
        self.nodes.borrow()[node].dom_id.clone()
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes.borrow()[node].classes.clone()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes.borrow()[node]
            .classes
            .iter()
            .any(|c| c == class)
    }

    pub fn text(&self, node: NodeId) -> Option<String> {
        self.nodes.borrow()[node].text.clone()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node].attributes.get(name).cloned()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node].parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node].children.clone()
    }

    /// Position of `node` among its parent's children
    pub fn child_index(&self, node: NodeId) -> Option<usize> {
        let nodes = self.nodes.borrow();
        let parent = nodes[node].parent?;
        nodes[parent].children.iter().position(|&c| c == node)
    }

    /// Whether the node is reachable from the page root
    pub fn is_attached(&self, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Attached elements below the root, in document order
    pub fn descendants(&self) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if node != self.root {
                out.push(node);
            }
            for &child in nodes[node].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// First attached element with the given id, in document order
    pub fn element_by_dom_id(&self, dom_id: &str) -> Option<NodeId> {
        self.descendants()
            .into_iter()
            .find(|&n| self.nodes.borrow()[n].dom_id.as_deref() == Some(dom_id))
    }

    /// Concatenated text of the node and its subtree, in document order
    pub fn text_content(&self, node: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(text) = &nodes[current].text {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
            for &child in nodes[current].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Non-observed mutations (attribute/character data)
    // ------------------------------------------------------------------

    pub fn set_dom_id(&self, node: NodeId, dom_id: &str) {
        self.nodes.borrow_mut()[node].dom_id = Some(dom_id.to_string());
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let classes = &mut nodes[node].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    pub fn set_classes(&self, node: NodeId, classes: &[&str]) {
        self.nodes.borrow_mut()[node].classes = classes.iter().map(|c| c.to_string()).collect();
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        self.nodes.borrow_mut()[node].text = Some(text.to_string());
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[node]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        self.nodes.borrow_mut()[node].attributes.remove(name);
    }

    // ------------------------------------------------------------------
    // Observed (child-list) mutations
    // ------------------------------------------------------------------

    /// Appends `child` as the last child of `parent`
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.attach(parent, child, Position::Last)
    }

    /// Inserts `child` as the first child of `parent`
    pub fn prepend_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.attach(parent, child, Position::First)
    }

    /// Inserts `node` immediately before `reference` under the same parent
    pub fn insert_before(&self, reference: NodeId, node: NodeId) -> bool {
        match self.parent(reference) {
            Some(parent) => self.attach(parent, node, Position::Before(reference)),
            None => false,
        }
    }

    /// Detaches a node (and its subtree) from the page
    pub fn remove(&self, node: NodeId) -> bool {
        if node == self.root {
            return false;
        }
        let was_attached = self.is_attached(node);
        {
            let mut nodes = self.nodes.borrow_mut();
            let Some(parent) = nodes[node].parent else {
                return false;
            };
            nodes[parent].children.retain(|&c| c != node);
            nodes[node].parent = None;
        }
        if was_attached {
            self.notify();
        }
        true
    }

    fn attach(&self, parent: NodeId, child: NodeId, position: Position) -> bool {
        if parent == child || self.is_ancestor(child, parent) {
            trace!("refusing to attach a node under itself");
            return false;
        }
        {
            let mut nodes = self.nodes.borrow_mut();
            if let Position::Before(reference) = position {
                if reference == child {
                    return false;
                }
            }
            if let Some(old_parent) = nodes[child].parent {
                nodes[old_parent].children.retain(|&c| c != child);
            }
            let index = match position {
                Position::First => 0,
                Position::Last => nodes[parent].children.len(),
                Position::Before(reference) => {
                    match nodes[parent].children.iter().position(|&c| c == reference) {
                        Some(index) => index,
                        None => return false,
                    }
                }
            };
            nodes[child].parent = Some(parent);
            nodes[parent].children.insert(index, child);
        }
        if self.is_attached(parent) {
            self.notify();
        }
        true
    }

    /// Whether `ancestor` is on `node`'s parent chain
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = nodes[node].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = nodes[parent].parent;
        }
        false
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub(crate) fn subscribe(&self, handler: Weak<MutationHandler>) -> u64 {
        let id = self.next_subscriber.get();
        self.next_subscriber.set(id + 1);
        self.subscribers.borrow_mut().push((id, handler));
        id
    }

    pub(crate) fn unsubscribe(&self, id: u64) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    /// Delivers queued mutation notifications.
    ///
    /// Re-entrant mutations performed by handlers queue further rounds that
    /// are drained by the outermost call. Each round coalesces all mutations
    /// queued since the previous one.
    fn notify(&self) {
        self.pending.set(self.pending.get() + 1);
        if self.dispatching.get() {
            return;
        }

        self.dispatching.set(true);
        while self.pending.get() > 0 {
            self.pending.set(0);
            let handlers: Vec<Rc<MutationHandler>> = self
                .subscribers
                .borrow()
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect();
            for handler in handlers {
                handler(self);
            }
            self.subscribers
                .borrow_mut()
                .retain(|(_, weak)| weak.strong_count() > 0);
        }
        self.dispatching.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_page() -> (Rc<Page>, Rc<Cell<usize>>, Rc<MutationHandler>) {
        let page = Page::new("/dashboards/1");
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let handler: Rc<MutationHandler> = Rc::new(move |_page: &Page| {
            seen.set(seen.get() + 1);
        });
        page.subscribe(Rc::downgrade(&handler));
        (page, count, handler)
    }

    #[test]
    fn append_and_query_by_id() {
        let page = Page::new("/");
        let div = page.create_element("div");
        page.set_dom_id(div, "controls");
        page.append_child(page.root(), div);

        assert_eq!(page.element_by_dom_id("controls"), Some(div));
        assert!(page.is_attached(div));
    }

    #[test]
    fn detached_elements_are_not_found() {
        let page = Page::new("/");
        let div = page.create_element("div");
        page.set_dom_id(div, "floating");

        assert_eq!(page.element_by_dom_id("floating"), None);
        assert!(!page.is_attached(div));
    }

    #[test]
    fn child_ordering_operations() {
        let page = Page::new("/");
        let parent = page.create_element("div");
        page.append_child(page.root(), parent);

        let a = page.create_element("a");
        let b = page.create_element("b");
        let c = page.create_element("c");
        page.append_child(parent, b);
        page.prepend_child(parent, a);
        assert!(page.insert_before(b, c));

        let order: Vec<String> = page
            .children(parent)
            .into_iter()
            .map(|n| page.tag(n))
            .collect();
        assert_eq!(order, ["a", "c", "b"]);
        assert_eq!(page.child_index(c), Some(1));
    }

    #[test]
    fn attached_mutations_notify_subscribers() {
        let (page, count, _handler) = counting_page();

        let div = page.create_element("div");
        assert_eq!(count.get(), 0); // creation alone is not a mutation

        page.append_child(page.root(), div);
        assert_eq!(count.get(), 1);

        page.remove(div);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn detached_subtree_assembly_is_silent() {
        let (page, count, _handler) = counting_page();

        let button = page.create_element("button");
        let icon = page.create_element("i");
        page.append_child(button, icon);
        assert_eq!(count.get(), 0);

        page.append_child(page.root(), button);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn attribute_and_text_changes_are_not_observed() {
        let (page, count, _handler) = counting_page();
        let div = page.create_element("div");
        page.append_child(page.root(), div);

        page.set_text(div, "hello");
        page.set_attribute(div, "disabled", "true");
        page.add_class(div, "x");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn handlers_may_mutate_the_page_reentrantly() {
        let page = Page::new("/");
        let rounds = Rc::new(Cell::new(0));

        let seen = Rc::clone(&rounds);
        let handler: Rc<MutationHandler> = Rc::new(move |page: &Page| {
            seen.set(seen.get() + 1);
            // inject once; the guard keeps the loop finite
            if page.element_by_dom_id("injected").is_none() {
                let div = page.create_element("div");
                page.set_dom_id(div, "injected");
                page.append_child(page.root(), div);
            }
        });
        page.subscribe(Rc::downgrade(&handler));

        let trigger = page.create_element("span");
        page.append_child(page.root(), trigger);

        assert!(page.element_by_dom_id("injected").is_some());
        // initial mutation + the handler's own insertion
        assert_eq!(rounds.get(), 2);
    }

    #[test]
    fn unsubscribed_and_dropped_handlers_stop_firing() {
        let (page, count, handler) = counting_page();
        let div = page.create_element("div");
        page.append_child(page.root(), div);
        assert_eq!(count.get(), 1);

        drop(handler);
        let other = page.create_element("p");
        page.append_child(page.root(), other);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn cycles_are_refused() {
        let page = Page::new("/");
        let outer = page.create_element("div");
        let inner = page.create_element("div");
        page.append_child(page.root(), outer);
        page.append_child(outer, inner);

        assert!(!page.append_child(inner, outer));
        assert!(!page.append_child(outer, outer));
    }

    #[test]
    fn text_content_walks_the_subtree() {
        let page = Page::new("/");
        let button = page.create_element("button");
        let span = page.create_element("span");
        page.set_text(span, "Refresh");
        page.append_child(button, span);
        page.append_child(page.root(), button);

        assert_eq!(page.text_content(button), "Refresh");
    }
}
