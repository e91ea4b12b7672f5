//! Reactive page monitoring
//!
//! Keeps a registry of callbacks and runs every one of them on each observed
//! page mutation. `start`/`stop` are idempotent both ways; stopping detaches
//! the observer from the page entirely.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use super::dom::{MutationHandler, Page};

/// A page callback registered with the observer
pub type ObserverCallback = dyn Fn(&Page);

/// Mutation observer with a callback registry
pub struct DomObserver {
    callbacks: Rc<RefCell<Vec<Rc<ObserverCallback>>>>,
    handler: RefCell<Option<Rc<MutationHandler>>>,
    subscription: Cell<Option<u64>>,
    page: RefCell<Option<Weak<Page>>>,
}

impl DomObserver {
    pub fn new() -> Self {
        Self {
            callbacks: Rc::new(RefCell::new(Vec::new())),
            handler: RefCell::new(None),
            subscription: Cell::new(None),
            page: RefCell::new(None),
        }
    }

    /// Registers a callback invoked on every observed mutation
    pub fn add_callback(&self, callback: impl Fn(&Page) + 'static) {
        self.callbacks.borrow_mut().push(Rc::new(callback));
    }

    /// Begins monitoring the page. A no-op while already started.
    pub fn start(&self, page: &Rc<Page>) {
        if self.handler.borrow().is_some() {
            return;
        }

        let callbacks = Rc::clone(&self.callbacks);
        let handler: Rc<MutationHandler> = Rc::new(move |page: &Page| {
            let snapshot: Vec<Rc<ObserverCallback>> = callbacks.borrow().iter().cloned().collect();
            for callback in snapshot {
                callback(page);
            }
        });

        let id = page.subscribe(Rc::downgrade(&handler));
        *self.handler.borrow_mut() = Some(handler);
        self.subscription.set(Some(id));
        *self.page.borrow_mut() = Some(Rc::downgrade(page));
        debug!("page observation started");
    }

    /// Ends monitoring and detaches from the page. A no-op while stopped.
    pub fn stop(&self) {
        if self.handler.borrow_mut().take().is_none() {
            return;
        }
        let page = self.page.borrow_mut().take().and_then(|weak| weak.upgrade());
        if let (Some(id), Some(page)) = (self.subscription.take(), page) {
            page.unsubscribe(id);
        }
        debug!("page observation stopped");
    }

    /// Whether the observer is currently monitoring a page
    pub fn is_active(&self) -> bool {
        self.handler.borrow().is_some()
    }
}

impl Default for DomObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed_page() -> (Rc<Page>, DomObserver, Rc<Cell<usize>>) {
        let page = Page::new("/dashboards/1");
        let observer = DomObserver::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        observer.add_callback(move |_page| seen.set(seen.get() + 1));
        (page, observer, count)
    }

    fn mutate(page: &Page) {
        let div = page.create_element("div");
        page.append_child(page.root(), div);
    }

    #[test]
    fn callbacks_run_on_every_mutation() {
        let (page, observer, count) = observed_page();
        observer.start(&page);

        mutate(&page);
        mutate(&page);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn start_is_idempotent() {
        let (page, observer, count) = observed_page();
        observer.start(&page);
        observer.start(&page);

        mutate(&page);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn stop_detaches_and_is_idempotent() {
        let (page, observer, count) = observed_page();
        observer.start(&page);
        mutate(&page);

        observer.stop();
        observer.stop();
        assert!(!observer.is_active());

        mutate(&page);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn can_restart_after_stop() {
        let (page, observer, count) = observed_page();
        observer.start(&page);
        observer.stop();
        observer.start(&page);

        mutate(&page);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn multiple_callbacks_all_fire() {
        let page = Page::new("/");
        let observer = DomObserver::new();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let seen = Rc::clone(&first);
        observer.add_callback(move |_| seen.set(seen.get() + 1));
        let seen = Rc::clone(&second);
        observer.add_callback(move |_| seen.set(seen.get() + 1));

        observer.start(&page);
        mutate(&page);

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
    }
}
