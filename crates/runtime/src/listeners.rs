use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// Ordered set of change listeners for single-threaded controllers.
///
/// Listeners fire in registration order. Notification iterates over a snapshot
/// taken before the first callback runs, so a listener that subscribes or
/// unsubscribes while being notified only affects the next notification.
pub struct Listeners<T> {
    inner: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Installs `callback` and returns the handle that removes exactly it.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut reg = self.inner.borrow_mut();
            let id = reg.next_id;
            reg.next_id = reg.next_id.wrapping_add(1);
            reg.entries.push((id, Rc::new(callback)));
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(reg) = weak.upgrade() {
                reg.borrow_mut().entries.retain(|(eid, _)| *eid != id);
            }
        })
    }

    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        tracing::trace!(listeners = snapshot.len(), "notifying listeners");
        for cb in snapshot {
            cb(value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.inner.borrow().entries.len())
            .finish()
    }
}

/// Disposer returned by [`Listeners::subscribe`].
///
/// Dropping it leaves the listener installed; call [`Subscription::unsubscribe`].
#[must_use = "keep the subscription to be able to remove the listener"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Listeners;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fires_in_registration_order() {
        let listeners: Listeners<u32> = Listeners::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _a = listeners.subscribe(move |v| l1.borrow_mut().push(("a", *v)));
        let l2 = Rc::clone(&log);
        let _b = listeners.subscribe(move |v| l2.borrow_mut().push(("b", *v)));

        listeners.emit(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let listeners: Listeners<()> = Listeners::new();
        let count = Rc::new(RefCell::new((0, 0)));

        let c1 = Rc::clone(&count);
        let first = listeners.subscribe(move |_| c1.borrow_mut().0 += 1);
        let c2 = Rc::clone(&count);
        let _second = listeners.subscribe(move |_| c2.borrow_mut().1 += 1);

        listeners.emit(&());
        first.unsubscribe();
        listeners.emit(&());

        assert_eq!(*count.borrow(), (1, 2));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn subscribing_during_emit_applies_next_time() {
        let listeners: Rc<Listeners<()>> = Rc::new(Listeners::new());
        let hits = Rc::new(RefCell::new(0));

        let inner_listeners = Rc::clone(&listeners);
        let inner_hits = Rc::clone(&hits);
        let _outer = listeners.subscribe(move |_| {
            let h = Rc::clone(&inner_hits);
            let _late = inner_listeners.subscribe(move |_| *h.borrow_mut() += 1);
        });

        listeners.emit(&());
        assert_eq!(*hits.borrow(), 0);
        listeners.emit(&());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn unsubscribe_after_registry_dropped_is_harmless() {
        let listeners: Listeners<u8> = Listeners::new();
        let sub = listeners.subscribe(|_| {});
        drop(listeners);
        sub.unsubscribe();
    }
}
