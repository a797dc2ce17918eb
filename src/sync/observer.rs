//! A small subscription utility: any number of listeners register against an
//! `Observers<E>` and are notified of each published event until their
//! `Subscription` handle is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// A list of listeners for events of type `E`.
pub struct Observers<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> Observers<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register `listener`. It stays registered while the returned handle lives.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe(&self, listener: impl FnMut(&E) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let listener: Listener<E> = Rc::new(RefCell::new(listener));
        registry.listeners.push((id, listener));

        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Deliver `event` to every registered listener in registration order.
    pub fn notify(&self, event: &E) {
        // Listeners may subscribe or unsubscribe while being notified, so the
        // registry borrow must not be held across the calls.
        let listeners: Vec<Listener<E>> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            if let Ok(mut listener) = listener.try_borrow_mut() {
                (*listener)(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration handle; unregisters its listener when dropped.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn notifies_until_dropped() {
        let observers = Observers::<u32>::new();
        let seen = Rc::new(Cell::new(0));

        let sink = Rc::clone(&seen);
        let sub = observers.subscribe(move |v| sink.set(sink.get() + *v));
        observers.notify(&2);
        observers.notify(&3);
        assert_eq!(seen.get(), 5);
        assert_eq!(observers.len(), 1);

        drop(sub);
        observers.notify(&10);
        assert_eq!(seen.get(), 5);
        assert!(observers.is_empty());
    }

    #[test]
    fn subscription_outliving_observers_is_harmless() {
        let observers = Observers::<()>::new();
        let sub = observers.subscribe(|_| {});
        drop(observers);
        drop(sub);
    }
}
