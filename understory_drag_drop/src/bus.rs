// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event bus: synchronous, single-threaded publish/subscribe on named channels.
//!
//! ## Usage
//!
//! 1) Create an [`EventBus`] and share it by cloning (clones are handles to the
//!    same registry).
//! 2) [`EventBus::subscribe`] returns a [`Subscription`]. Keep it alive for as
//!    long as the handler should run; dropping it unsubscribes.
//! 3) [`EventBus::dispatch`] calls every handler registered on a channel, in
//!    subscription order, before returning.
//!
//! Handlers run with no internal borrow held, so a handler may dispatch,
//! subscribe or unsubscribe on the same bus. A handler removed during a
//! dispatch is skipped for the rest of it; one added during a dispatch first
//! runs on the next one.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_drag_drop::bus::EventBus;
//!
//! let bus = EventBus::<i32>::new();
//! let total = Rc::new(Cell::new(0));
//!
//! let sum = total.clone();
//! let sub = bus.subscribe("numbers", move |n| sum.set(sum.get() + n));
//!
//! assert_eq!(bus.dispatch("numbers", &2), 1);
//! assert_eq!(bus.dispatch("letters", &5), 0);
//! assert_eq!(total.get(), 2);
//!
//! drop(sub);
//! assert_eq!(bus.dispatch("numbers", &3), 0);
//! assert_eq!(total.get(), 2);
//! ```

use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;

type Handler<M> = Rc<dyn Fn(&M)>;

/// Identifies one registration on an [`EventBus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Registry<M> {
    next_id: u64,
    channels: HashMap<String, Vec<(SubscriptionId, Handler<M>)>>,
}

impl<M> Registry<M> {
    fn remove(&mut self, channel: &str, id: SubscriptionId) -> bool {
        let Some(handlers) = self.channels.get_mut(channel) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            self.channels.remove(channel);
        }
        removed
    }

    fn contains(&self, channel: &str, id: SubscriptionId) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|handlers| handlers.iter().any(|(sid, _)| *sid == id))
    }
}

/// A synchronous, local fan-out bus keyed by channel name.
///
/// The bus is `!Send`; all handlers run on the dispatching thread.
pub struct EventBus<M> {
    registry: Rc<RefCell<Registry<M>>>,
}

impl<M> Clone for EventBus<M> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<M> Default for EventBus<M> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                channels: HashMap::new(),
            })),
        }
    }
}

impl<M> fmt::Debug for EventBus<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventBus")
            .field("channels", &registry.channels.len())
            .field("next_id", &registry.next_id)
            .finish()
    }
}

impl<M: 'static> EventBus<M> {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` on `channel`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// dropped or released.
    #[must_use = "dropping the subscription unsubscribes the handler"]
    pub fn subscribe(&self, channel: &str, handler: impl Fn(&M) + 'static) -> Subscription<M> {
        let mut registry = self.registry.borrow_mut();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry
            .channels
            .entry(String::from(channel))
            .or_default()
            .push((id, Rc::new(handler)));
        Subscription {
            registry: Rc::downgrade(&self.registry),
            channel: String::from(channel),
            id,
        }
    }

    /// Removes the registration `id` from `channel`.
    ///
    /// Returns `false` if it was not registered there.
    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) -> bool {
        self.registry.borrow_mut().remove(channel, id)
    }

    /// Calls every handler registered on `channel` with `message`.
    ///
    /// Returns the number of handlers called.
    pub fn dispatch(&self, channel: &str, message: &M) -> usize {
        let handlers: Vec<(SubscriptionId, Handler<M>)> =
            match self.registry.borrow().channels.get(channel) {
                Some(handlers) => handlers.clone(),
                None => return 0,
            };
        log::trace!("dispatch on {channel:?} to {} handler(s)", handlers.len());
        let mut called = 0;
        for (id, handler) in &handlers {
            if !self.registry.borrow().contains(channel, *id) {
                continue;
            }
            handler(message);
            called += 1;
        }
        called
    }

    /// Number of handlers currently registered on `channel`.
    pub fn handler_count(&self, channel: &str) -> usize {
        self.registry
            .borrow()
            .channels
            .get(channel)
            .map_or(0, Vec::len)
    }
}

/// An owned registration on an [`EventBus`].
///
/// Dropping it unsubscribes the handler. It does not keep the bus alive.
pub struct Subscription<M> {
    registry: Weak<RefCell<Registry<M>>>,
    channel: String,
    id: SubscriptionId,
}

impl<M> Subscription<M> {
    /// The registration id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The channel this handler listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Unsubscribes now. Equivalent to dropping the subscription.
    pub fn release(self) {}
}

impl<M> Drop for Subscription<M> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(&self.channel, self.id);
        }
    }
}

impl<M> fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;

    #[test]
    fn dispatch_reaches_handlers_in_subscription_order() {
        let bus = EventBus::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = seen.clone();
        let _s1 = bus.subscribe("c", move |m| a.borrow_mut().push(("first", *m)));
        let b = seen.clone();
        let _s2 = bus.subscribe("c", move |m| b.borrow_mut().push(("second", *m)));

        assert_eq!(bus.dispatch("c", &7), 2);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = EventBus::<u32>::new();
        let sub = bus.subscribe("c", |_| {});
        assert_eq!(bus.handler_count("c"), 1);
        drop(sub);
        assert_eq!(bus.handler_count("c"), 0);
    }

    #[test]
    fn explicit_unsubscribe_by_id() {
        let bus = EventBus::<u32>::new();
        let sub = bus.subscribe("c", |_| {});
        assert!(bus.unsubscribe("c", sub.id()));
        assert!(!bus.unsubscribe("c", sub.id()));
        assert!(!bus.unsubscribe("other", sub.id()));
        // Dropping after an explicit unsubscribe is harmless.
        sub.release();
        assert_eq!(bus.handler_count("c"), 0);
    }

    #[test]
    fn handlers_may_dispatch_reentrantly() {
        let bus = EventBus::<u32>::new();
        let echoed = Rc::new(Cell::new(0));

        let inner_bus = bus.clone();
        let _ping = bus.subscribe("ping", move |m| {
            inner_bus.dispatch("pong", &(m + 1));
        });
        let sink = echoed.clone();
        let _pong = bus.subscribe("pong", move |m| sink.set(*m));

        bus.dispatch("ping", &41);
        assert_eq!(echoed.get(), 42);
    }

    #[test]
    fn handler_removed_mid_dispatch_is_skipped() {
        let bus = EventBus::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let victim: Rc<RefCell<Option<Subscription<u32>>>> = Rc::new(RefCell::new(None));

        let slot = victim.clone();
        let _first = bus.subscribe("c", move |_| {
            slot.borrow_mut().take();
        });
        let sink = seen.clone();
        *victim.borrow_mut() = Some(bus.subscribe("c", move |m| sink.borrow_mut().push(*m)));

        assert_eq!(bus.dispatch("c", &1), 1);
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.handler_count("c"), 1);
    }

    #[test]
    fn subscription_outliving_bus_is_inert() {
        let bus = EventBus::<u32>::new();
        let sub = bus.subscribe("c", |_| {});
        drop(bus);
        assert_eq!(sub.channel(), "c");
        drop(sub);
    }
}
