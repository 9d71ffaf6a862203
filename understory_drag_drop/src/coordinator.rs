// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag coordinator: turns raw gesture messages into drag state,
//! placeholder notifications, drop callbacks and autoscroll.
//!
//! ## Lifecycle
//!
//! 1) [`DragCoordinator::new`] validates the configuration and creates an idle
//!    state. Host callbacks are attached with the `with_*` builders.
//! 2) [`DragCoordinator::init`] subscribes to the group's `start`, `move`,
//!    `end` and `reset` channels.
//! 3) Every committed state change goes through the state-change observer,
//!    which publishes on the `placeholder` channel when the placeholder or the
//!    active droppable changed.
//! 4) [`DragCoordinator::dispose`] (or dropping the coordinator) releases the
//!    subscriptions and cancels a pending autoscroll tick. Messages published
//!    afterwards have no handler to reach.
//!
//! Host callbacks, bus handlers and the geometry query are never called while
//! the coordinator holds an internal borrow, so they may publish on the bus
//! (for example a drop target answering a placeholder with a reset).
//!
//! Calling the gesture handlers before the container exists is a caller
//! error: the geometry query is expected to return the container's current
//! bounding box on every move.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::mem;

use kurbo::{Point, Rect};

use crate::Error;
use crate::autoscroll::{AutoScroller, ScrollArea, TickOutcome};
use crate::bus::{EventBus, Subscription};
use crate::config::DragDropConfig;
use crate::frame::FrameScheduler;
use crate::group::{Channel, DragGroup, DragMessage};
use crate::state::{DragInput, DragState, Draggable};

/// Read-only query for the bounding box of the coordinator's root region.
///
/// Queried on every move, never cached, so layout changes during a drag are
/// picked up immediately. Any `Fn() -> Rect` implements it.
pub trait ContainerGeometry {
    /// Current bounding box of the container.
    fn bounding_box(&self) -> Rect;
}

impl<F: Fn() -> Rect> ContainerGeometry for F {
    fn bounding_box(&self) -> Rect {
        self()
    }
}

type StartCallback<D> = Rc<dyn Fn(&D, Point)>;
type EndCallback<D, K> = Rc<dyn Fn(&D, &K, Option<&K>)>;
type StateObserver<D, K> = Rc<dyn Fn(&DragState<D, K>, &DragState<D, K>)>;

struct Inner<D, K> {
    config: DragDropConfig,
    bus: EventBus<DragMessage<D, K>>,
    geometry: Rc<dyn ContainerGeometry>,
    frames: Rc<dyn FrameScheduler>,
    on_drag_start: Option<StartCallback<D>>,
    on_drag_end: Option<EndCallback<D, K>>,
    observer: Option<StateObserver<D, K>>,
    state: DragState<D, K>,
    scroller: AutoScroller,
    disposed: bool,
}

impl<D, K> Inner<D, K> {
    fn output(&self, channel: Channel) -> (EventBus<DragMessage<D, K>>, String) {
        (
            self.bus.clone(),
            String::from(self.config.group.channel(channel)),
        )
    }
}

struct Shared<D, K>(Rc<RefCell<Inner<D, K>>>);

impl<D, K> Shared<D, K>
where
    D: Draggable + 'static,
    K: Clone + PartialEq + 'static,
{
    fn route(&self, channel: Channel, message: &DragMessage<D, K>) {
        match (channel, message) {
            (Channel::Start, DragMessage::Start { draggable, pos }) => {
                self.start(draggable.clone(), *pos);
            }
            (
                Channel::Move,
                DragMessage::Move {
                    draggable,
                    droppable,
                    hovered,
                    pos,
                },
            ) => self.move_to(draggable.clone(), droppable.clone(), hovered.clone(), *pos),
            (Channel::End, DragMessage::End) => self.end(),
            (Channel::Reset, DragMessage::Reset) => self.reset(),
            (channel, message) => log::warn!(
                "ignoring {:?} message published on the {:?} channel",
                message.channel(),
                channel
            ),
        }
    }

    fn start(&self, draggable: D, pos: Point) {
        let (transition, callback) = {
            let inner = self.0.borrow();
            let transition = inner.state.apply(DragInput::Start {
                draggable: draggable.clone(),
            });
            (transition, inner.on_drag_start.clone())
        };
        if transition.changed {
            log::debug!("drag started at ({}, {})", pos.x, pos.y);
            self.commit(transition.next);
        } else {
            log::debug!("start while already dragging; keeping the current draggable");
        }
        if let Some(callback) = callback {
            callback(&draggable, pos);
        }
    }

    fn move_to(&self, draggable: D, droppable: Option<K>, hovered: Option<K>, pos: Point) {
        let transition = self.0.borrow().state.apply(DragInput::Move {
            draggable,
            droppable,
            hovered,
        });
        if transition.changed {
            log::trace!("move changed drag target");
            self.commit(transition.next);
        }
        self.autoscroll(pos);
    }

    fn end(&self) {
        let (dropped, callback) = {
            let inner = self.0.borrow();
            let dropped = inner
                .state
                .drop_payload()
                .map(|(dragged, droppable, placeholder)| {
                    (dragged.clone(), droppable.clone(), placeholder.cloned())
                });
            (dropped, inner.on_drag_end.clone())
        };
        if let (Some((dragged, droppable, placeholder)), Some(callback)) = (&dropped, callback) {
            callback(dragged, droppable, placeholder.as_ref());
        }

        let transition = self.0.borrow().state.apply(DragInput::End);
        if transition.changed {
            log::debug!("drag ended (dropped on a target: {})", dropped.is_some());
            self.commit(transition.next);
        }
    }

    fn reset(&self) {
        let transition = self.0.borrow().state.apply(DragInput::Reset);
        if transition.changed {
            log::debug!("placeholder reset");
            self.commit(transition.next);
        }
    }

    fn commit(&self, next: DragState<D, K>) {
        let prev = mem::replace(&mut self.0.borrow_mut().state, next.clone());
        self.on_state_change(&prev, &next);
    }

    /// Observer for every committed change.
    fn on_state_change(&self, prev: &DragState<D, K>, next: &DragState<D, K>) {
        let (observer, (bus, channel)) = {
            let inner = self.0.borrow();
            (inner.observer.clone(), inner.output(Channel::Placeholder))
        };
        if let Some(observer) = observer {
            observer(prev, next);
        }
        if prev.placeholder_differs(next) {
            let (placeholder, droppable) = next.placeholder_payload();
            bus.dispatch(
                &channel,
                &DragMessage::Placeholder {
                    placeholder,
                    droppable,
                },
            );
        }
    }

    fn autoscroll(&self, pointer: Point) {
        let geometry = self.0.borrow().geometry.clone();
        let bounds = geometry.bounding_box();
        let needs_tick = {
            let mut guard = self.0.borrow_mut();
            let inner = &mut *guard;
            inner.scroller.update_intent(&mut inner.state, bounds, pointer);
            !inner.disposed && !inner.scroller.is_pending()
        };
        if needs_tick {
            self.request_tick();
        }
    }

    fn request_tick(&self) {
        let frames = self.0.borrow().frames.clone();
        let weak = Rc::downgrade(&self.0);
        let handle = frames.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Shared(inner).tick();
            }
        }));
        self.0.borrow_mut().scroller.set_pending(handle);
    }

    fn tick(&self) {
        let outcome = {
            let mut guard = self.0.borrow_mut();
            let inner = &mut *guard;
            if inner.disposed {
                inner.scroller.take_pending();
                return;
            }
            inner.scroller.tick(&inner.state)
        };
        match outcome {
            TickOutcome::Stop => log::debug!("autoscroll loop finished"),
            TickOutcome::Continue => self.reschedule(),
            TickOutcome::Scroll { droppable, delta } => {
                let (bus, channel) = self.0.borrow().output(Channel::Scroll);
                log::trace!("autoscroll y by {delta}");
                bus.dispatch(&channel, &DragMessage::Scroll { droppable, delta });
                self.reschedule();
            }
        }
    }

    fn reschedule(&self) {
        let disposed = self.0.borrow().disposed;
        if disposed {
            self.0.borrow_mut().scroller.take_pending();
        } else {
            self.request_tick();
        }
    }
}

/// Coordinates one drag group: tracks the gesture, notifies drop targets and
/// drives autoscroll.
///
/// `D` is the draggable type, `K` the id type of droppables and placeholders.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use kurbo::{Point, Rect};
/// use understory_drag_drop::bus::EventBus;
/// use understory_drag_drop::config::DragDropConfig;
/// use understory_drag_drop::coordinator::DragCoordinator;
/// use understory_drag_drop::frame::ManualFrames;
/// use understory_drag_drop::group::{DragGroup, DragMessage};
///
/// let group = DragGroup::new("board").unwrap();
/// let bus = EventBus::<DragMessage<u32, &str>>::new();
/// let frames = Rc::new(ManualFrames::new());
/// let drops = Rc::new(RefCell::new(Vec::new()));
///
/// let sink = drops.clone();
/// let mut coordinator = DragCoordinator::new(
///     DragDropConfig::new(group.clone()),
///     bus.clone(),
///     || Rect::new(0.0, 0.0, 800.0, 600.0),
///     frames.clone(),
/// )
/// .unwrap()
/// .with_drag_end_callback(move |card, column, _slot| {
///     sink.borrow_mut().push((*card, *column));
/// });
/// coordinator.init();
///
/// group.emit_start(&bus, 7, Point::new(400.0, 300.0));
/// group.emit_move(&bus, 7, Some("done"), None, Point::new(410.0, 300.0));
/// group.emit_end(&bus);
///
/// assert_eq!(*drops.borrow(), [(7, "done")]);
/// assert!(!coordinator.is_dragging());
/// ```
pub struct DragCoordinator<D, K>
where
    D: Draggable + 'static,
    K: Clone + PartialEq + 'static,
{
    shared: Shared<D, K>,
    subscriptions: Vec<Subscription<DragMessage<D, K>>>,
}

impl<D, K> DragCoordinator<D, K>
where
    D: Draggable + 'static,
    K: Clone + PartialEq + 'static,
{
    /// Creates an idle coordinator.
    ///
    /// Fails if `config` does not validate. Nothing is subscribed until
    /// [`init`](Self::init).
    pub fn new(
        config: DragDropConfig,
        bus: EventBus<DragMessage<D, K>>,
        geometry: impl ContainerGeometry + 'static,
        frames: Rc<dyn FrameScheduler>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let area = config.horizontal_scroll.then(ScrollArea::default);
        let scroller = AutoScroller::new(config.autoscroll, area);
        let inner = Inner {
            config,
            bus,
            geometry: Rc::new(geometry),
            frames,
            on_drag_start: None,
            on_drag_end: None,
            observer: None,
            state: DragState::default(),
            scroller,
            disposed: false,
        };
        Ok(Self {
            shared: Shared(Rc::new(RefCell::new(inner))),
            subscriptions: Vec::new(),
        })
    }

    /// Calls `callback` on every start message, including starts received
    /// while a drag is already active.
    #[must_use]
    pub fn with_drag_start_callback(self, callback: impl Fn(&D, Point) + 'static) -> Self {
        self.shared.0.borrow_mut().on_drag_start = Some(Rc::new(callback));
        self
    }

    /// Calls `callback` with `(dragged, droppable, placeholder)` when a drag
    /// ends over a droppable.
    #[must_use]
    pub fn with_drag_end_callback(
        self,
        callback: impl Fn(&D, &K, Option<&K>) + 'static,
    ) -> Self {
        self.shared.0.borrow_mut().on_drag_end = Some(Rc::new(callback));
        self
    }

    /// Calls `observer` with `(prev, next)` after every committed change.
    #[must_use]
    pub fn with_state_observer(
        self,
        observer: impl Fn(&DragState<D, K>, &DragState<D, K>) + 'static,
    ) -> Self {
        self.shared.0.borrow_mut().observer = Some(Rc::new(observer));
        self
    }

    /// Subscribes to the group's input channels.
    ///
    /// Calling it again while initialized does nothing. After
    /// [`dispose`](Self::dispose) it subscribes afresh.
    pub fn init(&mut self) {
        if self.is_initialized() {
            return;
        }
        let (bus, group) = {
            let mut inner = self.shared.0.borrow_mut();
            inner.disposed = false;
            (inner.bus.clone(), inner.config.group.clone())
        };
        for channel in [Channel::Start, Channel::Move, Channel::End, Channel::Reset] {
            let weak = Rc::downgrade(&self.shared.0);
            let sub = bus.subscribe(group.channel(channel), move |message| {
                if let Some(inner) = weak.upgrade() {
                    Shared(inner).route(channel, message);
                }
            });
            self.subscriptions.push(sub);
        }
        log::debug!("drag coordinator for {:?} initialized", group.name());
    }

    /// Releases the subscriptions and cancels a pending autoscroll tick.
    ///
    /// Disposing from inside a handler on one of the input channels also
    /// keeps the message being dispatched from reaching this coordinator.
    pub fn dispose(&mut self) {
        if self.subscriptions.is_empty() && self.shared.0.borrow().disposed {
            return;
        }
        self.subscriptions.clear();
        let (frames, pending) = {
            let mut inner = self.shared.0.borrow_mut();
            inner.disposed = true;
            (inner.frames.clone(), inner.scroller.take_pending())
        };
        if let Some(handle) = pending {
            frames.cancel_frame(handle);
        }
        log::debug!("drag coordinator disposed");
    }

    /// Returns `true` between [`init`](Self::init) and [`dispose`](Self::dispose).
    pub fn is_initialized(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Handles a start gesture.
    pub fn on_start(&self, draggable: D, pos: Point) {
        self.shared.start(draggable, pos);
    }

    /// Handles a move gesture.
    pub fn on_move(&self, draggable: D, droppable: Option<K>, hovered: Option<K>, pos: Point) {
        self.shared.move_to(draggable, droppable, hovered, pos);
    }

    /// Handles the end of a gesture.
    pub fn on_end(&self) {
        self.shared.end();
    }

    /// Clears the placeholder and active droppable, keeping the drag.
    pub fn on_reset(&self) {
        self.shared.reset();
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> DragState<D, K> {
        self.shared.0.borrow().state.clone()
    }

    /// Returns `true` while a drag is active.
    pub fn is_dragging(&self) -> bool {
        self.shared.0.borrow().state.drag_active
    }

    /// Returns `true` while an autoscroll tick is scheduled.
    pub fn tick_pending(&self) -> bool {
        self.shared.0.borrow().scroller.is_pending()
    }

    /// The drag group this coordinator listens on.
    pub fn group(&self) -> DragGroup {
        self.shared.0.borrow().config.group.clone()
    }

    /// A handle to the bus this coordinator listens on.
    pub fn bus(&self) -> EventBus<DragMessage<D, K>> {
        self.shared.0.borrow().bus.clone()
    }

    /// Offset of the owned horizontal area, if one is owned.
    pub fn scroll_offset(&self) -> Option<f64> {
        self.shared.0.borrow().scroller.area().map(ScrollArea::offset)
    }

    /// Sets the offset of the owned horizontal area, for example after the
    /// user scrolled it by hand. The offset is clamped to the scroll width
    /// and NaN resets it to zero. Returns `false` if no area is owned.
    pub fn set_scroll_offset(&self, offset: f64) -> bool {
        match self.shared.0.borrow_mut().scroller.area_mut() {
            Some(area) => {
                area.set_offset(offset);
                true
            }
            None => false,
        }
    }

    /// Sets the scroll width of the owned horizontal area. Returns `false` if
    /// no area is owned.
    pub fn set_scroll_width(&self, scroll_width: f64) -> bool {
        match self.shared.0.borrow_mut().scroller.area_mut() {
            Some(area) => {
                area.set_scroll_width(scroll_width);
                true
            }
            None => false,
        }
    }
}

impl<D, K> Drop for DragCoordinator<D, K>
where
    D: Draggable + 'static,
    K: Clone + PartialEq + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<D, K> fmt::Debug for DragCoordinator<D, K>
where
    D: Draggable + 'static,
    K: Clone + PartialEq + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.0.borrow();
        f.debug_struct("DragCoordinator")
            .field("group", &inner.config.group.name())
            .field("initialized", &!self.subscriptions.is_empty())
            .field("drag_active", &inner.state.drag_active)
            .field("tick_pending", &inner.scroller.is_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoscroll::AutoScrollConfig;
    use crate::frame::ManualFrames;
    use alloc::vec;
    use core::cell::Cell;

    type Msg = DragMessage<u32, u32>;
    type Coordinator = DragCoordinator<u32, u32>;

    fn coordinator(frames: &Rc<ManualFrames>) -> Coordinator {
        let group = DragGroup::new("test").unwrap();
        DragCoordinator::new(
            DragDropConfig::new(group),
            EventBus::new(),
            || Rect::new(0.0, 0.0, 800.0, 300.0),
            frames.clone(),
        )
        .unwrap()
    }

    fn record(
        coordinator: &Coordinator,
        channel: Channel,
    ) -> (Rc<RefCell<Vec<Msg>>>, Subscription<Msg>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let sub = coordinator
            .bus()
            .subscribe(coordinator.group().channel(channel), move |m: &Msg| {
                sink.borrow_mut().push(m.clone());
            });
        (seen, sub)
    }

    const MIDDLE: Point = Point::new(400.0, 150.0);

    #[test]
    fn new_rejects_invalid_autoscroll() {
        let frames: Rc<dyn FrameScheduler> = Rc::new(ManualFrames::new());
        let config = DragDropConfig::new(DragGroup::new("g").unwrap()).with_autoscroll(
            AutoScrollConfig {
                horizontal_step: -10.0,
                ..AutoScrollConfig::default()
            },
        );
        let result = DragCoordinator::<u32, u32>::new(
            config,
            EventBus::new(),
            || Rect::ZERO,
            frames,
        );
        assert!(result.is_err());
    }

    #[test]
    fn start_forwards_to_callback_even_when_active() {
        let frames = Rc::new(ManualFrames::new());
        let starts = Rc::new(Cell::new(0));
        let count = starts.clone();
        let c = coordinator(&frames)
            .with_drag_start_callback(move |_, _| count.set(count.get() + 1));

        c.on_start(1, MIDDLE);
        c.on_start(2, MIDDLE);

        assert_eq!(starts.get(), 2);
        assert_eq!(c.state().dragged, Some(1));
    }

    #[test]
    fn identical_moves_dispatch_once() {
        let frames = Rc::new(ManualFrames::new());
        let c = coordinator(&frames);
        let (seen, _sub) = record(&c, Channel::Placeholder);

        c.on_start(1, MIDDLE);
        c.on_move(1, Some(10), Some(100), MIDDLE);
        let after_first = c.state();
        c.on_move(1, Some(10), Some(100), MIDDLE);

        assert_eq!(c.state(), after_first);
        assert_eq!(
            *seen.borrow(),
            vec![Msg::Placeholder {
                placeholder: Some(100),
                droppable: Some(10)
            }]
        );
    }

    #[test]
    fn observer_sees_each_committed_change() {
        let frames = Rc::new(ManualFrames::new());
        let changes = Rc::new(Cell::new(0));
        let count = changes.clone();
        let c = coordinator(&frames).with_state_observer(move |prev, next| {
            assert_ne!(prev, next);
            count.set(count.get() + 1);
        });

        c.on_start(1, MIDDLE);
        c.on_move(1, Some(10), None, MIDDLE);
        c.on_move(1, Some(10), None, MIDDLE);
        c.on_reset();
        c.on_reset();
        c.on_end();

        assert_eq!(changes.get(), 4);
    }

    #[test]
    fn move_always_updates_intent_and_schedules_one_tick() {
        let frames = Rc::new(ManualFrames::new());
        let c = coordinator(&frames);

        c.on_start(1, MIDDLE);
        c.on_move(1, Some(10), None, Point::new(400.0, 5.0));
        c.on_move(1, Some(10), None, Point::new(400.0, 6.0));

        assert!(c.state().scroll_intent.should_scroll_y);
        assert!(c.tick_pending());
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn dispose_cancels_pending_tick() {
        let frames = Rc::new(ManualFrames::new());
        let mut c = coordinator(&frames);
        c.init();
        c.on_start(1, MIDDLE);
        c.on_move(1, Some(10), None, Point::new(400.0, 5.0));
        assert_eq!(frames.pending(), 1);

        c.dispose();
        assert!(!c.is_initialized());
        assert!(!c.tick_pending());
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn scroll_area_accessors_require_horizontal_scroll() {
        let frames = Rc::new(ManualFrames::new());
        let c = coordinator(&frames);
        assert_eq!(c.scroll_offset(), None);
        assert!(!c.set_scroll_width(100.0));
        assert!(!c.set_scroll_offset(10.0));
    }
}
