// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag groups: channel namespaces and the messages that travel on them.
//!
//! A [`DragGroup`] names six channels on an [`EventBus`]: four inputs
//! (`start`, `move`, `end`, `reset`) published by draggables, and two outputs
//! (`placeholder`, `scroll`) published by the coordinator for droppables.
//! Independent groups on one bus never see each other's traffic.
//!
//! ```
//! use kurbo::Point;
//! use understory_drag_drop::bus::EventBus;
//! use understory_drag_drop::group::{Channel, DragGroup, DragMessage};
//!
//! let board = DragGroup::new("board").unwrap();
//! assert_eq!(board.channel(Channel::Move), "board:move");
//!
//! let bus = EventBus::<DragMessage<u32, u32>>::new();
//! // Nobody listens yet, so nothing is delivered.
//! assert_eq!(board.emit_start(&bus, 1, Point::new(4.0, 8.0)), 0);
//! ```

use alloc::format;
use alloc::string::String;

use kurbo::Point;

use crate::Error;
use crate::bus::EventBus;

/// The six channels of a drag group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Input: a draggable was picked up.
    Start,
    /// Input: the pointer moved during a drag.
    Move,
    /// Input: the drag finished.
    End,
    /// Input: the pointer left every droppable.
    Reset,
    /// Output: the active placeholder changed.
    Placeholder,
    /// Output: a droppable should scroll its content.
    Scroll,
}

impl Channel {
    /// All channels, inputs first.
    pub const ALL: [Self; 6] = [
        Self::Start,
        Self::Move,
        Self::End,
        Self::Reset,
        Self::Placeholder,
        Self::Scroll,
    ];

    /// Short name used as the channel suffix.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move => "move",
            Self::End => "end",
            Self::Reset => "reset",
            Self::Placeholder => "placeholder",
            Self::Scroll => "scroll",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Messages carried on drag group channels.
///
/// `D` is the draggable type and `K` the id type shared by droppables and
/// placeholders.
#[derive(Clone, Debug, PartialEq)]
pub enum DragMessage<D, K> {
    /// Published on [`Channel::Start`].
    Start {
        /// The draggable being picked up.
        draggable: D,
        /// Pointer position.
        pos: Point,
    },
    /// Published on [`Channel::Move`].
    Move {
        /// The draggable being moved.
        draggable: D,
        /// Droppable under the pointer.
        droppable: Option<K>,
        /// Insertion point under the pointer.
        hovered: Option<K>,
        /// Pointer position.
        pos: Point,
    },
    /// Published on [`Channel::End`].
    End,
    /// Published on [`Channel::Reset`].
    Reset,
    /// Published on [`Channel::Placeholder`]. Both fields are `None` when no
    /// droppable is active.
    Placeholder {
        /// The placeholder to render.
        placeholder: Option<K>,
        /// The droppable that should render it.
        droppable: Option<K>,
    },
    /// Published on [`Channel::Scroll`]. Positive deltas scroll up.
    Scroll {
        /// The droppable owning the scrollable region.
        droppable: K,
        /// Requested scroll delta.
        delta: f64,
    },
}

impl<D, K> DragMessage<D, K> {
    /// The channel this message belongs on.
    pub fn channel(&self) -> Channel {
        match self {
            Self::Start { .. } => Channel::Start,
            Self::Move { .. } => Channel::Move,
            Self::End => Channel::End,
            Self::Reset => Channel::Reset,
            Self::Placeholder { .. } => Channel::Placeholder,
            Self::Scroll { .. } => Channel::Scroll,
        }
    }
}

/// A named drag context.
///
/// Channel names are resolved once, at construction, as `"{name}:{channel}"`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct DragGroup {
    name: String,
    channels: [String; 6],
}

impl DragGroup {
    /// Creates a group named `name`.
    ///
    /// Names must be non-empty and must not contain `:`.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyGroupName);
        }
        if name.contains(':') {
            return Err(Error::InvalidGroupName(name));
        }
        let channels = Channel::ALL.map(|c| format!("{name}:{}", c.as_str()));
        Ok(Self { name, channels })
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full bus channel name for `channel`.
    pub fn channel(&self, channel: Channel) -> &str {
        &self.channels[channel.index()]
    }

    /// Publishes `message` on the channel it belongs to.
    ///
    /// Returns the number of handlers that received it.
    pub fn publish<D, K>(
        &self,
        bus: &EventBus<DragMessage<D, K>>,
        message: &DragMessage<D, K>,
    ) -> usize
    where
        D: 'static,
        K: 'static,
    {
        bus.dispatch(self.channel(message.channel()), message)
    }

    /// Publishes a [`DragMessage::Start`].
    pub fn emit_start<D: 'static, K: 'static>(
        &self,
        bus: &EventBus<DragMessage<D, K>>,
        draggable: D,
        pos: Point,
    ) -> usize {
        self.publish(bus, &DragMessage::Start { draggable, pos })
    }

    /// Publishes a [`DragMessage::Move`].
    pub fn emit_move<D: 'static, K: 'static>(
        &self,
        bus: &EventBus<DragMessage<D, K>>,
        draggable: D,
        droppable: Option<K>,
        hovered: Option<K>,
        pos: Point,
    ) -> usize {
        self.publish(
            bus,
            &DragMessage::Move {
                draggable,
                droppable,
                hovered,
                pos,
            },
        )
    }

    /// Publishes a [`DragMessage::End`].
    pub fn emit_end<D: 'static, K: 'static>(&self, bus: &EventBus<DragMessage<D, K>>) -> usize {
        self.publish(bus, &DragMessage::End)
    }

    /// Publishes a [`DragMessage::Reset`].
    pub fn emit_reset<D: 'static, K: 'static>(&self, bus: &EventBus<DragMessage<D, K>>) -> usize {
        self.publish(bus, &DragMessage::Reset)
    }
}

impl TryFrom<String> for DragGroup {
    type Error = Error;

    fn try_from(name: String) -> Result<Self, Error> {
        Self::new(name)
    }
}

impl From<DragGroup> for String {
    fn from(group: DragGroup) -> Self {
        group.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    type Msg = DragMessage<u32, u32>;

    #[test]
    fn channel_names_are_namespaced() {
        let group = DragGroup::new("kanban").unwrap();
        assert_eq!(group.name(), "kanban");
        assert_eq!(group.channel(Channel::Start), "kanban:start");
        assert_eq!(group.channel(Channel::Reset), "kanban:reset");
        assert_eq!(group.channel(Channel::Placeholder), "kanban:placeholder");
        assert_eq!(group.channel(Channel::Scroll), "kanban:scroll");
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(DragGroup::new(""), Err(Error::EmptyGroupName));
        assert_eq!(
            DragGroup::new("a:b"),
            Err(Error::InvalidGroupName("a:b".into()))
        );
    }

    #[test]
    fn messages_know_their_channel() {
        assert_eq!(Msg::End.channel(), Channel::End);
        assert_eq!(
            Msg::Scroll {
                droppable: 1,
                delta: 15.0
            }
            .channel(),
            Channel::Scroll
        );
    }

    #[test]
    fn groups_do_not_cross_talk() {
        let bus = EventBus::<Msg>::new();
        let left = DragGroup::new("left").unwrap();
        let right = DragGroup::new("right").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        let _sub = bus.subscribe(left.channel(Channel::End), move |m: &Msg| {
            sink.borrow_mut().push(m.clone());
        });

        assert_eq!(right.emit_end(&bus), 0);
        assert_eq!(left.emit_end(&bus), 1);
        assert_eq!(*seen.borrow(), [Msg::End]);
    }

    #[test]
    fn emit_move_publishes_on_move_channel() {
        let bus = EventBus::<Msg>::new();
        let group = DragGroup::new("g").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        let _sub = bus.subscribe(group.channel(Channel::Move), move |m: &Msg| {
            sink.borrow_mut().push(m.clone());
        });

        group.emit_move(&bus, 3, Some(1), None, Point::new(1.0, 2.0));
        assert_eq!(
            *seen.borrow(),
            [Msg::Move {
                draggable: 3,
                droppable: Some(1),
                hovered: None,
                pos: Point::new(1.0, 2.0),
            }]
        );
    }
}
