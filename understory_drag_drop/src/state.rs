// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag state: the record of the current gesture and its pure transitions.
//!
//! [`DragState::apply`] compares a [`DragInput`] against the current state and
//! returns the next state together with a `changed` flag. Nothing is mutated
//! and nothing is dispatched here, so change detection can be tested without
//! wiring an event bus.
//!
//! ## Minimal example
//!
//! ```
//! use understory_drag_drop::state::{DragInput, DragState};
//!
//! let state = DragState::<u32, &str>::new();
//!
//! let started = state.apply(DragInput::Start { draggable: 7 });
//! assert!(started.changed);
//! assert!(started.next.drag_active);
//!
//! let hovered = started.next.apply(DragInput::Move {
//!     draggable: 7,
//!     droppable: Some("todo"),
//!     hovered: Some("card-3"),
//! });
//! assert!(hovered.changed);
//! assert_eq!(hovered.next.placeholder_payload(), (Some("card-3"), Some("todo")));
//!
//! // The same move again is free.
//! let again = hovered.next.apply(DragInput::Move {
//!     draggable: 7,
//!     droppable: Some("todo"),
//!     hovered: Some("card-3"),
//! });
//! assert!(!again.changed);
//! ```

/// An entity that can be dragged.
///
/// Draggables are compared by [`Draggable::Id`], not by their full value, so a
/// draggable whose other fields changed mid-drag is still the same draggable.
pub trait Draggable: Clone {
    /// Identity used for change detection.
    type Id: PartialEq;

    /// Returns the identity of this draggable.
    fn drag_id(&self) -> Self::Id;
}

macro_rules! impl_draggable_for_int {
    ($($t:ty),*) => {
        $(
            impl Draggable for $t {
                type Id = Self;

                fn drag_id(&self) -> Self {
                    *self
                }
            }
        )*
    };
}

impl_draggable_for_int!(u16, u32, u64, usize, i32, i64);

/// Per-axis autoscroll flags derived from the pointer position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollIntent {
    /// Horizontal autoscroll should act.
    pub should_scroll_x: bool,
    /// Horizontal direction: `true` scrolls right, `false` scrolls left.
    pub scroll_x_right: bool,
    /// Vertical autoscroll should act.
    pub should_scroll_y: bool,
    /// Vertical direction: `true` scrolls up, `false` scrolls down.
    pub scroll_y_up: bool,
}

impl ScrollIntent {
    /// Returns `true` if neither axis wants to scroll.
    pub fn is_idle(&self) -> bool {
        !self.should_scroll_x && !self.should_scroll_y
    }
}

/// Raw gesture inputs understood by [`DragState::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum DragInput<D, K> {
    /// A draggable was picked up.
    Start {
        /// The draggable being picked up.
        draggable: D,
    },
    /// The pointer moved while dragging.
    Move {
        /// The draggable reported by the producer.
        draggable: D,
        /// The droppable under the pointer, if any.
        droppable: Option<K>,
        /// The candidate insertion point inside `droppable`, if any.
        hovered: Option<K>,
    },
    /// The gesture finished.
    End,
    /// The pointer left every droppable; forget the placeholder.
    Reset,
}

/// Result of applying a [`DragInput`] to a [`DragState`].
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<D, K> {
    /// State after the input.
    pub next: DragState<D, K>,
    /// `true` if any field differs from the previous state.
    pub changed: bool,
}

/// The mutable record of the current drag gesture.
///
/// `drag_active` and `dragged` are always set and cleared together.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState<D, K> {
    /// The draggable being moved.
    pub dragged: Option<D>,
    /// Whether a gesture is in progress.
    pub drag_active: bool,
    /// The droppable currently under the pointer.
    pub active_droppable: Option<K>,
    /// The candidate insertion point inside the active droppable.
    pub placeholder: Option<K>,
    /// Autoscroll flags. Written only by the autoscroller.
    pub scroll_intent: ScrollIntent,
}

impl<D, K> Default for DragState<D, K> {
    fn default() -> Self {
        Self {
            dragged: None,
            drag_active: false,
            active_droppable: None,
            placeholder: None,
            scroll_intent: ScrollIntent::default(),
        }
    }
}

impl<D: Draggable, K: Clone + PartialEq> DragState<D, K> {
    /// Creates an idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the state that follows `input`.
    ///
    /// - `Start` activates the drag unless one is already active. A re-entrant
    ///   start never rebinds `dragged`.
    /// - `Move` compares each of `dragged`, `active_droppable` and
    ///   `placeholder` against the candidate. If any differs, all three are
    ///   written together; otherwise the state is returned unchanged. While no
    ///   drag is active the `dragged` field is left alone so that `drag_active`
    ///   and `dragged` stay paired.
    /// - `End` clears the gesture fields.
    /// - `Reset` clears `placeholder` and `active_droppable` only.
    ///
    /// `scroll_intent` is carried through untouched by every input.
    pub fn apply(&self, input: DragInput<D, K>) -> Transition<D, K> {
        match input {
            DragInput::Start { draggable } => {
                if self.drag_active {
                    return self.unchanged();
                }
                Transition {
                    next: Self {
                        dragged: Some(draggable),
                        drag_active: true,
                        ..self.clone()
                    },
                    changed: true,
                }
            }
            DragInput::Move {
                draggable,
                droppable,
                hovered,
            } => {
                let dragged_changed = self.drag_active
                    && self
                        .dragged
                        .as_ref()
                        .is_none_or(|current| current.drag_id() != draggable.drag_id());
                let droppable_changed = self.active_droppable != droppable;
                let placeholder_changed = self.placeholder != hovered;
                if !(dragged_changed || droppable_changed || placeholder_changed) {
                    return self.unchanged();
                }
                let dragged = if self.drag_active {
                    Some(draggable)
                } else {
                    self.dragged.clone()
                };
                Transition {
                    next: Self {
                        dragged,
                        drag_active: self.drag_active,
                        active_droppable: droppable,
                        placeholder: hovered,
                        scroll_intent: self.scroll_intent,
                    },
                    changed: true,
                }
            }
            DragInput::End => {
                let changed = self.drag_active
                    || self.dragged.is_some()
                    || self.active_droppable.is_some()
                    || self.placeholder.is_some();
                Transition {
                    next: Self {
                        scroll_intent: self.scroll_intent,
                        ..Self::default()
                    },
                    changed,
                }
            }
            DragInput::Reset => {
                if self.placeholder.is_none() && self.active_droppable.is_none() {
                    return self.unchanged();
                }
                Transition {
                    next: Self {
                        active_droppable: None,
                        placeholder: None,
                        ..self.clone()
                    },
                    changed: true,
                }
            }
        }
    }

    fn unchanged(&self) -> Transition<D, K> {
        Transition {
            next: self.clone(),
            changed: false,
        }
    }

    /// Returns `true` when a draggable is held over an active droppable.
    pub fn is_fully_active(&self) -> bool {
        self.drag_active && self.dragged.is_some() && self.active_droppable.is_some()
    }

    /// Payload for the placeholder channel: `(placeholder, droppable)`.
    ///
    /// Both are `None` unless [`is_fully_active`](Self::is_fully_active) holds.
    pub fn placeholder_payload(&self) -> (Option<K>, Option<K>) {
        if self.is_fully_active() {
            (self.placeholder.clone(), self.active_droppable.clone())
        } else {
            (None, None)
        }
    }

    /// Arguments for the host drop callback: `(dragged, droppable, placeholder)`.
    ///
    /// Returns `None` unless both a draggable and an active droppable are set.
    pub fn drop_payload(&self) -> Option<(&D, &K, Option<&K>)> {
        match (&self.dragged, &self.active_droppable) {
            (Some(dragged), Some(droppable)) => {
                Some((dragged, droppable, self.placeholder.as_ref()))
            }
            _ => None,
        }
    }

    /// Returns `true` if `other` differs in a field observed by drop targets.
    pub fn placeholder_differs(&self, other: &Self) -> bool {
        self.placeholder != other.placeholder || self.active_droppable != other.active_droppable
    }
}
