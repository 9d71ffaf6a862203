// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge-triggered autoscroll while dragging.
//!
//! ## Intent
//!
//! On every move, [`scroll_intent`] compares the pointer against the edges of
//! the container's bounding box. The trigger distance is
//! `max(height * threshold_ratio, min_threshold)` and is shared by both axes.
//!
//! - Horizontal: `width - x < threshold` scrolls right, `x < threshold` scrolls left.
//! - Vertical, only while a droppable is active: `height - y <= threshold`
//!   scrolls down, `y - top <= threshold` scrolls up.
//!
//! ## Ticks
//!
//! [`AutoScroller::tick`] runs once per frame while a tick is pending. It
//! steps the owned horizontal [`ScrollArea`] when there is horizontal intent,
//! otherwise it asks the active droppable to scroll vertically. The loop ends
//! on its own when the drag ends, the droppable goes away, the intent clears,
//! or the horizontal area reaches an edge.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_drag_drop::autoscroll::{AutoScrollConfig, scroll_intent};
//!
//! let config = AutoScrollConfig::default();
//! let bounds = Rect::new(0.0, 0.0, 800.0, 300.0);
//! assert_eq!(config.threshold(bounds.height()), 30.0);
//!
//! let intent = scroll_intent(&config, bounds, Point::new(771.0, 150.0), false);
//! assert!(intent.should_scroll_x && intent.scroll_x_right);
//! assert!(!intent.should_scroll_y);
//! ```

use kurbo::{Point, Rect};

use crate::Error;
use crate::frame::FrameHandle;
use crate::state::{DragState, Draggable, ScrollIntent};

/// Tuning for edge autoscroll.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoScrollConfig {
    /// Fraction of the container height used as the edge trigger distance.
    pub threshold_ratio: f64,
    /// Lower bound for the edge trigger distance.
    pub min_threshold: f64,
    /// Horizontal step per tick, applied to the owned [`ScrollArea`].
    pub horizontal_step: f64,
    /// Magnitude of the vertical delta emitted per tick.
    pub vertical_step: f64,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.1,
            min_threshold: 25.0,
            horizontal_step: 10.0,
            vertical_step: 15.0,
        }
    }
}

impl AutoScrollConfig {
    /// Edge trigger distance for a container of the given height.
    pub fn threshold(&self, height: f64) -> f64 {
        (height * self.threshold_ratio).max(self.min_threshold)
    }

    /// Checks that every field is finite and non-negative.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [
            ("threshold_ratio", self.threshold_ratio),
            ("min_threshold", self.min_threshold),
            ("horizontal_step", self.horizontal_step),
            ("vertical_step", self.vertical_step),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidAutoScroll { field, value });
            }
        }
        Ok(())
    }
}

/// Derives per-axis scroll intent from the pointer position.
///
/// `bounds` is the live bounding box of the drag container. Vertical intent is
/// only produced while `droppable_active` is set.
pub fn scroll_intent(
    config: &AutoScrollConfig,
    bounds: Rect,
    pointer: Point,
    droppable_active: bool,
) -> ScrollIntent {
    let width = bounds.width();
    let height = bounds.height();
    let threshold = config.threshold(height);
    let mut intent = ScrollIntent::default();

    if width - pointer.x < threshold {
        intent.should_scroll_x = true;
        intent.scroll_x_right = true;
    } else if pointer.x < threshold {
        intent.should_scroll_x = true;
        intent.scroll_x_right = false;
    }

    if droppable_active {
        if height - pointer.y <= threshold {
            intent.should_scroll_y = true;
            intent.scroll_y_up = false;
        } else if pointer.y - bounds.y0 <= threshold {
            intent.should_scroll_y = true;
            intent.scroll_y_up = true;
        }
    }

    intent
}

/// A horizontally scrollable region owned by the coordinator.
///
/// `scroll_width` is the largest offset the region may reach; hosts update it
/// when their content width changes. Non-finite widths and NaN offsets are
/// read as zero, so both stay finite and the stepping loop always reaches an
/// edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollArea {
    offset: f64,
    scroll_width: f64,
}

impl ScrollArea {
    /// Creates an area scrolled to the start.
    pub fn new(scroll_width: f64) -> Self {
        Self {
            offset: 0.0,
            scroll_width: finite_width(scroll_width),
        }
    }

    /// Current scroll offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Largest reachable offset.
    pub fn scroll_width(&self) -> f64 {
        self.scroll_width
    }

    /// Sets the scroll width, pulling the offset back inside it.
    pub fn set_scroll_width(&mut self, scroll_width: f64) {
        self.scroll_width = finite_width(scroll_width);
        self.offset = self.offset.min(self.scroll_width);
    }

    /// Sets the offset, clamped to `0..=scroll_width`. NaN resets it to zero.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = if offset.is_nan() {
            0.0
        } else {
            offset.clamp(0.0, self.scroll_width)
        };
    }

    /// Steps right by `step`. Returns `false`, without moving, once
    /// `offset + step` would reach the scroll width.
    pub fn step_right(&mut self, step: f64) -> bool {
        if self.offset + step >= self.scroll_width {
            return false;
        }
        self.offset += step;
        true
    }

    /// Steps left by `step`. Returns `false`, without moving, once the offset
    /// is at zero.
    pub fn step_left(&mut self, step: f64) -> bool {
        if self.offset <= 0.0 {
            return false;
        }
        self.offset = (self.offset - step).max(0.0);
        true
    }
}

fn finite_width(width: f64) -> f64 {
    if width.is_finite() { width.max(0.0) } else { 0.0 }
}

/// What a single autoscroll tick decided.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome<K> {
    /// Conditions no longer hold; do not reschedule.
    Stop,
    /// The owned area moved; reschedule.
    Continue,
    /// Ask `droppable` to scroll by `delta`, then reschedule.
    Scroll {
        /// The droppable owning the vertical region.
        droppable: K,
        /// Positive scrolls up.
        delta: f64,
    },
}

/// Owns the scroll intent bookkeeping, the horizontal area and the pending
/// tick handle.
#[derive(Clone, Debug, Default)]
pub struct AutoScroller {
    config: AutoScrollConfig,
    area: Option<ScrollArea>,
    pending: Option<FrameHandle>,
}

impl AutoScroller {
    /// Creates a scroller. `area` is `Some` when horizontal scrolling is owned.
    pub fn new(config: AutoScrollConfig, area: Option<ScrollArea>) -> Self {
        Self {
            config,
            area,
            pending: None,
        }
    }

    /// The tuning in use.
    pub fn config(&self) -> &AutoScrollConfig {
        &self.config
    }

    /// The owned horizontal area, if any.
    pub fn area(&self) -> Option<&ScrollArea> {
        self.area.as_ref()
    }

    /// Mutable access to the owned horizontal area, if any.
    pub fn area_mut(&mut self) -> Option<&mut ScrollArea> {
        self.area.as_mut()
    }

    /// Recomputes the intent stored in `state` for a pointer at `pointer`.
    pub fn update_intent<D, K>(&self, state: &mut DragState<D, K>, bounds: Rect, pointer: Point) {
        state.scroll_intent = scroll_intent(
            &self.config,
            bounds,
            pointer,
            state.active_droppable.is_some(),
        );
    }

    /// Returns `true` while a tick is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending tick handle, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Records the handle of a newly scheduled tick.
    pub fn set_pending(&mut self, handle: FrameHandle) {
        self.pending = Some(handle);
    }

    /// Forgets the pending tick, returning its handle.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// Runs one tick against `state`.
    ///
    /// On [`TickOutcome::Stop`] the pending handle is cleared; otherwise the
    /// caller is expected to schedule the next tick and record its handle.
    pub fn tick<D: Draggable, K: Clone + PartialEq>(
        &mut self,
        state: &DragState<D, K>,
    ) -> TickOutcome<K> {
        let outcome = self.step(state);
        if matches!(outcome, TickOutcome::Stop) {
            self.pending = None;
        }
        outcome
    }

    fn step<D: Draggable, K: Clone + PartialEq>(
        &mut self,
        state: &DragState<D, K>,
    ) -> TickOutcome<K> {
        let Some(droppable) = state.active_droppable.as_ref() else {
            return TickOutcome::Stop;
        };
        if !state.drag_active || state.dragged.is_none() {
            return TickOutcome::Stop;
        }
        let intent = state.scroll_intent;

        if intent.should_scroll_x
            && let Some(area) = self.area.as_mut()
        {
            let step = self.config.horizontal_step;
            let moved = if intent.scroll_x_right {
                area.step_right(step)
            } else {
                area.step_left(step)
            };
            if !moved {
                return TickOutcome::Stop;
            }
            log::trace!("autoscroll x -> {}", area.offset());
            return TickOutcome::Continue;
        }

        if intent.should_scroll_y {
            let delta = if intent.scroll_y_up {
                self.config.vertical_step
            } else {
                -self.config.vertical_step
            };
            return TickOutcome::Scroll {
                droppable: droppable.clone(),
                delta,
            };
        }

        TickOutcome::Stop
    }
}
