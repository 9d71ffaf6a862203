// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling: "run this once before the next paint".
//!
//! Hosts implement [`FrameScheduler`] on top of whatever their runtime offers
//! (`requestAnimationFrame`, a winit redraw request, a timer queue). The
//! autoscroll tick loop only needs two guarantees:
//!
//! - a requested callback runs at most once, and never synchronously inside
//!   [`FrameScheduler::request_frame`];
//! - a cancelled callback does not run.
//!
//! [`ManualFrames`] is a deterministic implementation driven by explicit
//! [`ManualFrames::run_frame`] calls, suitable for headless hosts and tests.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use core::cell::RefCell;
use core::fmt;
use core::mem;

/// Callback run on a future frame.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Identifies a requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Schedules callbacks to run before the next paint.
pub trait FrameScheduler {
    /// Requests that `callback` run once on a future frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Cancels a pending callback. Returns `false` if it already ran or was
    /// never requested.
    fn cancel_frame(&self, handle: FrameHandle) -> bool;
}

#[derive(Default)]
struct Queue {
    next: u64,
    pending: VecDeque<(FrameHandle, FrameCallback)>,
}

/// A [`FrameScheduler`] whose frames are advanced by hand.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use understory_drag_drop::frame::{FrameScheduler, ManualFrames};
///
/// let frames = ManualFrames::new();
/// let ran = Rc::new(Cell::new(false));
///
/// let flag = ran.clone();
/// frames.request_frame(Box::new(move || flag.set(true)));
/// assert!(!ran.get());
///
/// assert_eq!(frames.run_frame(), 1);
/// assert!(ran.get());
/// ```
#[derive(Default)]
pub struct ManualFrames {
    queue: RefCell<Queue>,
}

impl ManualFrames {
    /// Creates a scheduler with no pending frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Runs every callback requested before this call.
    ///
    /// Callbacks requested while the frame runs wait for the next frame.
    /// Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let batch = mem::take(&mut self.queue.borrow_mut().pending);
        let count = batch.len();
        for (_, callback) in batch {
            callback();
        }
        count
    }

    /// Runs frames until nothing is pending or `max_frames` have run.
    ///
    /// Returns the number of frames that ran at least one callback.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.pending() > 0 {
            self.run_frame();
            frames += 1;
        }
        frames
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let mut queue = self.queue.borrow_mut();
        let handle = FrameHandle(queue.next);
        queue.next += 1;
        queue.pending.push_back((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) -> bool {
        let mut queue = self.queue.borrow_mut();
        let before = queue.pending.len();
        queue.pending.retain(|(h, _)| *h != handle);
        queue.pending.len() != before
    }
}

impl fmt::Debug for ManualFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrames")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[test]
    fn callbacks_requested_during_a_frame_wait_for_the_next() {
        let frames = Rc::new(ManualFrames::new());
        let count = Rc::new(Cell::new(0));

        let again = frames.clone();
        let c = count.clone();
        frames.request_frame(Box::new(move || {
            c.set(c.get() + 1);
            let c = c.clone();
            again.request_frame(Box::new(move || c.set(c.get() + 1)));
        }));

        assert_eq!(frames.run_frame(), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(frames.pending(), 1);

        assert_eq!(frames.run_frame(), 1);
        assert_eq!(count.get(), 2);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn cancelled_frames_do_not_run() {
        let frames = ManualFrames::new();
        let ran = Rc::new(Cell::new(false));

        let flag = ran.clone();
        let handle = frames.request_frame(Box::new(move || flag.set(true)));
        assert!(frames.cancel_frame(handle));
        assert!(!frames.cancel_frame(handle));

        assert_eq!(frames.run_frame(), 0);
        assert!(!ran.get());
    }

    #[test]
    fn run_until_idle_stops_at_limit() {
        fn forever(frames: Rc<ManualFrames>) {
            let next = frames.clone();
            frames.request_frame(Box::new(move || forever(next)));
        }

        let frames = Rc::new(ManualFrames::new());
        forever(frames.clone());
        assert_eq!(frames.run_until_idle(5), 5);
        assert_eq!(frames.pending(), 1);
    }
}
