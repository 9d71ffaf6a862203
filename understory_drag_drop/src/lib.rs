// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drag_drop --heading-base-level=0

//! Understory Drag Drop: headless drag-and-drop coordination for UI.
//!
//! This crate tracks an in-progress drag gesture, works out which drop target
//! and insertion placeholder are under the pointer, and drives edge-triggered
//! autoscroll of the surrounding region. It does not render anything and does
//! not hit test: draggables publish raw `start`/`move`/`end`/`reset` messages,
//! and droppables listen for `placeholder` and `scroll` messages.
//!
//! - [`bus`]: Synchronous named-channel publish/subscribe with owned subscriptions
//! - [`group`]: Drag groups, their six channels, and the messages on them
//! - [`state`]: The drag state record and its pure transitions
//! - [`autoscroll`]: Edge detection, the owned horizontal scroll area, and tick decisions
//! - [`frame`]: The "run before next paint" scheduling seam
//! - [`coordinator`]: Wires all of the above to one drag group
//!
//! ## Message flow
//!
//! ```text
//! draggables ── start/move/end/reset ──▶ DragCoordinator ── placeholder ──▶ droppables
//!                                             │
//!                                             ├── host callbacks (start, drop)
//!                                             │
//!                                        AutoScroller ── scroll ──▶ droppables
//!                                             │
//!                                        owned ScrollArea (horizontal)
//! ```
//!
//! A placeholder message carries `(placeholder, droppable)` while a draggable is
//! held over a droppable, and `(None, None)` otherwise, so drop targets can
//! render insertion indicators without polling.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use kurbo::{Point, Rect};
//! use understory_drag_drop::bus::EventBus;
//! use understory_drag_drop::config::DragDropConfig;
//! use understory_drag_drop::coordinator::DragCoordinator;
//! use understory_drag_drop::frame::ManualFrames;
//! use understory_drag_drop::group::{Channel, DragGroup, DragMessage};
//!
//! let group = DragGroup::new("kanban").unwrap();
//! let bus = EventBus::<DragMessage<u32, u32>>::new();
//! let frames = Rc::new(ManualFrames::new());
//!
//! let mut coordinator = DragCoordinator::new(
//!     DragDropConfig::new(group.clone()),
//!     bus.clone(),
//!     || Rect::new(0.0, 0.0, 1000.0, 500.0),
//!     frames.clone(),
//! )
//! .unwrap();
//! coordinator.init();
//!
//! // A column listens for placeholder and scroll requests.
//! let requests = Rc::new(RefCell::new(Vec::new()));
//! let sink = requests.clone();
//! let _column = bus.subscribe(group.channel(Channel::Scroll), move |m| {
//!     sink.borrow_mut().push(m.clone());
//! });
//!
//! // Drag card 1 over column 2, close to the top edge.
//! group.emit_start(&bus, 1, Point::new(500.0, 250.0));
//! group.emit_move(&bus, 1, Some(2), Some(9), Point::new(500.0, 20.0));
//!
//! // Each frame asks column 2 to scroll up.
//! frames.run_frame();
//! frames.run_frame();
//! assert_eq!(requests.borrow().len(), 2);
//!
//! // Dropping stops the loop on the next frame.
//! group.emit_end(&bus);
//! frames.run_frame();
//! assert!(!coordinator.tick_pending());
//! assert_eq!(requests.borrow().len(), 2);
//! ```
//!
//! ## Threading
//!
//! Everything is single-threaded and cooperative: state is shared through
//! `Rc`/`RefCell`, and ticks run from whatever [`frame::FrameScheduler`] the
//! host provides. Ending or resetting a drag does not cancel a scheduled tick;
//! the tick sees the new state and stops.
//!
//! ## Logging
//!
//! State transitions and tick-loop decisions are reported through the `log`
//! facade at `debug` and `trace` level. No logger is installed by this crate.
//!
//! ## Features
//!
//! - `std` (default): Build Kurbo with `std`
//! - `libm`: Build Kurbo with `libm` for `no_std` targets
//! - `serde`: Derive `Serialize`/`Deserialize` for configuration types
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod autoscroll;
pub mod bus;
pub mod config;
pub mod coordinator;
mod error;
pub mod frame;
pub mod group;
pub mod state;

pub use error::Error;
