// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.
//!
//! Gesture handling itself never fails: unmet preconditions degrade to no-ops
//! or empty placeholder payloads. Only building a drag group or an autoscroll
//! configuration can be rejected.

use alloc::string::String;

/// Errors produced while validating drag-and-drop configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Drag group names must not be empty.
    #[error("drag group name is empty")]
    EmptyGroupName,
    /// Drag group names must not contain the channel separator.
    #[error("drag group name {0:?} contains the reserved separator ':'")]
    InvalidGroupName(String),
    /// An autoscroll parameter is negative, infinite, or NaN.
    #[error("autoscroll `{field}` must be finite and non-negative, got {value}")]
    InvalidAutoScroll {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}
