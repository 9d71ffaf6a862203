// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinator configuration, resolved once at construction.

use crate::Error;
use crate::autoscroll::AutoScrollConfig;
use crate::group::DragGroup;

/// Configuration for a [`DragCoordinator`](crate::coordinator::DragCoordinator).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragDropConfig {
    /// Channel namespace shared with the group's draggables and droppables.
    pub group: DragGroup,
    /// Whether the coordinator owns a horizontally scrollable wrapper.
    ///
    /// Without one, horizontal autoscroll never acts.
    pub horizontal_scroll: bool,
    /// Autoscroll tuning.
    #[cfg_attr(feature = "serde", serde(default))]
    pub autoscroll: AutoScrollConfig,
}

impl DragDropConfig {
    /// Default configuration for `group`: no horizontal wrapper, default autoscroll.
    pub fn new(group: DragGroup) -> Self {
        Self {
            group,
            horizontal_scroll: false,
            autoscroll: AutoScrollConfig::default(),
        }
    }

    /// Sets whether a horizontal wrapper is owned.
    #[must_use]
    pub fn with_horizontal_scroll(mut self, enabled: bool) -> Self {
        self.horizontal_scroll = enabled;
        self
    }

    /// Replaces the autoscroll tuning.
    #[must_use]
    pub fn with_autoscroll(mut self, autoscroll: AutoScrollConfig) -> Self {
        self.autoscroll = autoscroll;
        self
    }

    /// Checks the autoscroll tuning. The group is validated when it is built.
    pub fn validate(&self) -> Result<(), Error> {
        self.autoscroll.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let group = DragGroup::new("g").unwrap();
        let config = DragDropConfig::new(group.clone())
            .with_horizontal_scroll(true)
            .with_autoscroll(AutoScrollConfig {
                horizontal_step: 20.0,
                ..AutoScrollConfig::default()
            });
        assert_eq!(config.group, group);
        assert!(config.horizontal_scroll);
        assert_eq!(config.autoscroll.horizontal_step, 20.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn validate_forwards_autoscroll_errors() {
        let config = DragDropConfig::new(DragGroup::new("g").unwrap()).with_autoscroll(
            AutoScrollConfig {
                min_threshold: f64::NAN,
                ..AutoScrollConfig::default()
            },
        );
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidAutoScroll {
                field: "min_threshold",
                ..
            })
        ));
    }
}
