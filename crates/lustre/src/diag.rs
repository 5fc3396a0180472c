//! Apply diagnostics.
//!
//! Enabled by the `diagnostics` feature flag. The session records one
//! [`ApplyEvent`] per applicator pass into a bounded [`ApplyLog`], so a host
//! can show which operation touched how many meshes and which names fell
//! through classification.

use std::collections::VecDeque;
use std::time::Instant;

use serde::Serialize;

use crate::apply::{ApplyReport, ApplyScope};

/// Number of events kept before the oldest is dropped.
pub const APPLY_LOG_CAPACITY: usize = 64;

/// A record of one applicator pass.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyEvent {
    /// Seconds since the log was created.
    pub timestamp_secs: f32,
    /// Control operation or handoff that triggered the pass.
    pub operation: &'static str,
    pub scope: ApplyScope,
    pub report: ApplyReport,
}

/// Ring buffer of recent [`ApplyEvent`]s.
#[derive(Debug)]
pub struct ApplyLog {
    started: Instant,
    events: VecDeque<ApplyEvent>,
}

impl ApplyLog {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            events: VecDeque::with_capacity(APPLY_LOG_CAPACITY),
        }
    }

    pub(crate) fn record(
        &mut self,
        operation: &'static str,
        scope: ApplyScope,
        report: ApplyReport,
    ) {
        if self.events.len() == APPLY_LOG_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(ApplyEvent {
            timestamp_secs: self.started.elapsed().as_secs_f32(),
            operation,
            scope,
            report,
        });
    }

    /// Oldest first.
    pub fn events(&self) -> impl Iterator<Item = &ApplyEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&ApplyEvent> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Serialize the whole log, e.g. for a debug overlay.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.events).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for ApplyLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_bounded_and_drops_oldest_first() {
        let mut log = ApplyLog::new();
        log.record("asset_ready", ApplyScope::All, ApplyReport::default());
        for _ in 0..APPLY_LOG_CAPACITY {
            log.record("set_metal_color", ApplyScope::Metals, ApplyReport::default());
        }
        assert_eq!(log.len(), APPLY_LOG_CAPACITY);
        assert!(log.events().all(|e| e.operation == "set_metal_color"));
        assert_eq!(log.last().unwrap().operation, "set_metal_color");
    }

    #[test]
    fn log_serializes() {
        let mut log = ApplyLog::new();
        log.record("reset_viewer", ApplyScope::All, ApplyReport::default());
        let json = log.to_json();
        assert_eq!(json[0]["operation"], "reset_viewer");
        assert_eq!(json[0]["scope"], "All");
    }
}
