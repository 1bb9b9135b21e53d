//! Update Metrics
//!
//! Tracks poll outcomes per channel kind and failure reason. Lives only as long
//! as the fleet that owns it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::engine::fleet::{ChannelKind, UpdateError};

/// Number of poll records kept in history
pub const HISTORY_LIMIT: usize = 100;

/// Counters and recent history of update attempts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMetrics {
    pub total_polls: u64,
    pub successful_updates: u64,
    pub failed_updates: u64,
    /// Failure count keyed by error token
    pub failures_by_reason: BTreeMap<String, u64>,
    pub last_update: Option<DateTime<Utc>>,
    /// Oldest first, at most `HISTORY_LIMIT` entries
    pub history: VecDeque<UpdateRecord>,
}

/// Single poll outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub timestamp: DateTime<Utc>,
    pub target: String,
    pub channel: ChannelKind,
    pub artifact: Option<String>,
    pub from_version: u64,
    pub to_version: u64,
    pub success: bool,
    pub error: Option<UpdateError>,
}

impl UpdateMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one poll
    pub fn record_poll(
        &mut self,
        target: &str,
        channel: ChannelKind,
        artifact: Option<&str>,
        from_version: u64,
        to_version: u64,
        error: Option<UpdateError>,
    ) {
        self.total_polls += 1;

        let now = Utc::now();
        let success = error.is_none();
        if success {
            self.successful_updates += 1;
            self.last_update = Some(now);
        } else {
            self.failed_updates += 1;
        }

        if let Some(err) = error {
            *self
                .failures_by_reason
                .entry(err.token().to_string())
                .or_insert(0) += 1;
        }

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(UpdateRecord {
            timestamp: now,
            target: target.to_string(),
            channel,
            artifact: artifact.map(str::to_string),
            from_version,
            to_version,
            success,
            error,
        });
    }

    /// Share of polls that applied an update, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_polls == 0 {
            return 100.0;
        }
        (self.successful_updates as f64 / self.total_polls as f64) * 100.0
    }

    pub fn failures_for(&self, error: UpdateError) -> u64 {
        self.failures_by_reason
            .get(error.token())
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let metrics = UpdateMetrics::new();
        assert_eq!(metrics.total_polls, 0);
        assert_eq!(metrics.success_rate(), 100.0);
        assert!(metrics.last_update.is_none());
    }

    #[test]
    fn test_record_poll() {
        let mut metrics = UpdateMetrics::new();
        metrics.record_poll("M1", ChannelKind::Ota, Some("moxa_34.swu"), 33, 34, None);
        metrics.record_poll(
            "M1",
            ChannelKind::Ota,
            Some("moxa_34.swu"),
            34,
            34,
            Some(UpdateError::VersionNotNewer),
        );
        metrics.record_poll("E1", ChannelKind::Dfu, None, 10, 10, Some(UpdateError::NoArtifact));

        assert_eq!(metrics.total_polls, 3);
        assert_eq!(metrics.successful_updates, 1);
        assert_eq!(metrics.failed_updates, 2);
        assert_eq!(metrics.failures_for(UpdateError::VersionNotNewer), 1);
        assert_eq!(metrics.failures_for(UpdateError::LowBattery), 0);
        assert_eq!(metrics.last_update, Some(metrics.history[0].timestamp));
        assert!(metrics.history[0].success);
        assert_eq!(metrics.history[2].error, Some(UpdateError::NoArtifact));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut metrics = UpdateMetrics::new();
        for i in 0..(HISTORY_LIMIT as u64 + 10) {
            let error = Some(UpdateError::NoArtifact);
            metrics.record_poll("M1", ChannelKind::Ota, None, i, i, error);
        }
        assert_eq!(metrics.history.len(), HISTORY_LIMIT);
        assert_eq!(metrics.history[0].from_version, 10);
        assert_eq!(
            metrics.history.back().map(|r| r.from_version),
            Some(HISTORY_LIMIT as u64 + 9)
        );
    }
}
