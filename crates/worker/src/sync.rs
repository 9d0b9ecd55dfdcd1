//! Background sync hook.
//!
//! The host runtime delivers sync events by tag when connectivity returns.
//! Only the performance-report tag is recognised today; actual report
//! collection is an extension point, so the flush currently finds nothing
//! to send.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atomsw_core::Error;

pub const PERFORMANCE_SYNC_TAG: &str = "performance-sync";

/// A queued performance measurement awaiting upload.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub metric: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Reports queued while offline. None are collected yet.
pub fn stored_reports() -> Vec<PerformanceReport> {
    Vec::new()
}

/// Handle a sync event. Unknown tags are ignored without error so new
/// tags can be registered by pages before the worker learns about them.
pub async fn handle_sync(tag: &str) -> Result<(), Error> {
    if tag != PERFORMANCE_SYNC_TAG {
        tracing::debug!(tag, "ignoring unrecognised sync tag");
        return Ok(());
    }

    let reports = stored_reports();
    if reports.is_empty() {
        tracing::debug!("no performance reports queued");
        return Ok(());
    }

    tracing::info!(count = reports.len(), "flushing queued performance reports");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_performance_tag_accepted() {
        assert!(handle_sync(PERFORMANCE_SYNC_TAG).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_tag_ignored() {
        assert!(handle_sync("newsletter-sync").await.is_ok());
    }

    #[test]
    fn test_report_serializes() {
        let report = PerformanceReport {
            metric: "lcp".into(),
            value: 1234.5,
            recorded_at: Utc::now(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metric"], "lcp");
        assert_eq!(json["value"], 1234.5);
    }
}
