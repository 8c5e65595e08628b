//! Engine metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder every
//! call is a no-op. The CLI installs a Prometheus recorder on request.

use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use rolecall_notify::NotificationKind;

use crate::error::EngineResult;

pub const TRANSITIONS_TOTAL: &str = "rolecall_transitions_total";
pub const REJECTIONS_TOTAL: &str = "rolecall_rejections_total";
pub const NOTIFICATIONS_TOTAL: &str = "rolecall_notifications_total";
pub const OPERATION_DURATION: &str = "rolecall_operation_duration_seconds";

/// Describe engine metrics for better documentation in exporter output.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        TRANSITIONS_TOTAL,
        "Total number of committed staffing operations"
    );
    describe_counter!(
        REJECTIONS_TOTAL,
        "Total number of rejected staffing operations by error kind"
    );
    describe_counter!(
        NOTIFICATIONS_TOTAL,
        "Total number of notifications published by type"
    );
    describe_histogram!(
        OPERATION_DURATION,
        "Duration of staffing operations including lock wait, in seconds"
    );
}

/// Record a committed operation.
pub fn record_transition(op: &'static str, duration: Duration) {
    counter!(TRANSITIONS_TOTAL, "op" => op).increment(1);
    histogram!(OPERATION_DURATION, "op" => op).record(duration.as_secs_f64());
}

/// Record a rejected operation.
pub fn record_rejection(op: &'static str, kind: &'static str) {
    counter!(REJECTIONS_TOTAL, "op" => op, "kind" => kind).increment(1);
}

/// Record a published notification.
pub fn record_notification(kind: NotificationKind) {
    counter!(NOTIFICATIONS_TOTAL, "type" => kind.as_str()).increment(1);
}

/// Times one coordinator operation and records its outcome.
pub struct OperationTimer {
    op: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn start(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
        }
    }

    pub fn finish<T>(self, result: &EngineResult<T>) {
        match result {
            Ok(_) => record_transition(self.op, self.start.elapsed()),
            Err(err) => record_rejection(self.op, err.kind().as_str()),
        }
    }
}
