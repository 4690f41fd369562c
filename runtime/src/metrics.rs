//! Lifecycle metrics.
//!
//! Counters and a latency histogram recorded through the `metrics` facade,
//! labelled with the mutation name. Nothing is recorded unless the host
//! installs a recorder (for example a Prometheus exporter).
//!
//! | Metric | Kind |
//! |--------|------|
//! | `mutation_attempts_total` | counter |
//! | `mutation_succeeded_total` | counter |
//! | `mutation_failed_total` | counter |
//! | `mutation_cleared_total` | counter |
//! | `mutation_duration_seconds` | histogram |

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Duration;

/// Label carrying the configured mutation name.
pub const MUTATION_LABEL: &str = "mutation";

/// Register descriptions for every lifecycle metric.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        "mutation_attempts_total",
        "Total number of mutation attempts started"
    );
    describe_counter!(
        "mutation_succeeded_total",
        "Total number of mutation attempts that completed"
    );
    describe_counter!(
        "mutation_failed_total",
        "Total number of mutation attempts that failed"
    );
    describe_counter!(
        "mutation_cleared_total",
        "Total number of lifecycle resets"
    );
    describe_histogram!(
        "mutation_duration_seconds",
        Unit::Seconds,
        "Time from attempt start to settlement"
    );
}

pub(crate) fn record_attempt(mutation: &str) {
    counter!("mutation_attempts_total", MUTATION_LABEL => mutation.to_owned()).increment(1);
}

pub(crate) fn record_settled(mutation: &str, succeeded: bool, elapsed: Duration) {
    if succeeded {
        counter!("mutation_succeeded_total", MUTATION_LABEL => mutation.to_owned()).increment(1);
    } else {
        counter!("mutation_failed_total", MUTATION_LABEL => mutation.to_owned()).increment(1);
    }
    histogram!("mutation_duration_seconds", MUTATION_LABEL => mutation.to_owned())
        .record(elapsed.as_secs_f64());
}

pub(crate) fn record_cleared(mutation: &str) {
    counter!("mutation_cleared_total", MUTATION_LABEL => mutation.to_owned()).increment(1);
}
