//! Metrics instrumentation for srv-redirector.
//!
//! All metrics are prefixed with `srv_redirector.`

use std::time::Duration;

use metrics::{counter, histogram};

/// Record the outcome of one request (`redirect` or a `RedirectError::kind`).
pub fn record_request(outcome: &'static str) {
    counter!("srv_redirector.request.count", "outcome" => outcome).increment(1);
}

/// Record the duration of one resolver exchange.
pub fn record_exchange(elapsed: Duration) {
    histogram!("srv_redirector.resolve.duration.seconds").record(elapsed.as_secs_f64());
}

/// Record how many candidates a successful lookup produced.
pub fn record_candidates(count: usize) {
    histogram!("srv_redirector.resolve.candidates").record(count as f64);
}
