//! Per-request observation hook, replacing process-wide metric counters.

use std::collections::HashMap;

use http::StatusCode;
use parking_lot::Mutex;

/// What a single transport attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Response(StatusCode),
    TransportError,
}

impl RequestOutcome {
    /// Metric label: the status class (`"200"`, `"400"`, ...) or `"client-error"`.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Response(status) => {
                let code = status.as_u16();
                (code - code % 100).to_string()
            }
            Self::TransportError => "client-error".to_owned(),
        }
    }
}

/// Called once per request after the transport returns. Must not block.
pub trait RequestObserver: Send + Sync {
    fn observe(&self, broker: &str, outcome: RequestOutcome);
}

/// In-memory request and response counters keyed by broker.
#[derive(Debug, Default)]
pub struct RequestCounters {
    requests: Mutex<HashMap<String, u64>>,
    responses: Mutex<HashMap<(String, String), u64>>,
}

impl RequestCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests sent to `broker`.
    #[must_use]
    pub fn requests(&self, broker: &str) -> u64 {
        self.requests.lock().get(broker).copied().unwrap_or(0)
    }

    /// Responses from `broker` with the given outcome label.
    #[must_use]
    pub fn responses(&self, broker: &str, label: &str) -> u64 {
        self.responses
            .lock()
            .get(&(broker.to_owned(), label.to_owned()))
            .copied()
            .unwrap_or(0)
    }
}

impl RequestObserver for RequestCounters {
    fn observe(&self, broker: &str, outcome: RequestOutcome) {
        *self.requests.lock().entry(broker.to_owned()).or_default() += 1;
        *self
            .responses
            .lock()
            .entry((broker.to_owned(), outcome.label()))
            .or_default() += 1;
    }
}
