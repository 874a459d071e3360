//! Request-scoped logging fields passed explicitly into driving ports.
//!
//! Every use-case receives a [`RequestContext`] by reference and records its
//! fields on the log events it emits, so correlation never depends on
//! task-local or global state.

use super::TraceId;

/// Correlation fields for one inbound request.
///
/// # Examples
/// ```
/// use rewards_backend::domain::{RequestContext, TraceId};
///
/// let ctx = RequestContext::new(TraceId::generate(), "POST", "/users/auth");
/// assert_eq!(ctx.method(), "POST");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    trace_id: TraceId,
    method: String,
    path: String,
}

impl RequestContext {
    /// Build a context for an inbound request.
    pub fn new(trace_id: TraceId, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            trace_id,
            method: method.into(),
            path: path.into(),
        }
    }

    /// Context for work that did not originate from a request, such as tests
    /// or startup tasks.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(TraceId::generate(), "-", "-")
    }

    /// Correlation identifier echoed in the `trace-id` response header.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// HTTP method of the request.
    #[must_use]
    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }
}
