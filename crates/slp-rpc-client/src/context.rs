//! Request-scoped correlation context.
//!
//! Built once per inbound HTTP request and passed by reference to every
//! outbound call so broker messages and logs share the same request id.

use uuid::Uuid;

/// Correlation data for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    /// W3C `traceparent` header, forwarded verbatim when present.
    pub traceparent: Option<String>,
    /// Subject of the authenticated caller, if any.
    pub user_id: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            traceparent: None,
            user_id: None,
        }
    }

    /// Context with a fresh UUID v4 request id.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn with_traceparent(mut self, traceparent: Option<String>) -> Self {
        self.traceparent = traceparent;
        self
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_uuids() {
        let ctx = RequestContext::generate();
        assert!(Uuid::parse_str(&ctx.request_id).is_ok());
        assert!(ctx.traceparent.is_none());
    }

    #[test]
    fn builders_set_fields() {
        let ctx = RequestContext::new("req-1")
            .with_traceparent(Some("00-abc-def-01".into()))
            .with_user(Some("user-7".into()));
        assert_eq!(ctx.request_id, "req-1");
        assert_eq!(ctx.traceparent.as_deref(), Some("00-abc-def-01"));
        assert_eq!(ctx.user_id.as_deref(), Some("user-7"));
    }
}
