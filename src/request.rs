//! The decoded access event replayed against a [`crate::Cache`].

/// 64-bit object identifier, matching the hash-table key everywhere else
/// in the core.
pub type ObjectId = u64;

/// The operation a [`Request`] represents.
///
/// The core's eviction policies only distinguish reads from writes insofar
/// as a policy chooses to (none of the policies implemented here do, but
/// the field is part of the data model so a future policy can).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A read / lookup.
    Get,
    /// A write / store, refreshing the object's size.
    Set,
}

/// A single decoded access event.
///
/// Transient: the driver constructs one per line of trace and reuses the
/// struct across iterations; nothing in the core retains a `Request` past
/// the call that consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    /// Monotonic clock time of the access, in the trace's own units.
    pub clock_time: i64,
    /// Object identifier.
    pub obj_id: ObjectId,
    /// Object size in bytes.
    pub obj_size: i64,
    /// The operation code.
    pub op: Operation,
    /// Virtual time of this object's next access, for oracle policies.
    /// `None` when the trace does not carry lookahead (or this is the
    /// object's last access).
    pub next_access_vtime: Option<i64>,
    /// Time-to-live in the same units as `clock_time`; `None` means no TTL.
    pub ttl: Option<i64>,
    /// Whether this record decoded cleanly. Callers that must tolerate
    /// malformed trace lines without aborting the replay can mark a
    /// request invalid and let the driver skip it.
    pub valid: bool,
}

impl Request {
    /// Creates a request with no lookahead and no TTL.
    pub fn new(clock_time: i64, obj_id: ObjectId, obj_size: i64, op: Operation) -> Self {
        Self {
            clock_time,
            obj_id,
            obj_size,
            op,
            next_access_vtime: None,
            ttl: None,
            valid: true,
        }
    }

    /// Builder-style setter for the oracle lookahead field.
    #[must_use]
    pub fn with_next_access(mut self, vtime: i64) -> Self {
        self.next_access_vtime = Some(vtime);
        self
    }

    /// Builder-style setter for TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_has_no_lookahead_or_ttl() {
        let req = Request::new(0, 7, 128, Operation::Get);
        assert_eq!(req.obj_id, 7);
        assert_eq!(req.obj_size, 128);
        assert!(req.next_access_vtime.is_none());
        assert!(req.ttl.is_none());
        assert!(req.valid);
    }

    #[test]
    fn builder_methods_set_optional_fields() {
        let req = Request::new(0, 1, 1, Operation::Set)
            .with_next_access(42)
            .with_ttl(3600);
        assert_eq!(req.next_access_vtime, Some(42));
        assert_eq!(req.ttl, Some(3600));
    }
}
