//! Size limits for the analytics service.
//!
//! Tracked events are small (an event name, a version, a handful of optional
//! scalars). These limits keep a single request from writing oversized records
//! or keys into the store.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so field limits are duplicated there. Keep both in sync when modifying.

/// Maximum `/track` body size in bytes (64KB).
pub const MAX_TRACK_BODY_BYTES: usize = 64 * 1024;

/// Event type name max length.
/// Names like "install_success" are ~15 chars.
pub const MAX_EVENT_NAME_LEN: usize = 64;

/// Version label max length.
pub const MAX_VERSION_LEN: usize = 64;

/// Visitor ID max length.
/// UUIDs=36, custom IDs up to 128.
pub const MAX_VISITOR_ID_LEN: usize = 128;

/// User agent string max length stored with a record.
/// Browser UAs: 100-300 typical, 500+ with extensions.
pub const MAX_USER_AGENT_LEN: usize = 512;
