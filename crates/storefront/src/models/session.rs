//! Session-related types.

/// Session keys for visitor state.
pub mod session_keys {
    /// Anonymous visitor id used to de-duplicate product views.
    pub const VISITOR_ID: &str = "visitor_id";
}
