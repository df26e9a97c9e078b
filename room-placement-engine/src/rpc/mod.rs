//! JSON-RPC 2.0 bridge between the placement engine and the React frontend.
//!
//! The engine runs in an iframe; requests arrive through `postMessage` and are
//! answered with responses carrying the same `id`. Integrity events are pushed
//! back as notifications. Native builds have no parent window: raw requests
//! are pushed into `MessageQueue` and delivered messages collect in
//! `NativeOutbox`.
//!
//! Requests are handled in `Update` ahead of the integrity request systems, so
//! a queued placement or quarantine takes effect in the same frame. Outgoing
//! messages are flushed in `PostUpdate` after the position guard, notifications
//! first.
//!
//! ## Methods
//!
//! | method | params | result |
//! |---|---|---|
//! | `place_furniture` | `store_id`, `furniture_type?`, `position` | `{queued, store_id}` |
//! | `quarantine_instance` | `instance_id`, `index?` | `{queued, instance_id}` |
//! | `release_instance` | `instance_id`, `target_index` | `{queued, instance_id}` |
//! | `get_quarantine_stats` | none | `QuarantineStats` |
//! | `validate_instance_id` | `instance_id` | `{valid, original_store_id}` |
//! | `begin_manipulation` / `end_manipulation` | `instance_id` | `{instance_id, monitoring_suspended}` |
//! | `get_monitor_status` | none | `{running, stoppable, period_ms, ticks, corrections}` |
//! | `stop_integrity_monitor` | none | `{stopped}` |
//!
//! ## Notifications
//!
//! `furniture_placed`, `position_corrected`, `center_collision_alert`,
//! `instance_quarantined`, `instance_released`, and `debug_message` for
//! messages that fail to parse.
//!
//! ## Error codes
//!
//! - `-32601`: method not found
//! - `-32602`: invalid params; unknown instance ids carry the id in `data`
//! - `-32603`: internal error
//! - `-32000`: no stoppable integrity monitor (not running, or restarted
//!   outside the handle held by the app)

/// Message transport, method dispatch and notification forwarding.
pub mod web_rpc;
