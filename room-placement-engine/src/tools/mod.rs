//! Interactive tools operating on the furniture placed in the room.
//!
//! Currently a single tool: placement integrity, which keeps every placed
//! instance off the degenerate room centre and provides the quarantine
//! escalation path driven from the frontend over RPC.

/// Position guard, integrity monitor, quarantine zone and instance identity.
///
/// Registered through `PlacementIntegrityPlugin`.
pub mod placement_integrity;
