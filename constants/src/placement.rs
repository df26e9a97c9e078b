use bevy::math::Vec3;
use std::time::Duration;

/// Separator between the catalog id and the random component of an instance id.
pub const INSTANCE_ID_SEPARATOR: char = '_';

/// Type tag prefix marking uploaded/custom furniture.
pub const CUSTOM_TYPE_PREFIX: &str = "custom_";

/// Replacement range `[min, max)` for a single zeroed axis written through the guard.
pub const GUARD_SUBSTITUTE_MIN: f32 = 5.0;
pub const GUARD_SUBSTITUTE_MAX: f32 = 7.0;

/// Replacement range `[min, max)` used by the integrity monitor on a centre collision.
pub const EMERGENCY_SUBSTITUTE_MIN: f32 = 8.0;
pub const EMERGENCY_SUBSTITUTE_MAX: f32 = 12.0;

pub const DEFAULT_AUDIT_PERIOD: Duration = Duration::from_secs(1);

// Quarantine grid
pub const QUARANTINE_BASE: Vec3 = Vec3::new(50.0, 1.0, 50.0);
pub const QUARANTINE_COLUMNS: u32 = 5;
pub const QUARANTINE_SPACING: f32 = 3.0;
/// Zone membership: x >= threshold AND z >= threshold.
pub const QUARANTINE_ZONE_THRESHOLD: f32 = 40.0;
pub const QUARANTINE_REASON: &str = "problematic_position";

// Release ring
pub const RELEASE_ANGLE_STEP_DEGREES: f32 = 45.0;
pub const RELEASE_BASE_RADIUS: f32 = 8.0;
pub const RELEASE_RADIUS_STEP: f32 = 1.5;
pub const RELEASE_HEIGHT: f32 = 0.1;
