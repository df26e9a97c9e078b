//! Scene graph access for placed objects.
//!
//! Wraps Bevy transforms in the handle the placement integrity tools write
//! through, with immediate world-matrix recomputation.

/// `SceneObject` handle over `Transform`/`GlobalTransform` pairs.
///
/// ECS-backed nodes propagate to descendants on demand; detached nodes are used before spawn.
pub mod scene_object;
