use bevy::prelude::*;

use crate::tools::placement_integrity::state::FurnitureInstance;

/// Transforms beneath a furniture root. Nested furniture is excluded so the
/// two queries never alias.
pub type DescendantTransforms<'w, 's> = Query<
    'w,
    's,
    (
        &'static Transform,
        &'static mut GlobalTransform,
        Option<&'static Children>,
    ),
    Without<FurnitureInstance>,
>;

/// Position container of a placed object plus its cached world matrix.
pub trait SceneObject {
    fn position(&self) -> Vec3;

    /// Three-argument absolute set.
    fn set_position(&mut self, x: f32, y: f32, z: f32);

    fn copy_position(&mut self, source: &Vec3) {
        self.set_position(source.x, source.y, source.z);
    }

    fn set_x(&mut self, x: f32);

    fn set_z(&mut self, z: f32);

    /// Rebuild the world matrix from the local pose now, optionally walking
    /// every descendant as well.
    fn update_world_matrix(&mut self, propagate_to_children: bool);
}

/// Borrowed view of a furniture entity inside a system.
pub struct SceneNode<'a, 'w, 's> {
    transform: Mut<'a, Transform>,
    global: Mut<'a, GlobalTransform>,
    children: Option<&'a Children>,
    descendants: Option<&'a mut DescendantTransforms<'w, 's>>,
}

impl<'a, 'w, 's> SceneNode<'a, 'w, 's> {
    pub fn new(transform: Mut<'a, Transform>, global: Mut<'a, GlobalTransform>) -> Self {
        Self {
            transform,
            global,
            children: None,
            descendants: None,
        }
    }

    pub fn with_hierarchy(
        mut self,
        children: Option<&'a Children>,
        descendants: &'a mut DescendantTransforms<'w, 's>,
    ) -> Self {
        self.children = children;
        self.descendants = Some(descendants);
        self
    }
}

impl SceneObject for SceneNode<'_, '_, '_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.translation = Vec3::new(x, y, z);
    }

    fn set_x(&mut self, x: f32) {
        self.transform.translation.x = x;
    }

    fn set_z(&mut self, z: f32) {
        self.transform.translation.z = z;
    }

    fn update_world_matrix(&mut self, propagate_to_children: bool) {
        // Furniture is spawned at the scene root, so the local pose is the world pose.
        let world = GlobalTransform::from(*self.transform);
        *self.global = world;

        if !propagate_to_children {
            return;
        }
        if let (Some(children), Some(descendants)) = (self.children, self.descendants.as_deref_mut())
        {
            propagate_descendants(&world, children, descendants);
        }
    }
}

fn propagate_descendants(
    parent: &GlobalTransform,
    children: &[Entity],
    descendants: &mut DescendantTransforms,
) {
    for &child in children {
        let Ok((transform, mut global, grandchildren)) = descendants.get_mut(child) else {
            continue;
        };
        let world = parent.mul_transform(*transform);
        *global = world;
        let grandchildren: Vec<Entity> = grandchildren.map(|c| c.to_vec()).unwrap_or_default();
        propagate_descendants(&world, &grandchildren, descendants);
    }
}

/// Free-standing object outside the ECS, used while building new instances
/// before they are spawned.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetachedNode {
    pub transform: Transform,
    pub global: GlobalTransform,
}

impl DetachedNode {
    pub fn at(position: Vec3) -> Self {
        let transform = Transform::from_translation(position);
        Self {
            transform,
            global: GlobalTransform::from(transform),
        }
    }
}

impl SceneObject for DetachedNode {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.translation = Vec3::new(x, y, z);
    }

    fn set_x(&mut self, x: f32) {
        self.transform.translation.x = x;
    }

    fn set_z(&mut self, z: f32) {
        self.transform.translation.z = z;
    }

    fn update_world_matrix(&mut self, _propagate_to_children: bool) {
        self.global = GlobalTransform::from(self.transform);
    }
}
