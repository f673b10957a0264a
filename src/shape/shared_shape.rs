use crate::math::{Real, Vector};
use crate::shape::{Ball, Capsule, Cuboid, Octree, Shape, TriMesh};
use std::ops::Deref;
use std::sync::Arc;

/// The shape of a collision object, shared between all the objects referencing it.
#[derive(Clone)]
pub struct SharedShape(pub Arc<dyn Shape>);

impl Deref for SharedShape {
    type Target = dyn Shape;
    fn deref(&self) -> &dyn Shape {
        &*self.0
    }
}

impl AsRef<dyn Shape> for SharedShape {
    fn as_ref(&self) -> &dyn Shape {
        &*self.0
    }
}

impl SharedShape {
    /// Wraps the given shape as a shared shape.
    pub fn new(shape: impl Shape) -> Self {
        SharedShape(Arc::new(shape))
    }

    /// Initializes a shared ball shape.
    pub fn ball(radius: Real) -> Self {
        SharedShape(Arc::new(Ball::new(radius)))
    }

    /// Initializes a shared cuboid shape from its half-extents.
    pub fn cuboid(hx: Real, hy: Real, hz: Real) -> Self {
        SharedShape(Arc::new(Cuboid::new(Vector::new(hx, hy, hz))))
    }

    /// Initializes a shared capsule shape.
    pub fn capsule(half_height: Real, radius: Real) -> Self {
        SharedShape(Arc::new(Capsule::new(half_height, radius)))
    }

    /// Initializes a shared triangle-mesh shape.
    pub fn trimesh(mesh: TriMesh) -> Self {
        SharedShape(Arc::new(mesh))
    }

    /// Initializes a shared occupancy-tree shape.
    pub fn octree(octree: Octree) -> Self {
        SharedShape(Arc::new(octree))
    }
}
