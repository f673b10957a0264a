use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Real};
use crate::shape::SupportMap;
use downcast_rs::{impl_downcast, DowncastSync};

/// Enum representing the type of a shape.
///
/// Mesh variants carry the bounding-volume kind their internal hierarchy was built for;
/// the continuous-collision dispatch tables are indexed by this tag.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// A ball shape.
    Ball = 0,
    /// A cuboid shape.
    Cuboid,
    /// A capsule shape.
    Capsule,
    /// A triangle mesh with an AABB hierarchy.
    TriMeshAabb,
    /// A triangle mesh with an OBB hierarchy.
    TriMeshObb,
    /// A triangle mesh with a rectangle-swept-sphere hierarchy.
    TriMeshRss,
    /// A triangle mesh with a kIOS hierarchy.
    TriMeshKios,
    /// A triangle mesh with an OBB+RSS hierarchy.
    TriMeshObbRss,
    /// A triangle mesh with a 16-DOP hierarchy.
    TriMeshKdop16,
    /// A triangle mesh with an 18-DOP hierarchy.
    TriMeshKdop18,
    /// A triangle mesh with a 24-DOP hierarchy.
    TriMeshKdop24,
    /// A voxelized occupancy tree.
    VoxelOccupancy,
}

impl ShapeType {
    /// The number of shape types, for sizing dispatch tables.
    pub const COUNT: usize = 12;
}

/// The coarse class of a shape, which drives solver applicability checks.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeClass {
    /// A geometric primitive.
    Geom,
    /// A bounding-volume hierarchy over a mesh.
    Mesh,
    /// A voxelized occupancy tree.
    VoxelGrid,
}

/// Trait implemented by all the shapes supported by collide3d.
pub trait Shape: DowncastSync {
    /// The AABB of this shape in its local-space.
    fn compute_local_aabb(&self) -> Aabb;

    /// The AABB of this shape transformed by `position`.
    fn compute_aabb(&self, position: &Isometry<Real>) -> Aabb {
        self.compute_local_aabb().transform_by(position)
    }

    /// The type tag of this shape.
    fn shape_type(&self) -> ShapeType;

    /// The coarse class of this shape.
    fn shape_class(&self) -> ShapeClass;

    /// The radius of the smallest ball centered at the local origin and containing this shape.
    ///
    /// This bounds how far any point of the shape can travel under a rotation about the local
    /// origin, which conservative advancement uses to bound angular motion.
    fn angular_motion_disc(&self) -> Real;

    /// Converts this shape to its support-mapping representation, if it has one.
    fn as_support_map(&self) -> Option<&dyn SupportMap> {
        None
    }
}

impl_downcast!(sync Shape);
