//! Shapes supported by collide3d.

pub use self::ball::Ball;
pub use self::capsule::Capsule;
pub use self::cuboid::Cuboid;
pub use self::octree::{Octree, OctreeNode};
pub use self::shape::{Shape, ShapeClass, ShapeType};
pub use self::shared_shape::SharedShape;
pub use self::support_map::SupportMap;
pub use self::trimesh::{MeshBvKind, TriMesh};

mod ball;
mod capsule;
mod cuboid;
mod octree;
mod shape;
mod shared_shape;
mod support_map;
mod trimesh;
