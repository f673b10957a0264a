//! Collision objects: a shared shape positioned in the world, or attached to a motion.

pub use self::collision_object::{
    CollisionObject, CollisionObjectHandle, ContinuousCollisionObject, Occupancy,
};

mod collision_object;
