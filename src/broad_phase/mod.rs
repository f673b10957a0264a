//! Broad phase: filtering stage yielding candidate pairs for the narrow phase.

pub use self::manager::DynamicAabbTreeManager;

mod manager;
mod voxel_query;
