//! Spatial partitioning tools.

pub use self::hierarchy_tree::{select, HierarchyTree, Node, NodeIndex};

mod hierarchy_tree;
#[cfg(test)]
mod hierarchy_tree_tests;
