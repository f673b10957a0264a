use crate::math::{Point, Real};

/// Closest points information.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum ClosestPoints {
    /// The two objects are intersecting.
    Intersecting,
    /// The two objects are non-intersecting but closer than a given user-defined distance.
    WithinMargin(Point<Real>, Point<Real>),
    /// The two objects are non-intersecting and further apart than a given user-defined
    /// distance.
    Disjoint,
}
