//! Various unsorted geometrical and logical operators.

pub use self::obb::Obb;

mod obb;
