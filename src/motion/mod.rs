//! Parameterized rigid motions used by continuous collision detection.

pub use self::rigid_motion::{
    CcdMotionType, InterpMotion, Motion, RigidMotion, ScrewMotion, SplineMotion,
    TranslationMotion,
};

mod rigid_motion;
