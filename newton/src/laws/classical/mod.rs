mod damping;
mod friction;
mod gravity;
mod spring;

pub use damping::LinearDrag;
pub use friction::SlopeFriction;
pub use gravity::UniformGravity;
pub use spring::Spring;
