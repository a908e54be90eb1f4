// core/mod.rs

// Declares the stateful core of the velocity bridge: pose decoding, the command
// gate and the pose-seeded integrator. Nothing in here talks to ROS 2; the
// ros_interface module converts messages into these types.

/// Command gate and velocity command type
pub mod command;
/// Pose decoding
pub mod localization;
/// Heading-referenced velocity rotation
pub mod rotation;
/// Pose-seeded integrator
pub mod state;

// Re-export key types so callers do not need the submodule paths
pub use command::{CommandGate, VelocityCommand};
pub use localization::{DecodedPose, GIMBAL_LOCK_EPSILON, PoseSample, decode_pose};
pub use rotation::rotate_to_world;
pub use state::{CommandScale, IntegratorState, StepOutcome};
