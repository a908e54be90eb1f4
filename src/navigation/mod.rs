//! Navigation layer for the velocity bridge
//!
//! Turns the integrator's running estimate into waypoints: waypoint packaging
//! and the event-handling context that owns the whole pipeline.

pub mod velocity_control;
pub mod waypoint;

pub use velocity_control::{VelocityControl, VelocityControlStatus};
pub use waypoint::{Waypoint, WaypointEmitter, WaypointSink};
