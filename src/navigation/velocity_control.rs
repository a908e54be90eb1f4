// src/navigation/velocity_control.rs
// Event handlers tying the command gate, the integrator and the waypoint
// emitter together. One instance lives for the whole process and is driven
// serially by the input event loop, so it needs no locking.

use log::{info, warn};
use std::time::Duration;

use super::waypoint::{Waypoint, WaypointEmitter, WaypointSink};
use crate::{MAX_WAYPOINT_DURATION_S, VelocityControlConfig};
use crate::core::{CommandGate, CommandScale, IntegratorState, PoseSample, StepOutcome, VelocityCommand};

/// Snapshot of the bridge for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityControlStatus {
    /// A velocity command has been received
    pub has_command: bool,
    /// Position and heading have been seeded
    pub initialized: bool,
    /// Distance the target has moved
    pub distance_traveled: f64,
    /// Waypoints handed to the sink
    pub waypoints_emitted: u64,
}

/// Velocity-to-waypoint context
pub struct VelocityControl<S: WaypointSink> {
    gate: CommandGate,
    state: IntegratorState,
    emitter: WaypointEmitter<S>,
    scale: CommandScale,
}

impl<S: WaypointSink> VelocityControl<S> {
    /// Create the context from a configuration.
    ///
    /// An out-of-range waypoint duration is clamped to what a trajectory message
    /// can carry; NaN becomes zero.
    pub fn new(config: &VelocityControlConfig, sink: S) -> Self {
        VelocityControl {
            gate: CommandGate::new(),
            state: IntegratorState::new(),
            emitter: WaypointEmitter::new(sink, waypoint_duration(config.waypoint_duration_s)),
            scale: CommandScale {
                max_vel: config.max_vel,
                max_yawrate: config.max_yawrate,
            },
        }
    }

    /// Store the latest velocity command
    pub fn on_velocity_command(&mut self, command: VelocityCommand) {
        self.gate.update(command);
    }

    /// Advance the target on a pose sample and emit one waypoint.
    ///
    /// Returns `None` while no command has arrived, or when the seeding pose
    /// could not be decoded.
    pub fn on_pose_sample(&mut self, sample: &PoseSample, now: Duration) -> Option<Waypoint> {
        if !self.gate.has_command() {
            return None;
        }

        let command = self.gate.current_command();
        match self.state.step(sample, &command, &self.scale, now) {
            Ok(StepOutcome::Seeded) => {}
            Ok(StepOutcome::Advanced { .. }) => {
                info!("Distance Traveled: {:.3}", self.state.distance_traveled());
            }
            Err(e) => {
                warn!("Skipping pose sample, waiting for a usable initial pose: {}", e);
                return None;
            }
        }

        Some(self.emitter.emit(&self.state))
    }

    /// Integrator state
    pub fn state(&self) -> &IntegratorState {
        &self.state
    }

    /// Command gate
    pub fn gate(&self) -> &CommandGate {
        &self.gate
    }

    /// Output sink
    pub fn sink(&self) -> &S {
        self.emitter.sink()
    }

    /// Current diagnostics
    pub fn status(&self) -> VelocityControlStatus {
        VelocityControlStatus {
            has_command: self.gate.has_command(),
            initialized: self.state.is_initialized(),
            distance_traveled: self.state.distance_traveled(),
            waypoints_emitted: self.emitter.emitted(),
        }
    }
}

fn waypoint_duration(seconds: f64) -> Duration {
    let clamped = seconds.clamp(0.0, MAX_WAYPOINT_DURATION_S);
    if clamped != seconds {
        warn!("waypoint_duration_s {} out of range, using {}", seconds, clamped);
    }
    Duration::try_from_secs_f64(clamped).unwrap_or(Duration::ZERO)
}
