// core/state.rs

// Owns the running target estimate: position, heading and the distance covered
// so far. The first accepted pose seeds the estimate, later poses only act as a
// clock tick that advances it by the current command.

use log::{info, warn};
use nalgebra::Vector3;
use std::time::Duration;

use super::command::VelocityCommand;
use super::localization::{PoseSample, decode_pose};
use super::rotation::rotate_to_world;
use crate::VelocityControlError;

/// Scale factors turning command magnitudes into physical rates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandScale {
    /// Linear scale (units/s per unit command)
    pub max_vel: f64,
    /// Yaw-rate scale (rad/s per unit command)
    pub max_yawrate: f64,
}

/// What a single integration call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// State was seeded from the pose; no motion applied
    Seeded,
    /// State was advanced by the command
    Advanced {
        /// Clamped elapsed time
        dt: Duration,
        /// Distance added by this step
        step_distance: f64,
    },
}

/// Pose-seeded integrator state
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorState {
    initialized: bool,
    position: Vector3<f64>,
    heading: f64,
    distance_traveled: f64,
    last_update: Duration,
}

impl Default for IntegratorState {
    fn default() -> Self {
        IntegratorState {
            initialized: false,
            position: Vector3::zeros(),
            heading: 0.0,
            distance_traveled: 0.0,
            last_update: Duration::ZERO,
        }
    }
}

impl IntegratorState {
    /// Creates an unseeded state
    pub fn new() -> Self {
        IntegratorState::default()
    }

    /// Seeds on the first call, advances on every later one.
    ///
    /// `now` is the time since the clock's epoch. A `now` earlier than the
    /// previous call is treated as zero elapsed time.
    pub fn step(
        &mut self,
        sample: &PoseSample,
        command: &VelocityCommand,
        scale: &CommandScale,
        now: Duration,
    ) -> Result<StepOutcome, VelocityControlError> {
        if !self.initialized {
            self.seed(sample, now)?;
            return Ok(StepOutcome::Seeded);
        }
        Ok(self.advance(command, scale, now))
    }

    fn seed(&mut self, sample: &PoseSample, now: Duration) -> Result<(), VelocityControlError> {
        let decoded = decode_pose(sample)?;
        self.position = decoded.position;
        self.heading = decoded.heading;
        self.last_update = now;
        self.initialized = true;
        info!(
            "Initial pose set: x={:.3}, y={:.3}, z={:.3}, yaw={:.3}",
            self.position.x, self.position.y, self.position.z, self.heading
        );
        Ok(())
    }

    fn advance(&mut self, command: &VelocityCommand, scale: &CommandScale, now: Duration) -> StepOutcome {
        let dt = now.saturating_sub(self.last_update);
        self.last_update = now;
        let dt_s = dt.as_secs_f64();

        let velocity = rotate_to_world(command.forward, command.lateral, self.heading);
        let displacement = velocity * scale.max_vel * dt_s;

        let mut step_distance = 0.0;
        if displacement.iter().all(|v| v.is_finite()) {
            step_distance = displacement.norm();
            self.position += displacement;
            self.distance_traveled += step_distance;
        } else {
            warn!("Dropping non-finite displacement from command {:?}", command);
        }

        let dheading = scale.max_yawrate * command.yaw_rate * dt_s;
        if dheading.is_finite() {
            self.heading += dheading;
        } else {
            warn!("Dropping non-finite yaw increment from command {:?}", command);
        }

        StepOutcome::Advanced { dt, step_distance }
    }

    /// Whether position and heading have been seeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current absolute target position
    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    /// Current absolute target heading, not wrapped
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Total distance the target has moved
    pub fn distance_traveled(&self) -> f64 {
        self.distance_traveled
    }

    /// Time of the previous step
    pub fn last_update(&self) -> Duration {
        self.last_update
    }
}
