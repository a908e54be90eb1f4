//! Velocity Waypoints - velocity command to trajectory waypoint bridge
//!
//! This library turns a stream of planar velocity / yaw-rate commands into
//! absolute waypoints for a trajectory tracker. The first odometry sample seeds
//! the position and heading estimate, every following sample advances it by the
//! latest command.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod core;
pub mod navigation;
pub mod ros_interface;

// Re-export commonly used items for easier access
pub use crate::core::{
    CommandGate, IntegratorState, PoseSample, VelocityCommand, decode_pose, rotate_to_world,
};
pub use crate::navigation::{VelocityControl, Waypoint, WaypointEmitter, WaypointSink};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest waypoint time allowance a trajectory message can carry (s)
pub const MAX_WAYPOINT_DURATION_S: f64 = i32::MAX as f64;

/// Runtime configuration for the velocity control node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityControlConfig {
    /// ROS 2 node settings and topic names
    pub ros: RosConfig,
    /// Scale applied to normalized linear commands (units/s)
    pub max_vel: f64,
    /// Scale applied to normalized yaw-rate commands (rad/s)
    pub max_yawrate: f64,
    /// Time allowance attached to every emitted waypoint (s)
    pub waypoint_duration_s: f64,
    /// Take the lateral command from `linear.y` instead of forcing it to zero
    pub use_lateral: bool,
    /// Joystick axis mapping kept for compatibility with older launch files
    pub axes: AxisConfig,
}

/// ROS 2 specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosConfig {
    /// Node name
    pub node_name: String,
    /// Node namespace
    pub namespace: String,
    /// Odometry input topic
    pub pose_topic: String,
    /// Velocity command input topic
    pub command_topic: String,
    /// Trajectory output topic
    pub trajectory_topic: String,
    /// QoS history depth
    pub qos_depth: usize,
}

/// Legacy joystick axis mapping.
///
/// Only `direction_yaw` still has an effect: it flips the sign of the incoming
/// yaw-rate command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Roll axis index
    pub roll: i32,
    /// Pitch axis index
    pub pitch: i32,
    /// Yaw axis index
    pub yaw: i32,
    /// Thrust axis index
    pub thrust: i32,
    /// Roll axis direction
    pub direction_roll: i32,
    /// Pitch axis direction
    pub direction_pitch: i32,
    /// Yaw axis direction
    pub direction_yaw: i32,
    /// Thrust axis direction
    pub direction_thrust: i32,
}

impl Default for VelocityControlConfig {
    fn default() -> Self {
        VelocityControlConfig {
            ros: RosConfig::default(),
            max_vel: 1.0,
            max_yawrate: 45.0_f64.to_radians(),
            waypoint_duration_s: 1.0,
            use_lateral: false,
            axes: AxisConfig::default(),
        }
    }
}

impl Default for RosConfig {
    fn default() -> Self {
        RosConfig {
            node_name: "velocity_waypoints".to_string(),
            namespace: String::new(),
            pose_topic: "odom".to_string(),
            command_topic: "/bebop/cmd_vel".to_string(),
            trajectory_topic: "command/trajectory".to_string(),
            qos_depth: 10,
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        AxisConfig {
            roll: 3,
            pitch: 4,
            yaw: 0,
            thrust: 1,
            direction_roll: -1,
            direction_pitch: 1,
            direction_yaw: 1,
            direction_thrust: -1,
        }
    }
}

impl VelocityControlConfig {
    /// Load a configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, VelocityControlError> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: VelocityControlConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, VelocityControlError> {
        let config: VelocityControlConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the scale factors and the waypoint duration are usable
    pub fn validate(&self) -> Result<(), VelocityControlError> {
        if !self.max_vel.is_finite() || self.max_vel < 0.0 {
            return Err(VelocityControlError::ConfigError(format!(
                "max_vel must be finite and non-negative, got {}",
                self.max_vel
            )));
        }
        if !self.max_yawrate.is_finite() || self.max_yawrate < 0.0 {
            return Err(VelocityControlError::ConfigError(format!(
                "max_yawrate must be finite and non-negative, got {}",
                self.max_yawrate
            )));
        }
        if !self.waypoint_duration_s.is_finite()
            || self.waypoint_duration_s <= 0.0
            || self.waypoint_duration_s > MAX_WAYPOINT_DURATION_S
        {
            return Err(VelocityControlError::ConfigError(format!(
                "waypoint_duration_s must be in (0, {}], got {}",
                MAX_WAYPOINT_DURATION_S, self.waypoint_duration_s
            )));
        }
        if self.ros.qos_depth == 0 {
            return Err(VelocityControlError::ConfigError(
                "ros.qos_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Yaw-rate sign taken from the legacy axis mapping
    pub fn yaw_direction(&self) -> f64 {
        self.axes.direction_yaw.signum() as f64
    }
}

/// Velocity control error types
#[derive(Debug)]
pub enum VelocityControlError {
    /// ROS interface error
    RosError(String),
    /// Orientation too close to gimbal lock to extract a heading
    DegenerateOrientation {
        /// cos(phi) of the rejected orientation
        cos_phi: f64,
    },
    /// Message conversion error
    ConversionError(String),
    /// Waypoint could not be handed to the transport
    PublishError(String),
    /// Configuration error
    ConfigError(String),
}

impl std::fmt::Display for VelocityControlError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            VelocityControlError::RosError(msg) => write!(f, "ROS error: {}", msg),
            VelocityControlError::DegenerateOrientation { cos_phi } => {
                write!(f, "Degenerate orientation: cos(phi) = {:e}", cos_phi)
            }
            VelocityControlError::ConversionError(msg) => write!(f, "Conversion error: {}", msg),
            VelocityControlError::PublishError(msg) => write!(f, "Publish error: {}", msg),
            VelocityControlError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for VelocityControlError {}

impl From<r2r::Error> for VelocityControlError {
    fn from(err: r2r::Error) -> Self {
        VelocityControlError::RosError(err.to_string())
    }
}

impl From<serde_yaml::Error> for VelocityControlError {
    fn from(err: serde_yaml::Error) -> Self {
        VelocityControlError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for VelocityControlError {
    fn from(err: std::io::Error) -> Self {
        VelocityControlError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_node_parameters() {
        let config = VelocityControlConfig::default();
        assert_eq!(config.max_vel, 1.0);
        assert!((config.max_yawrate - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert_eq!(config.waypoint_duration_s, 1.0);
        assert_eq!(config.axes.direction_yaw, 1);
        assert_eq!(config.ros.trajectory_topic, "command/trajectory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = VelocityControlConfig::from_yaml_str(
            "max_vel: 2.5\nros:\n  pose_topic: /bebop/odom\n",
        )
        .unwrap();
        assert_eq!(config.max_vel, 2.5);
        assert_eq!(config.ros.pose_topic, "/bebop/odom");
        assert_eq!(config.ros.command_topic, "/bebop/cmd_vel");
        assert_eq!(config.axes, AxisConfig::default());
    }

    #[test]
    fn rejects_non_positive_waypoint_duration() {
        let err = VelocityControlConfig::from_yaml_str("waypoint_duration_s: 0.0").unwrap_err();
        assert!(matches!(err, VelocityControlError::ConfigError(_)));
    }

    #[test]
    fn rejects_oversized_waypoint_duration() {
        for yaml in ["waypoint_duration_s: 3.0e9", "waypoint_duration_s: 1.0e20"] {
            let err = VelocityControlConfig::from_yaml_str(yaml).unwrap_err();
            assert!(matches!(err, VelocityControlError::ConfigError(_)));
        }
        let config = VelocityControlConfig {
            waypoint_duration_s: MAX_WAYPOINT_DURATION_S,
            ..VelocityControlConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_negative_max_vel() {
        let config = VelocityControlConfig {
            max_vel: -1.0,
            ..VelocityControlConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn yaw_direction_follows_axis_sign() {
        let mut config = VelocityControlConfig::default();
        config.axes.direction_yaw = -1;
        assert_eq!(config.yaw_direction(), -1.0);
    }
}
