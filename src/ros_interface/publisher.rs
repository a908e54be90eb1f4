// src/ros_interface/publisher.rs
// Publishes waypoints as single-point MultiDOFJointTrajectory messages.

use r2r::trajectory_msgs::msg::MultiDOFJointTrajectory;
use r2r::{Clock, ClockType, QosProfile};

use super::trajectory_from_waypoint;
use crate::navigation::{Waypoint, WaypointSink};
use crate::{RosConfig, VelocityControlError};

/// Trajectory publisher stamping each message with the current ROS time
pub struct TrajectoryPublisher {
    inner: r2r::Publisher<MultiDOFJointTrajectory>,
    clock: Clock,
}

impl TrajectoryPublisher {
    /// Advertise the trajectory topic from `config`
    pub fn new(node: &mut r2r::Node, config: &RosConfig) -> Result<Self, VelocityControlError> {
        let qos = QosProfile::default().keep_last(config.qos_depth);
        let inner = node.create_publisher::<MultiDOFJointTrajectory>(&config.trajectory_topic, qos)?;
        let clock = Clock::create(ClockType::RosTime)?;
        Ok(TrajectoryPublisher { inner, clock })
    }
}

impl WaypointSink for TrajectoryPublisher {
    fn send(&mut self, waypoint: &Waypoint) -> Result<(), VelocityControlError> {
        let now = self.clock.get_now()?;
        let msg = trajectory_from_waypoint(waypoint, Clock::to_builtin_time(&now));
        self.inner
            .publish(&msg)
            .map_err(|e| VelocityControlError::PublishError(e.to_string()))
    }
}
