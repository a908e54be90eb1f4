//! ROS 2 interface for the velocity bridge
//!
//! This module handles all communication with ROS 2:
//! - Converting odometry and twist messages into core types
//! - Publishing waypoints as trajectory messages
//! - Driving the velocity control context from the merged input stream

mod publisher;
mod subscriber;

use futures::stream::{Stream, StreamExt};
use log::{debug, warn};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use r2r::builtin_interfaces::msg::{Duration as DurationMsg, Time};
use r2r::geometry_msgs::msg::{Transform, Twist};
use r2r::nav_msgs::msg::Odometry;
use r2r::std_msgs::msg::Header;
use r2r::trajectory_msgs::msg::{MultiDOFJointTrajectory, MultiDOFJointTrajectoryPoint};
use std::time::Duration;

pub use publisher::*;
pub use subscriber::*;

use crate::core::{PoseSample, VelocityCommand};
use crate::navigation::{VelocityControl, Waypoint, WaypointSink};
use crate::{VelocityControlConfig, VelocityControlError};

/// Joint name the trajectory tracker expects for the vehicle body
pub const BASE_LINK: &str = "base_link";

/// Minimum quaternion norm accepted from odometry
const MIN_QUATERNION_NORM: f64 = 1e-9;

/// Convert an odometry message into a pose sample.
///
/// The orientation quaternion is normalized; a zero or non-finite quaternion is
/// rejected.
pub fn pose_from_odometry(msg: &Odometry) -> Result<PoseSample, VelocityControlError> {
    let p = &msg.pose.pose.position;
    let q = &msg.pose.pose.orientation;

    let position = Vector3::new(p.x, p.y, p.z);
    if !position.iter().all(|v| v.is_finite()) {
        return Err(VelocityControlError::ConversionError(format!(
            "non-finite odometry position {:?}",
            position
        )));
    }

    let orientation = UnitQuaternion::try_new(Quaternion::new(q.w, q.x, q.y, q.z), MIN_QUATERNION_NORM)
        .filter(|uq| uq.coords.iter().all(|v| v.is_finite()))
        .ok_or_else(|| {
            VelocityControlError::ConversionError(format!(
                "invalid odometry orientation (x={}, y={}, z={}, w={})",
                q.x, q.y, q.z, q.w
            ))
        })?;

    Ok(PoseSample::from_quaternion(position, orientation))
}

/// Convert a twist into a velocity command.
///
/// Forward comes from `linear.x`, yaw-rate from `angular.z` signed by the yaw
/// axis direction. Lateral is only read when `use_lateral` is set.
pub fn command_from_twist(msg: &Twist, config: &VelocityControlConfig) -> VelocityCommand {
    VelocityCommand {
        forward: msg.linear.x,
        lateral: if config.use_lateral { msg.linear.y } else { 0.0 },
        vertical: msg.linear.z,
        yaw_rate: msg.angular.z * config.yaw_direction(),
    }
}

/// Build the single-point trajectory message for `waypoint`
pub fn trajectory_from_waypoint(waypoint: &Waypoint, stamp: Time) -> MultiDOFJointTrajectory {
    let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), waypoint.heading);

    let mut transform = Transform::default();
    transform.translation.x = waypoint.position.x;
    transform.translation.y = waypoint.position.y;
    transform.translation.z = waypoint.position.z;
    transform.rotation.x = rotation.i;
    transform.rotation.y = rotation.j;
    transform.rotation.z = rotation.k;
    transform.rotation.w = rotation.w;

    let point = MultiDOFJointTrajectoryPoint {
        transforms: vec![transform],
        velocities: vec![Twist::default()],
        accelerations: vec![Twist::default()],
        time_from_start: DurationMsg {
            sec: i32::try_from(waypoint.time_from_start.as_secs()).unwrap_or(i32::MAX),
            nanosec: waypoint.time_from_start.subsec_nanos(),
        },
    };

    MultiDOFJointTrajectory {
        header: Header {
            stamp,
            frame_id: String::new(),
        },
        joint_names: vec![BASE_LINK.to_string()],
        points: vec![point],
    }
}

/// Dispatch one inbound message to the context.
///
/// `now` is only read for pose events. Returns the waypoint emitted, if any.
pub fn handle_event<S, C>(
    control: &mut VelocityControl<S>,
    event: InputEvent,
    now: &mut C,
    config: &VelocityControlConfig,
) -> Result<Option<Waypoint>, VelocityControlError>
where
    S: WaypointSink,
    C: FnMut() -> Result<Duration, VelocityControlError>,
{
    match event {
        InputEvent::Command(twist) => {
            let command = command_from_twist(&twist, config);
            debug!("Velocity command: {:?}", command);
            control.on_velocity_command(command);
            Ok(None)
        }
        InputEvent::Pose(odom) => match pose_from_odometry(&odom) {
            Ok(sample) => Ok(control.on_pose_sample(&sample, now()?)),
            Err(e) => {
                warn!("Dropping odometry sample: {}", e);
                Ok(None)
            }
        },
    }
}

/// Consume `events` until the stream ends, dispatching each one in order.
///
/// A clock failure is logged and the event skipped.
pub async fn run_event_loop<S, E, C>(
    control: &mut VelocityControl<S>,
    mut events: E,
    mut now: C,
    config: &VelocityControlConfig,
) where
    S: WaypointSink,
    E: Stream<Item = InputEvent> + Unpin,
    C: FnMut() -> Result<Duration, VelocityControlError>,
{
    while let Some(event) = events.next().await {
        if let Err(e) = handle_event(control, event, &mut now, config) {
            warn!("Failed to handle input event: {}", e);
        }
    }
}
