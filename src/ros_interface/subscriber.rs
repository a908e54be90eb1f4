// src/ros_interface/subscriber.rs
// Subscribes to odometry and velocity commands and merges both into one event
// stream, so a single task sees every input in arrival order.

use futures::stream::{self, Stream, StreamExt};
use r2r::QosProfile;
use r2r::geometry_msgs::msg::Twist;
use r2r::nav_msgs::msg::Odometry;

use crate::{RosConfig, VelocityControlError};

/// One inbound message
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Odometry sample from the pose topic
    Pose(Odometry),
    /// Velocity command from the command topic
    Command(Twist),
}

/// Subscribe to the pose and command topics from `config`.
///
/// The returned stream borrows neither `node` nor `config`, so the node can
/// keep spinning while the stream is consumed.
pub fn subscribe_inputs(
    node: &mut r2r::Node,
    config: &RosConfig,
) -> Result<impl Stream<Item = InputEvent> + Unpin + use<>, VelocityControlError> {
    let qos = QosProfile::default().keep_last(config.qos_depth);

    let poses = node.subscribe::<Odometry>(&config.pose_topic, qos.clone())?;
    let commands = node.subscribe::<Twist>(&config.command_topic, qos)?;

    Ok(merge_inputs(poses, commands))
}

/// Interleave pose and command streams into one event stream
pub fn merge_inputs<P, C>(poses: P, commands: C) -> impl Stream<Item = InputEvent> + Unpin + use<P, C>
where
    P: Stream<Item = Odometry> + Unpin,
    C: Stream<Item = Twist> + Unpin,
{
    stream::select(poses.map(InputEvent::Pose), commands.map(InputEvent::Command))
}
