// src/main.rs
// Entry point for the velocity waypoint node: turns velocity commands into
// trajectory waypoints seeded from odometry.

// - r2r: ROS 2 node, topics and clock.
// - futures: single-threaded executor driving the subscription streams.
// - env_logger: log output, filtered with RUST_LOG.
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use log::{error, info};
use r2r::{Clock, ClockType, Context, Node};
use std::error::Error;
use std::time::Duration;
use velocity_waypoints::ros_interface::{TrajectoryPublisher, run_event_loop, subscribe_inputs};
use velocity_waypoints::{VelocityControl, VelocityControlConfig, VelocityControlError};

/// Loads the configuration, wires topics and spins until interrupted.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Optional YAML configuration path as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            VelocityControlConfig::from_yaml_file(&path)?
        }
        None => VelocityControlConfig::default(),
    };
    info!(
        "max_vel={:.3}, max_yawrate={:.3} rad/s, waypoint duration={:.2}s",
        config.max_vel, config.max_yawrate, config.waypoint_duration_s
    );

    let ctx = Context::create()?;
    let mut node = Node::create(ctx, &config.ros.node_name, &config.ros.namespace)?;

    let publisher = TrajectoryPublisher::new(&mut node, &config.ros)?;
    info!("Publishing waypoints to {}", config.ros.trajectory_topic);

    let events = subscribe_inputs(&mut node, &config.ros)?;
    info!(
        "Subscribed to {} (pose) and {} (commands)",
        config.ros.pose_topic, config.ros.command_topic
    );

    let mut clock = Clock::create(ClockType::RosTime)?;
    let now = move || clock.get_now().map_err(VelocityControlError::from);

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    spawner.spawn_local(async move {
        let mut control = VelocityControl::new(&config, publisher);
        run_event_loop(&mut control, events, now, &config).await;
        error!("Input streams closed");
    })?;

    info!("Started velocity waypoint node");
    loop {
        node.spin_once(Duration::from_millis(100));
        pool.run_until_stalled();
    }
}
