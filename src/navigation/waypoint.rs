// src/navigation/waypoint.rs
// Packages the integrator's target into a single waypoint and hands it to the
// output transport. Delivery is fire-and-forget: a failed send is logged and the
// next pose sample produces a fresh waypoint anyway.

use log::{debug, error};
use nalgebra::Vector3;
use std::time::Duration;

use crate::VelocityControlError;
use crate::core::IntegratorState;

/// Single absolute position/heading target with a time allowance
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Emission counter, starting at 1
    pub seq: u64,
    /// Absolute target position
    pub position: Vector3<f64>,
    /// Absolute target heading (radians)
    pub heading: f64,
    /// Time the tracker is given to reach the target
    pub time_from_start: Duration,
}

/// Output collaborator receiving waypoints
#[cfg_attr(test, mockall::automock)]
pub trait WaypointSink {
    /// Transmit one waypoint
    fn send(&mut self, waypoint: &Waypoint) -> Result<(), VelocityControlError>;
}

/// Builds waypoints from integrator state and forwards them to a sink
pub struct WaypointEmitter<S: WaypointSink> {
    sink: S,
    time_from_start: Duration,
    seq: u64,
}

impl<S: WaypointSink> WaypointEmitter<S> {
    /// Create an emitter attaching `time_from_start` to every waypoint
    pub fn new(sink: S, time_from_start: Duration) -> Self {
        WaypointEmitter {
            sink,
            time_from_start,
            seq: 0,
        }
    }

    /// Build a waypoint from `state` and send it once.
    ///
    /// The waypoint is returned whether or not the sink accepted it.
    pub fn emit(&mut self, state: &IntegratorState) -> Waypoint {
        self.seq += 1;
        let waypoint = Waypoint {
            seq: self.seq,
            position: state.position(),
            heading: state.heading(),
            time_from_start: self.time_from_start,
        };

        match self.sink.send(&waypoint) {
            Ok(()) => debug!(
                "Waypoint {} sent: x={:.3}, y={:.3}, z={:.3}, yaw={:.3}",
                waypoint.seq, waypoint.position.x, waypoint.position.y, waypoint.position.z, waypoint.heading
            ),
            Err(e) => error!("Failed to send waypoint {}: {}", waypoint.seq, e),
        }
        waypoint
    }

    /// Number of waypoints emitted so far
    pub fn emitted(&self) -> u64 {
        self.seq
    }

    /// Access the underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_state_with_fixed_duration() {
        let mut sink = MockWaypointSink::new();
        sink.expect_send()
            .withf(|wp| wp.seq == 1 && wp.time_from_start == Duration::from_secs(1))
            .times(1)
            .returning(|_| Ok(()));

        let mut emitter = WaypointEmitter::new(sink, Duration::from_secs(1));
        let waypoint = emitter.emit(&IntegratorState::new());
        assert_eq!(waypoint.position, Vector3::zeros());
        assert_eq!(emitter.emitted(), 1);
    }

    #[test]
    fn failed_send_is_not_retried() {
        let mut sink = MockWaypointSink::new();
        sink.expect_send()
            .times(2)
            .returning(|_| Err(VelocityControlError::PublishError("link down".to_string())));

        let mut emitter = WaypointEmitter::new(sink, Duration::from_millis(500));
        let state = IntegratorState::new();
        assert_eq!(emitter.emit(&state).seq, 1);
        assert_eq!(emitter.emit(&state).seq, 2);
    }
}
