// core/command.rs

// Holds the most recent velocity command and whether one has arrived yet.
// Pose samples are ignored until the gate opens, so a zero-initialised command
// never causes the target to drift.

use log::info;

/// Velocity command in the commanding operator's frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    /// Forward velocity (normalized or physical)
    pub forward: f64,
    /// Lateral velocity, positive to the left
    pub lateral: f64,
    /// Vertical velocity; carried by the schema but not integrated
    pub vertical: f64,
    /// Yaw-rate, positive counter-clockwise
    pub yaw_rate: f64,
}

impl VelocityCommand {
    /// Command with forward velocity and yaw-rate only
    pub fn planar(forward: f64, yaw_rate: f64) -> Self {
        VelocityCommand {
            forward,
            yaw_rate,
            ..VelocityCommand::default()
        }
    }
}

/// Latest-value store for velocity commands
#[derive(Debug, Default)]
pub struct CommandGate {
    latest: VelocityCommand,
    has_command: bool,
}

impl CommandGate {
    /// Creates a closed gate
    pub fn new() -> Self {
        CommandGate::default()
    }

    /// Replaces the stored command and opens the gate
    pub fn update(&mut self, command: VelocityCommand) {
        if !self.has_command {
            info!("First velocity command received, integration enabled");
        }
        self.latest = command;
        self.has_command = true;
    }

    /// Whether any command has been received
    pub fn has_command(&self) -> bool {
        self.has_command
    }

    /// The most recently received command
    pub fn current_command(&self) -> VelocityCommand {
        self.latest
    }
}
