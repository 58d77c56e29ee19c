// Message types for the command interface and telemetry

use serde::{Deserialize, Serialize};

use crate::control::ControlState;

// Command from a supervisor/teleop -> runtime
// Internally tagged: {"type": "set_target_linear_speed", "speed": 0.5}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionCommand {
    SetTargetLinearSpeed { speed: f32 },
    SetIdealAngularSpeed { speed: f32 },
    EnableMotorControl,
    DisableMotorControl,
    SideSensorsCloseControl { enabled: bool },
    SideSensorsFarControl { enabled: bool },
    FrontSensorsControl { enabled: bool },
    DiagonalSensorsControl { enabled: bool },
    DisableWallsControl,
    ResetControlErrors,
    ResetControlSpeed,
    ResetCollisionDetection,
    ResetControlAll,
    ResetMotion,
}

// Snapshot of the control state, runtime -> telemetry consumers
// Each field is read independently; fields may come from adjacent ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionTelemetry {
    pub target_linear_speed: f32,
    pub ideal_linear_speed: f32,
    pub measured_linear_speed: f32,
    pub ideal_angular_speed: f32,
    pub measured_angular_speed: f32,
    pub voltage_left: f32,
    pub voltage_right: f32,
    pub pwm_left: i32,
    pub pwm_right: i32,
    pub motor_control_enabled: bool,
    pub collision_detected: bool,
}

impl MotionTelemetry {
    /// Read the state, pairing it with the measured speeds
    pub fn capture(state: &ControlState, measured_linear: f32, measured_angular: f32) -> Self {
        Self {
            target_linear_speed: state.target_linear_speed(),
            ideal_linear_speed: state.ideal_linear_speed(),
            measured_linear_speed: measured_linear,
            ideal_angular_speed: state.ideal_angular_speed(),
            measured_angular_speed: measured_angular,
            voltage_left: state.left_motor_voltage(),
            voltage_right: state.right_motor_voltage(),
            pwm_left: state.left_pwm(),
            pwm_right: state.right_pwm(),
            motor_control_enabled: state.motor_control_enabled(),
            collision_detected: state.collision_detected(),
        }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ControlHealth {
    Idle,
    Running,
    Collision,
}

impl From<&ControlState> for ControlHealth {
    fn from(state: &ControlState) -> Self {
        if state.collision_detected() {
            ControlHealth::Collision
        } else if state.motor_control_enabled() {
            ControlHealth::Running
        } else {
            ControlHealth::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_commands() {
        let cmd: MotionCommand =
            serde_json::from_str(r#"{"type": "set_target_linear_speed", "speed": 0.5}"#).unwrap();
        assert_eq!(cmd, MotionCommand::SetTargetLinearSpeed { speed: 0.5 });

        let cmd: MotionCommand =
            serde_json::from_str(r#"{"type": "front_sensors_control", "enabled": true}"#).unwrap();
        assert_eq!(cmd, MotionCommand::FrontSensorsControl { enabled: true });

        let cmd: MotionCommand = serde_json::from_str(r#"{"type": "reset_motion"}"#).unwrap();
        assert_eq!(cmd, MotionCommand::ResetMotion);
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_str::<MotionCommand>(r#"{"type": "self_destruct"}"#).is_err());
    }

    #[test]
    fn test_health_from_state() {
        let state = ControlState::new();
        assert_eq!(ControlHealth::from(&state), ControlHealth::Idle);
        state.enable_motor_control();
        assert_eq!(ControlHealth::from(&state), ControlHealth::Running);
        state.set_collision_detected();
        assert_eq!(ControlHealth::from(&state), ControlHealth::Collision);
        assert_eq!(serde_json::to_string(&ControlHealth::Collision).unwrap(), "\"collision\"");
    }

    #[test]
    fn test_telemetry_capture() {
        let state = ControlState::new();
        state.set_target_linear_speed(0.3);
        state.enable_motor_control();
        let telemetry = MotionTelemetry::capture(&state, 0.1, -0.2);
        assert_eq!(telemetry.target_linear_speed, 0.3);
        assert_eq!(telemetry.measured_linear_speed, 0.1);
        assert_eq!(telemetry.measured_angular_speed, -0.2);
        assert!(telemetry.motor_control_enabled);
        assert!(!telemetry.collision_detected);
    }
}
