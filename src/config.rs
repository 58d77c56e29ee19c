// Tick frequency, driver limits, topics
use std::time::Duration;

// Control tick frequency (systick)
pub const SYSTICK_FREQUENCY_HZ: f32 = 1000.0;

// PWM period of the motor driver timer (full-scale duty)
pub const DRIVER_PWM_PERIOD: i32 = 1024;

// Sustained saturation (seconds) interpreted as a collision
pub const MAX_MOTOR_DRIVER_SATURATION_PERIOD: f32 = 0.1;

// Default speed profile limits (m/s^2)
pub const DEFAULT_LINEAR_ACCELERATION: f32 = 5.0;
pub const DEFAULT_LINEAR_DECELERATION: f32 = 5.0;

// Publish telemetry once every N ticks (50 Hz at 1 kHz tick)
pub const TELEMETRY_DIVIDER: u32 = 20;

// Zenoh topics
pub const TOPIC_CMD_MOTION: &str = "diffbot/cmd/motion"; // commands
pub const TOPIC_TELEMETRY: &str = "diffbot/state/motion"; // control telemetry
pub const TOPIC_HEALTH: &str = "diffbot/state/health"; // health status

/// Tick period for a given frequency
pub fn tick_period(frequency_hz: f32) -> Duration {
    Duration::from_secs_f32(1.0 / frequency_hz)
}
