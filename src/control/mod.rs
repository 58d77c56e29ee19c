// Motion control core for the two-wheeled base
//
// Provides:
// - Control state with field-level atomic access
// - Linear speed profile (acceleration/deceleration ramp)
// - Wall sensor feedback accumulation
// - PD speed control cascaded with P+I sensor control, differential mixing
// - Supply-compensated voltage to PWM conversion
// - Collision detection from sustained driver saturation

mod constants;
pub mod feedback;
mod motion;
pub mod profile;
pub mod pwm;
mod state;

pub use constants::ControlConstants;
pub use feedback::SensorFeedback;
pub use motion::{ControlHandle, MotionControl};
pub use profile::next_ideal_linear_speed;
pub use pwm::voltage_to_motor_pwm;
pub use state::ControlState;
