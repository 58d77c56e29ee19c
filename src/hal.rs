// Collaborator interfaces consumed by the control core
//
// The core never talks to hardware directly. Encoders, gyro, wall sensors,
// the motor driver and the tuning store are all reached through these traits.

use crate::control::ControlConstants;

/// Motor driver stage: PWM output, supply voltage and saturation tracking
pub trait MotorDriver {
    /// Driver input (supply) voltage in volts
    ///
    /// Must be strictly positive while motor control is enabled.
    fn input_voltage(&self) -> f32;

    fn power_left(&mut self, duty: i32);

    fn power_right(&mut self, duty: i32);

    /// Stop driving both motors
    fn drive_off(&mut self);

    /// Ticks of sustained PWM saturation
    fn saturation(&self) -> u32;

    fn reset_saturation(&mut self);
}

/// Odometry sources: wheel encoders and gyroscope
pub trait MotionSensors {
    /// Left wheel speed in m/s
    fn encoder_left_speed(&self) -> f32;

    /// Right wheel speed in m/s
    fn encoder_right_speed(&self) -> f32;

    /// Gyroscope yaw rate in rad/s
    fn gyro_z_radps(&self) -> f32;
}

/// Wall and obstacle sensor errors
///
/// Positive values ask for a larger angular correction.
pub trait WallSensors {
    fn side_close_error(&self) -> f32;

    fn side_far_error(&self) -> f32;

    fn front_error(&self) -> f32;

    fn diagonal_error(&self) -> f32;
}

/// Source of the current tuning, read once per tick
pub trait Tuning {
    fn control_constants(&self) -> ControlConstants;

    /// Linear acceleration limit in m/s^2
    fn linear_acceleration(&self) -> f32;

    /// Linear deceleration limit in m/s^2
    fn linear_deceleration(&self) -> f32;
}
