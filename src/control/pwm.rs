// Voltage to PWM duty conversion

use crate::config::DRIVER_PWM_PERIOD;

/// Convert a voltage to the motor PWM duty that produces it
///
/// The duty is scaled by the measured supply voltage to compensate for battery
/// sag or converter drops. `supply_voltage` must be positive; the result is
/// truncated toward zero.
pub fn voltage_to_motor_pwm(voltage: f32, supply_voltage: f32) -> i32 {
    (voltage / supply_voltage * DRIVER_PWM_PERIOD as f32) as i32
}
