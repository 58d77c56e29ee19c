// Per-tick control state
//
// Every field lives in its own atomic cell so telemetry and command contexts
// can read (and the enable/reset operations can write) while the tick driver
// runs. Atomicity is per field only: there is no multi-field snapshot, except
// that the collision latch and the enable flag are ordered against each other.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use tracing::warn;

/// `f32` stored as its bit pattern in an `AtomicU32`
#[derive(Debug, Default)]
pub(crate) struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub(crate) fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Mutable state of the motion controller
///
/// Written by the tick function and by the explicit enable/reset operations.
#[derive(Debug, Default)]
pub struct ControlState {
    pub(crate) target_linear_speed: AtomicF32,
    pub(crate) ideal_linear_speed: AtomicF32,
    pub(crate) ideal_angular_speed: AtomicF32,

    pub(crate) linear_error: AtomicF32,
    pub(crate) angular_error: AtomicF32,
    pub(crate) last_linear_error: AtomicF32,
    pub(crate) last_angular_error: AtomicF32,

    pub(crate) side_sensors_integral: AtomicF32,
    pub(crate) front_sensors_integral: AtomicF32,
    pub(crate) diagonal_sensors_integral: AtomicF32,

    pub(crate) voltage_left: AtomicF32,
    pub(crate) voltage_right: AtomicF32,
    pub(crate) pwm_left: AtomicI32,
    pub(crate) pwm_right: AtomicI32,

    pub(crate) collision_detected: AtomicBool,
    pub(crate) motor_control_enabled: AtomicBool,
    pub(crate) side_sensors_close_enabled: AtomicBool,
    pub(crate) side_sensors_far_enabled: AtomicBool,
    pub(crate) front_sensors_enabled: AtomicBool,
    pub(crate) diagonal_sensors_enabled: AtomicBool,
}

impl ControlState {
    /// All-zero, everything disabled
    pub fn new() -> Self {
        Self::default()
    }

    // === Enable switches ===

    /// Enable motor control; refused while a collision is latched
    ///
    /// Returns whether control is now enabled.
    pub fn enable_motor_control(&self) -> bool {
        if self.collision_detected.load(Ordering::SeqCst) {
            warn!("Refusing to enable motor control: collision still latched");
            return false;
        }
        self.motor_control_enabled.store(true, Ordering::SeqCst);
        // A tick may have latched a collision between the check and the store
        if self.collision_detected.load(Ordering::SeqCst) {
            self.motor_control_enabled.store(false, Ordering::SeqCst);
            warn!("Refusing to enable motor control: collision still latched");
            return false;
        }
        true
    }

    pub fn disable_motor_control(&self) {
        self.motor_control_enabled.store(false, Ordering::Relaxed);
    }

    pub fn side_sensors_close_control(&self, value: bool) {
        self.side_sensors_close_enabled.store(value, Ordering::Relaxed);
    }

    pub fn side_sensors_far_control(&self, value: bool) {
        self.side_sensors_far_enabled.store(value, Ordering::Relaxed);
    }

    pub fn front_sensors_control(&self, value: bool) {
        self.front_sensors_enabled.store(value, Ordering::Relaxed);
    }

    pub fn diagonal_sensors_control(&self, value: bool) {
        self.diagonal_sensors_enabled.store(value, Ordering::Relaxed);
    }

    /// Disable side (close and far) and front control; diagonal is left as is
    pub fn disable_walls_control(&self) {
        self.side_sensors_close_control(false);
        self.side_sensors_far_control(false);
        self.front_sensors_control(false);
    }

    // === Resets ===

    /// Zero every error and integral accumulator
    pub fn reset_control_errors(&self) {
        self.side_sensors_integral.store(0.0);
        self.front_sensors_integral.store(0.0);
        self.diagonal_sensors_integral.store(0.0);
        self.linear_error.store(0.0);
        self.angular_error.store(0.0);
        self.last_linear_error.store(0.0);
        self.last_angular_error.store(0.0);
    }

    /// Zero target and ideal speeds
    pub fn reset_control_speed(&self) {
        self.target_linear_speed.store(0.0);
        self.ideal_linear_speed.store(0.0);
        self.ideal_angular_speed.store(0.0);
    }

    /// Zero the last computed voltages and PWM duties
    pub(crate) fn reset_control_outputs(&self) {
        self.voltage_left.store(0.0);
        self.voltage_right.store(0.0);
        self.pwm_left.store(0, Ordering::Relaxed);
        self.pwm_right.store(0, Ordering::Relaxed);
    }

    /// Latch a collision; control is disabled in the same step
    pub(crate) fn set_collision_detected(&self) {
        self.collision_detected.store(true, Ordering::SeqCst);
        self.motor_control_enabled.store(false, Ordering::SeqCst);
    }

    pub(crate) fn clear_collision_detected(&self) {
        self.collision_detected.store(false, Ordering::Relaxed);
    }

    // === Setpoints ===

    /// Target linear speed in m/s
    pub fn set_target_linear_speed(&self, speed: f32) {
        self.target_linear_speed.store(speed);
    }

    /// Ideal angular speed in rad/s
    pub fn set_ideal_angular_speed(&self, speed: f32) {
        self.ideal_angular_speed.store(speed);
    }

    // === Getters ===

    pub fn target_linear_speed(&self) -> f32 {
        self.target_linear_speed.load()
    }

    pub fn ideal_linear_speed(&self) -> f32 {
        self.ideal_linear_speed.load()
    }

    pub fn ideal_angular_speed(&self) -> f32 {
        self.ideal_angular_speed.load()
    }

    pub fn linear_error(&self) -> f32 {
        self.linear_error.load()
    }

    pub fn angular_error(&self) -> f32 {
        self.angular_error.load()
    }

    pub fn side_sensors_integral(&self) -> f32 {
        self.side_sensors_integral.load()
    }

    pub fn front_sensors_integral(&self) -> f32 {
        self.front_sensors_integral.load()
    }

    pub fn diagonal_sensors_integral(&self) -> f32 {
        self.diagonal_sensors_integral.load()
    }

    pub fn left_motor_voltage(&self) -> f32 {
        self.voltage_left.load()
    }

    pub fn right_motor_voltage(&self) -> f32 {
        self.voltage_right.load()
    }

    pub fn left_pwm(&self) -> i32 {
        self.pwm_left.load(Ordering::Relaxed)
    }

    pub fn right_pwm(&self) -> i32 {
        self.pwm_right.load(Ordering::Relaxed)
    }

    pub fn collision_detected(&self) -> bool {
        self.collision_detected.load(Ordering::Relaxed)
    }

    pub fn motor_control_enabled(&self) -> bool {
        self.motor_control_enabled.load(Ordering::Relaxed)
    }

    pub fn side_sensors_close_enabled(&self) -> bool {
        self.side_sensors_close_enabled.load(Ordering::Relaxed)
    }

    pub fn side_sensors_far_enabled(&self) -> bool {
        self.side_sensors_far_enabled.load(Ordering::Relaxed)
    }

    pub fn front_sensors_enabled(&self) -> bool {
        self.front_sensors_enabled.load(Ordering::Relaxed)
    }

    pub fn diagonal_sensors_enabled(&self) -> bool {
        self.diagonal_sensors_enabled.load(Ordering::Relaxed)
    }

    /// Bit-exact dump of every field, used to verify idle ticks leave state untouched
    #[cfg(test)]
    pub(crate) fn raw_fields(&self) -> Vec<u32> {
        let floats = [
            &self.target_linear_speed,
            &self.ideal_linear_speed,
            &self.ideal_angular_speed,
            &self.linear_error,
            &self.angular_error,
            &self.last_linear_error,
            &self.last_angular_error,
            &self.side_sensors_integral,
            &self.front_sensors_integral,
            &self.diagonal_sensors_integral,
            &self.voltage_left,
            &self.voltage_right,
        ];
        let flags = [
            &self.collision_detected,
            &self.motor_control_enabled,
            &self.side_sensors_close_enabled,
            &self.side_sensors_far_enabled,
            &self.front_sensors_enabled,
            &self.diagonal_sensors_enabled,
        ];
        floats
            .iter()
            .map(|f| f.load().to_bits())
            .chain([self.left_pwm() as u32, self.right_pwm() as u32])
            .chain(flags.iter().map(|b| b.load(Ordering::Relaxed) as u32))
            .collect()
    }
}
