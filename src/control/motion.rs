// Closed-loop motion control, executed once per tick
//
// Per tick:
// 1. Ramp the ideal linear speed toward the target
// 2. Gather enabled wall sensor feedback and update the integrals
// 3. Accumulate speed errors and compute linear/angular voltages
// 4. Mix into left/right voltages, convert to PWM and drive the motors
// 5. Trip the collision latch on sustained driver saturation

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::feedback::{self, SensorFeedback};
use super::profile::next_ideal_linear_speed;
use super::pwm::voltage_to_motor_pwm;
use super::state::ControlState;
use super::ControlConstants;
use crate::config::{MAX_MOTOR_DRIVER_SATURATION_PERIOD, SYSTICK_FREQUENCY_HZ};
use crate::hal::{MotionSensors, MotorDriver, Tuning, WallSensors};

/// Shared, read-mostly view of the control state for non-tick contexts
pub type ControlHandle = Arc<ControlState>;

/// Linear and angular drive voltages before mixing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DriveVoltages {
    linear: f32,
    angular: f32,
}

impl DriveVoltages {
    /// Differential mixing: (left, right)
    fn mix(self) -> (f32, f32) {
        (self.linear + self.angular, self.linear - self.angular)
    }
}

/// Motion controller: owns the tick and the collaborators it drives
pub struct MotionControl<D, S, W, T> {
    state: ControlHandle,
    driver: D,
    sensors: S,
    walls: W,
    tuning: T,
    frequency_hz: f32,
}

impl<D, S, W, T> MotionControl<D, S, W, T>
where
    D: MotorDriver,
    S: MotionSensors,
    W: WallSensors,
    T: Tuning,
{
    /// Create a controller ticking at `SYSTICK_FREQUENCY_HZ`
    pub fn new(driver: D, sensors: S, walls: W, tuning: T) -> Self {
        Self::with_frequency(driver, sensors, walls, tuning, SYSTICK_FREQUENCY_HZ)
    }

    /// Create a controller ticking at a custom frequency
    pub fn with_frequency(driver: D, sensors: S, walls: W, tuning: T, frequency_hz: f32) -> Self {
        Self {
            state: Arc::new(ControlState::new()),
            driver,
            sensors,
            walls,
            tuning,
            frequency_hz,
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Clone a handle for telemetry or command contexts
    pub fn handle(&self) -> ControlHandle {
        Arc::clone(&self.state)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Saturation ticks above which a collision is declared
    fn saturation_limit(&self) -> f32 {
        MAX_MOTOR_DRIVER_SATURATION_PERIOD * self.frequency_hz
    }

    /// Measured linear speed in m/s (mean of both encoders)
    pub fn measured_linear_speed(&self) -> f32 {
        (self.sensors.encoder_left_speed() + self.sensors.encoder_right_speed()) / 2.0
    }

    /// Measured angular speed in rad/s
    pub fn measured_angular_speed(&self) -> f32 {
        -self.sensors.gyro_z_radps()
    }

    /// Advance the ideal linear speed one step of the speed profile
    pub fn update_ideal_linear_speed(&self) {
        let next = next_ideal_linear_speed(
            self.state.ideal_linear_speed(),
            self.state.target_linear_speed(),
            self.tuning.linear_acceleration(),
            self.tuning.linear_deceleration(),
            self.frequency_hz,
        );
        self.state.ideal_linear_speed.store(next);
    }

    /// Accumulate speed errors and compute drive voltages
    fn compute_voltages(&self, control: &ControlConstants, feedback: SensorFeedback) -> DriveVoltages {
        let state = &self.state;

        let linear_error =
            state.linear_error() + state.ideal_linear_speed() - self.measured_linear_speed();
        let angular_error =
            state.angular_error() + state.ideal_angular_speed() - self.measured_angular_speed();
        state.linear_error.store(linear_error);
        state.angular_error.store(angular_error);

        let linear = control.kp_linear * linear_error
            + control.kd_linear * (linear_error - state.last_linear_error.load());
        let angular = control.kp_angular * angular_error
            + control.kd_angular * (angular_error - state.last_angular_error.load())
            + control.kp_angular_side * feedback.side
            + control.kp_angular_front * feedback.front
            + control.kp_angular_diagonal * feedback.diagonal
            + control.ki_angular_side * state.side_sensors_integral()
            + control.ki_angular_front * state.front_sensors_integral()
            + control.ki_angular_diagonal * state.diagonal_sensors_integral();

        DriveVoltages { linear, angular }
    }

    /// Execute one control tick
    ///
    /// Does nothing at all while motor control is disabled.
    pub fn motor_control(&mut self) {
        if !self.state.motor_control_enabled() {
            return;
        }

        self.update_ideal_linear_speed();

        let feedback = feedback::accumulate(&self.state, &self.walls);
        let control = self.tuning.control_constants();
        let voltages = self.compute_voltages(&control, feedback);

        let (voltage_left, voltage_right) = voltages.mix();
        let supply = self.driver.input_voltage();
        let pwm_left = voltage_to_motor_pwm(voltage_left, supply);
        let pwm_right = voltage_to_motor_pwm(voltage_right, supply);

        self.state.voltage_left.store(voltage_left);
        self.state.voltage_right.store(voltage_right);
        self.state.pwm_left.store(pwm_left, Ordering::Relaxed);
        self.state.pwm_right.store(pwm_right, Ordering::Relaxed);

        self.driver.power_left(pwm_left);
        self.driver.power_right(pwm_right);

        self.state.last_linear_error.store(self.state.linear_error());
        self.state.last_angular_error.store(self.state.angular_error());

        self.check_collision();
    }

    /// Latch a collision on sustained saturation and stop driving into it
    fn check_collision(&mut self) {
        let saturation = self.driver.saturation();
        if saturation as f32 > self.saturation_limit() {
            warn!(
                "Collision detected: driver saturated for {} ticks, disabling motor control",
                saturation
            );
            self.state.set_collision_detected();
            self.driver.drive_off();
        }
    }

    /// Clear the collision latch and the driver saturation counter
    ///
    /// Motor control stays disabled until explicitly enabled again.
    pub fn reset_collision_detection(&mut self) {
        debug!("Resetting collision detection");
        self.state.clear_collision_detected();
        self.driver.reset_saturation();
    }

    /// Reset errors, speeds, outputs and collision detection
    ///
    /// Enable switches are left untouched.
    pub fn reset_control_all(&mut self) {
        self.state.reset_control_errors();
        self.state.reset_control_speed();
        self.state.reset_control_outputs();
        self.reset_collision_detection();
    }

    /// Return to idle: control and walls off, driver off, state reset
    pub fn reset_motion(&mut self) {
        info!("Resetting motion to idle");
        self.state.disable_motor_control();
        self.state.disable_walls_control();
        self.driver.drive_off();
        self.reset_control_all();
    }
}
