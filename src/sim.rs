// Simulated two-wheeled plant
//
// Lets the runtime close the loop without hardware. Each wheel is a
// first-order system driven by the applied voltage; an optional obstacle pins
// both wheels at zero speed so a sustained push saturates the driver.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::config::DRIVER_PWM_PERIOD;
use crate::hal::{MotionSensors, WallSensors};
use crate::motor::{wheel_to_body, PwmOutput, SupplyVoltage, WheelSpeeds, WHEEL_BASE};

/// Wheel speed per applied volt at steady state (m/s/V)
pub const SPEED_PER_VOLT: f32 = 0.25;

/// Wheel response time constant (seconds)
pub const WHEEL_TIME_CONSTANT: f32 = 0.05;

/// Nominal battery voltage
pub const NOMINAL_SUPPLY_VOLTAGE: f32 = 7.4;

/// Wall sensor errors reported by the simulation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallErrors {
    pub side_close: f32,
    pub side_far: f32,
    pub front: f32,
    pub diagonal: f32,
}

#[derive(Debug)]
struct Plant {
    duty_left: i32,
    duty_right: i32,
    wheels: WheelSpeeds,
    supply_voltage: f32,
    blocked: bool,
    walls: WallErrors,
}

impl Plant {
    fn applied_voltage(&self, duty: i32) -> f32 {
        duty as f32 / DRIVER_PWM_PERIOD as f32 * self.supply_voltage
    }

    fn step(&mut self, dt: f32) {
        if self.blocked {
            self.wheels = WheelSpeeds::zero();
            return;
        }
        let alpha = (dt / WHEEL_TIME_CONSTANT).min(1.0);
        let target_left = self.applied_voltage(self.duty_left) * SPEED_PER_VOLT;
        let target_right = self.applied_voltage(self.duty_right) * SPEED_PER_VOLT;
        self.wheels.left += (target_left - self.wheels.left) * alpha;
        self.wheels.right += (target_right - self.wheels.right) * alpha;
    }
}

/// Shared handle to the simulated robot
///
/// Clones refer to the same plant, so one clone can act as the PWM output
/// while another serves the sensors.
#[derive(Debug, Clone)]
pub struct SimulatedRobot {
    plant: Arc<Mutex<Plant>>,
}

impl Default for SimulatedRobot {
    fn default() -> Self {
        Self::new(NOMINAL_SUPPLY_VOLTAGE)
    }
}

impl SimulatedRobot {
    pub fn new(supply_voltage: f32) -> Self {
        Self {
            plant: Arc::new(Mutex::new(Plant {
                duty_left: 0,
                duty_right: 0,
                wheels: WheelSpeeds::zero(),
                supply_voltage,
                blocked: false,
                walls: WallErrors::default(),
            })),
        }
    }

    fn plant(&self) -> MutexGuard<'_, Plant> {
        // A poisoned lock only means a panicking reader; the plant is still usable
        self.plant.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Advance the plant by `dt` seconds
    pub fn step(&self, dt: f32) {
        self.plant().step(dt);
    }

    /// Place or remove an obstacle that stops both wheels
    pub fn set_blocked(&self, blocked: bool) {
        debug!("Simulated obstacle: {}", blocked);
        self.plant().blocked = blocked;
    }

    pub fn set_wall_errors(&self, walls: WallErrors) {
        self.plant().walls = walls;
    }

    pub fn set_supply_voltage(&self, volts: f32) {
        self.plant().supply_voltage = volts;
    }

    pub fn wheel_speeds(&self) -> WheelSpeeds {
        self.plant().wheels
    }

    /// Last duties written by the driver (left, right)
    pub fn duties(&self) -> (i32, i32) {
        let plant = self.plant();
        (plant.duty_left, plant.duty_right)
    }
}

impl PwmOutput for SimulatedRobot {
    fn write_left(&mut self, duty: i32) {
        self.plant().duty_left = duty;
    }

    fn write_right(&mut self, duty: i32) {
        self.plant().duty_right = duty;
    }
}

impl SupplyVoltage for SimulatedRobot {
    fn read_volts(&self) -> f32 {
        self.plant().supply_voltage
    }
}

impl MotionSensors for SimulatedRobot {
    fn encoder_left_speed(&self) -> f32 {
        self.plant().wheels.left
    }

    fn encoder_right_speed(&self) -> f32 {
        self.plant().wheels.right
    }

    /// Counter-clockwise positive yaw rate
    fn gyro_z_radps(&self) -> f32 {
        -wheel_to_body(self.plant().wheels, WHEEL_BASE).angular
    }
}

impl WallSensors for SimulatedRobot {
    fn side_close_error(&self) -> f32 {
        self.plant().walls.side_close
    }

    fn side_far_error(&self) -> f32 {
        self.plant().walls.side_far
    }

    fn front_error(&self) -> f32 {
        self.plant().walls.front
    }

    fn diagonal_error(&self) -> f32 {
        self.plant().walls.diagonal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlConstants, MotionControl};
    use crate::hal::MotorDriver;
    use crate::motor::SaturatingDriver;
    use crate::tuning::StaticTuning;

    const DT: f32 = 0.001;

    fn simulated_control(
        robot: &SimulatedRobot,
        constants: ControlConstants,
    ) -> MotionControl<SaturatingDriver<SimulatedRobot, SimulatedRobot>, SimulatedRobot, SimulatedRobot, StaticTuning>
    {
        let driver = SaturatingDriver::new(robot.clone(), robot.clone());
        let tuning = StaticTuning {
            constants,
            ..Default::default()
        };
        MotionControl::with_frequency(driver, robot.clone(), robot.clone(), tuning, 1.0 / DT)
    }

    #[test]
    fn test_wheels_follow_duty() {
        let mut robot = SimulatedRobot::new(8.0);
        robot.write_left(DRIVER_PWM_PERIOD / 2);
        robot.write_right(DRIVER_PWM_PERIOD / 2);
        for _ in 0..1000 {
            robot.step(DT);
        }
        // 4 V applied -> 1 m/s steady state
        let wheels = robot.wheel_speeds();
        assert!((wheels.left - 1.0).abs() < 1e-3, "left={}", wheels.left);
        assert!((wheels.right - 1.0).abs() < 1e-3);
        assert!(robot.gyro_z_radps().abs() < 1e-6);
    }

    #[test]
    fn test_gyro_sign_matches_controller_convention() {
        let mut robot = SimulatedRobot::new(8.0);
        robot.write_left(DRIVER_PWM_PERIOD / 2);
        robot.write_right(0);
        for _ in 0..100 {
            robot.step(DT);
        }
        // Left faster -> clockwise -> negative CCW gyro reading
        assert!(robot.gyro_z_radps() < 0.0);
    }

    #[test]
    fn test_closed_loop_tracks_target_speed() {
        let robot = SimulatedRobot::default();
        let mut control = simulated_control(
            &robot,
            ControlConstants {
                kp_linear: 2.0,
                kd_linear: 10.0,
                kp_angular: 0.5,
                ..Default::default()
            },
        );
        control.state().set_target_linear_speed(0.5);
        control.state().enable_motor_control();

        for _ in 0..3000 {
            robot.step(DT);
            control.motor_control();
        }

        assert_eq!(control.state().ideal_linear_speed(), 0.5);
        let measured = control.measured_linear_speed();
        assert!((measured - 0.5).abs() < 0.05, "measured {}", measured);
        assert!(!control.state().collision_detected());
    }

    #[test]
    fn test_obstacle_trips_collision() {
        let robot = SimulatedRobot::default();
        let mut control = simulated_control(
            &robot,
            ControlConstants {
                kp_linear: 5.0,
                ..Default::default()
            },
        );
        robot.set_blocked(true);
        control.state().set_target_linear_speed(0.5);
        control.state().enable_motor_control();

        let mut ticks = 0;
        while !control.state().collision_detected() && ticks < 5000 {
            robot.step(DT);
            control.motor_control();
            ticks += 1;
        }

        assert!(control.state().collision_detected(), "collision never detected");
        assert!(!control.state().motor_control_enabled());
        assert_eq!(robot.duties(), (0, 0), "motors must be off after a collision");

        // Further ticks do not power the motors again
        for _ in 0..10 {
            robot.step(DT);
            control.motor_control();
        }
        assert_eq!(robot.duties(), (0, 0));

        control.reset_motion();
        assert_eq!(robot.duties(), (0, 0));
        assert_eq!(control.driver().saturation(), 0);
        assert!(!control.state().collision_detected());
    }
}
