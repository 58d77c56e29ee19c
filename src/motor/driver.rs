// Saturating PWM motor driver
//
// Wraps the raw PWM output stage, clamps duties to the hardware range and
// counts how long each side has been pinned at its limit. The control core
// uses that count for collision detection.

use tracing::{debug, info, warn};

use crate::config::DRIVER_PWM_PERIOD;
use crate::hal::MotorDriver;

/// Raw PWM output stage (timer channels / H-bridge)
pub trait PwmOutput {
    /// Write a signed duty to the left motor, already within range
    fn write_left(&mut self, duty: i32);

    /// Write a signed duty to the right motor, already within range
    fn write_right(&mut self, duty: i32);
}

/// Supply voltage measurement for the driver stage
pub trait SupplyVoltage {
    /// Supply voltage in volts
    fn read_volts(&self) -> f32;
}

/// Consecutive saturated writes for one motor
#[derive(Debug, Clone, Copy, Default)]
struct SaturationCounter {
    ticks: u32,
}

impl SaturationCounter {
    /// Clamp `duty` to `±max_duty`, counting consecutive saturated writes
    fn clamp(&mut self, duty: i32, max_duty: i32) -> i32 {
        if duty >= max_duty || duty <= -max_duty {
            self.ticks = self.ticks.saturating_add(1);
            duty.clamp(-max_duty, max_duty)
        } else {
            self.ticks = 0;
            duty
        }
    }
}

/// Motor driver with PWM clamping and saturation tracking
pub struct SaturatingDriver<O, V> {
    output: O,
    supply: V,
    max_duty: i32,
    left: SaturationCounter,
    right: SaturationCounter,
}

impl<O, V> SaturatingDriver<O, V>
where
    O: PwmOutput,
    V: SupplyVoltage,
{
    /// Create a driver saturating at the full PWM period
    pub fn new(output: O, supply: V) -> Self {
        Self::with_max_duty(output, supply, DRIVER_PWM_PERIOD)
    }

    /// Create with a custom duty limit
    pub fn with_max_duty(output: O, supply: V, max_duty: i32) -> Self {
        info!("Motor driver ready (max duty {})", max_duty);
        Self {
            output,
            supply,
            max_duty,
            left: SaturationCounter::default(),
            right: SaturationCounter::default(),
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

impl<O, V> MotorDriver for SaturatingDriver<O, V>
where
    O: PwmOutput,
    V: SupplyVoltage,
{
    fn input_voltage(&self) -> f32 {
        let volts = self.supply.read_volts();
        if volts <= 0.0 {
            warn!("Non-positive supply voltage reading: {} V", volts);
        }
        volts
    }

    fn power_left(&mut self, duty: i32) {
        let duty = self.left.clamp(duty, self.max_duty);
        self.output.write_left(duty);
    }

    fn power_right(&mut self, duty: i32) {
        let duty = self.right.clamp(duty, self.max_duty);
        self.output.write_right(duty);
    }

    fn drive_off(&mut self) {
        info!("Driving motors off");
        self.output.write_left(0);
        self.output.write_right(0);
    }

    /// Longest ongoing saturation of either motor
    fn saturation(&self) -> u32 {
        self.left.ticks.max(self.right.ticks)
    }

    fn reset_saturation(&mut self) {
        debug!("Resetting driver saturation counters");
        self.left = SaturationCounter::default();
        self.right = SaturationCounter::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingOutput {
        left: Vec<i32>,
        right: Vec<i32>,
    }

    impl PwmOutput for RecordingOutput {
        fn write_left(&mut self, duty: i32) {
            self.left.push(duty);
        }
        fn write_right(&mut self, duty: i32) {
            self.right.push(duty);
        }
    }

    struct Battery(f32);

    impl SupplyVoltage for Battery {
        fn read_volts(&self) -> f32 {
            self.0
        }
    }

    fn driver() -> SaturatingDriver<RecordingOutput, Battery> {
        SaturatingDriver::with_max_duty(RecordingOutput::default(), Battery(7.4), 100)
    }

    #[test]
    fn test_passes_duty_within_range() {
        let mut driver = driver();
        driver.power_left(50);
        driver.power_right(-99);
        assert_eq!(driver.output().left, vec![50]);
        assert_eq!(driver.output().right, vec![-99]);
        assert_eq!(driver.saturation(), 0);
    }

    #[test]
    fn test_clamps_and_counts_saturation() {
        let mut driver = driver();
        for _ in 0..3 {
            driver.power_left(500);
            driver.power_right(10);
        }
        driver.power_right(-100);
        assert_eq!(driver.output().left, vec![100, 100, 100]);
        assert_eq!(driver.output().right.last(), Some(&-100));
        assert_eq!(driver.saturation(), 3, "reports the longest saturated side");
    }

    #[test]
    fn test_unsaturated_write_clears_side_counter() {
        let mut driver = driver();
        driver.power_left(200);
        driver.power_left(200);
        driver.power_left(20);
        assert_eq!(driver.saturation(), 0);
    }

    #[test]
    fn test_reset_saturation() {
        let mut driver = driver();
        driver.power_left(-200);
        driver.power_right(200);
        driver.reset_saturation();
        assert_eq!(driver.saturation(), 0);
    }

    #[test]
    fn test_drive_off_writes_zero_and_keeps_counters() {
        let mut driver = driver();
        driver.power_left(200);
        driver.drive_off();
        assert_eq!(driver.output().left, vec![100, 0]);
        assert_eq!(driver.output().right, vec![0]);
        assert_eq!(driver.saturation(), 1);
    }

    #[test]
    fn test_input_voltage_forwards_supply() {
        assert_eq!(driver().input_voltage(), 7.4);
    }
}
