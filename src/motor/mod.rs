// Motor side of the differential base
//
// Provides:
// - Saturating PWM driver (duty clamping, saturation counting)
// - Raw PWM output and supply voltage interfaces
// - Differential drive kinematics (wheel to body speeds)

mod driver;
pub mod kinematics;

pub use driver::{PwmOutput, SaturatingDriver, SupplyVoltage};
pub use kinematics::{wheel_to_body, BodySpeeds, WheelSpeeds, WHEEL_BASE};
