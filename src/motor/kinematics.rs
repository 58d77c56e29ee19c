// Differential drive kinematics for the two-wheeled base
// Converts wheel linear speeds to body linear/angular speeds.

/// Distance between wheel contact points
pub const WHEEL_BASE: f32 = 0.075; // meters

/// Linear speeds of both wheels in m/s
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelSpeeds {
    pub left: f32,
    pub right: f32,
}

impl WheelSpeeds {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Body-frame speeds
///
/// `angular` is positive when turning clockwise (left wheel faster), which is
/// the direction a positive angular drive voltage produces.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodySpeeds {
    pub linear: f32,
    pub angular: f32,
}

/// Convert wheel speeds to body speeds
pub fn wheel_to_body(wheels: WheelSpeeds, wheel_base: f32) -> BodySpeeds {
    BodySpeeds {
        linear: (wheels.left + wheels.right) / 2.0,
        angular: (wheels.left - wheels.right) / wheel_base,
    }
}
