use serde::{Deserialize, Serialize};

/// Controller gains, supplied by the tuning source and never mutated by the core
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConstants {
    pub kp_linear: f32,
    pub kd_linear: f32,
    pub kp_angular: f32,
    pub kd_angular: f32,
    pub kp_angular_side: f32,
    pub kp_angular_front: f32,
    pub kp_angular_diagonal: f32,
    pub ki_angular_side: f32,
    pub ki_angular_front: f32,
    pub ki_angular_diagonal: f32,
}
