// Wall sensor feedback accumulation
//
// Four channels can be enabled independently: side close, side far, front and
// diagonal. Side close and side far feed a single combined side channel: both
// add into the same feedback value and the same integral.

use super::state::ControlState;
use crate::hal::WallSensors;

/// Feedback values gathered during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorFeedback {
    /// Combined side feedback (close + far)
    pub side: f32,
    pub front: f32,
    pub diagonal: f32,
}

/// Combined side channel
///
/// Each enabled side sub-channel adds its error to the running feedback, then
/// adds the running feedback to the shared side integral. With both enabled
/// the close error reaches the integral twice: `2 * close + far` per tick.
fn accumulate_side_feedback<W: WallSensors>(state: &ControlState, sensors: &W) -> f32 {
    let mut feedback = 0.0;
    let mut integral = state.side_sensors_integral.load();

    if state.side_sensors_close_enabled() {
        feedback += sensors.side_close_error();
        integral += feedback;
    }

    if state.side_sensors_far_enabled() {
        feedback += sensors.side_far_error();
        integral += feedback;
    }

    state.side_sensors_integral.store(integral);
    feedback
}

/// Read every enabled channel and update its integral
///
/// Disabled channels contribute zero and keep their integral frozen.
pub(crate) fn accumulate<W: WallSensors>(state: &ControlState, sensors: &W) -> SensorFeedback {
    let side = accumulate_side_feedback(state, sensors);

    let front = if state.front_sensors_enabled() {
        let error = sensors.front_error();
        state
            .front_sensors_integral
            .store(state.front_sensors_integral.load() + error);
        error
    } else {
        0.0
    };

    let diagonal = if state.diagonal_sensors_enabled() {
        let error = sensors.diagonal_error();
        state
            .diagonal_sensors_integral
            .store(state.diagonal_sensors_integral.load() + error);
        error
    } else {
        0.0
    };

    SensorFeedback {
        side,
        front,
        diagonal,
    }
}
