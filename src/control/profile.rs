// Linear speed profile: ramp the ideal speed toward the target

/// Advance `ideal` one tick toward `target`
///
/// Accelerates by `acceleration / frequency_hz` when below the target and
/// decelerates by `deceleration / frequency_hz` when above it, never crossing
/// the target.
pub fn next_ideal_linear_speed(
    ideal: f32,
    target: f32,
    acceleration: f32,
    deceleration: f32,
    frequency_hz: f32,
) -> f32 {
    if ideal < target {
        (ideal + acceleration / frequency_hz).min(target)
    } else if ideal > target {
        (ideal - deceleration / frequency_hz).max(target)
    } else {
        ideal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HZ: f32 = 1000.0;

    /// Ticks until `ideal` reaches `target`, asserting monotonic approach
    fn ticks_to_converge(mut ideal: f32, target: f32, accel: f32, decel: f32) -> u32 {
        let mut ticks = 0;
        while ideal != target {
            let next = next_ideal_linear_speed(ideal, target, accel, decel, HZ);
            assert!(
                (next - target).abs() <= (ideal - target).abs(),
                "ramp moved away from target: {} -> {}",
                ideal,
                next
            );
            if ideal < target {
                assert!(next <= target, "overshoot while accelerating");
            } else {
                assert!(next >= target, "overshoot while decelerating");
            }
            ideal = next;
            ticks += 1;
            assert!(ticks < 100_000, "ramp did not converge");
        }
        ticks
    }

    #[test]
    fn test_no_op_when_equal() {
        assert_eq!(next_ideal_linear_speed(0.5, 0.5, 5.0, 5.0, HZ), 0.5);
    }

    #[test]
    fn test_single_step_uses_acceleration() {
        let next = next_ideal_linear_speed(0.0, 1.0, 2.0, 8.0, HZ);
        assert!((next - 0.002).abs() < 1e-7);
    }

    #[test]
    fn test_single_step_uses_deceleration() {
        let next = next_ideal_linear_speed(1.0, 0.0, 2.0, 8.0, HZ);
        assert!((next - 0.992).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_to_target() {
        assert_eq!(next_ideal_linear_speed(0.999, 1.0, 5.0, 5.0, HZ), 1.0);
        assert_eq!(next_ideal_linear_speed(-0.999, -1.0, 5.0, 5.0, HZ), -1.0);
    }

    #[test]
    fn test_convergence_within_bound() {
        let cases: [(f32, f32, f32, f32); 4] = [
            (0.0, 1.0, 5.0, 5.0),
            (1.0, 0.0, 5.0, 2.0),
            (-0.5, 0.7, 3.0, 4.0),
            (0.7, -0.5, 3.0, 4.0),
        ];
        for (ideal, target, accel, decel) in cases {
            let limit: f32 = if target > ideal { accel } else { decel };
            let bound = ((target - ideal).abs() * HZ / limit).ceil() as u32;
            let ticks = ticks_to_converge(ideal, target, accel, decel);
            // One extra tick of slack for f32 accumulation
            assert!(
                ticks <= bound + 1,
                "{} -> {}: took {} ticks, bound {}",
                ideal,
                target,
                ticks,
                bound
            );
        }
    }

    #[test]
    fn test_holds_target_after_convergence() {
        let mut ideal = 0.0;
        for _ in 0..500 {
            ideal = next_ideal_linear_speed(ideal, 0.3, 5.0, 5.0, HZ);
        }
        assert_eq!(ideal, 0.3);
        assert_eq!(next_ideal_linear_speed(ideal, 0.3, 5.0, 5.0, HZ), 0.3);
    }
}
