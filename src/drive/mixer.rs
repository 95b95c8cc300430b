// Arcade-drive mixer for the two-sided (skid steer) chassis
// Converts a yaw/throttle stick pair into left and right motor power.

use crate::messages::MotorPower;

/// Default mixer ceiling, full duty cycle
pub const MAX_POWER: f32 = 100.0;

fn sanitize(axis: f32) -> f32 {
    if axis.is_nan() { 0.0 } else { axis.clamp(-1.0, 1.0) }
}

/// Mix a pair of joystick axes into a pair of wheel powers
///
/// # Arguments
/// * `yaw` - Turn axis, -1.0 (left) to 1.0 (right)
/// * `throttle` - Drive axis, -1.0 (reverse) to 1.0 (forward)
/// * `max_power` - Largest magnitude either side may receive, 0 to 100
///
/// `left = throttle + yaw` and `right = throttle - yaw`, then both are scaled
/// down together whenever either exceeds 1, so a full turn at full throttle
/// keeps the ratio between the sides instead of saturating one of them.
pub fn mix(yaw: f32, throttle: f32, max_power: f32) -> MotorPower {
    let yaw = sanitize(yaw);
    let throttle = sanitize(throttle);
    let max_power = if max_power.is_nan() { 0.0 } else { max_power.clamp(0.0, MAX_POWER) };

    let left = throttle + yaw;
    let right = throttle - yaw;
    let scale = max_power / left.abs().max(right.abs()).max(1.0);

    // `as` truncates toward zero, MotorPower::new clamps
    MotorPower::new((left * scale) as i32, (right * scale) as i32)
}
