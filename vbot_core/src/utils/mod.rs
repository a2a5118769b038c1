// vbot_core/src/utils/mod.rs

use num_traits::Float;

/// Symmetric clamp of `x` to `[-bound, bound]`.
///
/// Saturation is a clamp, not a rescale, so re-applying it to an already
/// saturated value is a no-op.
pub fn saturate<T: Float>(x: T, bound: T) -> T {
    let bound = bound.abs();
    x.max(-bound).min(bound)
}

/// Three-way sign: `-1`, `0` or `1`.
///
/// Unlike `f64::signum`, an exact zero maps to zero. The guidance gains rely on
/// this so that a zero closing rate switches the `K1` term off instead of
/// picking an arbitrary direction.
pub fn sign<T: Float>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else if x < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// Pushes `x` away from zero so that `|result| >= floor`, keeping its sign.
///
/// An exact zero is pushed to `+floor`. Returns the adjusted value and whether
/// the clamp was applied.
pub fn clamp_away_from_zero<T: Float>(x: T, floor: T) -> (T, bool) {
    let floor = floor.abs();
    if x.abs() >= floor {
        return (x, false);
    }
    if x < T::zero() {
        (-floor, true)
    } else {
        (floor, true)
    }
}
