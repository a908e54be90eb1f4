// core/rotation.rs
// Rotates command-frame planar velocity into the world frame.

use nalgebra::Vector3;

/// Rotate `(forward, lateral)` by `heading` about the world Z axis.
///
/// The vertical component is always zero: the command schema carries a thrust
/// channel but this bridge only moves the target in the horizontal plane.
pub fn rotate_to_world(forward: f64, lateral: f64, heading: f64) -> Vector3<f64> {
    let (sin_h, cos_h) = heading.sin_cos();
    Vector3::new(
        cos_h * forward - sin_h * lateral,
        sin_h * forward + cos_h * lateral,
        0.0,
    )
}
