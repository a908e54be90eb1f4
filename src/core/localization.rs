// core/localization.rs

// Extracts an absolute position and heading from a pose sample. The heading is
// the psi angle of a Z-X-Y style Euler decomposition of the rotation matrix.

use log::debug;
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

use crate::VelocityControlError;

/// Below this |cos(phi)| the yaw extraction is considered gimbal locked
pub const GIMBAL_LOCK_EPSILON: f64 = 1e-6;

/// One observation of the vehicle's absolute position and orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    /// Position in the world frame
    pub position: Vector3<f64>,
    /// Orientation in the world frame
    pub orientation: Rotation3<f64>,
}

/// Output of the pose decoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPose {
    /// Position copied from the sample
    pub position: Vector3<f64>,
    /// Heading (yaw) in radians
    pub heading: f64,
}

impl PoseSample {
    /// Build a sample from a position and a rotation
    pub fn new(position: Vector3<f64>, orientation: Rotation3<f64>) -> Self {
        PoseSample {
            position,
            orientation,
        }
    }

    /// Build a sample from a position and a unit quaternion
    pub fn from_quaternion(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        PoseSample::new(position, orientation.to_rotation_matrix())
    }

    /// Build a sample from a rotation matrix. The matrix is taken as-is, so a
    /// non-orthonormal input yields a meaningless heading.
    pub fn from_matrix(position: Vector3<f64>, matrix: Matrix3<f64>) -> Self {
        PoseSample::new(position, Rotation3::from_matrix_unchecked(matrix))
    }
}

/// Decode the absolute position and heading of a pose sample.
///
/// Returns [`VelocityControlError::DegenerateOrientation`] when the pitch-like
/// angle phi is close enough to ±90° that the heading is undefined.
pub fn decode_pose(sample: &PoseSample) -> Result<DecodedPose, VelocityControlError> {
    let dcm = sample.orientation.matrix();

    // Rounding can push the entry just outside asin's domain
    let phi = dcm[(2, 1)].clamp(-1.0, 1.0).asin();
    let cos_phi = phi.cos();
    if cos_phi.abs() < GIMBAL_LOCK_EPSILON {
        return Err(VelocityControlError::DegenerateOrientation { cos_phi });
    }

    let heading = (-dcm[(0, 1)] / cos_phi).atan2(dcm[(1, 1)] / cos_phi);
    debug!("Decoded pose: phi={:.4}, heading={:.4}", phi, heading);

    Ok(DecodedPose {
        position: sample.position,
        heading,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[rstest]
    #[case(0.0)]
    #[case(0.3)]
    #[case(-1.2)]
    #[case(FRAC_PI_2)]
    #[case(3.0)]
    #[case(-3.0)]
    fn recovers_pure_yaw(#[case] yaw: f64) {
        let sample = PoseSample::from_quaternion(
            Vector3::new(1.0, -2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
        );
        let decoded = decode_pose(&sample).unwrap();
        assert_relative_eq!(decoded.heading, yaw, epsilon = 1e-9);
        assert_eq!(decoded.position, Vector3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn yaw_survives_moderate_tilt() {
        // Rotation about the body X axis after yaw keeps psi unchanged
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.7);
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.4);
        let sample = PoseSample::from_quaternion(Vector3::zeros(), yaw * tilt);
        let decoded = decode_pose(&sample).unwrap();
        assert_relative_eq!(decoded.heading, 0.7, epsilon = 1e-9);
    }

    #[test]
    fn gimbal_lock_is_reported() {
        let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
        let sample = PoseSample::new(Vector3::zeros(), tilt);
        let err = decode_pose(&sample).unwrap_err();
        assert!(matches!(err, VelocityControlError::DegenerateOrientation { .. }));
    }

    #[test]
    fn accepts_raw_matrix() {
        let matrix = Matrix3::new(
            0.0, -1.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0,
        );
        let sample = PoseSample::from_matrix(Vector3::zeros(), matrix);
        assert_relative_eq!(decode_pose(&sample).unwrap().heading, PI / 2.0, epsilon = 1e-12);
    }
}
