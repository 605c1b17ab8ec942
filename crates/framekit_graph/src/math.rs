// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rigid transform math.
//!
//! Provides [`Pose`] (translation + unit quaternion) for user-facing values
//! and [`Matrix4`] (row-major 4x4 homogeneous matrix) as the payload stored
//! on frame graph vertices. Both are `f64` throughout.

use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Quaternion norms below this are treated as degenerate
const DEGENERATE_NORM: f64 = 1e-10;

/// A rigid pose: translation plus rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation [x, y, z]
    pub position: [f64; 3],
    /// Rotation as quaternion [x, y, z, w] (Hamilton convention)
    pub rotation: [f64; 4],
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// Pose with no translation or rotation
    pub const IDENTITY: Pose = Pose {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Create a pose from a translation and quaternion [x, y, z, w].
    ///
    /// The quaternion is normalized; a zero or non-finite quaternion
    /// becomes the identity rotation.
    pub fn new(position: [f64; 3], rotation: [f64; 4]) -> Self {
        Self {
            position,
            rotation: normalize_quaternion(rotation),
        }
    }

    /// Create a pose from a translation only
    pub fn from_translation(position: [f64; 3]) -> Self {
        Self {
            position,
            rotation: Self::IDENTITY.rotation,
        }
    }

    /// Create a pose from translation and roll/pitch/yaw in radians
    pub fn from_xyz_rpy(position: [f64; 3], rpy: [f64; 3]) -> Self {
        Self {
            position,
            rotation: euler_to_quaternion(rpy[0], rpy[1], rpy[2]),
        }
    }

    /// Create a pose from `[x, y, z, roll, pitch, yaw]`
    pub fn from_array(values: [f64; 6]) -> Self {
        Self::from_xyz_rpy(
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5]],
        )
    }

    /// Roll, pitch and yaw in radians
    pub fn rpy(&self) -> [f64; 3] {
        quaternion_to_euler(self.rotation)
    }

    /// Compose two poses: `self * other`
    pub fn compose(&self, other: &Pose) -> Pose {
        let rotated = rotate_vector(self.rotation, other.position);
        Pose {
            position: [
                self.position[0] + rotated[0],
                self.position[1] + rotated[1],
                self.position[2] + rotated[2],
            ],
            rotation: normalize_quaternion(quaternion_multiply(self.rotation, other.rotation)),
        }
    }

    /// Inverse pose
    pub fn inverse(&self) -> Pose {
        let [x, y, z, w] = self.rotation;
        let inv_rotation = [-x, -y, -z, w];
        let neg = [-self.position[0], -self.position[1], -self.position[2]];
        Pose {
            position: rotate_vector(inv_rotation, neg),
            rotation: inv_rotation,
        }
    }

    /// Apply the pose to a point
    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        let rotated = rotate_vector(self.rotation, point);
        [
            rotated[0] + self.position[0],
            rotated[1] + self.position[1],
            rotated[2] + self.position[2],
        ]
    }

    /// Compare two poses within `epsilon`.
    ///
    /// `q` and `-q` describe the same rotation, so the quaternion check is
    /// sign-insensitive.
    pub fn approx_eq(&self, other: &Pose, epsilon: f64) -> bool {
        let position = self
            .position
            .iter()
            .zip(other.position.iter())
            .all(|(a, b)| (a - b).abs() < epsilon);
        let dot: f64 = self
            .rotation
            .iter()
            .zip(other.rotation.iter())
            .map(|(a, b)| a * b)
            .sum();
        position && (1.0 - dot.abs()) < epsilon
    }

    /// Check if the pose is approximately the identity
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.approx_eq(&Self::IDENTITY, epsilon)
    }
}

/// Row-major 4x4 homogeneous transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4(pub [[f64; 4]; 4]);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// Identity matrix
    pub const IDENTITY: Matrix4 = Matrix4([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Translation column
    pub fn translation(&self) -> [f64; 3] {
        [self.0[0][3], self.0[1][3], self.0[2][3]]
    }

    /// Inverse of a rigid transform.
    ///
    /// Uses the transposed rotation block rather than a general inverse, so
    /// it never divides and stays finite for near-singular input.
    pub fn rigid_inverse(&self) -> Matrix4 {
        let m = &self.0;
        let t = self.translation();
        let mut out = Matrix4::IDENTITY;
        for row in 0..3 {
            for col in 0..3 {
                out.0[row][col] = m[col][row];
            }
            out.0[row][3] = -(m[0][row] * t[0] + m[1][row] * t[1] + m[2][row] * t[2]);
        }
        out
    }

    /// Decompose into translation + rotation
    pub fn to_pose(&self) -> Pose {
        let m = &self.0;
        let rotation = matrix_to_quaternion([
            [m[0][0], m[0][1], m[0][2]],
            [m[1][0], m[1][1], m[1][2]],
            [m[2][0], m[2][1], m[2][2]],
        ]);
        Pose::new(self.translation(), rotation)
    }
}

impl From<Pose> for Matrix4 {
    fn from(pose: Pose) -> Self {
        let [x, y, z, w] = pose.rotation;
        let [tx, ty, tz] = pose.position;

        let xx = x * x;
        let yy = y * y;
        let zz = z * z;
        let xy = x * y;
        let xz = x * z;
        let yz = y * z;
        let wx = w * x;
        let wy = w * y;
        let wz = w * z;

        Matrix4([
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy), tx],
            [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx), ty],
            [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy), tz],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

impl From<&Pose> for Matrix4 {
    fn from(pose: &Pose) -> Self {
        Matrix4::from(*pose)
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut out = [[0.0; 4]; 4];
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, cell) in out_row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.0[row][k] * rhs.0[k][col]).sum();
            }
        }
        Matrix4(out)
    }
}

// Quaternion helpers

fn normalize_quaternion(q: [f64; 4]) -> [f64; 4] {
    let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if norm.is_finite() && norm > DEGENERATE_NORM {
        [q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm]
    } else {
        Pose::IDENTITY.rotation
    }
}

fn quaternion_multiply(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
    [
        a[3] * b[0] + a[0] * b[3] + a[1] * b[2] - a[2] * b[1],
        a[3] * b[1] - a[0] * b[2] + a[1] * b[3] + a[2] * b[0],
        a[3] * b[2] + a[0] * b[1] - a[1] * b[0] + a[2] * b[3],
        a[3] * b[3] - a[0] * b[0] - a[1] * b[1] - a[2] * b[2],
    ]
}

fn rotate_vector(q: [f64; 4], v: [f64; 3]) -> [f64; 3] {
    let [qx, qy, qz, qw] = q;
    let t = [
        2.0 * (qy * v[2] - qz * v[1]),
        2.0 * (qz * v[0] - qx * v[2]),
        2.0 * (qx * v[1] - qy * v[0]),
    ];
    [
        v[0] + qw * t[0] + qy * t[2] - qz * t[1],
        v[1] + qw * t[1] + qz * t[0] - qx * t[2],
        v[2] + qw * t[2] + qx * t[1] - qy * t[0],
    ]
}

fn euler_to_quaternion(roll: f64, pitch: f64, yaw: f64) -> [f64; 4] {
    let (sr, cr) = (roll / 2.0).sin_cos();
    let (sp, cp) = (pitch / 2.0).sin_cos();
    let (sy, cy) = (yaw / 2.0).sin_cos();

    [
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    ]
}

fn quaternion_to_euler(q: [f64; 4]) -> [f64; 3] {
    let [x, y, z, w] = q;

    let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));

    // Clamp at the gimbal-lock singularity
    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= 1.0 {
        std::f64::consts::FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

    [roll, pitch, yaw]
}

fn matrix_to_quaternion(m: [[f64; 3]; 3]) -> [f64; 4] {
    let trace = m[0][0] + m[1][1] + m[2][2];

    if trace > 0.0 {
        let s = 0.5 / (trace + 1.0).sqrt();
        [
            (m[2][1] - m[1][2]) * s,
            (m[0][2] - m[2][0]) * s,
            (m[1][0] - m[0][1]) * s,
            0.25 / s,
        ]
    } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
        let s = 2.0 * (1.0 + m[0][0] - m[1][1] - m[2][2]).max(0.0).sqrt();
        [
            0.25 * s,
            (m[0][1] + m[1][0]) / s,
            (m[0][2] + m[2][0]) / s,
            (m[2][1] - m[1][2]) / s,
        ]
    } else if m[1][1] > m[2][2] {
        let s = 2.0 * (1.0 + m[1][1] - m[0][0] - m[2][2]).max(0.0).sqrt();
        [
            (m[0][1] + m[1][0]) / s,
            0.25 * s,
            (m[1][2] + m[2][1]) / s,
            (m[0][2] - m[2][0]) / s,
        ]
    } else {
        let s = 2.0 * (1.0 + m[2][2] - m[0][0] - m[1][1]).max(0.0).sqrt();
        [
            (m[0][2] + m[2][0]) / s,
            (m[1][2] + m[2][1]) / s,
            0.25 * s,
            (m[1][0] - m[0][1]) / s,
        ]
    }
}
