use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Vec3::new(a[0], a[1], a[2])
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quat { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let len = axis.length();
        if len == 0.0 {
            return Quat::IDENTITY;
        }
        let (s, c) = (angle * 0.5).sin_cos();
        let a = axis * (s / len);
        Quat::new(a.x, a.y, a.z, c)
    }

    pub fn norm_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    pub fn normalize(self) -> Self {
        let n = self.norm_squared().sqrt();
        if n == 0.0 || !n.is_finite() {
            return Quat::IDENTITY;
        }
        Quat::new(self.x / n, self.y / n, self.z / n, self.w / n)
    }

    pub fn conjugate(self) -> Self {
        Quat::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn inverse(self) -> Self {
        let n = self.norm_squared();
        if n == 0.0 {
            return Quat::IDENTITY;
        }
        let c = self.conjugate();
        Quat::new(c.x / n, c.y / n, c.z / n, c.w / n)
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }

    /// Same rotation, allowing for the `q` / `-q` double cover.
    pub fn approx_eq(self, other: Quat, tolerance: f64) -> bool {
        let dot = self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w;
        (1.0 - dot.abs()) <= tolerance
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn from_array(a: [f64; 4]) -> Self {
        Quat::new(a[0], a[1], a[2], a[3])
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`.
impl Mul for Quat {
    type Output = Quat;

    fn mul(self, b: Quat) -> Quat {
        let a = self;
        Quat::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Pose {
            position,
            orientation,
        }
    }

    pub fn to_arrays(&self) -> ([f64; 3], [f64; 4]) {
        (self.position.to_array(), self.orientation.to_array())
    }

    pub fn from_arrays(position: [f64; 3], orientation: [f64; 4]) -> Self {
        Pose::new(Vec3::from_array(position), Quat::from_array(orientation))
    }

    pub fn approx_eq(&self, other: &Pose, tolerance: f64) -> bool {
        (self.position - other.position).length() <= tolerance
            && self.orientation.approx_eq(other.orientation, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), FRAC_PI_2);
        let v = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(close(v, Vec3::new(0.0, 0.0, -1.0)), "{:?}", v);
    }

    #[test]
    fn test_inverse_undoes_rotation() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0), 0.7);
        let v = Vec3::new(0.3, -1.2, 4.0);
        assert!(close(q.inverse().rotate(q.rotate(v)), v));
        assert!((q * q.inverse()).approx_eq(Quat::IDENTITY, 1e-12));
    }

    #[test]
    fn test_product_order() {
        let yaw = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), FRAC_PI_2);
        let pitch = Quat::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), FRAC_PI_2);
        let v = Vec3::new(0.0, 0.0, 1.0);
        assert!(close((yaw * pitch).rotate(v), yaw.rotate(pitch.rotate(v))));
        assert!(!close((yaw * pitch).rotate(v), (pitch * yaw).rotate(v)));
    }

    #[test]
    fn test_double_cover_equality() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), 1.0);
        let neg = Quat::new(-q.x, -q.y, -q.z, -q.w);
        assert!(q.approx_eq(neg, 1e-12));
    }

    #[test]
    fn test_pose_arrays() {
        let pose = Pose::new(Vec3::new(0.1, 1.2, -0.4), Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.3));
        let (p, q) = pose.to_arrays();
        assert_eq!(Pose::from_arrays(p, q), pose);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(Quat::from_axis_angle(Vec3::ZERO, 1.0), Quat::IDENTITY);
        assert_eq!(Quat::new(0.0, 0.0, 0.0, 0.0).normalize(), Quat::IDENTITY);
    }
}
