use core::ops::Mul;

use super::{Vec2, Vec3};

/// `1 / d`, or `0` when `d == 0`.
///
/// Degenerate projection bounds therefore collapse an axis (a singular matrix)
/// instead of filling the matrix with infinities.
#[inline]
fn recip_or_zero(d: f32) -> f32 {
    if d == 0.0 { 0.0 } else { 1.0 / d }
}

/// Treats zero and non-finite determinants alike: both have no usable inverse.
#[inline]
fn is_invertible(det: f32) -> bool {
    det != 0.0 && det.is_finite()
}

// ── Matrix3 ───────────────────────────────────────────────────────────────

/// 3x3 row-major matrix for 2D homogeneous transforms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix3 {
    m: [[f32; 3]; 3],
}

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3 {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[inline]
    pub const fn from_rows(m: [[f32; 3]; 3]) -> Self {
        Self { m }
    }

    #[inline]
    pub const fn rows(&self) -> &[[f32; 3]; 3] {
        &self.m
    }

    /// Maps `[left, right] x [bottom, top]` onto `[-1, 1] x [-1, 1]`.
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        let sx = recip_or_zero(right - left);
        let sy = recip_or_zero(top - bottom);
        Self::from_rows([
            [2.0 * sx, 0.0, -(right + left) * sx],
            [0.0, 2.0 * sy, -(top + bottom) * sy],
            [0.0, 0.0, 1.0],
        ])
    }

    pub fn determinant(&self) -> f32 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Returns the inverse, or the identity when the matrix is singular.
    pub fn inverse(&self) -> Self {
        let det = self.determinant();
        if !is_invertible(det) {
            return Self::IDENTITY;
        }

        let m = &self.m;
        let d = 1.0 / det;
        Self::from_rows([
            [
                d * (m[1][1] * m[2][2] - m[1][2] * m[2][1]),
                d * (m[0][2] * m[2][1] - m[0][1] * m[2][2]),
                d * (m[0][1] * m[1][2] - m[0][2] * m[1][1]),
            ],
            [
                d * (m[1][2] * m[2][0] - m[1][0] * m[2][2]),
                d * (m[0][0] * m[2][2] - m[0][2] * m[2][0]),
                d * (m[0][2] * m[1][0] - m[0][0] * m[1][2]),
            ],
            [
                d * (m[1][0] * m[2][1] - m[1][1] * m[2][0]),
                d * (m[0][1] * m[2][0] - m[0][0] * m[2][1]),
                d * (m[0][0] * m[1][1] - m[0][1] * m[1][0]),
            ],
        ])
    }

    /// Transforms a point, dividing by the homogeneous coordinate when it is
    /// neither 1 nor 0.
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let m = &self.m;
        let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
        let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];

        if w != 1.0 && w != 0.0 {
            Vec2::new(x / w, y / w)
        } else {
            Vec2::new(x, y)
        }
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        let mut out = [[0.0f32; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[r][k] * rhs.m[k][c]).sum();
            }
        }
        Matrix3::from_rows(out)
    }
}

// ── Matrix4 ───────────────────────────────────────────────────────────────

/// 4x4 row-major matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix4 {
    m: [[f32; 4]; 4],
}

impl Matrix4 {
    pub const IDENTITY: Matrix4 = Matrix4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    #[inline]
    pub const fn from_rows(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    #[inline]
    pub const fn rows(&self) -> &[[f32; 4]; 4] {
        &self.m
    }

    /// Orthographic projection of the box `[left, right] x [bottom, top] x [-1, 1]`
    /// onto clip space. `z = 0` stays at `0`, which is inside wgpu's `[0, 1]`
    /// depth range.
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self::ortho_depth(left, right, bottom, top, -1.0, 1.0)
    }

    pub fn ortho_depth(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let sx = recip_or_zero(right - left);
        let sy = recip_or_zero(top - bottom);
        let sz = recip_or_zero(far - near);
        Self::from_rows([
            [2.0 * sx, 0.0, 0.0, -(right + left) * sx],
            [0.0, 2.0 * sy, 0.0, -(top + bottom) * sy],
            [0.0, 0.0, -2.0 * sz, -(far + near) * sz],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn determinant(&self) -> f32 {
        let (s, c) = self.minors();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// Returns the inverse, or the identity when the matrix is singular.
    ///
    /// The identity fallback is defined behavior: callers never see NaN or
    /// infinite entries from a degenerate projection.
    pub fn inverse(&self) -> Self {
        let (s, c) = self.minors();
        let det = s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0];
        if !is_invertible(det) {
            return Self::IDENTITY;
        }

        let a = &self.m;
        let d = 1.0 / det;
        Self::from_rows([
            [
                d * (a[1][1] * c[5] - a[1][2] * c[4] + a[1][3] * c[3]),
                d * (-a[0][1] * c[5] + a[0][2] * c[4] - a[0][3] * c[3]),
                d * (a[3][1] * s[5] - a[3][2] * s[4] + a[3][3] * s[3]),
                d * (-a[2][1] * s[5] + a[2][2] * s[4] - a[2][3] * s[3]),
            ],
            [
                d * (-a[1][0] * c[5] + a[1][2] * c[2] - a[1][3] * c[1]),
                d * (a[0][0] * c[5] - a[0][2] * c[2] + a[0][3] * c[1]),
                d * (-a[3][0] * s[5] + a[3][2] * s[2] - a[3][3] * s[1]),
                d * (a[2][0] * s[5] - a[2][2] * s[2] + a[2][3] * s[1]),
            ],
            [
                d * (a[1][0] * c[4] - a[1][1] * c[2] + a[1][3] * c[0]),
                d * (-a[0][0] * c[4] + a[0][1] * c[2] - a[0][3] * c[0]),
                d * (a[3][0] * s[4] - a[3][1] * s[2] + a[3][3] * s[0]),
                d * (-a[2][0] * s[4] + a[2][1] * s[2] - a[2][3] * s[0]),
            ],
            [
                d * (-a[1][0] * c[3] + a[1][1] * c[1] - a[1][2] * c[0]),
                d * (a[0][0] * c[3] - a[0][1] * c[1] + a[0][2] * c[0]),
                d * (-a[3][0] * s[3] + a[3][1] * s[1] - a[3][2] * s[0]),
                d * (a[2][0] * s[3] - a[2][1] * s[1] + a[2][2] * s[0]),
            ],
        ])
    }

    /// 2x2 minors of the top two rows (`s`) and bottom two rows (`c`).
    fn minors(&self) -> ([f32; 6], [f32; 6]) {
        let a = &self.m;
        let s = [
            a[0][0] * a[1][1] - a[1][0] * a[0][1],
            a[0][0] * a[1][2] - a[1][0] * a[0][2],
            a[0][0] * a[1][3] - a[1][0] * a[0][3],
            a[0][1] * a[1][2] - a[1][1] * a[0][2],
            a[0][1] * a[1][3] - a[1][1] * a[0][3],
            a[0][2] * a[1][3] - a[1][2] * a[0][3],
        ];
        let c = [
            a[2][0] * a[3][1] - a[3][0] * a[2][1],
            a[2][0] * a[3][2] - a[3][0] * a[2][2],
            a[2][0] * a[3][3] - a[3][0] * a[2][3],
            a[2][1] * a[3][2] - a[3][1] * a[2][2],
            a[2][1] * a[3][3] - a[3][1] * a[2][3],
            a[2][2] * a[3][3] - a[3][2] * a[2][3],
        ];
        (s, c)
    }

    /// Transforms a point and performs the perspective divide when `w` is
    /// neither 1 nor 0.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3];
        let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3];
        let z = m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3];
        let w = m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3];

        if w != 1.0 && w != 0.0 {
            Vec3::new(x / w, y / w, z / w)
        } else {
            Vec3::new(x, y, z)
        }
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut out = [[0.0f32; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[r][k] * rhs.m[k][c]).sum();
            }
        }
        Matrix4::from_rows(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_mat4_eq(a: Matrix4, b: Matrix4) {
        for r in 0..4 {
            for c in 0..4 {
                assert_relative_eq!(a.rows()[r][c], b.rows()[r][c], epsilon = 1e-5);
            }
        }
    }

    fn general() -> Matrix4 {
        Matrix4::from_rows([
            [2.0, 0.0, 1.0, 3.0],
            [1.0, 3.0, 0.0, -1.0],
            [0.0, 1.0, 4.0, 2.0],
            [1.0, 0.0, 2.0, 5.0],
        ])
    }

    // ── ortho ─────────────────────────────────────────────────────────────

    #[test]
    fn ortho_maps_corners_to_clip_corners() {
        let m = Matrix4::ortho(0.0, 800.0, 0.0, 600.0);
        let bl = m.transform_point(Vec3::new(0.0, 0.0, 0.0));
        let tr = m.transform_point(Vec3::new(800.0, 600.0, 0.0));
        assert_relative_eq!(bl.x, -1.0);
        assert_relative_eq!(bl.y, -1.0);
        assert_relative_eq!(tr.x, 1.0);
        assert_relative_eq!(tr.y, 1.0);
        assert_relative_eq!(bl.z, 0.0);
    }

    #[test]
    fn ortho_maps_center_to_origin() {
        let m = Matrix4::ortho(0.0, 800.0, 0.0, 600.0);
        let c = m.transform_point(Vec3::new(400.0, 300.0, 0.0));
        assert_relative_eq!(c.x, 0.0);
        assert_relative_eq!(c.y, 0.0);
    }

    #[test]
    fn degenerate_ortho_is_finite_and_singular() {
        let m = Matrix4::ortho(0.0, 0.0, 0.0, 600.0);
        assert!(m.rows().iter().flatten().all(|v| v.is_finite()));
        assert_eq!(m.determinant(), 0.0);
    }

    // ── determinant ───────────────────────────────────────────────────────

    #[test]
    fn determinant_of_identity_is_one() {
        assert_eq!(Matrix4::IDENTITY.determinant(), 1.0);
        assert_eq!(Matrix3::IDENTITY.determinant(), 1.0);
    }

    #[test]
    fn determinant_of_general_matrix() {
        // Cofactor expansion along the first row.
        assert_relative_eq!(general().determinant(), 62.0, epsilon = 1e-4);
    }

    // ── inverse ───────────────────────────────────────────────────────────

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = general();
        assert_mat4_eq(m * m.inverse(), Matrix4::IDENTITY);
        assert_mat4_eq(m.inverse() * m, Matrix4::IDENTITY);
    }

    #[test]
    fn ortho_inverse_round_trips_points() {
        let viewports = [
            (0.0, 800.0, 0.0, 600.0),
            (-50.0, 50.0, -20.0, 80.0),
            (100.0, 1380.0, 720.0, 0.0),
        ];
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(123.5, 77.25, 0.0),
            Vec3::new(-40.0, 900.0, 0.5),
        ];
        for (l, r, b, t) in viewports {
            let fwd = Matrix4::ortho(l, r, b, t);
            let inv = fwd.inverse();
            for p in points {
                let back = inv.transform_point(fwd.transform_point(p));
                assert_relative_eq!(back.x, p.x, epsilon = 1e-3);
                assert_relative_eq!(back.y, p.y, epsilon = 1e-3);
                assert_relative_eq!(back.z, p.z, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn singular_inverse_is_identity() {
        let singular = Matrix4::from_rows([
            [1.0, 2.0, 3.0, 4.0],
            [2.0, 4.0, 6.0, 8.0],
            [0.0, 1.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 0.0],
        ]);
        assert_eq!(singular.determinant(), 0.0);

        let inv = singular.inverse();
        assert_eq!(inv, Matrix4::IDENTITY);

        let p = Vec3::new(3.0, -7.0, 2.0);
        let q = inv.transform_point(p);
        assert_eq!(q, p);
        assert!(q.is_finite());
    }

    #[test]
    fn degenerate_viewport_inverse_is_identity() {
        let inv = Matrix4::ortho(10.0, 10.0, 0.0, 0.0).inverse();
        assert_eq!(inv, Matrix4::IDENTITY);
    }

    #[test]
    fn matrix3_inverse_round_trips() {
        let fwd = Matrix3::ortho(0.0, 640.0, 0.0, 480.0);
        let inv = fwd.inverse();
        let p = Vec2::new(320.0, 12.0);
        let back = inv.transform_point(fwd.transform_point(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-3);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-3);
    }

    #[test]
    fn matrix3_singular_inverse_is_identity() {
        let m = Matrix3::from_rows([[1.0, 2.0, 0.0], [2.0, 4.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(m.inverse(), Matrix3::IDENTITY);
    }

    // ── perspective divide ────────────────────────────────────────────────

    #[test]
    fn transform_divides_by_w() {
        let mut rows = *Matrix4::IDENTITY.rows();
        rows[3][3] = 2.0;
        let m = Matrix4::from_rows(rows);
        let p = m.transform_point(Vec3::new(4.0, 6.0, 8.0));
        assert_eq!(p, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn transform_skips_divide_when_w_is_zero() {
        let mut rows = *Matrix4::IDENTITY.rows();
        rows[3][3] = 0.0;
        let m = Matrix4::from_rows(rows);
        let p = m.transform_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(p.is_finite());
    }
}
