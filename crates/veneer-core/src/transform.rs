use crate::Vec2;

/// Determinants below `EPSILON * EPSILON` (in magnitude) are treated as singular.
pub const EPSILON: f32 = 0.001;

/// 2×3 affine matrix `[m00, m01, m10, m11, m20, m21]`.
///
/// Points are row vectors: `x' = x*m00 + y*m10 + m20`, `y' = x*m01 + y*m11 + m21`.
/// `a.multiply(&b)` therefore applies `a` first and `b` second.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine2D {
    pub m: [f32; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub const fn new(m00: f32, m01: f32, m10: f32, m11: f32, m20: f32, m21: f32) -> Self {
        Self {
            m: [m00, m01, m10, m11, m20, m21],
        }
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub const fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub const fn scaling(x: f32, y: f32) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn determinant(&self) -> f32 {
        self.m[0] * self.m[3] - self.m[1] * self.m[2]
    }

    /// `self` then `other`.
    pub fn multiply(&self, other: &Affine2D) -> Affine2D {
        let [l0, l1, l2, l3, l4, l5] = self.m;
        let [r0, r1, r2, r3, r4, r5] = other.m;
        Affine2D {
            m: [
                l0 * r0 + l1 * r2,
                l0 * r1 + l1 * r3,
                l2 * r0 + l3 * r2,
                l2 * r1 + l3 * r3,
                l4 * r0 + l5 * r2 + r4,
                l4 * r1 + l5 * r3 + r5,
            ],
        }
    }

    pub fn try_invert(&self) -> Option<Affine2D> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < EPSILON * EPSILON {
            return None;
        }
        let [l0, l1, l2, l3, l4, l5] = self.m;
        let inv = 1.0 / det;
        Some(Affine2D {
            m: [
                l3 * inv,
                -l1 * inv,
                -l2 * inv,
                l0 * inv,
                (l2 * l5 - l3 * l4) * inv,
                (l1 * l4 - l0 * l5) * inv,
            ],
        })
    }

    /// Inverse, or identity when the matrix is degenerate (e.g. a zero scale).
    pub fn invert(&self) -> Affine2D {
        self.try_invert().unwrap_or_else(|| {
            log::trace!("degenerate transform {:?}; using identity inverse", self.m);
            Self::IDENTITY
        })
    }

    pub fn transform_point(&self, x: f32, y: f32) -> Vec2 {
        Vec2 {
            x: x * self.m[0] + y * self.m[2] + self.m[4],
            y: x * self.m[1] + y * self.m[3] + self.m[5],
        }
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.transform_point(p.x, p.y)
    }

    /// `T(tx, ty) · S(sx, sy) · R(angle) · T(-tx, -ty)`, followed by `parent` if given.
    pub fn compose(
        tx: f32,
        ty: f32,
        angle: f32,
        scale_x: f32,
        scale_y: f32,
        parent: Option<&Affine2D>,
    ) -> Affine2D {
        let local = Self::translation(tx, ty)
            .multiply(&Self::scaling(scale_x, scale_y))
            .multiply(&Self::rotation(angle))
            .multiply(&Self::translation(-tx, -ty));
        match parent {
            Some(parent) => local.multiply(parent),
            None => local,
        }
    }

    /// Scale and rotation about `(pivot_x, pivot_y)`, followed by `parent`.
    pub fn around_pivot(
        pivot_x: f32,
        pivot_y: f32,
        angle: f32,
        scale_x: f32,
        scale_y: f32,
        parent: Option<&Affine2D>,
    ) -> Affine2D {
        Self::compose(-pivot_x, -pivot_y, angle, scale_x, scale_y, parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn multiply_applies_other_last() {
        let t = Affine2D::translation(10.0, 0.0).multiply(&Affine2D::scaling(2.0, 2.0));
        assert_eq!(t.transform_point(1.0, 1.0), Vec2::new(22.0, 2.0));

        let t = Affine2D::scaling(2.0, 2.0).multiply(&Affine2D::translation(10.0, 0.0));
        assert_eq!(t.transform_point(1.0, 1.0), Vec2::new(12.0, 2.0));
    }

    #[test]
    fn rotation_about_pivot_keeps_pivot_fixed() {
        let t = Affine2D::around_pivot(50.0, 50.0, FRAC_PI_2, 1.0, 1.0, None);
        assert!(close(t.transform_point(50.0, 50.0), Vec2::new(50.0, 50.0)));
        // (60, 50) is 10px right of the pivot; a quarter turn moves it 10px down.
        assert!(close(t.transform_point(60.0, 50.0), Vec2::new(50.0, 60.0)));
    }

    #[test]
    fn compose_then_invert_round_trips() {
        let parent = Affine2D::around_pivot(5.0, 7.0, 0.3, 1.5, 0.75, None);
        for &(sx, sy, angle) in &[(1.0, 1.0, 0.0), (0.5, 2.0, 1.2), (-1.0, 3.0, -2.5)] {
            let t = Affine2D::around_pivot(100.0, 40.0, angle, sx, sy, Some(&parent));
            let inv = t.try_invert().expect("non-degenerate");
            let p = t.transform_point(12.5, -33.0);
            assert!(close(inv.apply(p), Vec2::new(12.5, -33.0)));
        }
    }

    #[test]
    fn zero_scale_is_degenerate() {
        let t = Affine2D::compose(3.0, 4.0, 0.7, 0.0, 1.0, None);
        assert!(t.try_invert().is_none());
        assert_eq!(t.invert(), Affine2D::IDENTITY);

        let t = Affine2D::compose(3.0, 4.0, 0.7, 1.0, 0.0, None);
        assert!(t.try_invert().is_none());
    }

    #[test]
    fn mirrored_transform_still_inverts() {
        let t = Affine2D::scaling(-1.0, 1.0);
        assert!(t.determinant() < 0.0);
        assert_eq!(t.invert().transform_point(-4.0, 2.0), Vec2::new(4.0, 2.0));
    }
}
