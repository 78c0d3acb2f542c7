use glam::Mat4;

/// Angular speed while an arrow key is held.
pub const ROTATION_SPEED_DEG_PER_SEC: f32 = 90.0;

/// Accumulated rotation of the square about the Z axis.
///
/// Stored as a matrix rather than an angle: every frame's step is
/// post-multiplied onto the previous result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub matrix: Mat4,
}

impl Default for Rotation {
    fn default() -> Self {
        Self { matrix: Mat4::IDENTITY }
    }
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the rotation by `dt` seconds of key input.
    ///
    /// Left turns counter-clockwise, right turns clockwise. Holding both
    /// applies both steps, which cancel out.
    pub fn update(&mut self, left_held: bool, right_held: bool, dt: f32) {
        let step = (ROTATION_SPEED_DEG_PER_SEC * dt).to_radians();

        if left_held {
            self.matrix *= Mat4::from_rotation_z(step);
        }
        if right_held {
            self.matrix *= Mat4::from_rotation_z(-step);
        }
    }

    /// Column-major layout expected by a WGSL `mat4x4<f32>` uniform.
    pub fn to_uniform(&self) -> [[f32; 4]; 4] {
        self.matrix.to_cols_array_2d()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const EPS: f32 = 1e-5;

    fn corner_after(rotation: &Rotation) -> Vec3 {
        rotation.matrix.transform_point3(Vec3::new(0.5, 0.0, 0.0))
    }

    #[test]
    fn starts_at_identity() {
        assert_eq!(Rotation::new().matrix, Mat4::IDENTITY);
    }

    #[test]
    fn no_keys_no_change() {
        let mut r = Rotation::new();
        r.update(false, false, 0.5);
        assert_eq!(r.matrix, Mat4::IDENTITY);
    }

    #[test]
    fn left_for_one_second_turns_quarter_counter_clockwise() {
        let mut r = Rotation::new();
        r.update(true, false, 1.0);
        assert!(corner_after(&r).abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), EPS));
    }

    #[test]
    fn right_for_one_second_turns_quarter_clockwise() {
        let mut r = Rotation::new();
        r.update(false, true, 1.0);
        assert!(corner_after(&r).abs_diff_eq(Vec3::new(0.0, -0.5, 0.0), EPS));
    }

    #[test]
    fn both_keys_cancel() {
        let mut r = Rotation::new();
        r.update(true, true, 0.3);
        assert!(r.matrix.abs_diff_eq(Mat4::IDENTITY, EPS));
    }

    #[test]
    fn steps_accumulate() {
        let mut r = Rotation::new();
        for _ in 0..60 {
            r.update(true, false, 1.0 / 60.0);
        }
        assert!(corner_after(&r).abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-4));
    }

    #[test]
    fn stays_orthogonal_after_many_steps() {
        let mut r = Rotation::new();
        for i in 0..10_000 {
            r.update(i % 3 != 0, i % 7 == 0, 0.016);
        }

        let m = r.matrix;
        assert!((m * m.transpose()).abs_diff_eq(Mat4::IDENTITY, 1e-3));
        assert!((m.determinant() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn rotation_stays_in_xy_plane() {
        let mut r = Rotation::new();
        r.update(true, false, 0.7);
        let z = r.matrix.transform_point3(Vec3::Z);
        assert!(z.abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn uniform_is_column_major() {
        let mut r = Rotation::new();
        r.update(true, false, 1.0);
        let cols = r.to_uniform();

        // First column is the image of +X: (0, 1, 0, 0) after a quarter turn.
        assert!((cols[0][0]).abs() < EPS);
        assert!((cols[0][1] - 1.0).abs() < EPS);
        assert_eq!(cols[3], [0.0, 0.0, 0.0, 1.0]);
    }
}
