//! Squircle outline and light-direction helpers.

use resvg::tiny_skia::{Path, PathBuilder};

/// Superellipse exponent of the icon outline.
pub const SQUIRCLE_EXPONENT: f32 = 5.0;

/// Number of segments the outline is sampled with.
pub const SQUIRCLE_SEGMENTS: usize = 360;

/// A closed superellipse outline sampled at a fixed angular resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SquirclePath {
    points: Vec<(f32, f32)>,
}

impl SquirclePath {
    /// The sampled outline. A degenerate (zero-size) outline is one point.
    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    /// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        self.points.iter().fold(
            (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }

    /// Converts the outline into a fillable path.
    ///
    /// Returns `None` for a degenerate outline.
    pub fn to_path(&self) -> Option<Path> {
        if self.points.len() < 3 {
            return None;
        }
        let mut pb = PathBuilder::new();
        let (x, y) = self.points[0];
        pb.move_to(x, y);
        for &(x, y) in &self.points[1..] {
            pb.line_to(x, y);
        }
        pb.close();
        pb.finish()
    }
}

/// Traces a superellipse of edge length `size` centered on `center`.
///
/// Each sample is `center + r·(sign(cos θ)|cos θ|^(2/n), sign(sin θ)|sin θ|^(2/n))`.
/// A `size` of zero (or less) yields a single point at the center.
pub fn squircle_path(center: (f32, f32), size: f32, exponent: f32) -> SquirclePath {
    if !(size > 0.0) {
        return SquirclePath {
            points: vec![center],
        };
    }

    let radius = f64::from(size) / 2.0;
    let power = 2.0 / f64::from(exponent.max(f32::EPSILON));
    let (cx, cy) = (f64::from(center.0), f64::from(center.1));

    let points = (0..SQUIRCLE_SEGMENTS)
        .map(|i| {
            let theta = i as f64 * std::f64::consts::TAU / SQUIRCLE_SEGMENTS as f64;
            let (sin, cos) = theta.sin_cos();
            let x = cx + radius * cos.signum() * cos.abs().powf(power);
            let y = cy + radius * sin.signum() * sin.abs().powf(power);
            (x as f32, y as f32)
        })
        .collect();

    SquirclePath { points }
}

/// The icon outline for a frame of edge `size`, centered in the frame.
pub fn frame_squircle(size: u32) -> SquirclePath {
    let half = size as f32 / 2.0;
    squircle_path((half, half), size as f32, SQUIRCLE_EXPONENT)
}

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn normalize_angle(degrees: f32) -> f32 {
    if degrees.is_finite() {
        degrees.rem_euclid(360.0)
    } else {
        0.0
    }
}

/// Unit vector pointing from the frame center toward the light.
///
/// 0° is straight up (y-down pixel space), 90° is to the right.
pub fn light_vector(degrees: f32) -> (f32, f32) {
    let (sin, cos) = normalize_angle(degrees).to_radians().sin_cos();
    (sin, -cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_single_center_point() {
        let path = squircle_path((12.0, 7.0), 0.0, SQUIRCLE_EXPONENT);
        assert_eq!(path.points(), &[(12.0, 7.0)]);
        assert!(path.to_path().is_none());
    }

    #[test]
    fn bounding_box_matches_size() {
        let path = squircle_path((0.0, 0.0), 750.0, SQUIRCLE_EXPONENT);
        let (x0, y0, x1, y1) = path.bounds();
        assert!((x1 - x0 - 750.0).abs() < 1e-3, "width {}", x1 - x0);
        assert!((y1 - y0 - 750.0).abs() < 1e-3, "height {}", y1 - y0);
        assert!((x0 + x1).abs() < 1e-3 && (y0 + y1).abs() < 1e-3, "not centered");
        assert_eq!(path.points().len(), SQUIRCLE_SEGMENTS);
    }

    #[test]
    fn squircle_is_fuller_than_circle() {
        // At 45° a circle reaches r/√2; the n=5 superellipse reaches further.
        let path = squircle_path((0.0, 0.0), 2.0, SQUIRCLE_EXPONENT);
        let (x, y) = path.points()[45];
        assert!(x > std::f32::consts::FRAC_1_SQRT_2 && y > std::f32::consts::FRAC_1_SQRT_2);
        assert!(x <= 1.0 && y <= 1.0);
    }

    #[test]
    fn frame_squircle_fills_frame() {
        let path = frame_squircle(64).to_path().unwrap();
        let b = path.bounds();
        assert!((b.width() - 64.0).abs() < 1e-3);
        assert!((b.left()).abs() < 1e-3);
    }

    #[test]
    fn light_vector_is_periodic() {
        for angle in [-720.0f32, -405.0, -90.0, 0.0, 45.0, 200.0, 359.5, 1080.0] {
            let (ax, ay) = light_vector(angle);
            let (bx, by) = light_vector(angle + 360.0);
            assert!((ax - bx).abs() < 1e-3 && (ay - by).abs() < 1e-3, "{angle}");
            assert!(((ax * ax + ay * ay) - 1.0).abs() < 1e-4);
        }
        let (x, y) = light_vector(0.0);
        assert!(x.abs() < 1e-6 && (y + 1.0).abs() < 1e-6);
        let (x, y) = light_vector(90.0);
        assert!((x - 1.0).abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn light_vector_rotates_continuously() {
        let mut prev = light_vector(-400.0);
        let mut angle = -400.0f32;
        while angle < 400.0 {
            angle += 1.0;
            let next = light_vector(angle);
            let step = ((next.0 - prev.0).powi(2) + (next.1 - prev.1).powi(2)).sqrt();
            assert!(step < 0.02, "jump of {step} at {angle}");
            prev = next;
        }
    }
}
