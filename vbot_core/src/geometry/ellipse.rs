// vbot_core/src/geometry/ellipse.rs

//! Minimum-volume enclosing ellipse of a planar point set.
//!
//! The fit is Khachiyan's barycentric coordinate ascent: points are lifted to
//! homogeneous coordinates, a weight per point is moved towards the point with
//! the largest Mahalanobis distance until the weights settle, and the weighted
//! scatter of the points then yields the ellipse shape matrix.

use crate::error::{DegenerateReason, FitError};
use crate::types::{Point, Vec2};
use nalgebra::{DVector, Matrix2, Matrix2xX, Matrix3, Matrix3xX, RowVector2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Planar dimension `d`.
const DIM: f64 = 2.0;
/// Relative cutoff for singular values treated as zero in pseudo-inverses.
const PINV_RCOND: f64 = 1e-15;
/// `m` this close to one would make the step divide by zero.
const UNIT_DISTANCE_EPS: f64 = 1e-12;

/// Tunables of the enclosing-ellipse fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FitterConfig {
    /// Stop when the L2 change of the weight vector is at most this.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Rescale the fitted shape so that no input point lies outside it.
    ///
    /// Without it the weight iteration stops on `tolerance` alone, and points
    /// may fall noticeably outside the returned ellipse (squared distances
    /// above `1 + tolerance` occur on ordinary clouds).
    pub enforce_enclosure: bool,
    /// Ratio of the smallest to the largest scatter singular value below which
    /// the points are treated as collinear.
    pub collinearity_threshold: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            max_iterations: 10_000,
            enforce_enclosure: true,
            collinearity_threshold: 1e-10,
        }
    }
}

/// A planar ellipse described by its axes, orientation and foci.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Semi-major axis length `a`.
    pub major_axis_len: f64,
    /// Semi-minor axis length `b`, never larger than `a`.
    pub minor_axis_len: f64,
    pub center: Point,
    /// Angle of the major axis w.r.t. the x axis, radians.
    pub rotation_angle: f64,
    /// Center-to-focus distance `sqrt(a^2 - b^2)`.
    pub focal_length: f64,
    pub focal_point_1: Point,
    pub focal_point_2: Point,
}

impl Ellipse {
    /// Builds an ellipse from its center, semi-axes and major-axis angle.
    ///
    /// The axes are swapped if `major < minor`, in which case the angle is
    /// turned by a quarter so the described set stays the same.
    pub fn from_axes(center: Point, major: f64, minor: f64, rotation_angle: f64) -> Self {
        let (major, minor, rotation_angle) = if major >= minor {
            (major, minor, rotation_angle)
        } else {
            (minor, major, rotation_angle + std::f64::consts::FRAC_PI_2)
        };
        let focal_length = (major * major - minor * minor).max(0.0).sqrt();
        let offset = Vec2::new(rotation_angle.cos(), rotation_angle.sin()) * focal_length;
        Self {
            major_axis_len: major,
            minor_axis_len: minor,
            center,
            rotation_angle,
            focal_length,
            focal_point_1: center + offset,
            focal_point_2: center - offset,
        }
    }

    /// Midpoint of the two foci. Coincides with the center.
    pub fn mid_focal_point(&self) -> Point {
        Point::from((self.focal_point_1.coords + self.focal_point_2.coords) * 0.5)
    }

    /// The matrix `A` of the quadratic form `(p - c)^T A (p - c) <= 1`.
    pub fn shape_matrix(&self) -> Matrix2<f64> {
        let (s, c) = self.rotation_angle.sin_cos();
        let rot = Matrix2::new(c, -s, s, c);
        let inv_sq = Matrix2::new(
            1.0 / (self.major_axis_len * self.major_axis_len),
            0.0,
            0.0,
            1.0 / (self.minor_axis_len * self.minor_axis_len),
        );
        rot * inv_sq * rot.transpose()
    }

    /// Normalised squared distance of `p` from the center; `1` on the boundary.
    pub fn mahalanobis(&self, p: &Point) -> f64 {
        let e = p - self.center;
        e.dot(&(self.shape_matrix() * e))
    }

    /// `true` if `p` lies inside the ellipse grown by `slack`.
    pub fn contains(&self, p: &Point, slack: f64) -> bool {
        self.mahalanobis(p) <= 1.0 + slack
    }

    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.major_axis_len * self.minor_axis_len
    }
}

/// Fits the minimum-volume ellipse enclosing a point set.
#[derive(Debug, Clone, Default)]
pub struct EllipseFitter {
    config: FitterConfig,
}

impl EllipseFitter {
    pub fn new(config: FitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    /// Encloses `points` using the configured tolerance.
    pub fn enclose(&self, points: &[Point]) -> Result<Ellipse, FitError> {
        self.enclose_with_tolerance(points, self.config.tolerance)
    }

    /// Encloses `points`, stopping once the weight change is at most `tolerance`.
    ///
    /// # Errors
    /// * `DegenerateInput` for fewer than three points, non-finite coordinates
    ///   or a point set without 2D extent.
    /// * `Convergence` when `max_iterations` is exhausted.
    pub fn enclose_with_tolerance(
        &self,
        points: &[Point],
        tolerance: f64,
    ) -> Result<Ellipse, FitError> {
        self.validate(points)?;

        let n = points.len();
        let p = Matrix2xX::from_fn(n, |r, c| points[c][r]);
        let q = Matrix3xX::from_fn(n, |r, c| if r < 2 { points[c][r] } else { 1.0 });

        let (u, iterations) = self.solve_weights(&q, tolerance)?;

        // --- Shape from the weighted scatter ---
        let center: Vec2 = &p * &u;
        let scatter = weighted_scatter2(&p, &u) - center * center.transpose();
        let mut shape = pseudo_inverse2(scatter) / DIM;

        if self.config.enforce_enclosure {
            let worst = points
                .iter()
                .map(|pt| {
                    let e = pt.coords - center;
                    e.dot(&(shape * e))
                })
                .fold(0.0_f64, f64::max);
            if worst > 1.0 {
                debug!(worst, "rescaling ellipse to enclose all points");
                shape /= worst;
            }
        }

        let ellipse = ellipse_from_shape(Point::from(center), &shape);
        debug!(
            iterations,
            major = ellipse.major_axis_len,
            minor = ellipse.minor_axis_len,
            angle = ellipse.rotation_angle,
            "enclosing ellipse fitted"
        );
        Ok(ellipse)
    }

    fn validate(&self, points: &[Point]) -> Result<(), FitError> {
        if points.len() < 3 {
            return Err(FitError::DegenerateInput(DegenerateReason::TooFewPoints(
                points.len(),
            )));
        }
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(FitError::DegenerateInput(DegenerateReason::NonFinite));
        }

        let n = points.len() as f64;
        let mean = points.iter().fold(Vec2::zeros(), |acc, p| acc + p.coords) / n;
        let scatter = points.iter().fold(Matrix2::zeros(), |acc, p| {
            let e = p.coords - mean;
            acc + e * e.transpose()
        });
        let sv = scatter.singular_values();
        let (hi, lo) = (sv[0].max(sv[1]), sv[0].min(sv[1]));
        if hi <= 0.0 || lo <= self.config.collinearity_threshold * hi {
            return Err(FitError::DegenerateInput(DegenerateReason::Collinear));
        }
        Ok(())
    }

    /// Khachiyan weight iteration. Returns the weights and the iteration count.
    fn solve_weights(
        &self,
        q: &Matrix3xX<f64>,
        tolerance: f64,
    ) -> Result<(DVector<f64>, usize), FitError> {
        let n = q.ncols();
        let mut u = DVector::from_element(n, 1.0 / n as f64);

        for iteration in 1..=self.config.max_iterations {
            let x = weighted_scatter3(q, &u);
            let xq = pseudo_inverse3(x) * q;

            // M_k = q_k^T X^+ q_k, keep the largest.
            let (j, m) = q
                .column_iter()
                .zip(xq.column_iter())
                .map(|(qk, xk)| qk.dot(&xk))
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (k, mk)| {
                    if mk > best.1 {
                        (k, mk)
                    } else {
                        best
                    }
                });

            if (m - 1.0).abs() < UNIT_DISTANCE_EPS {
                return Ok((u, iteration));
            }

            let step = (m - DIM - 1.0) / ((DIM + 1.0) * (m - 1.0));
            let mut next = u.scale(1.0 - step);
            next[j] += step;

            let change = (&next - &u).norm();
            u = next;
            if change <= tolerance {
                return Ok((u, iteration));
            }
        }

        Err(FitError::Convergence {
            iterations: self.config.max_iterations,
        })
    }
}

/// `Q * diag(u) * Q^T` for homogeneous points, without materialising the diagonal.
fn weighted_scatter3(q: &Matrix3xX<f64>, u: &DVector<f64>) -> Matrix3<f64> {
    q.column_iter()
        .zip(u.iter())
        .fold(Matrix3::zeros(), |acc, (col, w)| acc + col * col.transpose() * *w)
}

fn weighted_scatter2(p: &Matrix2xX<f64>, u: &DVector<f64>) -> Matrix2<f64> {
    p.column_iter()
        .zip(u.iter())
        .fold(Matrix2::zeros(), |acc, (col, w)| acc + col * col.transpose() * *w)
}

fn pseudo_inverse2(m: Matrix2<f64>) -> Matrix2<f64> {
    let eps = PINV_RCOND * m.norm();
    m.pseudo_inverse(eps).unwrap_or_else(|_| Matrix2::zeros())
}

fn pseudo_inverse3(m: Matrix3<f64>) -> Matrix3<f64> {
    let eps = PINV_RCOND * m.norm();
    m.pseudo_inverse(eps).unwrap_or_else(|_| Matrix3::zeros())
}

/// Quarter-turn basis rotation applied three times: `[[b, d], [a, c]]` -> `[[c, a], [d, b]]`.
fn rotate_270(m: &Matrix2<f64>) -> Matrix2<f64> {
    Matrix2::new(m[(1, 0)], m[(0, 0)], m[(1, 1)], m[(0, 1)])
}

/// Reads axes and orientation off the SVD of the shape matrix.
fn ellipse_from_shape(center: Point, shape: &Matrix2<f64>) -> Ellipse {
    let svd = shape.svd(true, true);
    let sv = svd.singular_values;
    let v_t = svd.v_t.unwrap_or_else(Matrix2::identity);

    // Row 0 must belong to the largest singular value (minor axis).
    let (i_max, i_min) = if sv[0] >= sv[1] { (0, 1) } else { (1, 0) };
    let ordered = Matrix2::from_rows(&[
        RowVector2::new(v_t[(i_max, 0)], v_t[(i_max, 1)]),
        RowVector2::new(v_t[(i_min, 0)], v_t[(i_min, 1)]),
    ]);

    let rotation = rotate_270(&ordered);
    let rotation_angle = rotation[(1, 0)].atan2(rotation[(0, 0)]);

    let minor = 1.0 / sv[i_max].sqrt();
    let major = 1.0 / sv[i_min].sqrt();
    Ellipse::from_axes(center, major, minor, rotation_angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    const F64_EPSILON: f64 = 1e-9;

    fn pts(pairs: &[(f64, f64)]) -> Vec<Point> {
        pairs.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn max_mahalanobis(e: &Ellipse, points: &[Point]) -> f64 {
        points.iter().map(|p| e.mahalanobis(p)).fold(0.0, f64::max)
    }

    /// Deterministic scatter used in place of random clouds.
    fn lissajous(n: usize, scale: (f64, f64), shift: (f64, f64)) -> Vec<Point> {
        (0..n)
            .map(|k| {
                let t = k as f64 * 0.7371;
                Point::new(
                    shift.0 + scale.0 * (3.0 * t).sin() * t.cos(),
                    shift.1 + scale.1 * (2.0 * t + 0.4).cos(),
                )
            })
            .collect()
    }

    #[test]
    fn test_unit_square_gives_circle() {
        let square = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let fitter = EllipseFitter::new(FitterConfig {
            tolerance: 0.01,
            ..Default::default()
        });
        let e = fitter.enclose(&square).unwrap();

        assert_abs_diff_eq!(e.center.x, 0.5, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(e.center.y, 0.5, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(e.major_axis_len, FRAC_1_SQRT_2, epsilon = 1e-9);
        assert_abs_diff_eq!(e.minor_axis_len, FRAC_1_SQRT_2, epsilon = 1e-9);
        assert_abs_diff_eq!(e.focal_length, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(max_mahalanobis(&e, &square), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rectangle_axes_and_foci() {
        let rect = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 1.0), (0.0, 1.0)]);
        let e = EllipseFitter::default().enclose(&rect).unwrap();

        assert_abs_diff_eq!(e.center.x, 2.0, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(e.center.y, 0.5, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(e.major_axis_len, 2.0 * 2.0_f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(e.minor_axis_len, FRAC_1_SQRT_2, epsilon = 1e-9);
        // Major axis along x (angle 0 or pi).
        assert_abs_diff_eq!(e.rotation_angle.sin(), 0.0, epsilon = 1e-9);

        let f = 7.5_f64.sqrt();
        assert_abs_diff_eq!(e.focal_length, f, epsilon = 1e-9);
        let mut xs = [e.focal_point_1.x, e.focal_point_2.x];
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(xs[0], 2.0 - f, epsilon = 1e-9);
        assert_abs_diff_eq!(xs[1], 2.0 + f, epsilon = 1e-9);
        assert_abs_diff_eq!(e.focal_point_1.y, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_triangle_vertices_lie_on_boundary() {
        // The enclosing ellipse of a triangle passes through all three vertices,
        // so the sum of focal distances equals the major axis for each of them.
        let tri = pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let e = EllipseFitter::default().enclose(&tri).unwrap();

        assert_abs_diff_eq!(e.center.x, 1.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e.center.y, 1.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e.major_axis_len, (2.0_f64 / 3.0).sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(e.minor_axis_len, (2.0_f64 / 9.0).sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(e.focal_length, 2.0 / 3.0, epsilon = 1e-9);
        // Major axis along (1, -1).
        assert_abs_diff_eq!((2.0 * e.rotation_angle).sin(), -1.0, epsilon = 1e-9);

        for v in &tri {
            assert_abs_diff_eq!(e.mahalanobis(v), 1.0, epsilon = 1e-9);
            let d = (v - e.focal_point_1).norm() + (v - e.focal_point_2).norm();
            assert_abs_diff_eq!(d, 2.0 * e.major_axis_len, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invariants_on_scattered_sets() {
        let fitter = EllipseFitter::default();
        for (n, scale, shift) in [
            (5, (3.0, 1.0), (0.0, 0.0)),
            (12, (40.0, 15.0), (250.0, 120.0)),
            (30, (2.0, 9.0), (-7.0, 3.0)),
        ] {
            let cloud = lissajous(n, scale, shift);
            let e = fitter.enclose(&cloud).unwrap();

            assert!(e.major_axis_len >= e.minor_axis_len);
            assert!(e.minor_axis_len > 0.0);
            let f = (e.major_axis_len.powi(2) - e.minor_axis_len.powi(2)).sqrt();
            assert_abs_diff_eq!(e.focal_length, f, epsilon = 1e-9 * e.major_axis_len);

            let mid = e.mid_focal_point();
            assert_abs_diff_eq!(mid.x, e.center.x, epsilon = 1e-9);
            assert_abs_diff_eq!(mid.y, e.center.y, epsilon = 1e-9);

            assert!(max_mahalanobis(&e, &cloud) <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_rescaled_fit_encloses_within_tolerance() {
        let tolerance = FitterConfig::default().tolerance;
        let fitter = EllipseFitter::default();
        let raw = EllipseFitter::new(FitterConfig {
            enforce_enclosure: false,
            ..Default::default()
        });
        for (n, scale, shift) in [
            (7, (10.0, 4.0), (1.0, 2.0)),
            (20, (1.0, 6.0), (-30.0, 8.0)),
            (45, (25.0, 25.0), (0.0, 0.0)),
        ] {
            let cloud = lissajous(n, scale, shift);
            let e = fitter.enclose(&cloud).unwrap();
            assert!(max_mahalanobis(&e, &cloud) <= 1.0 + tolerance);

            // Rescaling only grows the shape about the same center.
            let r = raw.enclose(&cloud).unwrap();
            assert_abs_diff_eq!(r.center.x, e.center.x, epsilon = 1e-9);
            assert_abs_diff_eq!(r.center.y, e.center.y, epsilon = 1e-9);
            assert!(e.area() >= r.area() - 1e-9);
        }
    }

    #[test]
    fn test_shape_matrix_matches_axes() {
        let e = Ellipse::from_axes(Point::new(1.0, -2.0), 3.0, 1.0, 0.3);
        let along_major = e.center + Vec2::new(0.3_f64.cos(), 0.3_f64.sin()) * 3.0;
        let along_minor = e.center + Vec2::new(-(0.3_f64.sin()), 0.3_f64.cos()) * 1.0;
        assert_abs_diff_eq!(e.mahalanobis(&along_major), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.mahalanobis(&along_minor), 1.0, epsilon = 1e-12);
        assert!(e.contains(&e.center, 0.0));
    }

    #[test]
    fn test_from_axes_swaps_when_needed() {
        let e = Ellipse::from_axes(Point::origin(), 1.0, 2.0, 0.0);
        assert_eq!(e.major_axis_len, 2.0);
        assert_abs_diff_eq!(e.focal_point_1.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.focal_point_1.y, 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        let fitter = EllipseFitter::default();
        assert_eq!(
            fitter.enclose(&pts(&[(0.0, 0.0), (1.0, 1.0)])),
            Err(FitError::DegenerateInput(DegenerateReason::TooFewPoints(2)))
        );
        assert_eq!(
            fitter.enclose(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)])),
            Err(FitError::DegenerateInput(DegenerateReason::Collinear))
        );
        assert_eq!(
            fitter.enclose(&pts(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)])),
            Err(FitError::DegenerateInput(DegenerateReason::Collinear))
        );
        assert_eq!(
            fitter.enclose(&pts(&[(0.0, 0.0), (1.0, f64::NAN), (0.0, 1.0)])),
            Err(FitError::DegenerateInput(DegenerateReason::NonFinite))
        );
    }

    #[test]
    fn test_iteration_cap_reports_convergence_error() {
        let fitter = EllipseFitter::new(FitterConfig {
            tolerance: 1e-12,
            max_iterations: 1,
            ..Default::default()
        });
        let cloud = pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (5.0, 5.0), (2.0, 1.0)]);
        assert_eq!(
            fitter.enclose(&cloud),
            Err(FitError::Convergence { iterations: 1 })
        );
    }
}
