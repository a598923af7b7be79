//! Curve samplers, one strategy per classified form.
//!
//! Every sampler parses its expression once, compiles it against the merged
//! parameter scope, then walks its domain skipping per-point failures: a NaN
//! or out-of-range sample drops that point, never the whole curve. A wholly
//! unparsable expression yields an empty output, which is a valid renderable
//! result. Outputs are freshly allocated on every pass and never mutated.

use crate::symbolic::symbolic_eval::compile_expression;
use crate::symbolic::utils::linspace;
use log::debug;
use nalgebra::Point2;
use ndarray::Array2;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Number of subdivisions for the explicit-function sampler. Fixed, not
/// adaptive.
const FUNCTION_SUBDIVISIONS: usize = 1000;
/// Parameter step for the parametric sampler over [0, 2pi].
const PARAMETRIC_STEP: f64 = 0.05;
/// Angle step for the polar sampler over [0, 4pi]; two full turns cover
/// multi-lobe roses.
const POLAR_STEP: f64 = 0.02;
/// Hard radius cap for polar curves; larger radii are runaway traces.
const POLAR_RADIUS_CAP: f64 = 100.0;
/// Subdivisions per axis of the implicit-2D scalar grid (101x101 nodes).
const IMPLICIT_GRID_SIZE: usize = 100;
/// Subdivisions per axis of the z = f(x, y) height grid.
const SURFACE_GRID_SIZE: usize = 50;

/// Viewport rectangle the samplers operate over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            x_min: -10.0,
            x_max: 10.0,
            y_min: -10.0,
            y_max: 10.0,
        }
    }
}

/// Scalar field sampled over a rectangular grid, with the axis coordinate
/// vectors. `values[[j, i]]` is the field at `(x[i], y[j])`; evaluation
/// failures are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub values: Array2<f64>,
}

/// Samples y = f(x) over the viewport: exactly 1000 subdivisions of
/// [x_min, x_max], keeping only finite values inside [y_min, y_max].
/// Sampled x values are monotonically increasing.
pub fn sample_function(
    expression: &str,
    bounds: &Bounds,
    scope: &HashMap<String, f64>,
) -> Vec<Point2<f64>> {
    let f = match compile_expression(expression, &["x"], scope) {
        Ok(f) => f,
        Err(err) => {
            debug!("function sampler: {}", err);
            return Vec::new();
        }
    };

    linspace(bounds.x_min, bounds.x_max, FUNCTION_SUBDIVISIONS + 1)
        .into_iter()
        .filter_map(|x| {
            let y = f(&[x]);
            (y.is_finite() && y >= bounds.y_min && y <= bounds.y_max)
                .then(|| Point2::new(x, y))
        })
        .collect()
}

/// Samples a parametric pair x(t), y(t) for t in [0, 2pi] stepped by 0.05.
/// Keeps points where both coordinates are finite; parametric curves are
/// unbounded by design, so there is no viewport clipping.
pub fn sample_parametric(
    x_expr: &str,
    y_expr: &str,
    scope: &HashMap<String, f64>,
) -> Vec<Point2<f64>> {
    let (fx, fy) = match (
        compile_expression(x_expr, &["t"], scope),
        compile_expression(y_expr, &["t"], scope),
    ) {
        (Ok(fx), Ok(fy)) => (fx, fy),
        (x, y) => {
            for err in [x.err(), y.err()].into_iter().flatten() {
                debug!("parametric sampler: {}", err);
            }
            return Vec::new();
        }
    };

    (0..)
        .map(|i| i as f64 * PARAMETRIC_STEP)
        .take_while(|t| *t <= 2.0 * PI)
        .filter_map(|t| {
            let x = fx(&[t]);
            let y = fy(&[t]);
            (x.is_finite() && y.is_finite()).then(|| Point2::new(x, y))
        })
        .collect()
}

/// Samples r = f(theta) for theta in [0, 4pi] stepped by 0.02, discarding
/// points with |r| >= 100, converted to Cartesian coordinates.
pub fn sample_polar(expression: &str, scope: &HashMap<String, f64>) -> Vec<Point2<f64>> {
    let f = match compile_expression(expression, &["theta"], scope) {
        Ok(f) => f,
        Err(err) => {
            debug!("polar sampler: {}", err);
            return Vec::new();
        }
    };

    (0..)
        .map(|i| i as f64 * POLAR_STEP)
        .take_while(|theta| *theta <= 4.0 * PI)
        .filter_map(|theta| {
            let r = f(&[theta]);
            (r.is_finite() && r.abs() < POLAR_RADIUS_CAP)
                .then(|| Point2::new(r * theta.cos(), r * theta.sin()))
        })
        .collect()
}

/// Samples `left(x, y) - right(x, y)` over a 101x101 grid spanning the
/// viewport. The grid is the input to [`crate::plotting::contour`] (or any
/// external zero-contour extractor); this sampler does not trace lines.
/// An inequality region uses the same field with its sign giving membership.
pub fn sample_implicit_grid(
    left: &str,
    right: &str,
    bounds: &Bounds,
    scope: &HashMap<String, f64>,
) -> ScalarGrid {
    sample_difference_grid(left, right, bounds, scope, IMPLICIT_GRID_SIZE, f64::NAN)
}

/// Samples a z = f(x, y) height field over a 51x51 grid; non-finite samples
/// are flattened to 0 so the surface always has a value per node.
pub fn sample_surface_grid(
    expression: &str,
    bounds: &Bounds,
    scope: &HashMap<String, f64>,
) -> ScalarGrid {
    sample_difference_grid(expression, "0", bounds, scope, SURFACE_GRID_SIZE, 0.0)
        .map_non_finite(0.0)
}

fn sample_difference_grid(
    left: &str,
    right: &str,
    bounds: &Bounds,
    scope: &HashMap<String, f64>,
    size: usize,
    failure_value: f64,
) -> ScalarGrid {
    let x = linspace(bounds.x_min, bounds.x_max, size + 1);
    let y = linspace(bounds.y_min, bounds.y_max, size + 1);

    let compiled = (
        compile_expression(left, &["x", "y"], scope),
        compile_expression(right, &["x", "y"], scope),
    );
    let (fl, fr) = match compiled {
        (Ok(fl), Ok(fr)) => (fl, fr),
        (l, r) => {
            for err in [l.err(), r.err()].into_iter().flatten() {
                debug!("implicit grid sampler: {}", err);
            }
            let values = Array2::from_elem((size + 1, size + 1), failure_value);
            return ScalarGrid { x, y, values };
        }
    };

    let values = Array2::from_shape_fn((size + 1, size + 1), |(j, i)| {
        let v = fl(&[x[i], y[j]]) - fr(&[x[i], y[j]]);
        if v.is_nan() { failure_value } else { v }
    });

    ScalarGrid { x, y, values }
}

impl ScalarGrid {
    fn map_non_finite(mut self, replacement: f64) -> ScalarGrid {
        self.values.mapv_inplace(|v| {
            if v.is_finite() { v } else { replacement }
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use itertools::Itertools;

    #[test]
    fn test_function_parabola_clipped_and_monotonic() {
        let bounds = Bounds::default();
        let points = sample_function("x^2", &bounds, &HashMap::new());
        assert!(!points.is_empty());
        for p in &points {
            assert!(p.y.abs() <= 10.0);
        }
        for (a, b) in points.iter().tuple_windows() {
            assert!(b.x > a.x);
        }
    }

    #[test]
    fn test_function_exactly_1000_subdivisions_when_unclipped() {
        let bounds = Bounds {
            y_min: -100.0,
            y_max: 100.0,
            ..Bounds::default()
        };
        let points = sample_function("x", &bounds, &HashMap::new());
        assert_eq!(points.len(), 1001);
    }

    #[test]
    fn test_function_invalid_expression_yields_empty() {
        let points = sample_function("x +* 2", &Bounds::default(), &HashMap::new());
        assert!(points.is_empty());
    }

    #[test]
    fn test_function_skips_singularities() {
        // 1/x blows up near 0; those samples are skipped, not fatal
        let points = sample_function("1/x", &Bounds::default(), &HashMap::new());
        assert!(!points.is_empty());
        for p in &points {
            assert!(p.y.is_finite());
        }
    }

    #[test]
    fn test_parametric_circle() {
        let points = sample_parametric("cos(t)", "sin(t)", &HashMap::new());
        assert!(!points.is_empty());
        for p in &points {
            assert_relative_eq!(p.x * p.x + p.y * p.y, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_parametric_no_viewport_clipping() {
        let points = sample_parametric("100*cos(t)", "100*sin(t)", &HashMap::new());
        assert!(points.iter().any(|p| p.x.abs() > 10.0));
    }

    #[test]
    fn test_polar_unit_circle() {
        let points = sample_polar("1", &HashMap::new());
        assert!(!points.is_empty());
        for p in &points {
            assert_relative_eq!(p.x * p.x + p.y * p.y, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_polar_radius_cap() {
        // r = 200 exceeds the cap everywhere: empty but valid output
        let points = sample_polar("200", &HashMap::new());
        assert!(points.is_empty());
    }

    #[test]
    fn test_polar_rose_uses_slider_scope() {
        let mut scope = HashMap::new();
        scope.insert("a".to_string(), 2.0);
        let points = sample_polar("a*sin(3*theta)", &scope);
        assert!(!points.is_empty());
        let max_r = points
            .iter()
            .map(|p| (p.x * p.x + p.y * p.y).sqrt())
            .fold(0.0f64, f64::max);
        assert_relative_eq!(max_r, 2.0, epsilon = 1e-2);
    }

    #[test]
    fn test_implicit_grid_circle() {
        let grid = sample_implicit_grid("x^2+y^2", "25", &Bounds::default(), &HashMap::new());
        assert_eq!(grid.x.len(), 101);
        assert_eq!(grid.y.len(), 101);
        assert_eq!(grid.values.dim(), (101, 101));
        // center is inside (negative), corner outside (positive)
        assert!(grid.values[[50, 50]] < 0.0);
        assert!(grid.values[[0, 0]] > 0.0);
    }

    #[test]
    fn test_implicit_grid_evaluation_failure_is_nan() {
        let grid = sample_implicit_grid("x +* y", "0", &Bounds::default(), &HashMap::new());
        assert!(grid.values[[0, 0]].is_nan());
    }

    #[test]
    fn test_surface_grid_flattens_non_finite() {
        let bounds = Bounds::default();
        let grid = sample_surface_grid("1/x", &bounds, &HashMap::new());
        assert_eq!(grid.values.dim(), (51, 51));
        assert!(grid.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let mut scope = HashMap::new();
        scope.insert("a".to_string(), 1.5);
        let bounds = Bounds::default();
        let first = sample_function("a*sin(x)", &bounds, &scope);
        let second = sample_function("a*sin(x)", &bounds, &scope);
        assert_eq!(first, second);
    }
}
