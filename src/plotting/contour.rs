//! Marching squares: traces the zero-level contour of a sampled scalar grid.
//!
//! The implicit-2D sampler only supplies the field; this module turns it
//! into renderable polylines. Cells with a non-finite corner contribute
//! nothing, so evaluation failures punch holes in the contour instead of
//! aborting it.

use crate::plotting::samplers::ScalarGrid;
use nalgebra::Point2;
use std::collections::HashMap;

/// Cell edges: bottom, right, top, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Bottom,
    Right,
    Top,
    Left,
}

/// Segment endpoints per marching-squares case. Corner bit order:
/// bit 0 = bottom-left, 1 = bottom-right, 2 = top-right, 3 = top-left,
/// a bit is set when the corner value is negative ("inside").
/// The two ambiguous saddle cases (5, 10) are resolved into two parallel
/// segments without a center probe.
fn case_segments(case: u8) -> &'static [(Edge, Edge)] {
    use Edge::*;
    match case {
        1 => &[(Left, Bottom)],
        2 => &[(Bottom, Right)],
        3 => &[(Left, Right)],
        4 => &[(Right, Top)],
        5 => &[(Left, Top), (Bottom, Right)],
        6 => &[(Bottom, Top)],
        7 => &[(Left, Top)],
        8 => &[(Top, Left)],
        9 => &[(Top, Bottom)],
        10 => &[(Top, Right), (Bottom, Left)],
        11 => &[(Top, Right)],
        12 => &[(Right, Left)],
        13 => &[(Bottom, Right)],
        14 => &[(Left, Bottom)],
        _ => &[],
    }
}

/// Linear interpolation of the zero crossing between two corner samples.
/// Mirrors the 3D edge interpolation guard: a vanishing denominator puts
/// the crossing at the midpoint.
fn interpolate(pa: Point2<f64>, pb: Point2<f64>, va: f64, vb: f64) -> Point2<f64> {
    let dv = vb - va;
    let t = if dv.abs() <= f64::EPSILON {
        0.5
    } else {
        (-va / dv).clamp(0.0, 1.0)
    };
    Point2::new(pa.x + t * (pb.x - pa.x), pa.y + t * (pb.y - pa.y))
}

/// Traces the zero contour of the grid into polylines. Adjacent cells
/// compute bit-identical crossings on their shared edge, so chaining joins
/// on exact coordinates.
pub fn trace_zero_contour(grid: &ScalarGrid) -> Vec<Vec<Point2<f64>>> {
    let segments = collect_segments(grid);
    chain_segments(segments)
}

fn collect_segments(grid: &ScalarGrid) -> Vec<(Point2<f64>, Point2<f64>)> {
    let (rows, cols) = grid.values.dim();
    let mut segments = Vec::new();

    for j in 0..rows.saturating_sub(1) {
        for i in 0..cols.saturating_sub(1) {
            // corner values: bl, br, tr, tl
            let v = [
                grid.values[[j, i]],
                grid.values[[j, i + 1]],
                grid.values[[j + 1, i + 1]],
                grid.values[[j + 1, i]],
            ];
            if v.iter().any(|x| !x.is_finite()) {
                continue;
            }
            let p = [
                Point2::new(grid.x[i], grid.y[j]),
                Point2::new(grid.x[i + 1], grid.y[j]),
                Point2::new(grid.x[i + 1], grid.y[j + 1]),
                Point2::new(grid.x[i], grid.y[j + 1]),
            ];

            let mut case = 0u8;
            for (bit, value) in v.iter().enumerate() {
                if *value < 0.0 {
                    case |= 1 << bit;
                }
            }

            for (ea, eb) in case_segments(case) {
                let a = edge_crossing(*ea, &p, &v);
                let b = edge_crossing(*eb, &p, &v);
                if a != b {
                    segments.push((a, b));
                }
            }
        }
    }

    segments
}

fn edge_crossing(edge: Edge, p: &[Point2<f64>; 4], v: &[f64; 4]) -> Point2<f64> {
    let (a, b) = match edge {
        Edge::Bottom => (0, 1),
        Edge::Right => (1, 2),
        Edge::Top => (3, 2),
        Edge::Left => (0, 3),
    };
    interpolate(p[a], p[b], v[a], v[b])
}

fn point_key(p: &Point2<f64>) -> (u64, u64) {
    (p.x.to_bits(), p.y.to_bits())
}

/// Greedily chains segments into polylines by walking shared endpoints.
fn chain_segments(segments: Vec<(Point2<f64>, Point2<f64>)>) -> Vec<Vec<Point2<f64>>> {
    let mut adjacency: HashMap<(u64, u64), Vec<usize>> = HashMap::new();
    for (idx, (a, b)) in segments.iter().enumerate() {
        adjacency.entry(point_key(a)).or_default().push(idx);
        adjacency.entry(point_key(b)).or_default().push(idx);
    }

    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];
        let mut line = vec![a, b];

        // extend forward from the tail, then backward from the head
        for _ in 0..2 {
            loop {
                let tail = *line.last().expect("non-empty polyline");
                let Some(next) = adjacency
                    .get(&point_key(&tail))
                    .and_then(|ids| ids.iter().find(|id| !used[**id]))
                    .copied()
                else {
                    break;
                };
                used[next] = true;
                let (na, nb) = segments[next];
                line.push(if point_key(&na) == point_key(&tail) { nb } else { na });
            }
            line.reverse();
        }

        polylines.push(line);
    }

    polylines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plotting::samplers::{Bounds, sample_implicit_grid};
    use approx::assert_relative_eq;

    #[test]
    fn test_circle_contour_radius() {
        let grid = sample_implicit_grid("x^2+y^2", "4", &Bounds::default(), &HashMap::new());
        let polylines = trace_zero_contour(&grid);
        assert!(!polylines.is_empty());
        let mut count = 0;
        for line in &polylines {
            for p in line {
                assert_relative_eq!((p.x * p.x + p.y * p.y).sqrt(), 2.0, epsilon = 0.05);
                count += 1;
            }
        }
        assert!(count > 20);
    }

    #[test]
    fn test_empty_field_has_no_contour() {
        let grid = sample_implicit_grid("x^2+y^2", "-1", &Bounds::default(), &HashMap::new());
        assert!(trace_zero_contour(&grid).is_empty());
    }

    #[test]
    fn test_line_contour() {
        // y = x: contour of y - x over a symmetric viewport is the diagonal
        let grid = sample_implicit_grid("y", "x", &Bounds::default(), &HashMap::new());
        let polylines = trace_zero_contour(&grid);
        assert!(!polylines.is_empty());
        for line in &polylines {
            for p in line {
                assert_relative_eq!(p.x, p.y, epsilon = 0.3);
            }
        }
    }

    #[test]
    fn test_nan_cells_are_skipped() {
        // sqrt(x) is NaN for x < 0; the contour of sqrt(x) - 1 only lives
        // in the right half-plane
        let grid = sample_implicit_grid("sqrt(x)", "1", &Bounds::default(), &HashMap::new());
        let polylines = trace_zero_contour(&grid);
        for line in &polylines {
            for p in line {
                assert!(p.x > 0.0);
            }
        }
    }
}
