//! Marching cubes over an implicit equation `left = right` in x, y, z.
//!
//! The field is sampled as `left - right` on a cubic lattice spanning
//! `[-range, range]` on every axis; the zero level set of that difference
//! is the surface. Lattice nodes where evaluation fails get a large
//! positive value, which keeps them outside the surface without poisoning
//! neighbouring cells. The finished mesh is recentered on the centroid of
//! its bounding box.

use crate::plotting::mc_tables::{CORNER_OFFSETS, EDGE_ENDPOINTS, EDGE_TABLE, TRI_TABLE};
use crate::symbolic::symbolic_eval::compile_expression;
use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use std::collections::HashMap;

/// Field value standing in for a failed evaluation at a lattice node.
const FAILURE_SENTINEL: f64 = 1.0e6;

/// Indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Point3<f64>>,
    pub cells: Vec<[u32; 3]>,
    pub normals: Vec<Vector3<f64>>,
}

impl MeshData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Extracts the surface `left = right` on a `size`^3 lattice spanning
/// `[-range, range]` per axis. Either side failing to parse yields an
/// empty mesh.
pub fn extract_isosurface(
    left: &str,
    right: &str,
    size: usize,
    range: f64,
    scope: &HashMap<String, f64>,
) -> MeshData {
    if size < 2 {
        return MeshData::empty();
    }
    let free = ["x", "y", "z"];
    let (Ok(left_fn), Ok(right_fn)) = (
        compile_expression(left, &free, scope),
        compile_expression(right, &free, scope),
    ) else {
        log::debug!("isosurface skipped, failed to compile '{left}' = '{right}'");
        return MeshData::empty();
    };

    let field = sample_lattice(size, range, |p| {
        let v = left_fn(&[p.x, p.y, p.z]) - right_fn(&[p.x, p.y, p.z]);
        if v.is_finite() { v } else { FAILURE_SENTINEL }
    });

    let mut mesh = march(size, range, &field);
    recenter(&mut mesh);
    compute_normals(&mut mesh);
    mesh
}

/// Maps lattice index 0..size-1 to a coordinate in [-range, range].
#[inline]
fn lattice_coord(i: usize, size: usize, range: f64) -> f64 {
    (i as f64 / (size - 1) as f64) * 2.0 * range - range
}

#[inline]
fn grid_index(x: usize, y: usize, z: usize, size: usize) -> usize {
    x + y * size + z * size * size
}

/// Samples the field over the full lattice, one z-slice per rayon task.
fn sample_lattice<F>(size: usize, range: f64, sample: F) -> Vec<f64>
where
    F: Fn(Point3<f64>) -> f64 + Send + Sync,
{
    let sample = &sample;
    (0..size)
        .into_par_iter()
        .flat_map_iter(|z| {
            let pz = lattice_coord(z, size, range);
            (0..size)
                .flat_map(move |y| (0..size).map(move |x| (x, y)))
                .map(move |(x, y)| {
                    sample(Point3::new(
                        lattice_coord(x, size, range),
                        lattice_coord(y, size, range),
                        pz,
                    ))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn march(size: usize, range: f64, field: &[f64]) -> MeshData {
    let mut mesh = MeshData::empty();
    // crossings are welded per lattice edge, keyed by the node pair so
    // neighbouring cells sharing the edge reuse the exact same vertex
    let mut vertex_cache = HashMap::<(usize, usize), u32>::new();
    let mut corner_values = [0.0_f64; 8];
    let mut corner_points = [Point3::origin(); 8];
    let mut corner_nodes = [0usize; 8];
    let mut edge_vertices = [0u32; 12];

    for (z, y, x) in iproduct!(0..size - 1, 0..size - 1, 0..size - 1) {
        let mut case_index = 0usize;
        for (corner_id, offset) in CORNER_OFFSETS.iter().enumerate() {
            let gx = x + offset[0];
            let gy = y + offset[1];
            let gz = z + offset[2];
            let node = grid_index(gx, gy, gz, size);
            let value = field[node];
            corner_values[corner_id] = value;
            corner_nodes[corner_id] = node;
            corner_points[corner_id] = Point3::new(
                lattice_coord(gx, size, range),
                lattice_coord(gy, size, range),
                lattice_coord(gz, size, range),
            );
            if value < 0.0 {
                case_index |= 1 << corner_id;
            }
        }

        let edge_mask = EDGE_TABLE[case_index];
        if edge_mask == 0 {
            continue;
        }

        for (edge_id, [a, b]) in EDGE_ENDPOINTS.iter().enumerate() {
            if edge_mask & (1u16 << edge_id) == 0 {
                continue;
            }
            // orient by node index so both cells interpolate from the
            // same end and land on bit-identical coordinates
            let (lo, hi) = if corner_nodes[*a] < corner_nodes[*b] {
                (*a, *b)
            } else {
                (*b, *a)
            };
            let key = (corner_nodes[lo], corner_nodes[hi]);
            let positions = &mut mesh.positions;
            edge_vertices[edge_id] = *vertex_cache.entry(key).or_insert_with(|| {
                positions.push(interpolate_edge(
                    corner_points[lo],
                    corner_points[hi],
                    corner_values[lo],
                    corner_values[hi],
                ));
                (positions.len() - 1) as u32
            });
        }

        let row = TRI_TABLE[case_index];
        let mut tri_idx = 0usize;
        while tri_idx + 2 < 16 && row[tri_idx] != -1 {
            let i0 = edge_vertices[row[tri_idx] as usize];
            let i1 = edge_vertices[row[tri_idx + 1] as usize];
            let i2 = edge_vertices[row[tri_idx + 2] as usize];
            if i0 != i1 && i1 != i2 && i2 != i0 {
                mesh.cells.push([i0, i1, i2]);
            }
            tri_idx += 3;
        }
    }

    mesh
}

#[inline]
fn interpolate_edge(p1: Point3<f64>, p2: Point3<f64>, v1: f64, v2: f64) -> Point3<f64> {
    let dv = v2 - v1;
    let t = if dv.abs() <= f64::EPSILON {
        0.5
    } else {
        -v1 / dv
    };
    p1 + (p2 - p1) * t
}

/// Shifts the mesh so the centroid of its bounding box sits at the origin.
fn recenter(mesh: &mut MeshData) {
    if mesh.positions.is_empty() {
        return;
    }
    let mut min = mesh.positions[0];
    let mut max = mesh.positions[0];
    for p in &mesh.positions {
        min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
        max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
    }
    let center = Vector3::new(
        (min.x + max.x) / 2.0,
        (min.y + max.y) / 2.0,
        (min.z + max.z) / 2.0,
    );
    for p in &mut mesh.positions {
        *p -= center;
    }
}

/// Area-weighted per-vertex normals accumulated from face normals.
fn compute_normals(mesh: &mut MeshData) {
    let mut normals = vec![Vector3::zeros(); mesh.positions.len()];
    for [i0, i1, i2] in &mesh.cells {
        let a = mesh.positions[*i0 as usize];
        let b = mesh.positions[*i1 as usize];
        let c = mesh.positions[*i2 as usize];
        let face = (b - a).cross(&(c - a));
        normals[*i0 as usize] += face;
        normals[*i1 as usize] += face;
        normals[*i2 as usize] += face;
    }
    for n in &mut normals {
        let len = n.norm();
        if len > 0.0 {
            *n /= len;
        }
    }
    mesh.normals = normals;
}
