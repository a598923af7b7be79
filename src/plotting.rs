#![allow(non_snake_case)]
/// classification of a raw expression string into one of six mathematical
/// forms: explicit function, parametric pair, polar, inequality, implicit,
/// plain expression. An ordered list of matcher functions, first match wins.
pub mod classify;
///____________________________________________________________________________________________________________________________
/// curve samplers, one strategy per classified form: explicit-function,
/// parametric, polar, and the implicit-2D scalar grid. All samplers skip
/// per-point evaluation failures instead of aborting the curve.
pub mod samplers;
///____________________________________________________________________________________________________________________________
/// marching squares: traces the zero contour of a sampled scalar grid into
/// polylines
pub mod contour;
///____________________________________________________________________________________________________________________________
/// 3D isosurface extraction with marching cubes: voxel lattice sampling,
/// triangle soup with welded vertices, per-vertex normals, bbox recentering
pub mod isosurface;
/// standard 256-case marching cubes edge/triangle tables
pub mod mc_tables;
///____________________________________________________________________________________________________________________________
/// background mesh extraction with generation-tagged cancel-by-replacement
/// and a debounce window for slider-driven re-extraction
pub mod mesh_worker;
