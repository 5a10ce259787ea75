//! End-to-end edge extraction
//!
//! Runs the stages in order: load, normalize, triangulate, extract, write.
//! The engine session stays open until the edge file has been written, so
//! the engine is torn down exactly once whether the run succeeds, the engine
//! fails, or the output cannot be written.

use std::path::Path;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::edges::{extract_edges, Edge};
use crate::engine::{EngineSession, EngineTiming, TriangulationEngine};
use crate::error::{EdgeError, Result};
use crate::loader::{load_points, Truncation};
use crate::normalize::{normalize_points, NormalizedPoints};
use crate::writer::save_edges;

/// Smallest point count that can span a tetrahedron
const MIN_ENGINE_POINTS: usize = 4;

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Points read from the input
    pub point_count: usize,
    /// Tetrahedra returned by the engine
    pub tetra_count: usize,
    /// Unique edges written
    pub edge_count: usize,
    /// Engine phase timings (zero when the engine was skipped)
    pub timing: EngineTiming,
    /// Set when the input ended early
    pub truncation: Option<Truncation>,
}

/// Edge skeleton of an in-memory point set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSet {
    pub edges: Vec<Edge>,
    pub tetra_count: usize,
    pub timing: EngineTiming,
}

/// Copy of `base` with the point count filled in
fn engine_config(base: &EngineConfig, point_num: usize) -> EngineConfig {
    EngineConfig {
        point_num,
        ..*base
    }
}

/// Triangulate inside a session and hand the edges to `sink` before teardown
fn triangulate<E, F>(
    normalized: &NormalizedPoints,
    config: &EngineConfig,
    engine: &mut E,
    sink: F,
) -> Result<EdgeSet>
where
    E: TriangulationEngine + ?Sized,
    F: FnOnce(&[Edge]) -> Result<()>,
{
    if normalized.len() < MIN_ENGINE_POINTS {
        if config.log_verbose {
            eprintln!(
                "[Pipeline] {} points cannot span a tetrahedron; skipping engine",
                normalized.len()
            );
        }
        sink(&[])?;
        return Ok(EdgeSet::default());
    }

    let config = engine_config(config, normalized.len());
    let mut session = EngineSession::open(engine, &config, &normalized.points, &normalized.weights)?;
    let timing = session.compute()?;

    let extract_start = Instant::now();
    let tetrahedra = session.tetrahedra();
    let edges = extract_edges(tetrahedra);
    if config.log_timing {
        eprintln!(
            "[Pipeline] extract: {} tetrahedra -> {} edges in {:?}",
            tetrahedra.len(),
            edges.len(),
            extract_start.elapsed()
        );
    }

    let tetra_count = tetrahedra.len();
    sink(&edges)?;

    Ok(EdgeSet {
        edges,
        tetra_count,
        timing,
    })
}

/// Compute the edge skeleton of already normalized points
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::*;
///
/// let raw = vec![
///     RawPoint::new(0.0, 0.0, 0.0, 0.0),
///     RawPoint::new(1.0, 0.0, 0.0, 0.0),
///     RawPoint::new(0.0, 1.0, 0.0, 0.0),
///     RawPoint::new(0.0, 0.0, 1.0, 0.0),
/// ];
/// let normalized = normalize_points(&raw, BoundingExtent::from_points(&raw), 512).unwrap();
///
/// let mut engine = IncrementalEngine::new();
/// let result = compute_edges(&normalized, &EngineConfig::default(), &mut engine).unwrap();
///
/// assert_eq!(result.tetra_count, 1);
/// assert_eq!(result.edges.len(), 6);
/// ```
pub fn compute_edges<E>(
    normalized: &NormalizedPoints,
    config: &EngineConfig,
    engine: &mut E,
) -> Result<EdgeSet>
where
    E: TriangulationEngine + ?Sized,
{
    triangulate(normalized, config, engine, |_| Ok(()))
}

/// Read `input`, compute its edge skeleton and write it to `output`
///
/// The input is read in full before `output` is created, so an unreadable
/// input never leaves an output file behind. Fewer than four points produce
/// an empty edge file without calling the engine.
///
/// # Errors
///
/// - `InputUnreadable` / `InputReadFailed` / `OutputUnwritable` /
///   `OutputWriteFailed` for I/O failures
/// - `EmptyInput` if no complete point was read
/// - `DegenerateExtent` if all coordinates are equal
/// - `EngineFailed` / `ValidationFailed` from the engine
pub fn run<E, P, Q>(input: P, output: Q, config: &EngineConfig, engine: &mut E) -> Result<PipelineReport>
where
    E: TriangulationEngine + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let total_start = Instant::now();

    let load_start = Instant::now();
    let loaded = load_points(input)?;
    let load_time = load_start.elapsed();
    if loaded.is_empty() {
        return Err(EdgeError::EmptyInput);
    }

    let normalize_start = Instant::now();
    let normalized = normalize_points(&loaded.points, loaded.extent, config.grid_size)?;
    let normalize_time = normalize_start.elapsed();

    if config.log_verbose {
        eprintln!(
            "[Pipeline] {} points, extent [{}, {}], grid {}",
            loaded.len(),
            loaded.extent.min,
            loaded.extent.max,
            config.grid_size
        );
    }

    let output = output.as_ref();
    let write_start = Instant::now();
    let result = triangulate(&normalized, config, engine, |edges| save_edges(output, edges))?;
    let write_time = write_start.elapsed().saturating_sub(result.timing.total());

    if config.log_timing {
        eprintln!(
            "[Pipeline] load={:?}, normalize={:?}, engine={:?}, extract+write={:?}, total={:?}",
            load_time,
            normalize_time,
            result.timing.total(),
            write_time,
            total_start.elapsed()
        );
    }

    Ok(PipelineReport {
        point_count: loaded.len(),
        tetra_count: result.tetra_count,
        edge_count: result.edges.len(),
        timing: result.timing,
        truncation: loaded.truncation,
    })
}
