//! Triangulation engine boundary
//!
//! The weighted Delaunay computation sits behind [`TriangulationEngine`] so the
//! normalization and edge stages can run against any implementation:
//! the bundled [`IncrementalEngine`], a replayed [`PrecomputedEngine`], or an
//! external backend.
//!
//! Engines hold internal state between `init` and `deinit`. Callers should go
//! through [`EngineSession`], which tears the engine down exactly once when it
//! goes out of scope, whichever way the surrounding code exits.

#[cfg(feature = "validation")]
mod check;
mod expansion;
mod incremental;
pub mod predicates;

pub use incremental::{IncrementalEngine, InsertionStats};

use std::time::Duration;

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EdgeError, Result};

/// Four vertex indices into the grid point sequence
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tetrahedron(pub [u32; 4]);

impl Tetrahedron {
    /// Create a tetrahedron from four vertex indices
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self([a, b, c, d])
    }

    /// Vertex indices
    #[inline]
    pub const fn vertices(&self) -> [u32; 4] {
        self.0
    }
}

/// Wall-clock time spent in the four engine phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineTiming {
    /// Input ordering
    pub prepare: Duration,
    /// Construction of the starting simplex
    pub init: Duration,
    /// Point insertion
    pub insertion: Duration,
    /// Output collection and checks
    pub output: Duration,
}

impl EngineTiming {
    /// Sum of all phases
    pub fn total(&self) -> Duration {
        self.prepare + self.init + self.insertion + self.output
    }
}

/// A weighted Delaunay (regular) triangulation backend
///
/// `points` and `weights` are parallel: index `i` of one belongs to index `i`
/// of the other, and tetrahedra refer to points by that index.
pub trait TriangulationEngine {
    /// Acquire engine state for a point set
    fn init(&mut self, config: &EngineConfig, points: &[Vec3], weights: &[f32]) -> Result<()>;

    /// Run the triangulation
    fn compute(&mut self) -> Result<EngineTiming>;

    /// Tetrahedra produced by the last successful `compute`
    fn tetrahedra(&self) -> &[Tetrahedron];

    /// Release engine state; safe to call more than once
    fn deinit(&mut self);
}

/// Scoped engine acquisition
///
/// Opening a session runs `init`; dropping it runs `deinit`. If `init` itself
/// fails the engine is torn down before the error is returned.
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::*;
///
/// let points = vec![
///     Vec3::new(1.0, 1.0, 1.0),
///     Vec3::new(10.0, 1.0, 1.0),
///     Vec3::new(1.0, 10.0, 1.0),
///     Vec3::new(1.0, 1.0, 10.0),
/// ];
/// let weights = vec![0.0; 4];
/// let config = EngineConfigBuilder::new().point_num(4).build().unwrap();
///
/// let mut engine = IncrementalEngine::new();
/// {
///     let mut session = EngineSession::open(&mut engine, &config, &points, &weights).unwrap();
///     session.compute().unwrap();
///     assert_eq!(session.tetrahedra().len(), 1);
/// }
/// assert!(engine.tetrahedra().is_empty());
/// ```
pub struct EngineSession<'e, E: TriangulationEngine + ?Sized> {
    engine: &'e mut E,
}

impl<'e, E: TriangulationEngine + ?Sized> EngineSession<'e, E> {
    /// Initialize the engine and take ownership of its teardown
    pub fn open(
        engine: &'e mut E,
        config: &EngineConfig,
        points: &[Vec3],
        weights: &[f32],
    ) -> Result<Self> {
        if let Err(err) = engine.init(config, points, weights) {
            engine.deinit();
            return Err(err);
        }
        Ok(Self { engine })
    }

    /// Run the triangulation
    pub fn compute(&mut self) -> Result<EngineTiming> {
        self.engine.compute()
    }

    /// Tetrahedra from the last `compute`
    pub fn tetrahedra(&self) -> &[Tetrahedron] {
        self.engine.tetrahedra()
    }
}

impl<E: TriangulationEngine + ?Sized> Drop for EngineSession<'_, E> {
    fn drop(&mut self) {
        self.engine.deinit();
    }
}

/// Engine that replays a fixed tetrahedron set
///
/// Lets the normalization and edge stages be exercised with synthetic
/// tetrahedra. Counts `init`/`deinit` calls so teardown can be asserted.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedEngine {
    source: Vec<Tetrahedron>,
    output: Vec<Tetrahedron>,
    point_count: Option<usize>,
    failure: Option<String>,
    init_calls: usize,
    deinit_calls: usize,
}

impl PrecomputedEngine {
    /// Engine that will return `tetrahedra` from every `compute`
    pub fn new(tetrahedra: Vec<Tetrahedron>) -> Self {
        Self {
            source: tetrahedra,
            ..Self::default()
        }
    }

    /// Engine whose `compute` always fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of `init` calls so far
    pub fn init_calls(&self) -> usize {
        self.init_calls
    }

    /// Number of `deinit` calls so far
    pub fn deinit_calls(&self) -> usize {
        self.deinit_calls
    }

    /// True between `init` and `deinit`
    pub fn is_initialized(&self) -> bool {
        self.point_count.is_some()
    }
}

impl TriangulationEngine for PrecomputedEngine {
    fn init(&mut self, _config: &EngineConfig, points: &[Vec3], weights: &[f32]) -> Result<()> {
        self.init_calls += 1;
        if points.len() != weights.len() {
            return Err(EdgeError::EngineFailed(format!(
                "{} points but {} weights",
                points.len(),
                weights.len()
            )));
        }
        self.point_count = Some(points.len());
        Ok(())
    }

    fn compute(&mut self) -> Result<EngineTiming> {
        let point_count = self
            .point_count
            .ok_or_else(|| EdgeError::EngineFailed("compute called before init".to_string()))?;

        if let Some(message) = &self.failure {
            return Err(EdgeError::EngineFailed(message.clone()));
        }

        if let Some(tet) = self
            .source
            .iter()
            .find(|tet| tet.0.iter().any(|&v| v as usize >= point_count))
        {
            return Err(EdgeError::EngineFailed(format!(
                "tetrahedron {:?} references a vertex outside 0..{}",
                tet.0, point_count
            )));
        }

        self.output = self.source.clone();
        Ok(EngineTiming::default())
    }

    fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.output
    }

    fn deinit(&mut self) {
        self.deinit_calls += 1;
        self.point_count = None;
        self.output.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points(count: usize) -> (Vec<Vec3>, Vec<f32>) {
        let points = (0..count).map(|i| Vec3::splat(1.0 + i as f32)).collect();
        (points, vec![0.0; count])
    }

    #[test]
    fn test_session_tears_down_on_drop() {
        let (points, weights) = grid_points(4);
        let config = EngineConfig::default();
        let mut engine = PrecomputedEngine::new(vec![Tetrahedron::new(0, 1, 2, 3)]);

        {
            let mut session = EngineSession::open(&mut engine, &config, &points, &weights).unwrap();
            session.compute().unwrap();
            assert_eq!(session.tetrahedra(), &[Tetrahedron::new(0, 1, 2, 3)]);
        }

        assert_eq!(engine.init_calls(), 1);
        assert_eq!(engine.deinit_calls(), 1);
        assert!(!engine.is_initialized());
        assert!(engine.tetrahedra().is_empty());
    }

    #[test]
    fn test_session_tears_down_after_compute_failure() {
        let (points, weights) = grid_points(4);
        let config = EngineConfig::default();
        let mut engine = PrecomputedEngine::failing("ceiling exceeded");

        let result = {
            let mut session = EngineSession::open(&mut engine, &config, &points, &weights).unwrap();
            session.compute()
        };

        assert_eq!(
            result,
            Err(EdgeError::EngineFailed("ceiling exceeded".to_string()))
        );
        assert_eq!(engine.deinit_calls(), 1);
    }

    #[test]
    fn test_session_tears_down_after_init_failure() {
        let (points, _) = grid_points(4);
        let config = EngineConfig::default();
        let mut engine = PrecomputedEngine::new(Vec::new());

        let result = EngineSession::open(&mut engine, &config, &points, &[0.0; 3]);

        assert!(result.is_err());
        drop(result);
        assert_eq!(engine.init_calls(), 1);
        assert_eq!(engine.deinit_calls(), 1);
    }

    #[test]
    fn test_precomputed_rejects_out_of_range_vertex() {
        let (points, weights) = grid_points(4);
        let mut engine = PrecomputedEngine::new(vec![Tetrahedron::new(0, 1, 2, 4)]);

        engine.init(&EngineConfig::default(), &points, &weights).unwrap();
        assert!(matches!(engine.compute(), Err(EdgeError::EngineFailed(_))));
        engine.deinit();
    }

    #[test]
    fn test_compute_before_init() {
        let mut engine = PrecomputedEngine::new(Vec::new());
        assert!(engine.compute().is_err());
    }

    #[test]
    fn test_timing_total() {
        let timing = EngineTiming {
            prepare: Duration::from_millis(1),
            init: Duration::from_millis(2),
            insertion: Duration::from_millis(3),
            output: Duration::from_millis(4),
        };
        assert_eq!(timing.total(), Duration::from_millis(10));
    }
}
