//! Edge skeletons of weighted Delaunay tetrahedralizations
//!
//! Reads a weighted 3D point cloud, normalizes it into a bounded grid,
//! computes the regular (weighted Delaunay) triangulation and writes the
//! unique edges of its tetrahedra as vertex index pairs.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use weighted_delaunay_edges::*;
//!
//! let config = EngineConfig::default();
//! let mut engine = IncrementalEngine::new();
//!
//! let report = run("points.xyzw", "points.edges", &config, &mut engine).unwrap();
//! println!("{} points -> {} edges", report.point_count, report.edge_count);
//! ```
//!
//! # Features
//!
//! - `validation` (default): enables `do_check`, which cross-checks the
//!   triangulation against a parry3d convex hull
//! - `serde`: Enables serialization support for configuration and data types

// Modules
pub mod error;
pub mod config;
pub mod loader;
pub mod normalize;
pub mod engine;
pub mod edges;
pub mod writer;
pub mod pipeline;
pub mod generation;

// Re-export core types for convenience
pub use error::{EdgeError, Result};
pub use config::{
    Distribution, EngineConfig, EngineConfigBuilder, DEFAULT_GRID_SIZE, DEFAULT_TETRA_MAX,
    DEFAULT_WEIGHT_MAX, MIN_GRID_SIZE,
};
pub use loader::{
    load_points, read_points, write_points, BoundingExtent, LoadedPoints, RawPoint, Truncation,
    TruncationReason,
};
pub use normalize::{normalize_points, scale_coordinate, GridNormalizer, NormalizedPoints};
pub use engine::{
    EngineSession, EngineTiming, IncrementalEngine, InsertionStats, PrecomputedEngine,
    Tetrahedron, TriangulationEngine,
};
pub use edges::{extract_edges, Edge};
pub use writer::{save_edges, write_edges};
pub use pipeline::{compute_edges, run, EdgeSet, PipelineReport};
pub use generation::generate_points;

// Re-export glam::Vec3 for convenience
pub use glam::Vec3;
