//! Triangulation engine configuration and builder
//!
//! The pipeline derives most of these values itself (point count from the
//! input, everything else from fixed defaults). They are not exposed on the
//! command line.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, Result};

/// Default grid resolution of the engine lattice
pub const DEFAULT_GRID_SIZE: u32 = 512;

/// Default safety ceiling on the number of live tetrahedra
pub const DEFAULT_TETRA_MAX: usize = 12_000_000;

/// Default ceiling on generated weight magnitude
pub const DEFAULT_WEIGHT_MAX: f32 = 1.0;

/// Smallest grid that still leaves an interior after the one-cell margins
pub const MIN_GRID_SIZE: u32 = 4;

/// Point distribution hint
///
/// Describes how the input points are expected to be spread. The engine uses
/// it as a hint only; the point generator uses it to synthesize clouds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distribution {
    /// Uniform in the unit cube
    #[default]
    Uniform,
    /// Uniform inside a ball
    Ball,
    /// On the surface of a sphere
    Sphere,
    /// In a thin shell around a sphere surface
    ThinSphere,
}

impl Distribution {
    /// Human-readable name of the distribution
    pub fn name(self) -> &'static str {
        match self {
            Distribution::Uniform => "Uniform",
            Distribution::Ball => "Ball",
            Distribution::Sphere => "Sphere",
            Distribution::ThinSphere => "ThinSphere",
        }
    }
}

/// Configuration handed to a triangulation engine
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::*;
///
/// let config = EngineConfigBuilder::new()
///     .grid_size(1024)
///     .unwrap()
///     .point_num(10_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.grid_size, 1024);
/// assert_eq!(config.distribution, Distribution::Uniform);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Resolution of the engine lattice; grid points lie in `[1, grid_size - 2]`
    pub grid_size: u32,

    /// Number of points handed to the engine
    pub point_num: usize,

    /// Expected point distribution
    pub distribution: Distribution,

    /// Upper bound on live tetrahedra before the engine gives up
    pub tetra_max: usize,

    /// Upper bound on weight magnitude for generated points
    pub weight_max: f32,

    /// Seed for insertion order and point generation
    pub seed: u64,

    /// Print progress messages to stderr
    pub log_verbose: bool,

    /// Print insertion statistics to stderr
    pub log_stats: bool,

    /// Print phase timings to stderr
    pub log_timing: bool,

    /// Run consistency checks on the computed triangulation
    pub do_check: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfigBuilder::new().build().unwrap()
    }
}

/// Builder for creating EngineConfig with validation
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::*;
///
/// let config = EngineConfigBuilder::new()
///     .distribution(Distribution::Sphere)
///     .weight_max(0.5)
///     .unwrap()
///     .seed(7)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.grid_size, DEFAULT_GRID_SIZE);
/// assert_eq!(config.weight_max, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    grid_size: u32,
    point_num: usize,
    distribution: Distribution,
    tetra_max: usize,
    weight_max: f32,
    seed: u64,
    log_verbose: bool,
    log_stats: bool,
    log_timing: bool,
    do_check: bool,
}

impl EngineConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - grid_size: 512
    /// - point_num: 0 (the pipeline fills in the input size)
    /// - distribution: Uniform
    /// - tetra_max: 12,000,000
    /// - weight_max: 1.0
    /// - seed: 0
    /// - all logging and checking disabled
    pub fn new() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            point_num: 0,
            distribution: Distribution::default(),
            tetra_max: DEFAULT_TETRA_MAX,
            weight_max: DEFAULT_WEIGHT_MAX,
            seed: 0,
            log_verbose: false,
            log_stats: false,
            log_timing: false,
            do_check: false,
        }
    }

    /// Set the grid resolution
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the grid is smaller than 4 cells, which would
    /// leave no interior once the one-cell margins are reserved.
    pub fn grid_size(mut self, grid_size: u32) -> Result<Self> {
        if grid_size < MIN_GRID_SIZE {
            return Err(EdgeError::InvalidConfig(format!(
                "grid size must be >= {} (got {})",
                MIN_GRID_SIZE, grid_size
            )));
        }
        self.grid_size = grid_size;
        Ok(self)
    }

    /// Set the number of points handed to the engine
    pub fn point_num(mut self, point_num: usize) -> Self {
        self.point_num = point_num;
        self
    }

    /// Set the distribution hint
    pub fn distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Set the tetrahedron count ceiling
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the ceiling is zero
    pub fn tetra_max(mut self, tetra_max: usize) -> Result<Self> {
        if tetra_max == 0 {
            return Err(EdgeError::InvalidConfig(
                "tetrahedron ceiling must be positive".to_string(),
            ));
        }
        self.tetra_max = tetra_max;
        Ok(self)
    }

    /// Set the weight magnitude ceiling
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the ceiling is negative or not finite
    pub fn weight_max(mut self, weight_max: f32) -> Result<Self> {
        if !weight_max.is_finite() || weight_max < 0.0 {
            return Err(EdgeError::InvalidConfig(format!(
                "weight ceiling must be finite and >= 0 (got {})",
                weight_max
            )));
        }
        self.weight_max = weight_max;
        Ok(self)
    }

    /// Set the seed used for insertion order and point generation
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable progress messages
    pub fn log_verbose(mut self, enabled: bool) -> Self {
        self.log_verbose = enabled;
        self
    }

    /// Enable or disable insertion statistics
    pub fn log_stats(mut self, enabled: bool) -> Self {
        self.log_stats = enabled;
        self
    }

    /// Enable or disable phase timing output
    pub fn log_timing(mut self, enabled: bool) -> Self {
        self.log_timing = enabled;
        self
    }

    /// Enable or disable triangulation self-checks
    pub fn do_check(mut self, enabled: bool) -> Self {
        self.do_check = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            grid_size: self.grid_size,
            point_num: self.point_num,
            distribution: self.distribution,
            tetra_max: self.tetra_max,
            weight_max: self.weight_max,
            seed: self.seed,
            log_verbose: self.log_verbose,
            log_stats: self.log_stats,
            log_timing: self.log_timing,
            do_check: self.do_check,
        })
    }
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
