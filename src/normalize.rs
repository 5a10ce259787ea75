//! Grid normalization
//!
//! Maps raw coordinates into the engine lattice `[1, G - 2]`. One affine
//! transform, derived from the shared [`BoundingExtent`], is applied to all
//! three axes so the cloud is never stretched along a single axis.

use glam::Vec3;

use crate::config::MIN_GRID_SIZE;
use crate::error::{EdgeError, Result};
use crate::loader::{BoundingExtent, RawPoint};

/// Scale one coordinate into the grid domain
///
/// Translates by `-min`, scales by `(grid_size - 3) / (max - min)` and shifts
/// by `+1`. Values in `[min, max]` land in `[1, grid_size - 2]`; values
/// outside are not clamped. The caller guarantees `max > min`.
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::scale_coordinate;
///
/// assert_eq!(scale_coordinate(-4.0, -4.0, 4.0, 512), 1.0);
/// assert_eq!(scale_coordinate(4.0, -4.0, 4.0, 512), 510.0);
/// assert_eq!(scale_coordinate(0.0, -4.0, 4.0, 512), 255.5);
/// ```
#[inline]
pub fn scale_coordinate(value: f64, min: f64, max: f64, grid_size: u32) -> f32 {
    let range = max - min;
    ((f64::from(grid_size) - 3.0) * (value - min) / range + 1.0) as f32
}

/// Normalized engine input: grid points with their weights, index-aligned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPoints {
    pub points: Vec<Vec3>,
    pub weights: Vec<f32>,
}

impl NormalizedPoints {
    /// Number of points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Affine map from a bounding extent into the grid domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridNormalizer {
    min: f64,
    scale: f64,
    grid_size: u32,
}

impl GridNormalizer {
    /// Derive the transform for an extent and grid resolution
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `grid_size < 4`
    /// - `EmptyInput` if the extent never saw a value
    /// - `DegenerateExtent` if the extent has zero width or is not finite
    pub fn new(extent: BoundingExtent, grid_size: u32) -> Result<Self> {
        if grid_size < MIN_GRID_SIZE {
            return Err(EdgeError::InvalidConfig(format!(
                "grid size must be >= {} (got {})",
                MIN_GRID_SIZE, grid_size
            )));
        }
        if extent.is_empty() {
            return Err(EdgeError::EmptyInput);
        }
        if !extent.min.is_finite() || !extent.max.is_finite() {
            return Err(EdgeError::DegenerateExtent(format!(
                "extent [{}, {}] is not finite",
                extent.min, extent.max
            )));
        }

        let width = extent.width();
        let scale = (f64::from(grid_size) - 3.0) / width;
        if width <= 0.0 || !scale.is_finite() {
            return Err(EdgeError::DegenerateExtent(format!(
                "all coordinates equal {}; cannot scale a zero-width extent",
                extent.min
            )));
        }

        Ok(Self {
            min: extent.min,
            scale,
            grid_size,
        })
    }

    /// Grid resolution this normalizer targets
    #[inline]
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Map a single coordinate
    #[inline]
    pub fn map_value(&self, value: f64) -> f32 {
        ((value - self.min) * self.scale + 1.0) as f32
    }

    /// Map the spatial part of a raw point
    #[inline]
    pub fn map(&self, point: &RawPoint) -> Vec3 {
        Vec3::new(
            self.map_value(point.x),
            self.map_value(point.y),
            self.map_value(point.z),
        )
    }
}

/// Normalize raw points into grid points and parallel weights
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::*;
///
/// let points = vec![
///     RawPoint::new(0.0, 0.0, 0.0, 0.5),
///     RawPoint::new(2.0, 1.0, 0.5, 0.25),
/// ];
/// let extent = BoundingExtent::from_points(&points);
/// let normalized = normalize_points(&points, extent, 512).unwrap();
///
/// assert_eq!(normalized.points[0], Vec3::new(1.0, 1.0, 1.0));
/// assert_eq!(normalized.points[1].x, 510.0);
/// assert_eq!(normalized.weights, vec![0.5, 0.25]);
/// ```
///
/// # Errors
///
/// Same as [`GridNormalizer::new`]
pub fn normalize_points(
    points: &[RawPoint],
    extent: BoundingExtent,
    grid_size: u32,
) -> Result<NormalizedPoints> {
    let normalizer = GridNormalizer::new(extent, grid_size)?;

    let mut normalized = NormalizedPoints {
        points: Vec::with_capacity(points.len()),
        weights: Vec::with_capacity(points.len()),
    };
    for point in points {
        normalized.points.push(normalizer.map(point));
        normalized.weights.push(point.w as f32);
    }

    Ok(normalized)
}
