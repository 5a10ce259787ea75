//! Point loading from whitespace-separated `x y z w` streams
//!
//! Reading is lenient: the first token that is not a finite real number, or a
//! trailing record with fewer than four values, ends the read. Everything
//! parsed up to that point is kept and the stop is reported through
//! [`LoadedPoints::truncation`] instead of an error.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, Result};

/// A weighted input point as read from the stream
///
/// The position in the input defines the vertex index used by every later
/// stage, including the written edge list.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Weight used by the power distance
    pub w: f64,
}

impl RawPoint {
    /// Create a new raw point
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }
}

/// Scalar range spanning every spatial coordinate of every point
///
/// One range is shared by all three axes so that normalization scales the
/// cloud uniformly. An extent that has seen no values keeps `min > max`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingExtent {
    pub min: f64,
    pub max: f64,
}

impl BoundingExtent {
    /// Extent initialized from opposite numeric limits
    pub const fn empty() -> Self {
        Self {
            min: f64::MAX,
            max: f64::MIN,
        }
    }

    /// Compute the extent over x, y and z of all points
    pub fn from_points(points: &[RawPoint]) -> Self {
        let mut extent = Self::empty();
        for point in points {
            extent.include_point(point);
        }
        extent
    }

    /// Grow the extent to cover a single value
    #[inline]
    pub fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Grow the extent to cover the spatial coordinates of a point
    #[inline]
    pub fn include_point(&mut self, point: &RawPoint) {
        self.include(point.x);
        self.include(point.y);
        self.include(point.z);
    }

    /// True if no value has been included
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Width of the range (negative when empty)
    #[inline]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// True if the extent cannot be scaled: empty, zero width or not finite
    pub fn is_degenerate(&self) -> bool {
        self.is_empty()
            || !self.min.is_finite()
            || !self.max.is_finite()
            || !(self.width() > 0.0 && self.width().is_finite())
    }
}

impl Default for BoundingExtent {
    fn default() -> Self {
        Self::empty()
    }
}

/// Why reading stopped before the end of the stream
#[derive(Debug, Clone, PartialEq)]
pub enum TruncationReason {
    /// A token was not a finite real number
    MalformedToken(String),
    /// The stream ended inside a record
    IncompleteRecord {
        /// Number of values found for the unfinished record
        values: usize,
    },
}

/// Where reading stopped early
#[derive(Debug, Clone, PartialEq)]
pub struct Truncation {
    /// Complete points read before the stop
    pub points_read: usize,
    /// Zero-based index of the offending token in the stream
    pub token_index: usize,
    pub reason: TruncationReason,
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            TruncationReason::MalformedToken(token) => write!(
                f,
                "input truncated after {} points: malformed token {:?} at position {}",
                self.points_read, token, self.token_index
            ),
            TruncationReason::IncompleteRecord { values } => write!(
                f,
                "input truncated after {} points: trailing record has {} of 4 values",
                self.points_read, values
            ),
        }
    }
}

/// Points read from a stream together with their bounding extent
#[derive(Debug, Clone)]
pub struct LoadedPoints {
    pub points: Vec<RawPoint>,
    pub extent: BoundingExtent,
    /// Set when reading stopped before the end of the stream
    pub truncation: Option<Truncation>,
}

impl LoadedPoints {
    /// Number of complete points read
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no complete point was read
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Read `x y z w` quadruples from a buffered reader
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::read_points;
///
/// let input = "0 0 0 0.5\n1 2 3 0.1\n";
/// let loaded = read_points(input.as_bytes()).unwrap();
///
/// assert_eq!(loaded.len(), 2);
/// assert_eq!(loaded.extent.min, 0.0);
/// assert_eq!(loaded.extent.max, 3.0);
/// assert!(loaded.truncation.is_none());
/// ```
///
/// # Errors
///
/// Returns `InputReadFailed` if the underlying reader fails
pub fn read_points<R: BufRead>(mut reader: R) -> Result<LoadedPoints> {
    let mut points = Vec::with_capacity(1024);
    let mut extent = BoundingExtent::empty();
    let mut record = [0.0f64; 4];
    let mut filled = 0;
    let mut token_index = 0;
    let mut truncation = None;
    let mut line = Vec::with_capacity(256);

    // Raw bytes: a token that is not UTF-8 is malformed like any other
    'lines: loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| EdgeError::InputReadFailed(e.to_string()))?;
        if read == 0 {
            break;
        }

        for token in line
            .split(|b| b.is_ascii_whitespace())
            .filter(|t| !t.is_empty())
        {
            match parse_token(token) {
                Some(value) => {
                    record[filled] = value;
                    filled += 1;
                }
                None => {
                    truncation = Some(Truncation {
                        points_read: points.len(),
                        token_index,
                        reason: TruncationReason::MalformedToken(
                            String::from_utf8_lossy(token).into_owned(),
                        ),
                    });
                    break 'lines;
                }
            }
            token_index += 1;

            if filled == 4 {
                let point = RawPoint::new(record[0], record[1], record[2], record[3]);
                extent.include_point(&point);
                points.push(point);
                filled = 0;
            }
        }
    }

    if truncation.is_none() && filled > 0 {
        truncation = Some(Truncation {
            points_read: points.len(),
            token_index,
            reason: TruncationReason::IncompleteRecord { values: filled },
        });
    }

    Ok(LoadedPoints {
        points,
        extent,
        truncation,
    })
}

/// Parse one finite real number
#[inline]
fn parse_token(token: &[u8]) -> Option<f64> {
    std::str::from_utf8(token)
        .ok()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Open a file and read its points
///
/// # Errors
///
/// Returns `InputUnreadable` if the file cannot be opened and
/// `InputReadFailed` if reading it fails part way
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<LoadedPoints> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| EdgeError::InputUnreadable(format!("{}: {}", path.display(), e)))?;

    read_points(BufReader::new(file)).map_err(|err| match err {
        EdgeError::InputReadFailed(msg) => {
            EdgeError::InputReadFailed(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Write points as `x y z w` lines, readable by [`read_points`]
pub fn write_points<W: Write>(writer: W, points: &[RawPoint]) -> io::Result<()> {
    let mut out = BufWriter::new(writer);
    for p in points {
        writeln!(out, "{} {} {} {}", p.x, p.y, p.z, p.w)?;
    }
    out.flush()
}
