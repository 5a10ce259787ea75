//! Edge list output

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::edges::Edge;
use crate::error::{EdgeError, Result};

/// Write one `low high` line per edge, with no header
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::{write_edges, Edge};
///
/// let mut out = Vec::new();
/// write_edges(&mut out, &[Edge::new(0, 1), Edge::new(2, 1)]).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "0 1\n1 2\n");
/// ```
pub fn write_edges<W: Write>(writer: W, edges: &[Edge]) -> io::Result<()> {
    let mut out = BufWriter::new(writer);
    for edge in edges {
        writeln!(out, "{} {}", edge.v0(), edge.v1())?;
    }
    out.flush()
}

/// Create `path` and write the edge list to it
///
/// # Errors
///
/// Returns `OutputUnwritable` if the file cannot be created and
/// `OutputWriteFailed` if writing to it fails
pub fn save_edges<P: AsRef<Path>>(path: P, edges: &[Edge]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| EdgeError::OutputUnwritable(format!("{}: {}", path.display(), e)))?;

    write_edges(file, edges)
        .map_err(|e| EdgeError::OutputWriteFailed(format!("{}: {}", path.display(), e)))
}
