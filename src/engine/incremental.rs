//! Incremental regular triangulation
//!
//! Bowyer-Watson insertion driven by the power test. The hull is closed by a
//! single symbolic vertex at infinity: every hull facet carries a ghost cell
//! joining it to that vertex, so each cell always has four neighbors and
//! points outside the current hull are inserted exactly like interior ones.
//!
//! Orientation convention: finite cells are positively oriented (see
//! [`orient3d`]). A ghost cell with the infinite vertex in slot `i` is
//! oriented so that substituting a point beyond its hull facet for the
//! infinite vertex yields a positive cell.
//!
//! Replacing slot `i` of a cavity cell by the new point, for every cavity
//! face `i` whose neighbor survives, produces correctly oriented new cells in
//! both the finite and the ghost case.
//!
//! The predicates have exact signs, so lattices and other cospherical or
//! coplanar input need no tolerance. A point exactly on a power sphere is not
//! in conflict with it. Two cells sharing a face have equal power functions on
//! that face's plane, which keeps every cavity star-shaped around the new
//! point even when ties occur.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use glam::{DVec3, Vec3};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::predicates::{collinear, orient3d, power_test};
use super::{EngineTiming, Tetrahedron, TriangulationEngine};
use crate::config::EngineConfig;
use crate::error::{EdgeError, Result};

/// Vertex id of the symbolic point at infinity
const INFINITE: u32 = u32::MAX;

/// Placeholder for a neighbor that has not been linked yet
const UNLINKED: u32 = u32::MAX;

/// Minimum step budget for the visibility walk
const MIN_WALK_STEPS: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Cell {
    vertices: [u32; 4],
    /// `neighbors[i]` shares the face opposite `vertices[i]`
    neighbors: [u32; 4],
}

impl Cell {
    #[inline]
    fn infinite_slot(&self) -> Option<usize> {
        self.vertices.iter().position(|&v| v == INFINITE)
    }

    /// Sorted vertex ids of the face opposite `slot`
    fn face_key(&self, slot: usize) -> [u32; 3] {
        let mut key = [0u32; 3];
        let mut k = 0;
        for (i, &v) in self.vertices.iter().enumerate() {
            if i != slot {
                key[k] = v;
                k += 1;
            }
        }
        key.sort_unstable();
        key
    }
}

/// Counters collected during `compute`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertionStats {
    /// Points that became vertices when inserted (including the first simplex)
    pub inserted: usize,
    /// Points skipped because their weight leaves them outside every power sphere
    pub hidden: usize,
    /// Walks that exhausted their step budget and fell back to a full scan
    pub walk_fallbacks: usize,
    /// Largest number of live cells (ghosts included) seen
    pub peak_cells: usize,
}

/// Where point location ended
enum Located {
    /// A cell in conflict with the point
    Conflict(u32),
    /// No cell is in conflict: the point is hidden
    Hidden,
}

/// Reference weighted Delaunay engine
///
/// Inserts points in a seeded random order, so the output is reproducible for
/// a given [`EngineConfig::seed`].
///
/// # Example
///
/// ```rust
/// use weighted_delaunay_edges::*;
///
/// let points = vec![
///     Vec3::new(1.0, 1.0, 1.0),
///     Vec3::new(9.0, 1.0, 1.0),
///     Vec3::new(1.0, 9.0, 1.0),
///     Vec3::new(1.0, 1.0, 9.0),
///     Vec3::new(9.0, 9.0, 9.0),
/// ];
/// let weights = vec![0.0; 5];
///
/// let mut engine = IncrementalEngine::new();
/// engine.init(&EngineConfig::default(), &points, &weights).unwrap();
/// engine.compute().unwrap();
/// assert_eq!(engine.stats().inserted, 5);
/// assert!(!engine.tetrahedra().is_empty());
/// engine.deinit();
/// ```
#[derive(Debug, Default)]
pub struct IncrementalEngine {
    config: Option<EngineConfig>,
    points: Vec<DVec3>,
    weights: Vec<f64>,
    cells: Vec<Cell>,
    alive: Vec<bool>,
    free: Vec<u32>,
    live_cells: usize,
    last_cell: u32,
    tetrahedra: Vec<Tetrahedron>,
    stats: InsertionStats,
}

impl IncrementalEngine {
    /// Create an uninitialized engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters from the last `compute`
    pub fn stats(&self) -> InsertionStats {
        self.stats
    }

    #[inline]
    fn point(&self, v: u32) -> DVec3 {
        self.points[v as usize]
    }

    /// Orientation of `cell` with `slot` replaced by point `p`
    fn orient_with(&self, cell: &Cell, slot: usize, p: u32) -> f64 {
        let q: [DVec3; 4] = std::array::from_fn(|i| {
            if i == slot {
                self.point(p)
            } else {
                self.point(cell.vertices[i])
            }
        });
        orient3d(q[0], q[1], q[2], q[3])
    }

    fn finite_conflict(&self, cell: &Cell, p: u32) -> bool {
        let v = cell.vertices;
        let positions = v.map(|i| self.point(i));
        let weights = v.map(|i| self.weights[i as usize]);
        power_test(positions, weights, self.point(p), self.weights[p as usize]) < 0.0
    }

    /// True if the cell cannot survive the insertion of `p`
    fn conflict(&self, id: u32, p: u32) -> bool {
        let cell = &self.cells[id as usize];
        match cell.infinite_slot() {
            None => self.finite_conflict(cell, p),
            Some(slot) => {
                let side = self.orient_with(cell, slot, p);
                if side > 0.0 {
                    true
                } else if side < 0.0 {
                    false
                } else {
                    // On the hull plane: decided by the finite cell behind the facet
                    let finite = &self.cells[cell.neighbors[slot] as usize];
                    self.finite_conflict(finite, p)
                }
            }
        }
    }

    fn allocate(&mut self, cell: Cell) -> u32 {
        self.live_cells += 1;
        self.stats.peak_cells = self.stats.peak_cells.max(self.live_cells);
        match self.free.pop() {
            Some(id) => {
                self.cells[id as usize] = cell;
                self.alive[id as usize] = true;
                id
            }
            None => {
                self.cells.push(cell);
                self.alive.push(true);
                (self.cells.len() - 1) as u32
            }
        }
    }

    fn release(&mut self, id: u32) {
        self.alive[id as usize] = false;
        self.free.push(id);
        self.live_cells -= 1;
    }

    /// Pair up the unlinked faces of freshly created cells
    fn link_faces(&mut self, ids: &[u32]) -> Result<()> {
        let mut open: HashMap<[u32; 3], (u32, usize)> = HashMap::with_capacity(ids.len() * 2);

        for &id in ids {
            for slot in 0..4 {
                if self.cells[id as usize].neighbors[slot] != UNLINKED {
                    continue;
                }
                let key = self.cells[id as usize].face_key(slot);
                match open.remove(&key) {
                    Some((other, other_slot)) => {
                        self.cells[id as usize].neighbors[slot] = other;
                        self.cells[other as usize].neighbors[other_slot] = id;
                    }
                    None => {
                        open.insert(key, (id, slot));
                    }
                }
            }
        }

        if open.is_empty() {
            Ok(())
        } else {
            Err(EdgeError::EngineFailed(format!(
                "{} cavity faces left unmatched",
                open.len()
            )))
        }
    }

    /// Pick four affinely independent points, in insertion order
    fn find_initial_simplex(&self, order: &[u32]) -> Option<[u32; 4]> {
        let &a = order.first()?;
        let pa = self.point(a);

        let &b = order.iter().find(|&&v| self.point(v) != pa)?;
        let pb = self.point(b);

        let &c = order
            .iter()
            .find(|&&v| v != b && !collinear(pa, pb, self.point(v)))?;
        let pc = self.point(c);

        let &d = order
            .iter()
            .find(|&&v| v != a && v != b && v != c && orient3d(pa, pb, pc, self.point(v)) != 0.0)?;

        if orient3d(pa, pb, pc, self.point(d)) > 0.0 {
            Some([a, b, c, d])
        } else {
            Some([b, a, c, d])
        }
    }

    /// Build the first finite cell and its four ghosts
    fn start(&mut self, simplex: [u32; 4]) -> Result<()> {
        let solid = self.allocate(Cell {
            vertices: simplex,
            neighbors: [UNLINKED; 4],
        });

        let mut ghosts = [0u32; 4];
        for slot in 0..4 {
            let mut vertices = simplex;
            vertices[slot] = INFINITE;
            // Swap two finite slots to flip the orientation across the facet
            let (j, k) = if slot < 2 { (2, 3) } else { (0, 1) };
            vertices.swap(j, k);

            let mut neighbors = [UNLINKED; 4];
            neighbors[slot] = solid;
            ghosts[slot] = self.allocate(Cell {
                vertices,
                neighbors,
            });
            self.cells[solid as usize].neighbors[slot] = ghosts[slot];
        }

        self.last_cell = solid;
        self.link_faces(&ghosts)
    }

    /// Find a cell in conflict with `p` by walking from the last created cell
    fn locate(&mut self, p: u32, rng: &mut ChaCha8Rng) -> Located {
        let mut current = if self.alive[self.last_cell as usize] {
            self.last_cell
        } else {
            self.alive.iter().position(|&a| a).unwrap_or(0) as u32
        };

        let budget = self.live_cells.max(MIN_WALK_STEPS);
        for _ in 0..budget {
            let cell = self.cells[current as usize];

            if let Some(slot) = cell.infinite_slot() {
                if self.conflict(current, p) {
                    return Located::Conflict(current);
                }
                current = cell.neighbors[slot];
                continue;
            }

            let offset = rng.gen_range(0..4);
            let exit = (0..4)
                .map(|k| (offset + k) % 4)
                .find(|&slot| self.orient_with(&cell, slot, p) < 0.0);

            match exit {
                Some(slot) => current = cell.neighbors[slot],
                None if self.conflict(current, p) => return Located::Conflict(current),
                None => return Located::Hidden,
            }
        }

        self.stats.walk_fallbacks += 1;
        self.scan(p)
    }

    /// Linear search for any cell in conflict with `p`
    fn scan(&self, p: u32) -> Located {
        (0..self.cells.len() as u32)
            .find(|&id| self.alive[id as usize] && self.conflict(id, p))
            .map_or(Located::Hidden, Located::Conflict)
    }

    /// Insert one point; returns false if it is hidden
    fn insert(&mut self, p: u32, rng: &mut ChaCha8Rng) -> Result<bool> {
        let start = match self.locate(p, rng) {
            Located::Conflict(id) => id,
            Located::Hidden => return Ok(false),
        };

        let mut cavity = vec![start];
        let mut members: HashSet<u32> = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            for n in self.cells[id as usize].neighbors {
                if !members.contains(&n) && self.conflict(n, p) {
                    members.insert(n);
                    cavity.push(n);
                    stack.push(n);
                }
            }
        }

        // (new cell vertices, slot facing outward, outside neighbor, its back slot)
        let mut boundary = Vec::with_capacity(cavity.len() * 2);
        for &id in &cavity {
            let cell = self.cells[id as usize];
            for slot in 0..4 {
                let outside = cell.neighbors[slot];
                if members.contains(&outside) {
                    continue;
                }
                let back = self.cells[outside as usize]
                    .neighbors
                    .iter()
                    .position(|&n| n == id)
                    .ok_or_else(|| {
                        EdgeError::EngineFailed(format!(
                            "cell {} is not linked back to cell {}",
                            outside, id
                        ))
                    })?;
                let mut vertices = cell.vertices;
                vertices[slot] = p;
                boundary.push((vertices, slot, outside, back));
            }
        }

        for &id in &cavity {
            self.release(id);
        }

        let mut created = Vec::with_capacity(boundary.len());
        for (vertices, slot, outside, back) in boundary {
            let mut neighbors = [UNLINKED; 4];
            neighbors[slot] = outside;
            let id = self.allocate(Cell {
                vertices,
                neighbors,
            });
            self.cells[outside as usize].neighbors[back] = id;
            created.push(id);
        }
        self.link_faces(&created)?;

        if let Some(id) = created
            .iter()
            .copied()
            .find(|&id| self.cells[id as usize].infinite_slot().is_none())
            .or_else(|| created.first().copied())
        {
            self.last_cell = id;
        }

        Ok(true)
    }

    fn collect_tetrahedra(&mut self) {
        self.tetrahedra = self
            .cells
            .iter()
            .zip(&self.alive)
            .filter(|(cell, alive)| **alive && cell.infinite_slot().is_none())
            .map(|(cell, _)| Tetrahedron(cell.vertices))
            .collect();
        self.tetrahedra.sort_unstable();
    }

    fn run_checks(&self) -> Result<()> {
        #[cfg(feature = "validation")]
        {
            let points: Vec<Vec3> = self.points.iter().map(|p| p.as_vec3()).collect();
            super::check::check_triangulation(&points, &self.tetrahedra)
        }

        #[cfg(not(feature = "validation"))]
        {
            eprintln!("[Engine] do_check requested but the `validation` feature is disabled");
            Ok(())
        }
    }

    fn report(&self, config: &EngineConfig, timing: &EngineTiming) {
        if config.log_stats {
            eprintln!(
                "[Engine] {} points: {} inserted, {} hidden, {} tetrahedra, peak {} cells, {} walk fallbacks",
                self.points.len(),
                self.stats.inserted,
                self.stats.hidden,
                self.tetrahedra.len(),
                self.stats.peak_cells,
                self.stats.walk_fallbacks
            );
        }
        if config.log_timing {
            eprintln!(
                "[Engine] prepare={:?}, init={:?}, insertion={:?}, output={:?}, total={:?}",
                timing.prepare,
                timing.init,
                timing.insertion,
                timing.output,
                timing.total()
            );
        }
    }
}

impl TriangulationEngine for IncrementalEngine {
    fn init(&mut self, config: &EngineConfig, points: &[Vec3], weights: &[f32]) -> Result<()> {
        if points.len() != weights.len() {
            return Err(EdgeError::EngineFailed(format!(
                "{} points but {} weights",
                points.len(),
                weights.len()
            )));
        }
        if points.len() >= INFINITE as usize {
            return Err(EdgeError::EngineFailed(format!(
                "{} points exceed the index range",
                points.len()
            )));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(EdgeError::EngineFailed(format!(
                "point {} has non-finite coordinates {:?}",
                i, points[i]
            )));
        }
        if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
            return Err(EdgeError::EngineFailed(format!(
                "point {} has non-finite weight {}",
                i, weights[i]
            )));
        }

        self.deinit();
        self.points = points.iter().map(|p| p.as_dvec3()).collect();
        self.weights = weights.iter().map(|&w| f64::from(w)).collect();
        self.config = Some(*config);

        if config.log_verbose {
            eprintln!(
                "[Engine] init: {} points, grid {}, {} distribution",
                points.len(),
                config.grid_size,
                config.distribution.name()
            );
        }
        Ok(())
    }

    fn compute(&mut self) -> Result<EngineTiming> {
        let config = self
            .config
            .ok_or_else(|| EdgeError::EngineFailed("compute called before init".to_string()))?;

        self.cells.clear();
        self.alive.clear();
        self.free.clear();
        self.live_cells = 0;
        self.tetrahedra.clear();
        self.stats = InsertionStats::default();
        let mut timing = EngineTiming::default();

        let phase = Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut order: Vec<u32> = (0..self.points.len() as u32).collect();
        order.shuffle(&mut rng);
        timing.prepare = phase.elapsed();

        let phase = Instant::now();
        let simplex = self.find_initial_simplex(&order);
        if let Some(simplex) = simplex {
            self.start(simplex)?;
            self.stats.inserted = 4;
        }
        timing.init = phase.elapsed();

        let Some(simplex) = simplex else {
            if config.log_verbose {
                eprintln!(
                    "[Engine] {} points span no tetrahedron; nothing to triangulate",
                    self.points.len()
                );
            }
            self.report(&config, &timing);
            return Ok(timing);
        };

        let phase = Instant::now();
        for &p in &order {
            if simplex.contains(&p) {
                continue;
            }
            if self.insert(p, &mut rng)? {
                self.stats.inserted += 1;
            } else {
                self.stats.hidden += 1;
            }
            if self.live_cells > config.tetra_max {
                return Err(EdgeError::EngineFailed(format!(
                    "{} cells exceed the ceiling of {}",
                    self.live_cells, config.tetra_max
                )));
            }
        }
        timing.insertion = phase.elapsed();

        let phase = Instant::now();
        self.collect_tetrahedra();
        if config.do_check {
            self.run_checks()?;
        }
        timing.output = phase.elapsed();

        if config.log_verbose {
            eprintln!("[Engine] computed {} tetrahedra", self.tetrahedra.len());
        }
        self.report(&config, &timing);
        Ok(timing)
    }

    fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tetrahedra
    }

    fn deinit(&mut self) {
        self.config = None;
        self.points = Vec::new();
        self.weights = Vec::new();
        self.cells = Vec::new();
        self.alive = Vec::new();
        self.free = Vec::new();
        self.live_cells = 0;
        self.last_cell = 0;
        self.tetrahedra = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfigBuilder, DEFAULT_GRID_SIZE};
    use crate::loader::{BoundingExtent, RawPoint};
    use crate::normalize::normalize_points;
    use std::collections::{BTreeSet, HashMap};

    /// Faces of a positive tetrahedron with the opposite vertex on their positive side
    const INWARD_FACES: [[usize; 3]; 4] = [[1, 3, 2], [0, 2, 3], [0, 3, 1], [0, 1, 2]];

    fn random_cloud(count: usize, max_weight: f32, seed: u64) -> (Vec<Vec3>, Vec<f32>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(1.0..510.0),
                    rng.gen_range(1.0..510.0),
                    rng.gen_range(1.0..510.0),
                )
            })
            .collect();
        let weights = (0..count).map(|_| rng.gen_range(0.0..=max_weight)).collect();
        (points, weights)
    }

    fn triangulate(points: &[Vec3], weights: &[f32], config: &EngineConfig) -> (Vec<Tetrahedron>, InsertionStats) {
        let mut engine = IncrementalEngine::new();
        engine.init(config, points, weights).unwrap();
        engine.compute().unwrap();
        let result = (engine.tetrahedra().to_vec(), engine.stats());
        engine.deinit();
        result
    }

    fn corner_points() -> Vec<Vec3> {
        vec![
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(200.0, 1.0, 1.0),
            Vec3::new(1.0, 200.0, 1.0),
            Vec3::new(1.0, 1.0, 200.0),
        ]
    }

    fn orientation(points: &[Vec3], tet: &Tetrahedron) -> f64 {
        let [a, b, c, d] = tet.0.map(|v| points[v as usize].as_dvec3());
        orient3d(a, b, c, d)
    }

    /// Every finite face is shared by two tetrahedra or lies on the hull
    fn face_counts(tets: &[Tetrahedron]) -> HashMap<[u32; 3], usize> {
        let mut counts = HashMap::new();
        for tet in tets {
            for slot in 0..4 {
                let mut key = [0u32; 3];
                let mut k = 0;
                for (i, &v) in tet.0.iter().enumerate() {
                    if i != slot {
                        key[k] = v;
                        k += 1;
                    }
                }
                key.sort_unstable();
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_single_tetrahedron() {
        let points = corner_points();
        let (tets, stats) = triangulate(&points, &[0.0; 4], &EngineConfig::default());

        assert_eq!(tets.len(), 1);
        let mut vertices = tets[0].0;
        vertices.sort_unstable();
        assert_eq!(vertices, [0, 1, 2, 3]);
        assert!(orientation(&points, &tets[0]) > 0.0);
        assert_eq!(stats.inserted, 4);
        assert_eq!(stats.hidden, 0);
    }

    #[test]
    fn test_fewer_than_four_points() {
        let points = corner_points();
        for count in 0..4 {
            let (tets, _) = triangulate(&points[..count], &vec![0.0; count], &EngineConfig::default());
            assert!(tets.is_empty());
        }
    }

    #[test]
    fn test_coplanar_points_yield_nothing() {
        let points: Vec<Vec3> = (0..20)
            .map(|i| Vec3::new(1.0 + (i % 5) as f32 * 7.0, 1.0 + (i / 5) as f32 * 11.0, 42.0))
            .collect();
        let (tets, _) = triangulate(&points, &vec![0.0; 20], &EngineConfig::default());
        assert!(tets.is_empty());
    }

    #[test]
    fn test_light_interior_point_is_hidden() {
        let mut points = corner_points();
        points.push(Vec3::new(30.0, 30.0, 30.0));
        let weights = [0.0, 0.0, 0.0, 0.0, -1.0e6];

        let (tets, stats) = triangulate(&points, &weights, &EngineConfig::default());

        assert_eq!(tets.len(), 1);
        assert!(!tets[0].0.contains(&4));
        assert_eq!(stats.hidden, 1);
    }

    #[test]
    fn test_interior_point_splits_tetrahedron() {
        let mut points = corner_points();
        points.push(Vec3::new(30.0, 30.0, 30.0));

        let (tets, stats) = triangulate(&points, &[0.0; 5], &EngineConfig::default());

        assert_eq!(tets.len(), 4);
        assert!(tets.iter().all(|t| t.0.contains(&4)));
        assert_eq!(stats.hidden, 0);
    }

    #[test]
    fn test_heavy_duplicate_replaces_vertex() {
        let mut points = corner_points();
        points.push(Vec3::new(30.0, 30.0, 30.0));
        points.push(Vec3::new(30.0, 30.0, 30.0));
        let weights = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0];

        let (tets, stats) = triangulate(&points, &weights, &EngineConfig::default());

        // Equal weights: exactly one of the two copies survives
        assert_eq!(tets.len(), 4);
        assert_eq!(stats.hidden, 1);
        let used: BTreeSet<u32> = tets.iter().flat_map(|t| t.0).collect();
        assert_eq!(used.len(), 5);
    }

    #[test]
    fn test_regular_property_on_random_cloud() {
        let (points, weights) = random_cloud(80, 3000.0, 11);
        let (tets, stats) = triangulate(&points, &weights, &EngineConfig::default());

        assert!(!tets.is_empty());
        assert_eq!(stats.inserted + stats.hidden, points.len());

        // Later heavy points may evict earlier vertices
        let used: BTreeSet<u32> = tets.iter().flat_map(|t| t.0).collect();
        assert!(used.len() <= stats.inserted);

        for tet in &tets {
            assert!(orientation(&points, tet) > 0.0, "{:?} is inverted", tet);

            let cell = tet.0.map(|v| points[v as usize].as_dvec3());
            let cell_weights = tet.0.map(|v| f64::from(weights[v as usize]));
            for &q in &used {
                if tet.0.contains(&q) {
                    continue;
                }
                let power = power_test(
                    cell,
                    cell_weights,
                    points[q as usize].as_dvec3(),
                    f64::from(weights[q as usize]),
                );
                assert!(power >= 0.0, "vertex {} violates {:?} ({})", q, tet, power);
            }
        }

        for (face, count) in face_counts(&tets) {
            assert!(count <= 2, "face {:?} shared by {} cells", face, count);
        }
    }

    #[test]
    fn test_hull_faces_match_brute_force() {
        let (points, weights) = random_cloud(24, 2000.0, 5);
        let (tets, _) = triangulate(&points, &weights, &EngineConfig::default());

        let boundary: BTreeSet<[u32; 3]> = face_counts(&tets)
            .into_iter()
            .filter(|&(_, count)| count == 1)
            .map(|(face, _)| face)
            .collect();

        let n = points.len() as u32;
        let p = |i: u32| points[i as usize].as_dvec3();
        let mut hull = BTreeSet::new();
        for a in 0..n {
            for b in a + 1..n {
                for c in b + 1..n {
                    let sides: Vec<f64> = (0..n)
                        .filter(|&q| q != a && q != b && q != c)
                        .map(|q| orient3d(p(a), p(b), p(c), p(q)))
                        .collect();
                    if sides.iter().all(|&s| s > 0.0) || sides.iter().all(|&s| s < 0.0) {
                        hull.insert([a, b, c]);
                    }
                }
            }
        }

        assert_eq!(boundary, hull);
    }

    #[test]
    fn test_output_independent_of_insertion_seed() {
        let (points, weights) = random_cloud(60, 500.0, 3);
        let canonical = |tets: Vec<Tetrahedron>| -> BTreeSet<[u32; 4]> {
            tets.into_iter()
                .map(|t| {
                    let mut v = t.0;
                    v.sort_unstable();
                    v
                })
                .collect()
        };

        let first = EngineConfigBuilder::new().seed(1).build().unwrap();
        let second = EngineConfigBuilder::new().seed(2).build().unwrap();

        let (a, _) = triangulate(&points, &weights, &first);
        let (b, _) = triangulate(&points, &weights, &second);
        let (c, _) = triangulate(&points, &weights, &first);

        assert_eq!(a, c);
        assert_eq!(canonical(a), canonical(b));
    }

    #[test]
    fn test_cell_ceiling() {
        let (points, weights) = random_cloud(50, 0.0, 8);
        let config = EngineConfigBuilder::new().tetra_max(20).unwrap().build().unwrap();

        let mut engine = IncrementalEngine::new();
        engine.init(&config, &points, &weights).unwrap();
        assert!(matches!(engine.compute(), Err(EdgeError::EngineFailed(_))));
        engine.deinit();
    }

    #[test]
    fn test_init_rejects_mismatched_weights() {
        let mut engine = IncrementalEngine::new();
        let result = engine.init(&EngineConfig::default(), &corner_points(), &[0.0; 3]);
        assert!(matches!(result, Err(EdgeError::EngineFailed(_))));
    }

    #[test]
    fn test_compute_requires_init() {
        let mut engine = IncrementalEngine::new();
        assert!(engine.compute().is_err());

        engine
            .init(&EngineConfig::default(), &corner_points(), &[0.0; 4])
            .unwrap();
        engine.deinit();
        assert!(engine.compute().is_err());
    }

    /// Integer `k x k x k` lattice mapped onto the default grid
    fn normalized_lattice(k: usize) -> Vec<Vec3> {
        let raw: Vec<RawPoint> = (0..k * k * k)
            .map(|i| RawPoint::new((i % k) as f64, (i / k % k) as f64, (i / (k * k)) as f64, 0.0))
            .collect();
        let extent = BoundingExtent::from_points(&raw);
        normalize_points(&raw, extent, DEFAULT_GRID_SIZE).unwrap().points
    }

    /// Assert that `tets` tile the convex hull of their vertices; returns the volume
    fn assert_tiles_hull(points: &[Vec3], tets: &[Tetrahedron]) -> f64 {
        let p = |v: u32| points[v as usize].as_dvec3();
        let mut volume = 0.0;
        let mut faces: HashMap<[u32; 3], (usize, [u32; 3])> = HashMap::new();

        for tet in tets {
            let o = orientation(points, tet);
            assert!(o > 0.0, "{:?} is not positively oriented ({})", tet, o);
            volume += o / 6.0;

            for slots in INWARD_FACES {
                let face = slots.map(|i| tet.0[i]);
                let mut key = face;
                key.sort_unstable();
                faces.entry(key).or_insert((0, face)).0 += 1;
            }
        }

        let used: BTreeSet<u32> = tets.iter().flat_map(|t| t.0).collect();
        let centroid = used.iter().map(|&v| p(v)).sum::<DVec3>() / used.len() as f64;

        let mut cone_volume = 0.0;
        let mut boundary_edges: HashMap<(u32, u32), usize> = HashMap::new();
        for (key, &(count, face)) in &faces {
            assert!(count <= 2, "face {:?} shared by {} cells", key, count);
            if count == 2 {
                continue;
            }

            let [a, b, c] = face.map(p);
            for q in 0..points.len() as u32 {
                assert!(
                    orient3d(a, b, c, p(q)) >= 0.0,
                    "point {} lies beyond boundary face {:?}",
                    q,
                    face
                );
            }
            cone_volume += orient3d(a, b, c, centroid) / 6.0;

            for k in 0..3 {
                let (u, v) = (face[k], face[(k + 1) % 3]);
                *boundary_edges.entry((u.min(v), u.max(v))).or_insert(0) += 1;
            }
        }

        for (edge, count) in boundary_edges {
            assert_eq!(count, 2, "boundary edge {:?} borders {} faces", edge, count);
        }
        assert!(
            (volume - cone_volume).abs() <= 1e-9 * volume,
            "cells cover {} but the hull holds {}",
            volume,
            cone_volume
        );
        volume
    }

    #[test]
    fn test_scaled_lattices_tile_the_grid_cube() {
        let side = f64::from(DEFAULT_GRID_SIZE - 3);

        for k in [4, 6, 8] {
            let points = normalized_lattice(k);
            let (tets, stats) =
                triangulate(&points, &vec![0.0; points.len()], &EngineConfig::default());

            assert_eq!(stats.hidden, 0, "k = {}", k);
            let used: BTreeSet<u32> = tets.iter().flat_map(|t| t.0).collect();
            assert_eq!(used.len(), k * k * k, "k = {}", k);

            let volume = assert_tiles_hull(&points, &tets);
            assert!(
                (volume - side.powi(3)).abs() <= 1e-9 * side.powi(3),
                "k = {}: volume {}",
                k,
                volume
            );
        }
    }

    #[test]
    fn test_lattice_is_regular() {
        let points = normalized_lattice(4);
        let (tets, _) = triangulate(&points, &vec![0.0; points.len()], &EngineConfig::default());

        for tet in &tets {
            let cell = tet.0.map(|v| points[v as usize].as_dvec3());
            for q in 0..points.len() as u32 {
                if !tet.0.contains(&q) {
                    let power = power_test(cell, [0.0; 4], points[q as usize].as_dvec3(), 0.0);
                    assert!(power >= 0.0, "vertex {} inside the sphere of {:?}", q, tet);
                }
            }
        }
    }

    #[test]
    fn test_cube_corners() {
        let s = 1.0 + 509.0f32 / 3.0;
        let points: Vec<Vec3> = (0..8)
            .map(|i| {
                let c = |bit: u32| if i & bit != 0 { s } else { 1.0 };
                Vec3::new(c(1), c(2), c(4))
            })
            .collect();

        for seed in 0..4 {
            let config = EngineConfigBuilder::new().seed(seed).build().unwrap();
            let (tets, stats) = triangulate(&points, &[0.0; 8], &config);

            assert!(tets.len() == 5 || tets.len() == 6, "{} cells", tets.len());
            assert_eq!(stats.inserted, 8);
            let volume = assert_tiles_hull(&points, &tets);
            let side = f64::from(s) - 1.0;
            assert!((volume - side.powi(3)).abs() <= 1e-9 * side.powi(3));
        }
    }

    #[test]
    fn test_cospherical_shell_around_center() {
        // Every integer point at distance 5 from the center, plus the center
        let center = Vec3::splat(100.0);
        let mut points = vec![center];
        for x in -5i32..=5 {
            for y in -5i32..=5 {
                for z in -5i32..=5 {
                    if x * x + y * y + z * z == 25 {
                        points.push(center + Vec3::new(x as f32, y as f32, z as f32));
                    }
                }
            }
        }
        assert_eq!(points.len(), 31);

        let (tets, stats) = triangulate(&points, &vec![0.0; points.len()], &EngineConfig::default());

        assert_eq!(stats.hidden, 0);
        assert!(tets.iter().all(|t| t.0.contains(&0)), "center must see every cell");
        assert_tiles_hull(&points, &tets);
    }

    #[test]
    fn test_random_cloud_tiles_hull() {
        let (points, weights) = random_cloud(120, 800.0, 17);
        let (tets, _) = triangulate(&points, &weights, &EngineConfig::default());
        assert_tiles_hull(&points, &tets);
    }

    #[cfg(feature = "validation")]
    #[test]
    fn test_self_check_accepts_lattice() {
        let points = normalized_lattice(3);
        let config = EngineConfigBuilder::new().do_check(true).build().unwrap();

        let mut engine = IncrementalEngine::new();
        engine.init(&config, &points, &[0.0; 27]).unwrap();
        engine.compute().unwrap();
        assert!(!engine.tetrahedra().is_empty());
        engine.deinit();
    }

    #[cfg(feature = "validation")]
    #[test]
    fn test_self_check_passes() {
        let (points, weights) = random_cloud(100, 1000.0, 21);
        let config = EngineConfigBuilder::new().do_check(true).build().unwrap();

        let mut engine = IncrementalEngine::new();
        engine.init(&config, &points, &weights).unwrap();
        engine.compute().unwrap();
        engine.deinit();
    }
}
