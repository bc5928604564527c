//! Proximity graph construction
//!
//! An edge joins particles `i < j` whenever their Euclidean distance is
//! strictly below the connection threshold. The graph is rebuilt from scratch
//! on every call; nothing carries over between frames.
//!
//! Two strategies produce the same edge list, ordered by `(i, j)`:
//! - `BruteForce` tests every unordered pair
//! - `Grid` buckets particles into cells one threshold wide and only tests
//!   pairs in neighbouring cells

use driftline_core::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A connection between two particles
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// Lower particle index
    pub i: u32,
    /// Higher particle index
    pub j: u32,
    /// Distance between the two particles
    pub distance: f32,
}

/// How pairs are enumerated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityStrategy {
    #[default]
    BruteForce,
    Grid,
}

type CellKey = (i32, i32, i32);

/// Rebuilds the proximity graph, reusing its buffers between frames
#[derive(Debug, Default)]
pub struct ProximityGraphBuilder {
    strategy: ProximityStrategy,
    edges: Vec<Edge>,
    cells: FxHashMap<CellKey, SmallVec<[u32; 8]>>,
}

impl ProximityGraphBuilder {
    pub fn new(strategy: ProximityStrategy) -> Self {
        Self {
            strategy,
            edges: Vec::new(),
            cells: FxHashMap::default(),
        }
    }

    pub fn strategy(&self) -> ProximityStrategy {
        self.strategy
    }

    /// Recompute all edges for `positions`
    ///
    /// A threshold that is not a positive finite number yields no edges.
    pub fn rebuild(&mut self, positions: &[Vec3], threshold: f32) -> &[Edge] {
        self.edges.clear();

        if threshold.is_finite() && threshold > 0.0 {
            match self.strategy {
                ProximityStrategy::BruteForce => self.brute_force(positions, threshold),
                ProximityStrategy::Grid => self.grid(positions, threshold),
            }
        }

        tracing::trace!(
            particles = positions.len(),
            edges = self.edges.len(),
            "rebuilt proximity graph"
        );
        &self.edges
    }

    /// Edges from the most recent rebuild
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn brute_force(&mut self, positions: &[Vec3], threshold: f32) {
        for (i, a) in positions.iter().enumerate() {
            for (j, b) in positions.iter().enumerate().skip(i + 1) {
                let distance = a.distance(*b);
                if distance < threshold {
                    self.edges.push(Edge {
                        i: i as u32,
                        j: j as u32,
                        distance,
                    });
                }
            }
        }
    }

    fn grid(&mut self, positions: &[Vec3], threshold: f32) {
        self.cells.clear();
        for (index, p) in positions.iter().enumerate() {
            self.cells
                .entry(cell_of(*p, threshold))
                .or_default()
                .push(index as u32);
        }

        for (i, a) in positions.iter().enumerate() {
            let (cx, cy, cz) = cell_of(*a, threshold);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let key = (
                            cx.saturating_add(dx),
                            cy.saturating_add(dy),
                            cz.saturating_add(dz),
                        );
                        let Some(bucket) = self.cells.get(&key) else {
                            continue;
                        };
                        for &j in bucket.iter().filter(|&&j| j as usize > i) {
                            let distance = a.distance(positions[j as usize]);
                            if distance < threshold {
                                self.edges.push(Edge {
                                    i: i as u32,
                                    j,
                                    distance,
                                });
                            }
                        }
                    }
                }
            }
        }

        self.edges.sort_unstable_by_key(|e| (e.i, e.j));
    }
}

#[inline]
fn cell_of(p: Vec3, cell: f32) -> CellKey {
    (
        (p.x / cell).floor() as i32,
        (p.y / cell).floor() as i32,
        (p.z / cell).floor() as i32,
    )
}

/// One-shot brute-force rebuild
pub fn proximity_edges(positions: &[Vec3], threshold: f32) -> Vec<Edge> {
    let mut builder = ProximityGraphBuilder::new(ProximityStrategy::BruteForce);
    builder.rebuild(positions, threshold).to_vec()
}
