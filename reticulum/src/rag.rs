//! Region adjacency graph construction.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::{EmptyGraphPolicy, RagConfig};
use crate::error::{Error, Result};
use crate::scan::{scan_volume, scan_volume_sequential, AxisScan};
use crate::volume::{LabelVolume, RegionCensus};

/// Position of an edge in the graph's canonical order.
pub type EdgeIndex = u32;

/// Canonical identity of an edge: the unordered region pair, stored with
/// `lo < hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId {
    pub lo: u32,
    pub hi: u32,
}

impl EdgeId {
    /// Canonicalize an unordered pair. Panics on self-pairs, which cannot
    /// occur in a scan (faces require differing labels).
    pub fn new(a: u32, b: u32) -> EdgeId {
        assert_ne!(a, b, "self-edges are not representable");
        if a < b {
            EdgeId { lo: a, hi: b }
        } else {
            EdgeId { lo: b, hi: a }
        }
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lo, self.hi)
    }
}

/// One adjacency edge with its shared-boundary face count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    /// Number of voxel faces shared by the two regions, summed over all axes.
    pub face_count: u64,
}

/// Region adjacency graph over an N-dimensional label volume.
///
/// Edges are deduplicated and kept in first-seen scan order (axis-major);
/// that order is the canonical row order for every feature table built from
/// this graph. The graph owns its region and edge collections; feature
/// tables reference edges by value and may outlive the graph.
#[derive(Debug)]
pub struct Rag {
    volume: LabelVolume,
    census: RegionCensus,
    edges: Vec<Edge>,
    edge_lookup: HashMap<EdgeId, EdgeIndex>,
    axis_scans: Vec<AxisScan>,
    /// Edge index of every face, parallel to `axis_scans[i].faces`.
    face_edges: Vec<Vec<EdgeIndex>>,
}

impl Rag {
    /// Build with the default configuration (empty graphs rejected).
    pub fn build(volume: LabelVolume) -> Result<Rag> {
        Self::build_with_config(volume, &RagConfig::default())
    }

    pub fn build_with_config(volume: LabelVolume, config: &RagConfig) -> Result<Rag> {
        let census = volume.region_census();

        let axis_scans = if config.parallel_scan {
            scan_volume(&volume)
        } else {
            scan_volume_sequential(&volume)
        };

        let mut edges: Vec<Edge> = Vec::new();
        let mut edge_lookup: HashMap<EdgeId, EdgeIndex> = HashMap::new();
        let mut face_edges: Vec<Vec<EdgeIndex>> = Vec::with_capacity(axis_scans.len());

        for scan in &axis_scans {
            let mut indices = Vec::with_capacity(scan.faces.len());
            for face in &scan.faces {
                let id = EdgeId {
                    lo: face.lo,
                    hi: face.hi,
                };
                let index = match edge_lookup.get(&id) {
                    Some(&index) => {
                        edges[index as usize].face_count += 1;
                        index
                    }
                    None => {
                        let index = edges.len() as EdgeIndex;
                        edge_lookup.insert(id, index);
                        edges.push(Edge { id, face_count: 1 });
                        index
                    }
                };
                indices.push(index);
            }
            face_edges.push(indices);
        }

        if edges.is_empty() && config.empty_graph == EmptyGraphPolicy::Reject {
            return Err(Error::EmptyGraph);
        }

        tracing::debug!(
            regions = census.num_regions(),
            edges = edges.len(),
            "built region adjacency graph"
        );

        Ok(Rag {
            volume,
            census,
            edges,
            edge_lookup,
            axis_scans,
            face_edges,
        })
    }

    #[inline]
    pub fn label_volume(&self) -> &LabelVolume {
        &self.volume
    }

    #[inline]
    pub fn census(&self) -> &RegionCensus {
        &self.census
    }

    #[inline]
    pub fn num_regions(&self) -> usize {
        self.census.num_regions()
    }

    /// Region ids, ascending.
    #[inline]
    pub fn region_ids(&self) -> &[u32] {
        self.census.ids()
    }

    /// Voxel count of one region.
    #[inline]
    pub fn region_size(&self, id: u32) -> Option<u64> {
        self.census.count(id)
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges in canonical (first-seen) order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Region-id pairs in canonical order.
    pub fn edge_ids(&self) -> Vec<(u32, u32)> {
        self.edges.iter().map(|e| (e.id.lo, e.id.hi)).collect()
    }

    /// Region-id pairs sorted lexicographically, for order-insensitive
    /// comparisons and debugging.
    pub fn edge_ids_sorted(&self) -> Vec<(u32, u32)> {
        let mut ids = self.edge_ids();
        ids.sort_unstable();
        ids
    }

    /// O(1) lookup of an edge by its region pair, in either orientation.
    pub fn edge_index(&self, a: u32, b: u32) -> Option<EdgeIndex> {
        if a == b {
            return None;
        }
        self.edge_lookup.get(&EdgeId::new(a, b)).copied()
    }

    /// Shared boundary face count of one edge.
    #[inline]
    pub fn face_count(&self, index: EdgeIndex) -> u64 {
        self.edges[index as usize].face_count
    }

    pub(crate) fn axis_scans(&self) -> &[AxisScan] {
        &self.axis_scans
    }

    pub(crate) fn face_edges(&self) -> &[Vec<EdgeIndex>] {
        &self.face_edges
    }
}
