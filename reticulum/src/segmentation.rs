//! Groundtruth comparison and decision-driven merging.
//!
//! Given a reference segmentation, each edge gets an ON/OFF decision: ON
//! means the two regions stay separated, OFF means they belong to the same
//! reference region and may be merged. Decisions are aligned to the graph's
//! canonical edge order.

use common::NdBuffer;
use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::rag::Rag;
use crate::volume::LabelVolume;

/// Overlap table: `counts[(a, b)]` is the number of voxels labelled `a` in
/// `left` and `b` in `right`.
pub fn contingency_counts(
    left: &LabelVolume,
    right: &LabelVolume,
) -> Result<HashMap<(u32, u32), u64>> {
    if left.shape() != right.shape() {
        return Err(Error::ShapeMismatch {
            expected: left.shape().to_vec(),
            actual: right.shape().to_vec(),
        });
    }

    let mut counts: HashMap<(u32, u32), u64> = HashMap::new();
    for (&a, &b) in left.data().iter().zip(right.data()) {
        *counts.entry((a, b)).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Map every region of `from` to the region of `to` it overlaps most.
///
/// Ties resolve to the smallest `to` id, so the mapping is deterministic.
/// Not commutative.
pub fn overlap_mapping(from: &LabelVolume, to: &LabelVolume) -> Result<HashMap<u32, u32>> {
    let counts = contingency_counts(from, to)?;

    let mut best: HashMap<u32, (u64, u32)> = HashMap::new();
    for ((a, b), count) in counts {
        match best.get(&a) {
            Some(&(best_count, best_b))
                if best_count > count || (best_count == count && best_b <= b) => {}
            _ => {
                best.insert(a, (count, b));
            }
        }
    }

    Ok(best.into_iter().map(|(a, (_, b))| (a, b)).collect())
}

/// Decide, for every edge, whether it should stay ON for best consistency
/// with a reference segmentation.
///
/// An edge is ON (`true`) when its two regions overlap different reference
/// regions, OFF (`false`) when they map to the same one. Result order
/// matches the graph's canonical edge order.
pub fn edge_decisions_from_groundtruth(rag: &Rag, groundtruth: &LabelVolume) -> Result<Vec<bool>> {
    if rag.label_volume().shape() != groundtruth.shape() {
        return Err(Error::ShapeMismatch {
            expected: rag.label_volume().shape().to_vec(),
            actual: groundtruth.shape().to_vec(),
        });
    }

    let mapping = overlap_mapping(rag.label_volume(), groundtruth)?;
    Ok(rag
        .edges()
        .iter()
        .map(|edge| mapping[&edge.id.lo] != mapping[&edge.id.hi])
        .collect())
}

/// Merge all regions connected by OFF edges and relabel the volume with
/// consecutive ids starting at 1.
///
/// `decisions` must align with the graph's canonical edge order. Regions
/// with no OFF edge keep a component of their own.
pub fn merge_segmentation(rag: &Rag, decisions: &[bool]) -> Result<LabelVolume> {
    if decisions.len() != rag.num_edges() {
        return Err(Error::ShapeMismatch {
            expected: vec![rag.num_edges()],
            actual: vec![decisions.len()],
        });
    }

    let ids = rag.region_ids();
    let index_of = |id: u32| -> u32 {
        ids.binary_search(&id)
            .expect("edge endpoints exist in the census") as u32
    };

    let mut uf = UnionFind::new(ids.len());
    let mut merged = 0_usize;
    for (edge, &active) in rag.edges().iter().zip(decisions) {
        if !active {
            uf.union(index_of(edge.id.lo), index_of(edge.id.hi));
            merged += 1;
        }
    }
    tracing::debug!(
        regions = ids.len(),
        inactive_edges = merged,
        "merging segmentation"
    );

    // Component labels in ascending order of the smallest member id.
    let mut label_of_root = vec![0_u32; ids.len()];
    let mut next = 1_u32;
    let mut label_by_index = vec![0_u32; ids.len()];
    for i in 0..ids.len() {
        let root = uf.find(i as u32) as usize;
        if label_of_root[root] == 0 {
            label_of_root[root] = next;
            next += 1;
        }
        label_by_index[i] = label_of_root[root];
    }

    let volume = rag.label_volume();
    let data: Vec<u32> = volume
        .data()
        .iter()
        .map(|&label| label_by_index[index_of(label) as usize])
        .collect();

    LabelVolume::new(NdBuffer::new(volume.shape().to_vec(), data))
}

// ============================================================================
// Union-Find
// ============================================================================

/// Dense union-find with path compression; the smaller root wins a union.
#[derive(Debug)]
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new(n: usize) -> UnionFind {
        UnionFind {
            parent: (0..n as u32).collect(),
        }
    }

    fn find(&mut self, i: u32) -> u32 {
        // First pass: find the root.
        let mut root = i;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Second pass: compress the path.
        let mut current = i;
        while current != root {
            let parent = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = parent;
        }

        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            let (smaller, larger) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[larger as usize] = smaller;
        }
    }
}
