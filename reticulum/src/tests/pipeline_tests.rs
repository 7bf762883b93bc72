//! End-to-end pipeline tests on synthetic volumes.

use crate::synthetic::voronoi_labels;
use crate::{
    compute_features, default_features, edge_decisions_from_groundtruth, merge_segmentation,
    EmptyGraphPolicy, Error, LabelVolume, Rag, RagConfig, ValueVolume,
};

fn ramp_values(volume: &LabelVolume) -> ValueVolume {
    let data: Vec<f32> = (0..volume.len()).map(|i| (i % 251) as f32).collect();
    ValueVolume::from_raw(volume.shape(), &data).unwrap()
}

#[test]
fn voronoi_volume_builds_a_consistent_graph() {
    let volume = voronoi_labels(&[48, 48], 12, 7);
    let rag = Rag::build(volume).unwrap();

    assert_eq!(rag.num_regions(), 12);
    let r = rag.num_regions();
    assert!(rag.num_edges() >= r - 1, "voronoi regions form one component");
    assert!(rag.num_edges() <= r * (r - 1) / 2);

    // Every edge is canonically ordered, unique, and findable.
    let mut seen = std::collections::HashSet::new();
    for edge in rag.edges() {
        assert!(edge.id.lo < edge.id.hi);
        assert!(edge.face_count >= 1);
        assert!(seen.insert(edge.id));
        assert_eq!(
            rag.edge_index(edge.id.hi, edge.id.lo),
            rag.edge_index(edge.id.lo, edge.id.hi)
        );
    }
}

#[test]
fn feature_table_aligns_with_graph_over_full_pipeline() {
    let volume = voronoi_labels(&[32, 32, 8], 9, 11);
    let values = ramp_values(&volume);
    let rag = Rag::build(volume).unwrap();

    let table = compute_features(&rag, Some(&values), &default_features()).unwrap();

    assert_eq!(table.num_rows(), rag.num_edges());
    for (row, edge) in table.edges().iter().zip(rag.edges()) {
        assert_eq!(*row, edge.id);
    }

    // edge_count is the boundary face count.
    let counts = &table.column("edge_count").unwrap().values;
    for (value, edge) in counts.iter().zip(rag.edges()) {
        assert_eq!(*value, edge.face_count as f32);
    }

    // Mean lies within the observed extrema.
    let means = &table.column("edge_mean").unwrap().values;
    let mins = &table.column("edge_minimum").unwrap().values;
    let maxs = &table.column("edge_maximum").unwrap().values;
    for i in 0..table.num_rows() {
        assert!(mins[i] <= means[i] && means[i] <= maxs[i]);
    }
}

#[test]
fn parallel_and_sequential_builds_agree_end_to_end() {
    let volume = voronoi_labels(&[64, 64, 17], 23, 5);
    let values = ramp_values(&volume);

    let sequential_config = RagConfig {
        parallel_scan: false,
        ..Default::default()
    };
    let a = Rag::build(volume.clone()).unwrap();
    let b = Rag::build_with_config(volume, &sequential_config).unwrap();

    assert_eq!(a.edge_ids(), b.edge_ids());

    let ta = compute_features(&a, Some(&values), &default_features()).unwrap();
    let tb = compute_features(&b, Some(&values), &default_features()).unwrap();
    assert_eq!(ta, tb);
}

#[test]
fn degenerate_graph_produces_an_empty_table() {
    let volume = voronoi_labels(&[8, 8], 1, 0);
    let config = RagConfig {
        empty_graph: EmptyGraphPolicy::Allow,
        ..Default::default()
    };
    let rag = Rag::build_with_config(volume, &config).unwrap();
    let values = ramp_values(rag.label_volume());

    let table = compute_features(&rag, Some(&values), &default_features()).unwrap();
    assert_eq!(table.num_rows(), 0);
    assert!(table.num_columns() > 0);
}

#[test]
fn single_region_volume_fails_by_default() {
    let volume = voronoi_labels(&[8, 8], 1, 0);
    assert!(matches!(Rag::build(volume), Err(Error::EmptyGraph)));
}

#[test]
fn groundtruth_pipeline_recovers_a_coarser_segmentation() {
    // Oversegment a volume, then merge it back toward a coarser reference.
    let fine = voronoi_labels(&[40, 40], 20, 13);
    let coarse = voronoi_labels(&[40, 40], 4, 13);

    let rag = Rag::build(fine).unwrap();
    let decisions = edge_decisions_from_groundtruth(&rag, &coarse).unwrap();
    let merged = merge_segmentation(&rag, &decisions).unwrap();

    // Merging can only reduce the region count, and the result relabels
    // from 1 consecutively.
    let census = merged.region_census();
    assert!(census.num_regions() <= rag.num_regions());
    assert_eq!(census.ids()[0], 1);
    assert_eq!(
        census.ids().last().copied().unwrap() as usize,
        census.num_regions()
    );
}

#[test]
fn table_survives_dropping_the_graph() {
    let volume = voronoi_labels(&[24, 24], 6, 19);
    let values = ramp_values(&volume);
    let rag = Rag::build(volume).unwrap();

    let num_edges = rag.num_edges();
    let table = compute_features(&rag, Some(&values), &default_features()).unwrap();
    drop(rag);

    assert_eq!(table.num_rows(), num_edges);
    assert!(table.column("sp_count_sum").is_some());
}
