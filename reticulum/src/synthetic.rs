//! Synthetic label volumes for tests and benches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::NdBuffer;

use crate::volume::LabelVolume;

/// Seeded Voronoi label volume: `num_regions` random seed points, every
/// voxel labelled by its nearest seed. Labels start at 1; a fixed seed gives
/// a fixed volume.
pub fn voronoi_labels(shape: &[usize], num_regions: usize, seed: u64) -> LabelVolume {
    assert!(shape.len() >= 2, "need at least 2 dimensions");
    assert!(shape.iter().all(|&extent| extent > 0), "zero-length axis");
    assert!(num_regions >= 1, "need at least one region");
    let capacity: usize = shape.iter().product();
    assert!(
        num_regions <= capacity,
        "more regions ({}) than voxels ({})",
        num_regions,
        capacity
    );

    let mut rng = StdRng::seed_from_u64(seed);

    // Draw distinct seed points.
    let mut seeds: Vec<Vec<usize>> = Vec::with_capacity(num_regions);
    while seeds.len() < num_regions {
        let point: Vec<usize> = shape
            .iter()
            .map(|&extent| rng.random_range(0..extent))
            .collect();
        if !seeds.contains(&point) {
            seeds.push(point);
        }
    }

    let mut labels = Vec::with_capacity(capacity);
    let mut coord = vec![0_usize; shape.len()];
    for _ in 0..capacity {
        let mut best_label = 0_u32;
        let mut best_distance = u64::MAX;
        for (i, seed_point) in seeds.iter().enumerate() {
            let distance: u64 = seed_point
                .iter()
                .zip(&coord)
                .map(|(&s, &c)| {
                    let d = s.abs_diff(c) as u64;
                    d * d
                })
                .sum();
            // Ties go to the lower label.
            if distance < best_distance {
                best_distance = distance;
                best_label = (i + 1) as u32;
            }
        }
        labels.push(best_label);

        // Odometer increment, last axis fastest.
        for axis in (0..shape.len()).rev() {
            coord[axis] += 1;
            if coord[axis] < shape[axis] {
                break;
            }
            coord[axis] = 0;
        }
    }

    LabelVolume::new(NdBuffer::new(shape.to_vec(), labels))
        .expect("generated volume has a valid shape")
}
