//! Axial adjacency scan.
//!
//! For every axis, every pair of face-adjacent voxels with differing labels
//! is one *face*. Faces are reported in scan order (ascending linear index of
//! the lesser-coordinate voxel), per axis. The per-axis scans are independent
//! and read-only, so large volumes scan their axes on the rayon pool; the
//! merged result is identical to the sequential scan.

use rayon::prelude::*;

use crate::volume::LabelVolume;

/// Element count above which the per-axis scans run on the rayon pool.
const PARALLEL_SCAN_THRESHOLD: usize = 1 << 16;

/// One boundary face between two voxels with differing labels.
///
/// `left` is the linear index of the lesser-coordinate voxel; the opposite
/// voxel of the face is `left + stride(axis)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub lo: u32,
    pub hi: u32,
    pub left: usize,
}

/// Lazy iterator over the faces of one axis.
///
/// Finite and consumed once; construct a new iterator to re-scan. Never
/// yields a face for equal labels, and never yields anything for an axis of
/// length 1.
#[derive(Debug)]
pub struct AxialFaces<'a> {
    labels: &'a [u32],
    stride: usize,
    extent: usize,
    block: usize,
    base: usize,
    j: usize,
    k: usize,
}

impl<'a> AxialFaces<'a> {
    pub fn new(volume: &'a LabelVolume, axis: usize) -> AxialFaces<'a> {
        assert!(axis < volume.ndim(), "axis {} out of range", axis);

        let stride = volume.buffer().axis_stride(axis);
        let extent = volume.buffer().axis_len(axis);
        let labels = volume.data();

        AxialFaces {
            labels,
            stride,
            extent,
            block: extent * stride,
            // An axis of length 1 has no faces; start exhausted.
            base: if extent < 2 { labels.len() } else { 0 },
            j: 0,
            k: 0,
        }
    }
}

impl Iterator for AxialFaces<'_> {
    type Item = Face;

    fn next(&mut self) -> Option<Face> {
        loop {
            if self.k == self.stride {
                self.k = 0;
                self.j += 1;
                if self.j == self.extent - 1 {
                    self.j = 0;
                    self.base += self.block;
                }
            }
            if self.base >= self.labels.len() {
                return None;
            }

            let left = self.base + self.j * self.stride + self.k;
            self.k += 1;

            let a = self.labels[left];
            let b = self.labels[left + self.stride];
            if a != b {
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                return Some(Face { lo, hi, left });
            }
        }
    }
}

/// All faces of one axis, collected in scan order.
#[derive(Debug, Clone)]
pub struct AxisScan {
    pub axis: usize,
    /// Element stride of the axis; `face.left + stride` is the opposite voxel.
    pub stride: usize,
    pub faces: Vec<Face>,
}

pub fn scan_axis(volume: &LabelVolume, axis: usize) -> AxisScan {
    let stride = volume.buffer().axis_stride(axis);
    let faces: Vec<Face> = AxialFaces::new(volume, axis).collect();
    AxisScan {
        axis,
        stride,
        faces,
    }
}

/// Scan every axis, parallelizing over axes for large volumes.
pub fn scan_volume(volume: &LabelVolume) -> Vec<AxisScan> {
    let scans = if volume.len() >= PARALLEL_SCAN_THRESHOLD {
        (0..volume.ndim())
            .into_par_iter()
            .map(|axis| scan_axis(volume, axis))
            .collect()
    } else {
        scan_volume_sequential(volume)
    };

    let total: usize = scans.iter().map(|s| s.faces.len()).sum();
    tracing::debug!(axes = scans.len(), faces = total, "scanned label volume");

    scans
}

/// Scan every axis on the calling thread.
pub fn scan_volume_sequential(volume: &LabelVolume) -> Vec<AxisScan> {
    (0..volume.ndim())
        .map(|axis| scan_axis(volume, axis))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(shape: &[usize], data: &[u32]) -> LabelVolume {
        LabelVolume::from_raw(shape, data).unwrap()
    }

    #[test]
    fn two_by_two_has_two_faces_on_one_axis() {
        // [[1, 1],
        //  [2, 2]]
        let v = volume(&[2, 2], &[1, 1, 2, 2]);

        let axis0: Vec<Face> = AxialFaces::new(&v, 0).collect();
        assert_eq!(axis0.len(), 2);
        assert_eq!(axis0[0], Face { lo: 1, hi: 2, left: 0 });
        assert_eq!(axis0[1], Face { lo: 1, hi: 2, left: 1 });

        let axis1: Vec<Face> = AxialFaces::new(&v, 1).collect();
        assert!(axis1.is_empty());
    }

    #[test]
    fn uniform_volume_has_no_faces() {
        let v = volume(&[3, 3], &[5; 9]);
        for axis in 0..2 {
            assert_eq!(AxialFaces::new(&v, axis).count(), 0);
        }
    }

    #[test]
    fn pairs_are_canonically_ordered() {
        // Descending labels left to right still yield lo < hi.
        let v = volume(&[2, 2], &[9, 3, 9, 3]);
        let faces: Vec<Face> = AxialFaces::new(&v, 1).collect();
        assert_eq!(faces.len(), 2);
        for face in faces {
            assert_eq!((face.lo, face.hi), (3, 9));
        }
    }

    #[test]
    fn axis_of_length_one_is_empty() {
        let v = volume(&[1, 4], &[1, 2, 3, 4]);
        assert_eq!(AxialFaces::new(&v, 0).count(), 0);
        assert_eq!(AxialFaces::new(&v, 1).count(), 3);
    }

    #[test]
    fn three_dimensional_scan_covers_every_axis() {
        // 2x2x2 with one odd voxel: the odd voxel touches one neighbor per axis.
        let mut data = vec![1_u32; 8];
        data[0] = 2;
        let v = volume(&[2, 2, 2], &data);

        let scans = scan_volume_sequential(&v);
        assert_eq!(scans.len(), 3);
        for scan in &scans {
            assert_eq!(scan.faces.len(), 1, "axis {}", scan.axis);
            assert_eq!(scan.faces[0], Face { lo: 1, hi: 2, left: 0 });
        }
    }

    #[test]
    fn faces_arrive_in_scan_order() {
        let v = volume(&[4, 4], &[1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]);
        let scan = scan_axis(&v, 0);
        let lefts: Vec<usize> = scan.faces.iter().map(|f| f.left).collect();
        let mut sorted = lefts.clone();
        sorted.sort_unstable();
        assert_eq!(lefts, sorted);
    }

    #[test]
    fn parallel_and_sequential_scans_agree() {
        // Big enough to cross the parallel threshold: 64x64x17.
        let shape = [64, 64, 17];
        let len = 64 * 64 * 17;
        assert!(len >= PARALLEL_SCAN_THRESHOLD);

        let data: Vec<u32> = (0..len).map(|i| (i as u32 / 1021) % 37).collect();
        let v = volume(&shape, &data);

        let parallel = scan_volume(&v);
        let sequential = scan_volume_sequential(&v);

        assert_eq!(parallel.len(), sequential.len());
        for (p, s) in parallel.iter().zip(&sequential) {
            assert_eq!(p.axis, s.axis);
            assert_eq!(p.stride, s.stride);
            assert_eq!(p.faces, s.faces);
        }
    }

    #[test]
    fn mirrored_volume_yields_same_pairs() {
        let v = volume(&[3, 3], &[1, 1, 2, 1, 5, 2, 7, 7, 2]);
        let mut mirrored_rows: Vec<u32> = Vec::new();
        for row in (0..3).rev() {
            mirrored_rows.extend_from_slice(&v.data()[row * 3..row * 3 + 3]);
        }
        let m = volume(&[3, 3], &mirrored_rows);

        let mut pairs_v: Vec<(u32, u32)> = scan_volume_sequential(&v)
            .iter()
            .flat_map(|s| s.faces.iter().map(|f| (f.lo, f.hi)))
            .collect();
        let mut pairs_m: Vec<(u32, u32)> = scan_volume_sequential(&m)
            .iter()
            .flat_map(|s| s.faces.iter().map(|f| (f.lo, f.hi)))
            .collect();

        pairs_v.sort_unstable();
        pairs_v.dedup();
        pairs_m.sort_unstable();
        pairs_m.dedup();
        assert_eq!(pairs_v, pairs_m);
    }
}
