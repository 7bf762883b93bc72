//! Validated volume ingest.
//!
//! Arbitrary array-like inputs cross the library boundary exactly once, here,
//! and come out as strongly-typed dense buffers: labels as `u32`, auxiliary
//! per-voxel data as `f32`. All downstream passes can then index without
//! re-checking dtypes.

use common::NdBuffer;
use hashbrown::HashMap;
use num_traits::ToPrimitive;

use crate::error::{Error, Result};

fn validate_shape(shape: &[usize]) -> Result<()> {
    if shape.len() < 2 {
        return Err(Error::InvalidShape {
            shape: shape.to_vec(),
            reason: "a label volume needs at least 2 dimensions".to_string(),
        });
    }
    if shape.iter().any(|&extent| extent == 0) {
        return Err(Error::InvalidShape {
            shape: shape.to_vec(),
            reason: "zero-length axis".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// LabelVolume
// ============================================================================

/// An N-dimensional volume of region labels.
///
/// Each distinct value is a region id. Id 0 carries no special meaning to the
/// library; treating it as background is a caller convention. Immutable once
/// built.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVolume {
    labels: NdBuffer<u32>,
}

impl LabelVolume {
    pub fn new(labels: NdBuffer<u32>) -> Result<LabelVolume> {
        validate_shape(labels.shape())?;
        Ok(LabelVolume { labels })
    }

    /// Ingest adapter for arbitrary integer sources.
    ///
    /// Fails with [`Error::InvalidLabelType`] on the first value that is not
    /// representable as a non-negative 32-bit integer (negative values,
    /// oversized values, non-finite floats).
    pub fn from_raw<T: ToPrimitive>(shape: &[usize], data: &[T]) -> Result<LabelVolume> {
        validate_shape(shape)?;

        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::InvalidShape {
                shape: shape.to_vec(),
                reason: format!(
                    "data length {} does not match shape product {}",
                    data.len(),
                    expected
                ),
            });
        }

        let mut labels = Vec::with_capacity(data.len());
        for (index, value) in data.iter().enumerate() {
            match value.to_u32() {
                Some(label) => labels.push(label),
                None => return Err(Error::InvalidLabelType { index }),
            }
        }

        Ok(LabelVolume {
            labels: NdBuffer::new(shape.to_vec(), labels),
        })
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.labels.shape()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.labels.ndim()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn buffer(&self) -> &NdBuffer<u32> {
        &self.labels
    }

    #[inline]
    pub fn data(&self) -> &[u32] {
        self.labels.data()
    }

    /// Census of the regions present in the volume.
    pub fn region_census(&self) -> RegionCensus {
        RegionCensus::from_volume(self)
    }
}

// ============================================================================
// RegionCensus
// ============================================================================

/// Sorted region ids and per-region voxel counts.
///
/// Region ids do not need to be consecutive, so the number of regions is not
/// `max_id + 1`.
#[derive(Debug, Clone)]
pub struct RegionCensus {
    ids: Vec<u32>,
    counts: HashMap<u32, u64>,
}

impl RegionCensus {
    fn from_volume(volume: &LabelVolume) -> RegionCensus {
        let mut counts: HashMap<u32, u64> = HashMap::new();
        for &label in volume.data() {
            *counts.entry(label).or_insert(0) += 1;
        }

        let mut ids: Vec<u32> = counts.keys().copied().collect();
        ids.sort_unstable();

        RegionCensus { ids, counts }
    }

    /// Region ids, ascending.
    #[inline]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    #[inline]
    pub fn num_regions(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn max_id(&self) -> Option<u32> {
        self.ids.last().copied()
    }

    /// Voxel count of one region, `None` for ids absent from the volume.
    #[inline]
    pub fn count(&self, id: u32) -> Option<u64> {
        self.counts.get(&id).copied()
    }

    /// Dense index of a region id within the sorted id list.
    #[inline]
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }
}

// ============================================================================
// ValueVolume
// ============================================================================

/// Per-voxel auxiliary data (an intensity or feature channel), aligned to a
/// label volume's shape. Values are carried as `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueVolume {
    values: NdBuffer<f32>,
}

impl ValueVolume {
    pub fn new(values: NdBuffer<f32>) -> Result<ValueVolume> {
        validate_shape(values.shape())?;
        Ok(ValueVolume { values })
    }

    /// Ingest adapter for arbitrary numeric sources.
    pub fn from_raw<T: ToPrimitive>(shape: &[usize], data: &[T]) -> Result<ValueVolume> {
        validate_shape(shape)?;

        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::InvalidShape {
                shape: shape.to_vec(),
                reason: format!(
                    "data length {} does not match shape product {}",
                    data.len(),
                    expected
                ),
            });
        }

        let mut values = Vec::with_capacity(data.len());
        for (index, value) in data.iter().enumerate() {
            match value.to_f32() {
                Some(v) => values.push(v),
                None => return Err(Error::InvalidLabelType { index }),
            }
        }

        Ok(ValueVolume {
            values: NdBuffer::new(shape.to_vec(), values),
        })
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    #[inline]
    pub fn buffer(&self) -> &NdBuffer<f32> {
        &self.values
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        self.values.data()
    }
}
