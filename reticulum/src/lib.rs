//! Reticulum - region adjacency graphs over N-dimensional label volumes.
//!
//! Builds a deduplicated adjacency graph from a volume of region labels and
//! computes per-edge feature tables from auxiliary per-voxel data.
//!
//! # Pipeline Overview
//!
//! 1. **Ingest**: validate the label volume (and any auxiliary channels)
//!    once at the boundary; everything downstream is strongly typed.
//!
//! 2. **Scan**: walk every axis and collect the voxel faces whose two sides
//!    carry different labels.
//!
//! 3. **Build**: deduplicate the face pairs into edges, counting shared
//!    boundary faces per edge. The first-seen scan order becomes the
//!    graph's canonical edge order.
//!
//! 4. **Accumulate**: run edge feature accumulators (boundary intensity
//!    statistics, whole-region statistics, geometry) over the graph.
//!
//! 5. **Assemble**: concatenate accumulator columns into one table, one row
//!    per edge in canonical order.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reticulum::{compute_features, default_features, LabelVolume, Rag, ValueVolume};
//!
//! let labels = LabelVolume::from_raw(&[512, 512], &label_data)?;
//! let intensity = ValueVolume::from_raw(&[512, 512], &intensity_data)?;
//!
//! let rag = Rag::build(labels)?;
//! let table = compute_features(&rag, Some(&intensity), &default_features())?;
//!
//! println!("{} edges, {} feature columns", table.num_rows(), table.num_columns());
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod rag;
pub mod scan;
pub mod segmentation;
pub mod synthetic;
pub mod table;
pub mod volume;

#[cfg(feature = "petgraph")]
pub mod interop;

#[cfg(test)]
mod tests;

// ============================================================================
// Core types
// ============================================================================

pub use config::{ColumnNaming, EmptyGraphPolicy, RagConfig};
pub use error::{Error, Result};
pub use rag::{Edge, EdgeId, EdgeIndex, Rag};
pub use volume::{LabelVolume, RegionCensus, ValueVolume};

// ============================================================================
// Features and tables
// ============================================================================

pub use features::{
    default_features, parse_features, BoundaryStatsAccumulator, EdgeAccumulator, FeatureSpec,
    GeometryAccumulator, RegionStatsAccumulator, Statistic,
};
pub use table::{compute_features, Column, FeatureTable};

// ============================================================================
// Segmentation helpers
// ============================================================================

pub use segmentation::{
    contingency_counts, edge_decisions_from_groundtruth, merge_segmentation, overlap_mapping,
};
