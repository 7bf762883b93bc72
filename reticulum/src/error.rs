use thiserror::Error;

/// Errors produced by graph construction and feature computation.
///
/// Every failure is detected eagerly at the boundary of the component that
/// first observes the violated precondition; no partial graphs or tables are
/// ever returned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid volume shape {shape:?}: {reason}")]
    InvalidShape { shape: Vec<usize>, reason: String },

    #[error("value at linear index {index} is not representable in the volume's element type")]
    InvalidLabelType { index: usize },

    #[error("label volume produced no adjacencies; use EmptyGraphPolicy::Allow to accept a degenerate graph")]
    EmptyGraph,

    #[error("accumulator '{accumulator}' requires per-voxel auxiliary data, but none was supplied")]
    MissingAuxiliaryData { accumulator: String },

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("column name collision: '{name}' is produced by more than one accumulator")]
    ColumnNameCollision { name: String },

    #[error("unknown feature name '{name}'; expected edge_<statistic> or sp_<statistic>")]
    UnknownFeature { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
