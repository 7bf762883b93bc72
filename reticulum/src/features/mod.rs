//! Edge feature accumulators.
//!
//! An accumulator is driven in three phases: `initialize` ingests the volume
//! (one or more deterministic passes), `accumulate` is called once per edge
//! in the graph's canonical order, and `finalize` yields named columns.
//! Accumulators only read the graph and externally supplied per-voxel data;
//! they never mutate the graph.
//!
//! Feature names follow the `edge_<statistic>` / `sp_<statistic>` scheme,
//! e.g. `edge_mean`, `sp_quantiles_75`.

mod boundary;
mod geometry;
mod region;
pub mod stats;

pub use boundary::BoundaryStatsAccumulator;
pub use geometry::GeometryAccumulator;
pub use region::RegionStatsAccumulator;

use std::str::FromStr;

use strum_macros::{Display, EnumString};

use crate::error::{Error, Result};
use crate::rag::{Edge, EdgeIndex, Rag};
use crate::table::Column;
use crate::volume::ValueVolume;

use stats::{quantile, Moments};

// ============================================================================
// Statistic vocabulary
// ============================================================================

/// Per-sample statistics that can be computed over boundary values
/// (`edge_*`) or whole regions (`sp_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Statistic {
    Count,
    Sum,
    Mean,
    Variance,
    Skewness,
    Kurtosis,
    Minimum,
    Maximum,
    #[strum(serialize = "quantiles_10")]
    Quantiles10,
    #[strum(serialize = "quantiles_25")]
    Quantiles25,
    #[strum(serialize = "quantiles_50")]
    Quantiles50,
    #[strum(serialize = "quantiles_75")]
    Quantiles75,
    #[strum(serialize = "quantiles_90")]
    Quantiles90,
}

impl Statistic {
    /// True when the statistic needs the full sample set, not just running
    /// moments.
    pub fn needs_samples(&self) -> bool {
        self.quantile_fraction().is_some()
    }

    pub fn quantile_fraction(&self) -> Option<f64> {
        match self {
            Statistic::Quantiles10 => Some(0.10),
            Statistic::Quantiles25 => Some(0.25),
            Statistic::Quantiles50 => Some(0.50),
            Statistic::Quantiles75 => Some(0.75),
            Statistic::Quantiles90 => Some(0.90),
            _ => None,
        }
    }

    /// Evaluate against running moments and, for quantiles, the
    /// ascending-sorted sample set.
    pub(crate) fn evaluate(&self, moments: &Moments, sorted: Option<&[f32]>) -> f32 {
        match self {
            Statistic::Count => moments.count() as f32,
            Statistic::Sum => moments.sum() as f32,
            Statistic::Mean => moments.mean() as f32,
            Statistic::Variance => moments.variance() as f32,
            Statistic::Skewness => moments.skewness() as f32,
            Statistic::Kurtosis => moments.kurtosis() as f32,
            Statistic::Minimum => moments.minimum(),
            Statistic::Maximum => moments.maximum(),
            _ => {
                let q = self
                    .quantile_fraction()
                    .expect("non-quantile statistics are handled above");
                let sorted = sorted.expect("quantile statistics require gathered samples");
                quantile(sorted, q)
            }
        }
    }
}

// ============================================================================
// Feature specification
// ============================================================================

/// One requested feature: a statistic over boundary values (`Edge`) or over
/// the two adjacent regions (`Region`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureSpec {
    Edge(Statistic),
    Region(Statistic),
}

impl std::fmt::Display for FeatureSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureSpec::Edge(stat) => write!(f, "edge_{}", stat),
            FeatureSpec::Region(stat) => write!(f, "sp_{}", stat),
        }
    }
}

impl FromStr for FeatureSpec {
    type Err = Error;

    fn from_str(name: &str) -> Result<FeatureSpec> {
        if let Some(rest) = name.strip_prefix("edge_") {
            if let Ok(stat) = Statistic::from_str(rest) {
                return Ok(FeatureSpec::Edge(stat));
            }
        } else if let Some(rest) = name.strip_prefix("sp_") {
            if let Ok(stat) = Statistic::from_str(rest) {
                return Ok(FeatureSpec::Region(stat));
            }
        }
        Err(Error::UnknownFeature {
            name: name.to_string(),
        })
    }
}

/// Parse a list of feature names, failing on the first unknown name.
pub fn parse_features(names: &[&str]) -> Result<Vec<FeatureSpec>> {
    names.iter().map(|name| name.parse()).collect()
}

/// The standard feature selection.
pub fn default_features() -> Vec<FeatureSpec> {
    vec![
        FeatureSpec::Edge(Statistic::Count),
        FeatureSpec::Edge(Statistic::Sum),
        FeatureSpec::Edge(Statistic::Mean),
        FeatureSpec::Edge(Statistic::Variance),
        FeatureSpec::Edge(Statistic::Minimum),
        FeatureSpec::Edge(Statistic::Maximum),
        FeatureSpec::Region(Statistic::Count),
        FeatureSpec::Region(Statistic::Mean),
    ]
}

// ============================================================================
// Accumulator capability set
// ============================================================================

/// Capability set of an edge feature accumulator.
///
/// The table assembler drives each accumulator through
/// `initialize -> accumulate (once per edge, canonical order) -> finalize`.
/// Implementations read region membership, edge identity and the supplied
/// per-voxel data only.
pub trait EdgeAccumulator {
    /// Short name, used for column prefixing and diagnostics.
    fn name(&self) -> &'static str;

    /// Column names this accumulator will produce, in output order.
    fn column_names(&self) -> Vec<String>;

    /// Ingest the volume. Fails with
    /// [`Error::MissingAuxiliaryData`] when required per-voxel data is
    /// absent and with [`Error::ShapeMismatch`] when it does not match the
    /// label volume's shape; both before any accumulation.
    fn initialize(&mut self, rag: &Rag, values: Option<&ValueVolume>) -> Result<()>;

    /// Fold one edge's statistics into the output columns.
    fn accumulate(&mut self, index: EdgeIndex, edge: &Edge) -> Result<()>;

    /// Yield the finished columns.
    fn finalize(&mut self) -> Result<Vec<Column>>;
}

/// Shape guard shared by the accumulators that read per-voxel data.
pub(crate) fn require_values<'v>(
    accumulator: &'static str,
    rag: &Rag,
    values: Option<&'v ValueVolume>,
) -> Result<&'v ValueVolume> {
    let values = values.ok_or_else(|| Error::MissingAuxiliaryData {
        accumulator: accumulator.to_string(),
    })?;

    let expected = rag.label_volume().shape();
    if values.shape() != expected {
        return Err(Error::ShapeMismatch {
            expected: expected.to_vec(),
            actual: values.shape().to_vec(),
        });
    }
    Ok(values)
}
