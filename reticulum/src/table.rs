//! Feature table assembly.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::config::ColumnNaming;
use crate::error::{Error, Result};
use crate::features::{
    BoundaryStatsAccumulator, EdgeAccumulator, FeatureSpec, RegionStatsAccumulator, Statistic,
};
use crate::rag::{EdgeId, EdgeIndex, Rag};
use crate::volume::ValueVolume;

/// One named feature column, aligned to the table's edge rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f32>,
}

impl Column {
    pub fn with_capacity(name: String, capacity: usize) -> Column {
        Column {
            name,
            values: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Edge-keyed feature table.
///
/// Row `i` corresponds to edge `i` of the graph's canonical order; the edge
/// identities are stored by value, so the table stays usable after the graph
/// is dropped. Rebuilding a table from the same graph and inputs is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    edges: Vec<EdgeId>,
    columns: Vec<Column>,
}

impl FeatureTable {
    /// Drive `accumulators` over the graph's canonical edge order and
    /// concatenate their columns in invocation order.
    pub fn assemble(
        rag: &Rag,
        accumulators: &mut [Box<dyn EdgeAccumulator>],
        values: Option<&ValueVolume>,
        naming: ColumnNaming,
    ) -> Result<FeatureTable> {
        let mut columns: Vec<Column> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for accumulator in accumulators.iter_mut() {
            accumulator.initialize(rag, values)?;

            for (index, edge) in rag.edges().iter().enumerate() {
                accumulator.accumulate(index as EdgeIndex, edge)?;
            }

            let mut produced = accumulator.finalize()?;
            for column in &mut produced {
                if naming == ColumnNaming::PrefixAccumulator {
                    column.name = format!("{}_{}", accumulator.name(), column.name);
                }
                assert_eq!(
                    column.values.len(),
                    rag.num_edges(),
                    "column '{}' length must equal the edge count",
                    column.name
                );
                if !seen.insert(column.name.clone()) {
                    return Err(Error::ColumnNameCollision {
                        name: column.name.clone(),
                    });
                }
            }
            columns.append(&mut produced);
        }

        tracing::debug!(
            rows = rag.num_edges(),
            columns = columns.len(),
            "assembled feature table"
        );

        Ok(FeatureTable {
            edges: rag.edges().iter().map(|edge| edge.id).collect(),
            columns,
        })
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Edge identities in row order.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn to_yaml(&self) -> String {
        serde_yml::to_string(self).expect("Failed to serialize feature table to YAML")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("Failed to serialize feature table to JSON")
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<FeatureTable> {
        let table: FeatureTable = serde_yml::from_str(yaml)?;
        Ok(table)
    }

    pub fn from_json(json: &str) -> anyhow::Result<FeatureTable> {
        let table: FeatureTable = serde_json::from_str(json)?;
        Ok(table)
    }
}

/// Compute a feature table for the requested `edge_*` / `sp_*` features.
///
/// The auxiliary data's shape is checked against the label volume before any
/// accumulator is constructed or run.
pub fn compute_features(
    rag: &Rag,
    values: Option<&ValueVolume>,
    features: &[FeatureSpec],
) -> Result<FeatureTable> {
    if let Some(values) = values {
        let expected = rag.label_volume().shape();
        if values.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected: expected.to_vec(),
                actual: values.shape().to_vec(),
            });
        }
    }

    let edge_stats: Vec<Statistic> = features
        .iter()
        .filter_map(|spec| match spec {
            FeatureSpec::Edge(stat) => Some(*stat),
            FeatureSpec::Region(_) => None,
        })
        .collect();
    let region_stats: Vec<Statistic> = features
        .iter()
        .filter_map(|spec| match spec {
            FeatureSpec::Region(stat) => Some(*stat),
            FeatureSpec::Edge(_) => None,
        })
        .collect();

    let mut accumulators: Vec<Box<dyn EdgeAccumulator>> = Vec::new();
    if !edge_stats.is_empty() {
        accumulators.push(Box::new(BoundaryStatsAccumulator::new(edge_stats)));
    }
    if !region_stats.is_empty() {
        accumulators.push(Box::new(RegionStatsAccumulator::new(region_stats)));
    }

    FeatureTable::assemble(rag, &mut accumulators, values, ColumnNaming::Strict)
}
