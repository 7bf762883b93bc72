//! Boundary intensity statistics (`edge_*` columns).

use crate::error::Result;
use crate::rag::{Edge, EdgeIndex, Rag};
use crate::table::Column;
use crate::volume::ValueVolume;

use super::stats::Moments;
use super::{require_values, EdgeAccumulator, FeatureSpec, Statistic};

/// Statistics over the boundary values of each edge.
///
/// A boundary value is the mean of the two voxels across one face, so every
/// edge contributes as many samples as it has faces. `edge_count` is
/// therefore the shared boundary face count.
#[derive(Debug)]
pub struct BoundaryStatsAccumulator {
    stats: Vec<Statistic>,
    moments: Vec<Moments>,
    /// Per-edge samples, gathered only when a quantile statistic is
    /// requested.
    samples: Option<Vec<Vec<f32>>>,
    columns: Vec<Column>,
}

impl BoundaryStatsAccumulator {
    pub fn new(stats: Vec<Statistic>) -> BoundaryStatsAccumulator {
        BoundaryStatsAccumulator {
            stats,
            moments: Vec::new(),
            samples: None,
            columns: Vec::new(),
        }
    }
}

impl EdgeAccumulator for BoundaryStatsAccumulator {
    fn name(&self) -> &'static str {
        "boundary"
    }

    fn column_names(&self) -> Vec<String> {
        self.stats
            .iter()
            .map(|stat| FeatureSpec::Edge(*stat).to_string())
            .collect()
    }

    fn initialize(&mut self, rag: &Rag, values: Option<&ValueVolume>) -> Result<()> {
        let values = require_values(self.name(), rag, values)?;
        let num_edges = rag.num_edges();

        self.moments = vec![Moments::new(); num_edges];
        self.samples = self
            .stats
            .iter()
            .any(|stat| stat.needs_samples())
            .then(|| vec![Vec::new(); num_edges]);

        let data = values.data();
        for (scan, edge_indices) in rag.axis_scans().iter().zip(rag.face_edges()) {
            for (face, &edge) in scan.faces.iter().zip(edge_indices) {
                let value = 0.5 * (data[face.left] + data[face.left + scan.stride]);
                self.moments[edge as usize].push(value);
                if let Some(samples) = &mut self.samples {
                    samples[edge as usize].push(value);
                }
            }
        }

        if let Some(samples) = &mut self.samples {
            for edge_samples in samples.iter_mut() {
                edge_samples.sort_unstable_by(f32::total_cmp);
            }
        }

        self.columns = self
            .column_names()
            .into_iter()
            .map(|name| Column::with_capacity(name, num_edges))
            .collect();

        Ok(())
    }

    fn accumulate(&mut self, index: EdgeIndex, _edge: &Edge) -> Result<()> {
        let moments = &self.moments[index as usize];
        let sorted = self
            .samples
            .as_ref()
            .map(|samples| samples[index as usize].as_slice());

        for (stat, column) in self.stats.iter().zip(&mut self.columns) {
            column.values.push(stat.evaluate(moments, sorted));
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<Vec<Column>> {
        Ok(std::mem::take(&mut self.columns))
    }
}
