//! Region statistics combined per edge (`sp_*` columns).

use hashbrown::HashMap;

use crate::error::Result;
use crate::rag::{Edge, EdgeIndex, Rag};
use crate::table::Column;
use crate::volume::ValueVolume;

use super::stats::Moments;
use super::{require_values, EdgeAccumulator, FeatureSpec, Statistic};

/// Whole-region statistics, emitted per edge as a `_sum` / `_difference`
/// column pair over the two adjacent regions.
///
/// Two deterministic passes: one over the volume to gather per-region
/// statistics, one over the edges to combine them. `sp_count` is reduced by
/// square root for 2D volumes and cube root otherwise before combination.
#[derive(Debug)]
pub struct RegionStatsAccumulator {
    stats: Vec<Statistic>,
    ndim: usize,
    per_region: HashMap<u32, Moments>,
    samples: Option<HashMap<u32, Vec<f32>>>,
    columns: Vec<Column>,
}

impl RegionStatsAccumulator {
    pub fn new(stats: Vec<Statistic>) -> RegionStatsAccumulator {
        RegionStatsAccumulator {
            stats,
            ndim: 0,
            per_region: HashMap::new(),
            samples: None,
            columns: Vec::new(),
        }
    }

    fn statistic_of(&self, stat: Statistic, region: u32) -> f32 {
        let moments = &self.per_region[&region];
        let sorted = self
            .samples
            .as_ref()
            .map(|samples| samples[&region].as_slice());

        if stat == Statistic::Count {
            // Count reduction per the multicut convention.
            let count = moments.count() as f64;
            let reduced = if self.ndim == 2 {
                count.sqrt()
            } else {
                count.cbrt()
            };
            return reduced as f32;
        }

        stat.evaluate(moments, sorted)
    }
}

impl EdgeAccumulator for RegionStatsAccumulator {
    fn name(&self) -> &'static str {
        "region"
    }

    fn column_names(&self) -> Vec<String> {
        self.stats
            .iter()
            .flat_map(|stat| {
                let base = FeatureSpec::Region(*stat).to_string();
                [format!("{}_sum", base), format!("{}_difference", base)]
            })
            .collect()
    }

    fn initialize(&mut self, rag: &Rag, values: Option<&ValueVolume>) -> Result<()> {
        let values = require_values(self.name(), rag, values)?;

        self.ndim = rag.label_volume().ndim();
        self.per_region = HashMap::with_capacity(rag.num_regions());
        self.samples = self
            .stats
            .iter()
            .any(|stat| stat.needs_samples())
            .then(HashMap::new);

        let labels = rag.label_volume().data();
        for (&label, &value) in labels.iter().zip(values.data()) {
            self.per_region.entry(label).or_default().push(value);
            if let Some(samples) = &mut self.samples {
                samples.entry(label).or_insert_with(Vec::new).push(value);
            }
        }

        if let Some(samples) = &mut self.samples {
            for region_samples in samples.values_mut() {
                region_samples.sort_unstable_by(f32::total_cmp);
            }
        }

        self.columns = self
            .column_names()
            .into_iter()
            .map(|name| Column::with_capacity(name, rag.num_edges()))
            .collect();

        Ok(())
    }

    fn accumulate(&mut self, _index: EdgeIndex, edge: &Edge) -> Result<()> {
        for (i, stat) in self.stats.iter().enumerate() {
            let lo = self.statistic_of(*stat, edge.id.lo);
            let hi = self.statistic_of(*stat, edge.id.hi);
            self.columns[2 * i].values.push(lo + hi);
            self.columns[2 * i + 1].values.push((lo - hi).abs());
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<Vec<Column>> {
        Ok(std::mem::take(&mut self.columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rag::Rag;
    use crate::table::FeatureTable;
    use crate::volume::LabelVolume;
    use crate::ColumnNaming;

    fn run(
        shape: &[usize],
        labels: &[u32],
        values: &[f32],
        stats: Vec<Statistic>,
    ) -> FeatureTable {
        let volume = LabelVolume::from_raw(shape, labels).unwrap();
        let rag = Rag::build(volume).unwrap();
        let values = ValueVolume::from_raw(shape, values).unwrap();

        let mut accumulators: Vec<Box<dyn EdgeAccumulator>> =
            vec![Box::new(RegionStatsAccumulator::new(stats))];
        FeatureTable::assemble(&rag, &mut accumulators, Some(&values), ColumnNaming::Strict)
            .unwrap()
    }

    #[test]
    fn sum_and_difference_of_region_means() {
        // Region 1 values: {1, 3} -> mean 2; region 2 values: {5, 7} -> mean 6.
        let table = run(
            &[2, 2],
            &[1, 1, 2, 2],
            &[1.0, 3.0, 5.0, 7.0],
            vec![Statistic::Mean],
        );

        assert_eq!(table.column("sp_mean_sum").unwrap().values, vec![8.0]);
        assert_eq!(table.column("sp_mean_difference").unwrap().values, vec![4.0]);
    }

    #[test]
    fn count_is_square_root_reduced_in_2d() {
        // Both regions have 2 voxels: sqrt(2) each.
        let table = run(
            &[2, 2],
            &[1, 1, 2, 2],
            &[0.0; 4],
            vec![Statistic::Count],
        );

        let expected = 2.0 * 2.0_f32.sqrt();
        let sum = table.column("sp_count_sum").unwrap().values[0];
        assert!((sum - expected).abs() < 1e-6);
        assert!(table.column("sp_count_difference").unwrap().values[0].abs() < 1e-6);
    }

    #[test]
    fn count_is_cube_root_reduced_in_3d() {
        // 2x2x2 split along axis 0: 4 voxels per region, cbrt(4) each.
        let table = run(
            &[2, 2, 2],
            &[1, 1, 1, 1, 2, 2, 2, 2],
            &[0.0; 8],
            vec![Statistic::Count],
        );

        let expected = 2.0 * 4.0_f32.cbrt();
        let sum = table.column("sp_count_sum").unwrap().values[0];
        assert!((sum - expected).abs() < 1e-6);
    }

    #[test]
    fn quantiles_use_whole_region_samples() {
        // Region 1: {0, 10}, region 2: {10, 10}; medians 5 and 10.
        let table = run(
            &[2, 2],
            &[1, 1, 2, 2],
            &[0.0, 10.0, 10.0, 10.0],
            vec![Statistic::Quantiles50],
        );

        assert_eq!(
            table.column("sp_quantiles_50_sum").unwrap().values,
            vec![15.0]
        );
        assert_eq!(
            table.column("sp_quantiles_50_difference").unwrap().values,
            vec![5.0]
        );
    }

    #[test]
    fn missing_values_fail_eagerly() {
        let volume = LabelVolume::from_raw(&[2, 2], &[1_u32, 1, 2, 2]).unwrap();
        let rag = Rag::build(volume).unwrap();

        let mut accumulator = RegionStatsAccumulator::new(vec![Statistic::Mean]);
        let result = accumulator.initialize(&rag, None);
        assert!(matches!(
            result,
            Err(Error::MissingAuxiliaryData { accumulator }) if accumulator == "region"
        ));
    }
}
