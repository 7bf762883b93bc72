//! Geometric edge features.

use hashbrown::HashMap;

use crate::error::Result;
use crate::rag::{Edge, EdgeIndex, Rag};
use crate::table::Column;
use crate::volume::ValueVolume;

use super::EdgeAccumulator;

/// Boundary face count and region size ratio per edge.
///
/// Works from the graph's side data alone; no auxiliary per-voxel data is
/// required.
#[derive(Debug, Default)]
pub struct GeometryAccumulator {
    sizes: HashMap<u32, u64>,
    columns: Vec<Column>,
}

impl GeometryAccumulator {
    pub fn new() -> GeometryAccumulator {
        GeometryAccumulator::default()
    }
}

impl EdgeAccumulator for GeometryAccumulator {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn column_names(&self) -> Vec<String> {
        vec![
            "boundary_face_count".to_string(),
            "size_ratio".to_string(),
        ]
    }

    fn initialize(&mut self, rag: &Rag, _values: Option<&ValueVolume>) -> Result<()> {
        self.sizes = rag
            .region_ids()
            .iter()
            .map(|&id| {
                let size = rag
                    .region_size(id)
                    .expect("census contains every region id");
                (id, size)
            })
            .collect();

        self.columns = self
            .column_names()
            .into_iter()
            .map(|name| Column::with_capacity(name, rag.num_edges()))
            .collect();

        Ok(())
    }

    fn accumulate(&mut self, _index: EdgeIndex, edge: &Edge) -> Result<()> {
        let a = self.sizes[&edge.id.lo];
        let b = self.sizes[&edge.id.hi];
        let ratio = a.min(b) as f64 / a.max(b) as f64;

        self.columns[0].values.push(edge.face_count as f32);
        self.columns[1].values.push(ratio as f32);
        Ok(())
    }

    fn finalize(&mut self) -> Result<Vec<Column>> {
        Ok(std::mem::take(&mut self.columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::Rag;
    use crate::table::FeatureTable;
    use crate::volume::LabelVolume;
    use crate::ColumnNaming;

    #[test]
    fn face_count_and_size_ratio() {
        // Region 1: 2 voxels, region 2: 4 voxels, 3 shared faces.
        let volume = LabelVolume::from_raw(&[2, 3], &[1_u32, 1, 2, 2, 2, 2]).unwrap();
        let rag = Rag::build(volume).unwrap();

        let mut accumulators: Vec<Box<dyn EdgeAccumulator>> =
            vec![Box::new(GeometryAccumulator::new())];
        let table =
            FeatureTable::assemble(&rag, &mut accumulators, None, ColumnNaming::Strict).unwrap();

        let index = rag.edge_index(1, 2).unwrap() as usize;
        assert_eq!(
            table.column("boundary_face_count").unwrap().values[index],
            rag.face_count(index as u32) as f32
        );
        assert_eq!(table.column("size_ratio").unwrap().values[index], 0.5);
    }

    #[test]
    fn runs_without_auxiliary_data() {
        let volume = LabelVolume::from_raw(&[2, 2], &[1_u32, 1, 2, 2]).unwrap();
        let rag = Rag::build(volume).unwrap();

        let mut accumulator = GeometryAccumulator::new();
        accumulator.initialize(&rag, None).unwrap();
    }
}
