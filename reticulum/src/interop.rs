//! Export to the `petgraph` node/edge protocol.

use hashbrown::HashMap;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::rag::Rag;

/// Build an undirected `petgraph` graph from the adjacency graph.
///
/// Node weights are region ids (in ascending id order), edge weights are
/// shared boundary face counts (in the graph's canonical edge order).
pub fn to_petgraph(rag: &Rag) -> UnGraph<u32, u64> {
    let mut graph = UnGraph::with_capacity(rag.num_regions(), rag.num_edges());

    let mut nodes: HashMap<u32, NodeIndex> = HashMap::with_capacity(rag.num_regions());
    for &id in rag.region_ids() {
        nodes.insert(id, graph.add_node(id));
    }

    for edge in rag.edges() {
        graph.add_edge(nodes[&edge.id.lo], nodes[&edge.id.hi], edge.face_count);
    }

    graph
}
