//! Dependency inference: which jobs a job `needs`, read off the edges.
//!
//! Rules applied:
//! 1. Only edges whose `target` is the job are considered.
//! 2. The `source` is resolved by ID; a missing source contributes nothing.
//! 3. Only job sources count. Trigger sources mark a pipeline entry point.
//!
//! Order follows edge order and duplicates are kept. Cycles are not detected.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::models::{Edge, Graph, Node};

/// Node lookup shared by every `needs` query over one graph.
pub struct DependencyIndex<'a> {
    nodes: HashMap<&'a str, &'a Node>,
    edges: &'a [Edge],
}

impl<'a> DependencyIndex<'a> {
    pub fn new(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
        // First node wins if IDs collide, matching `Graph::node`.
        let mut by_id: HashMap<&str, &Node> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            by_id.entry(node.id.as_str()).or_insert(node);
        }
        Self { nodes: by_id, edges }
    }

    /// Job names the node `job_id` needs, in edge order.
    pub fn needs(&self, job_id: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|edge| edge.target == job_id)
            .filter_map(|edge| match self.nodes.get(edge.source.as_str()) {
                Some(source) => source.as_job().map(|job| job.job_name.clone()),
                None => {
                    debug!("edge '{}' has no source node '{}'; ignored", edge.id, edge.source);
                    None
                }
            })
            .collect()
    }
}

/// Job names the node `job_node_id` needs, for a one-off query.
///
/// Build a [`DependencyIndex`] instead when querying several jobs.
pub fn infer_needs(graph: &Graph, job_node_id: &str) -> Vec<String> {
    DependencyIndex::new(&graph.nodes, &graph.edges).needs(job_node_id)
}

/// Every job's dependency set keyed by job name.
///
/// Node and edge IDs are erased, so two graphs that differ only in
/// identifiers and layout compare equal.
pub fn dependency_sets(graph: &Graph) -> BTreeMap<String, BTreeSet<String>> {
    let index = DependencyIndex::new(&graph.nodes, &graph.edges);
    graph
        .job_nodes()
        .map(|(node, job)| (job.job_name.clone(), index.needs(&node.id).into_iter().collect()))
        .collect()
}
