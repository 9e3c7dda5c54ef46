//! Identifier minting for nodes and edges.
//!
//! The counter is an explicit value owned by whoever mints IDs (normally the
//! [`Session`](crate::Session)), so independent sessions never share a
//! sequence. Minted IDs never repeat an ID the generator was seeded with or
//! has already handed out, even once the counter wraps.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::Graph;

/// Node ID counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
    taken: BTreeSet<String>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator {
    /// A generator whose next node ID is `node_<next>`.
    pub fn starting_at(next: u64) -> Self {
        Self {
            next: next.max(1),
            taken: BTreeSet::new(),
        }
    }

    /// A generator that cannot collide with any node already in `graph`.
    ///
    /// Both plain numeric IDs (`"2"`) and minted ones (`"node_7"`) count;
    /// IDs without a numeric suffix are ignored. Every existing ID is
    /// reserved, so a suffix of `u64::MAX` wraps the counter instead of
    /// overflowing it.
    pub fn seeded_past(graph: &Graph) -> Self {
        let highest = graph
            .nodes
            .iter()
            .filter_map(|n| numeric_suffix(&n.id))
            .max()
            .unwrap_or(0);
        let mut ids = Self::starting_at(highest.checked_add(1).unwrap_or(1));
        ids.taken = graph.nodes.iter().map(|n| n.id.clone()).collect();
        ids
    }

    /// The number the next call to [`node_id`](Self::node_id) will use.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn node_id(&mut self) -> String {
        loop {
            let id = format!("node_{}", self.next);
            self.next = self.next.checked_add(1).unwrap_or(1);
            if self.taken.insert(id.clone()) {
                return id;
            }
            debug!("node id '{}' already taken; skipping", id);
        }
    }

    /// Edge IDs are derived from their endpoints.
    pub fn edge_id(source: &str, target: &str) -> String {
        format!("e-{source}-{target}")
    }
}

fn numeric_suffix(id: &str) -> Option<u64> {
    id.rsplit('_').next()?.parse().ok()
}
