//! Core domain models for the pipeline canvas.
//!
//! These types are the source of truth for what the editor graph looks like
//! in memory. They serialize to the interchange shape the canvas consumes:
//! `{ id, type: "triggerNode" | "jobNode", data, position }` for nodes and
//! `{ id, source, target }` for edges.

use serde::{Deserialize, Serialize};

use nodes::{JobNodeData, TriggerNodeData};

use crate::EngineError;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Canvas coordinates. Opaque to the transformations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// The two node variants. The `type` tag only exists at the serde boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Pipeline start conditions.
    #[serde(rename = "triggerNode")]
    Trigger { data: TriggerNodeData },
    /// One unit of work.
    #[serde(rename = "jobNode")]
    Job { data: JobNodeData },
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique within a graph (referenced by edges).
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Node {
    pub fn trigger(id: impl Into<String>, data: TriggerNodeData, position: Position) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Trigger { data },
            position,
            selected: false,
        }
    }

    pub fn job(id: impl Into<String>, data: JobNodeData, position: Position) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Job { data },
            position,
            selected: false,
        }
    }

    pub fn as_trigger(&self) -> Option<&TriggerNodeData> {
        match &self.kind {
            NodeKind::Trigger { data } => Some(data),
            NodeKind::Job { .. } => None,
        }
    }

    pub fn as_job(&self) -> Option<&JobNodeData> {
        match &self.kind {
            NodeKind::Job { data } => Some(data),
            NodeKind::Trigger { .. } => None,
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self.kind, NodeKind::Trigger { .. })
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// Directed edge from `source` to `target`.
///
/// Its meaning depends on the endpoint variants and is resolved at
/// transformation time: trigger → job starts the job, job → job makes the
/// target need the source, anything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            animated: false,
        }
    }

    /// An edge drawn with the canvas' animated style (every edge the engine mints).
    pub fn animated(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            animated: true,
            ..Self::new(id, source, target)
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// The editor's live representation: nodes plus directed edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// First node with this ID.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// The trigger node that drives the definition: the first one in node order.
    pub fn trigger_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_trigger())
    }

    /// Job nodes with their payloads, in node order.
    pub fn job_nodes(&self) -> impl Iterator<Item = (&Node, &JobNodeData)> {
        self.nodes.iter().filter_map(|n| n.as_job().map(|job| (n, job)))
    }

    /// Read the interchange JSON the canvas saves.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodes::{Step, TriggerSpec};
    use serde_json::json;

    #[test]
    fn node_uses_interchange_shape() {
        let node = Node::job(
            "2",
            JobNodeData::new("build", "ubuntu-latest", vec![Step::run("Test", "npm test")]),
            Position::new(200.0, 250.0),
        );

        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "id": "2",
                "type": "jobNode",
                "data": {
                    "jobName": "build",
                    "runsOn": "ubuntu-latest",
                    "steps": [{ "name": "Test", "run": "npm test" }]
                },
                "position": { "x": 200.0, "y": 250.0 }
            })
        );
    }

    #[test]
    fn graph_reads_canvas_json_with_extra_fields() {
        let graph = Graph::from_json(
            r#"{
                "nodes": [
                    { "id": "1", "type": "triggerNode", "data": { "trigger": "on: push" },
                      "position": { "x": 200, "y": 100 }, "width": 180, "selected": true },
                    { "id": "2", "type": "jobNode",
                      "data": { "jobName": "build", "runsOn": "ubuntu-latest", "steps": [] } }
                ],
                "edges": [{ "id": "e1-2", "source": "1", "target": "2", "animated": true }]
            }"#,
        )
        .unwrap();

        let trigger = graph.trigger_node().unwrap();
        assert!(trigger.selected);
        assert_eq!(
            trigger.as_trigger().unwrap().triggers,
            vec![TriggerSpec::event("push")]
        );
        assert_eq!(graph.job_nodes().count(), 1);
        assert_eq!(graph.node("2").unwrap().position, Position::default());
        assert!(graph.edges[0].animated);
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let result = Graph::from_json(
            r#"{ "nodes": [{ "id": "x", "type": "noteNode", "data": {} }], "edges": [] }"#,
        );
        assert!(matches!(result, Err(EngineError::Interchange(_))));
    }

    #[test]
    fn first_trigger_in_node_order_wins() {
        let graph = Graph::new(
            vec![
                Node::job("j", JobNodeData::template(), Position::default()),
                Node::trigger("t1", TriggerNodeData::from_legacy("on: push"), Position::default()),
                Node::trigger("t2", TriggerNodeData::from_legacy("on: release"), Position::default()),
            ],
            vec![],
        );
        assert_eq!(graph.trigger_node().unwrap().id, "t1");
    }
}
