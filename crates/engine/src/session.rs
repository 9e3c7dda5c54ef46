//! Editing session: owns the authoritative graph and its derived definition.
//!
//! `Session` is the glue between the canvas and the two transformations:
//! 1. Every mutation re-runs the exporter so `definition()` is always current.
//! 2. `import_definition` builds a whole new graph and swaps it in only on
//!    success, so a failed import leaves graph, name and ID counter intact.
//! 3. The ID counter lives here, seeded past the IDs already on the canvas.

use tracing::{info, instrument, warn};

use nodes::{EditError, JobNodeData, Step, TriggerNodeData, TriggerSpec};

use crate::export::{export_named, DEFAULT_WORKFLOW_NAME};
use crate::ids::IdGenerator;
use crate::import::import;
use crate::models::{Edge, Graph, Node, NodeKind, Position};
use crate::EngineError;

/// Where a job added from the toolbox is dropped.
const NEW_JOB_POSITION: Position = Position::new(100.0, 100.0);

/// One editor session.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    graph: Graph,
    ids: IdGenerator,
    definition: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session holding the starter graph: a `push` trigger feeding a
    /// `build` job.
    pub fn new() -> Self {
        Self::with_graph(DEFAULT_WORKFLOW_NAME, starter_graph())
    }

    pub fn with_graph(name: impl Into<String>, graph: Graph) -> Self {
        let ids = IdGenerator::seeded_past(&graph);
        let mut session = Self {
            name: name.into(),
            graph,
            ids,
            definition: String::new(),
        };
        session.refresh();
        session
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The definition text derived from the current graph.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.refresh();
    }

    // -----------------------------------------------------------------------
    // Graph edits
    // -----------------------------------------------------------------------

    /// Add a job from the template.
    ///
    /// It is connected from the selected node if there is one, otherwise
    /// from the trigger node if there is one. Returns the new node's ID.
    #[instrument(skip(self))]
    pub fn add_job(&mut self) -> String {
        let id = self.ids.node_id();
        let source = self
            .graph
            .nodes
            .iter()
            .find(|n| n.selected)
            .or_else(|| self.graph.trigger_node())
            .map(|n| n.id.clone());

        self.graph
            .nodes
            .push(Node::job(id.clone(), JobNodeData::template(), NEW_JOB_POSITION));
        if let Some(source) = source {
            self.graph
                .edges
                .push(Edge::animated(IdGenerator::edge_id(&source, &id), source, id.clone()));
        }

        info!("added job node '{}'", id);
        self.refresh();
        id
    }

    /// Replace a job node's payload (the job dialog's save).
    pub fn update_job(&mut self, node_id: &str, data: JobNodeData) -> Result<(), EngineError> {
        self.edit_job(node_id, |job| {
            *job = data;
            Ok(())
        })
    }

    /// Replace a trigger node's payload (the trigger dialog's save).
    pub fn update_trigger(
        &mut self,
        node_id: &str,
        data: TriggerNodeData,
    ) -> Result<(), EngineError> {
        self.edit_trigger(node_id, |trigger| {
            *trigger = data;
            Ok(())
        })
    }

    /// Apply one edit operation to a job node's payload.
    ///
    /// The graph is only refreshed when the edit succeeds; a failed edit
    /// may have partially applied to the payload copy, which is discarded.
    pub fn edit_job<R>(
        &mut self,
        node_id: &str,
        edit: impl FnOnce(&mut JobNodeData) -> Result<R, EditError>,
    ) -> Result<R, EngineError> {
        let node = self.node_mut(node_id)?;
        let NodeKind::Job { data } = &mut node.kind else {
            return Err(wrong_kind(node_id, "job"));
        };
        let mut edited = data.clone();
        let out = edit(&mut edited)?;
        *data = edited;
        self.refresh();
        Ok(out)
    }

    /// Apply one edit operation to a trigger node's payload.
    pub fn edit_trigger<R>(
        &mut self,
        node_id: &str,
        edit: impl FnOnce(&mut TriggerNodeData) -> Result<R, EditError>,
    ) -> Result<R, EngineError> {
        let node = self.node_mut(node_id)?;
        let NodeKind::Trigger { data } = &mut node.kind else {
            return Err(wrong_kind(node_id, "trigger"));
        };
        let mut edited = data.clone();
        let out = edit(&mut edited)?;
        *data = edited;
        self.refresh();
        Ok(out)
    }

    /// Make `node_id` the only selected node.
    pub fn select(&mut self, node_id: &str) -> Result<(), EngineError> {
        self.node_mut(node_id)?;
        for node in &mut self.graph.nodes {
            node.selected = node.id == node_id;
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for node in &mut self.graph.nodes {
            node.selected = false;
        }
    }

    /// Draw an edge between two existing nodes. Returns the edge ID.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, EngineError> {
        for id in [source, target] {
            if self.graph.node(id).is_none() {
                return Err(EngineError::UnknownNode(id.to_owned()));
            }
        }
        let id = IdGenerator::edge_id(source, target);
        self.graph
            .edges
            .push(Edge::animated(id.clone(), source, target));
        self.refresh();
        Ok(id)
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, node_id: &str) -> Result<Node, EngineError> {
        let index = self
            .graph
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| EngineError::UnknownNode(node_id.to_owned()))?;
        let removed = self.graph.nodes.remove(index);
        self.graph
            .edges
            .retain(|e| e.source != node_id && e.target != node_id);
        self.refresh();
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Import
    // -----------------------------------------------------------------------

    /// Replace the graph with one parsed from `text`.
    ///
    /// # Errors
    /// [`EngineError::Parse`] when the text is not a mapping-shaped document.
    /// The session is unchanged in that case.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn import_definition(&mut self, text: &str) -> Result<(), EngineError> {
        let mut ids = self.ids.clone();
        let imported = import(text, &mut ids).map_err(|e| {
            warn!("import rejected: {}", e);
            e
        })?;

        self.graph = imported.graph;
        self.ids = ids;
        if let Some(name) = imported.name {
            self.name = name;
        }
        info!(
            "imported {} node(s), {} edge(s)",
            self.graph.nodes.len(),
            self.graph.edges.len()
        );
        self.refresh();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn refresh(&mut self) {
        self.definition = export_named(&self.name, &self.graph.nodes, &self.graph.edges);
    }

    fn node_mut(&mut self, node_id: &str) -> Result<&mut Node, EngineError> {
        self.graph
            .node_mut(node_id)
            .ok_or_else(|| EngineError::UnknownNode(node_id.to_owned()))
    }
}

fn wrong_kind(node_id: &str, expected: &'static str) -> EngineError {
    EngineError::WrongNodeKind {
        node_id: node_id.to_owned(),
        expected,
    }
}

/// Trigger `1` (`push`) → job `2` (`build`).
fn starter_graph() -> Graph {
    Graph::new(
        vec![
            Node::trigger(
                "1",
                TriggerNodeData::new(vec![TriggerSpec::event("push")]),
                Position::new(200.0, 100.0),
            ),
            Node::job(
                "2",
                JobNodeData::new(
                    "build",
                    "ubuntu-latest",
                    vec![
                        Step::uses("Checkout code", "actions/checkout@v4"),
                        Step::run("Run test script", "npm test"),
                    ],
                ),
                Position::new(200.0, 250.0),
            ),
        ],
        vec![Edge::animated("e1-2", "1", "2")],
    )
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use nodes::StepField;
    use serde_yaml::Value;

    fn doc(session: &Session) -> Value {
        serde_yaml::from_str(session.definition()).unwrap()
    }

    #[test]
    fn starter_session_exports_build_job() {
        let session = Session::new();
        let doc = doc(&session);

        assert_eq!(doc["name"], Value::String(DEFAULT_WORKFLOW_NAME.into()));
        assert_eq!(doc["on"], serde_yaml::from_str::<Value>("[push]").unwrap());
        assert_eq!(doc["jobs"]["build"]["runs-on"], Value::String("ubuntu-latest".into()));
        assert_eq!(session.ids().peek(), 3);
    }

    #[test]
    fn add_job_connects_from_trigger_by_default() {
        let mut session = Session::new();
        let id = session.add_job();

        assert_eq!(id, "node_3");
        let edge = session.graph().edges.last().unwrap();
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("1", "node_3"));
        assert!(doc(&session)["jobs"]["new-job"].get("needs").is_none());
    }

    #[test]
    fn add_job_connects_from_selected_node() {
        let mut session = Session::new();
        session.select("2").unwrap();
        session.add_job();

        assert_eq!(
            doc(&session)["jobs"]["new-job"]["needs"],
            serde_yaml::from_str::<Value>("[build]").unwrap()
        );
    }

    #[test]
    fn add_job_without_trigger_has_no_edge() {
        let mut session = Session::with_graph("empty", Graph::default());
        session.add_job();
        assert!(session.graph().edges.is_empty());
    }

    #[test]
    fn add_job_beside_largest_suffix_mints_fresh_id() {
        let existing = "node_18446744073709551615";
        let graph = Graph::new(
            vec![Node::job(existing, JobNodeData::template(), Position::default())],
            vec![],
        );
        let mut session = Session::with_graph("x", graph);

        let id = session.add_job();
        assert_ne!(id, existing);
        assert_eq!(session.graph().nodes.len(), 2);
        assert_eq!(session.graph().node(&id).map(|n| n.id.as_str()), Some(id.as_str()));
    }

    #[test]
    fn update_job_refreshes_definition() {
        let mut session = Session::new();
        session
            .update_job("2", JobNodeData::new("compile", "macos-latest", vec![]))
            .unwrap();

        let doc = doc(&session);
        assert!(doc["jobs"].get("build").is_none());
        assert_eq!(doc["jobs"]["compile"]["runs-on"], Value::String("macos-latest".into()));
    }

    #[test]
    fn edit_job_applies_step_edit() {
        let mut session = Session::new();
        session
            .edit_job("2", |job| job.set_step_field(1, StepField::Uses, "actions/setup-node@v4"))
            .unwrap();

        let step = &session.graph().node("2").unwrap().as_job().unwrap().steps[1];
        assert_eq!(step.action(), Some("actions/setup-node@v4"));
        assert_eq!(step.run, None);
    }

    #[test]
    fn failed_edit_leaves_payload_untouched() {
        let mut session = Session::new();
        let before = session.graph().clone();
        let result = session.edit_trigger("1", |t| {
            t.add_trigger();
            t.delete_trigger(9).map(|_| ())
        });

        assert!(matches!(result, Err(EngineError::Edit(_))));
        assert_eq!(session.graph(), &before);
    }

    #[test]
    fn editing_wrong_variant_is_rejected() {
        let mut session = Session::new();
        assert!(matches!(
            session.update_trigger("2", TriggerNodeData::default()),
            Err(EngineError::WrongNodeKind { expected: "trigger", .. })
        ));
        assert!(matches!(
            session.update_job("nope", JobNodeData::template()),
            Err(EngineError::UnknownNode(id)) if id == "nope"
        ));
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut session = Session::new();
        session.remove_node("1").unwrap();

        assert!(session.graph().edges.is_empty());
        assert_eq!(doc(&session)["on"], Value::Mapping(Default::default()));
    }

    #[test]
    fn connect_requires_existing_endpoints() {
        let mut session = Session::new();
        assert!(matches!(
            session.connect("2", "ghost"),
            Err(EngineError::UnknownNode(id)) if id == "ghost"
        ));
    }

    #[test]
    fn failed_import_leaves_session_untouched() {
        let mut session = Session::new();
        let graph_before: *const Graph = session.graph();
        let snapshot = session.graph().clone();
        let definition = session.definition().to_owned();

        let err = session.import_definition("not: [valid").unwrap_err();

        assert!(matches!(err, EngineError::Parse(_)));
        assert!(std::ptr::eq(graph_before, session.graph()));
        assert_eq!(session.graph(), &snapshot);
        assert_eq!(session.definition(), definition);
        assert_eq!(session.ids().peek(), 3);
    }

    #[test]
    fn import_swaps_graph_and_name() {
        let mut session = Session::new();
        session
            .import_definition("name: Deploy\non: [push]\njobs:\n  ship:\n    runs-on: ubuntu-latest\n")
            .unwrap();

        assert_eq!(session.name(), "Deploy");
        assert_eq!(session.graph().nodes.len(), 2);
        assert_eq!(session.graph().nodes[0].id, "node_3");
        assert_eq!(session.ids().peek(), 5);
        assert_eq!(doc(&session)["name"], Value::String("Deploy".into()));
    }
}
