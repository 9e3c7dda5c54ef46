//! Importer: definition text → graph.
//!
//! The new graph is built off to the side and only returned on success; the
//! ID generator is advanced only once the text has parsed.

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use nodes::{JobNodeData, Step, TriggerNodeData};

use crate::error::ParseError;
use crate::ids::IdGenerator;
use crate::models::{Edge, Graph, Node, Position};
use crate::trigger::{self, scalar_to_string, string_list};

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

const ORIGIN_X: f64 = 50.0;
const ORIGIN_Y: f64 = 50.0;
/// Horizontal offset of the trigger from the first job column.
const TRIGGER_OFFSET_X: f64 = 150.0;
/// Vertical gap between the trigger band and the job row.
const TRIGGER_BAND_HEIGHT: f64 = 150.0;
const JOB_SPACING_X: f64 = 250.0;

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedGraph {
    /// The document's `name`, when it is a scalar.
    pub name: Option<String>,
    pub graph: Graph,
}

/// Parse a definition and rebuild an equivalent graph with fresh IDs.
///
/// # Errors
/// [`ParseError`] if the text is not valid YAML or its top level is not a
/// mapping. `ids` is left untouched in that case.
pub fn import(text: &str, ids: &mut IdGenerator) -> Result<ImportedGraph, ParseError> {
    let document: Value = serde_yaml::from_str(text).map_err(|e| ParseError(e.to_string()))?;
    let Value::Mapping(document) = document else {
        return Err(ParseError("Invalid document object".to_string()));
    };

    let mut nodes: Vec<Node> = Vec::new();
    let mut edges: Vec<Edge> = Vec::new();

    // ------------------------------------------------------------------
    // Trigger node.
    // ------------------------------------------------------------------
    let mut y = ORIGIN_Y;
    let trigger_id = match field(&document, "on") {
        Some(on) if !on.is_null() => {
            let id = ids.node_id();
            let data = TriggerNodeData::new(trigger::decode(on));
            nodes.push(Node::trigger(
                id.clone(),
                data,
                Position::new(ORIGIN_X + TRIGGER_OFFSET_X, y),
            ));
            y += TRIGGER_BAND_HEIGHT;
            Some(id)
        }
        _ => None,
    };

    // ------------------------------------------------------------------
    // First pass: one job node per entry, remembering name → id.
    // ------------------------------------------------------------------
    let jobs: Vec<(String, &Value)> = match field(&document, "jobs") {
        Some(Value::Mapping(jobs)) => jobs
            .iter()
            .filter_map(|(name, body)| scalar_to_string(name).map(|name| (name, body)))
            .collect(),
        Some(other) if !other.is_null() => {
            warn!("'jobs' is not a mapping; no job nodes imported");
            Vec::new()
        }
        _ => Vec::new(),
    };

    let mut job_ids: Vec<(String, String)> = Vec::with_capacity(jobs.len());
    let mut x = ORIGIN_X;
    for (name, body) in &jobs {
        let id = ids.node_id();
        nodes.push(Node::job(
            id.clone(),
            job_data(name, body),
            Position::new(x, y),
        ));
        job_ids.push((name.clone(), id));
        x += JOB_SPACING_X;
    }

    // ------------------------------------------------------------------
    // Second pass: edges from `needs`, or from the trigger when absent.
    // ------------------------------------------------------------------
    let lookup = |name: &str| {
        job_ids
            .iter()
            .find(|(job_name, _)| job_name == name)
            .map(|(_, id)| id.as_str())
    };

    for ((name, body), (_, target)) in jobs.iter().zip(&job_ids) {
        match needs(body) {
            Some(needed) => {
                for needed_name in needed {
                    match lookup(needed_name.as_str()) {
                        Some(source) => edges.push(minted_edge(source, target)),
                        None => debug!("job '{}' needs unknown job '{}'; skipped", name, needed_name),
                    }
                }
            }
            None => {
                if let Some(source) = &trigger_id {
                    edges.push(minted_edge(source, target));
                }
            }
        }
    }

    debug!("imported {} node(s) and {} edge(s)", nodes.len(), edges.len());

    Ok(ImportedGraph {
        name: field(&document, "name").and_then(scalar_to_string),
        graph: Graph::new(nodes, edges),
    })
}

fn field<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping.get(key)
}

fn minted_edge(source: &str, target: &str) -> Edge {
    Edge::animated(IdGenerator::edge_id(source, target), source, target)
}

fn job_data(name: &str, body: &Value) -> JobNodeData {
    let runs_on = body
        .get("runs-on")
        .and_then(scalar_to_string)
        .unwrap_or_default();
    let steps = match body.get("steps") {
        Some(Value::Sequence(steps)) => steps.iter().filter_map(step).collect(),
        _ => Vec::new(),
    };
    JobNodeData::new(name, runs_on, steps)
}

fn step(value: &Value) -> Option<Step> {
    let step = value.as_mapping()?;
    Some(Step {
        name: step.get("name").and_then(scalar_to_string).unwrap_or_default(),
        uses: step.get("uses").and_then(scalar_to_string),
        run: step.get("run").and_then(scalar_to_string),
    })
}

/// `needs` as a list, or `None` when the job declares no prerequisites.
fn needs(body: &Value) -> Option<Vec<String>> {
    match body.get("needs")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(string_list(other)),
    }
}
