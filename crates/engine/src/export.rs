//! Exporter: graph → definition text.
//!
//! Reads node and edge data only. The output is deterministic for a fixed
//! node/edge order, and the exporter never fails past its own boundary: an
//! encoding failure degrades to [`EXPORT_ERROR_PLACEHOLDER`].

use serde::Serialize;
use tracing::{debug, error};

use crate::definition::{Definition, JobBody, Jobs, StepBody, TriggerEncoding};
use crate::needs::DependencyIndex;
use crate::models::{Edge, Node};
use crate::{trigger, EngineError};

/// Workflow name used when the caller does not supply one.
pub const DEFAULT_WORKFLOW_NAME: &str = "My Visual Workflow";

/// Text shown instead of a definition when encoding fails.
pub const EXPORT_ERROR_PLACEHOLDER: &str = "Error generating YAML";

/// Assemble the definition document for a graph.
pub fn build_definition(name: &str, nodes: &[Node], edges: &[Edge]) -> Definition {
    let on = nodes
        .iter()
        .find_map(Node::as_trigger)
        .map(|data| trigger::encode(&data.triggers))
        .unwrap_or_default();

    let index = DependencyIndex::new(nodes, edges);
    let mut jobs = Jobs::default();
    for node in nodes {
        let Some(job) = node.as_job() else { continue };
        let body = JobBody {
            runs_on: job.runs_on.clone(),
            steps: job.steps.iter().map(StepBody::from).collect(),
            needs: index.needs(&node.id),
        };
        jobs.insert(job.job_name.clone(), body);
    }

    debug!(
        "assembled definition with {} job(s), {} trigger shape",
        jobs.len(),
        match &on {
            TriggerEncoding::List(_) => "list",
            TriggerEncoding::Map(_) => "mapping",
        }
    );

    Definition {
        name: name.to_owned(),
        on,
        jobs,
    }
}

/// Export with the encoding error surfaced.
///
/// # Errors
/// [`EngineError::Serialization`] if the YAML encoder rejects the document.
pub fn try_export(name: &str, nodes: &[Node], edges: &[Edge]) -> Result<String, EngineError> {
    render(&build_definition(name, nodes, edges))
}

/// Export under `name`, degrading to the placeholder on failure.
pub fn export_named(name: &str, nodes: &[Node], edges: &[Edge]) -> String {
    render_or_placeholder(&build_definition(name, nodes, edges))
}

/// Encode any document as YAML.
///
/// # Errors
/// [`EngineError::Serialization`] if the YAML encoder rejects the value.
pub fn render<T: Serialize>(document: &T) -> Result<String, EngineError> {
    serde_yaml::to_string(document).map_err(|e| EngineError::Serialization(e.to_string()))
}

/// Encode as YAML, or [`EXPORT_ERROR_PLACEHOLDER`] if encoding fails.
pub fn render_or_placeholder<T: Serialize>(document: &T) -> String {
    render(document).unwrap_or_else(|e| {
        error!("definition export failed: {}", e);
        EXPORT_ERROR_PLACEHOLDER.to_owned()
    })
}

/// Export under [`DEFAULT_WORKFLOW_NAME`].
pub fn export(nodes: &[Node], edges: &[Edge]) -> String {
    export_named(DEFAULT_WORKFLOW_NAME, nodes, edges)
}
