//! The workflow definition document, as assembled by the exporter.
//!
//! Mapping order is insertion order; the YAML encoder never emits anchors
//! or aliases.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use nodes::Step;

/// `{ name, on, jobs }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub name: String,
    pub on: TriggerEncoding,
    pub jobs: Jobs,
}

// ---------------------------------------------------------------------------
// on:
// ---------------------------------------------------------------------------

/// On-disk shapes of the `on` field.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerEncoding {
    /// `on: [push, pull_request]`
    List(Vec<String>),
    /// `on: { push: { branches: [main] }, workflow_dispatch: null }`
    Map(Vec<(String, Option<Qualifier>)>),
}

impl Default for TriggerEncoding {
    fn default() -> Self {
        Self::Map(Vec::new())
    }
}

/// The nested `{ key: values }` under an event. Empty `values` encode as null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    pub key: String,
    pub values: Vec<String>,
}

impl Serialize for TriggerEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::List(events) => {
                let mut seq = serializer.serialize_seq(Some(events.len()))?;
                for event in events {
                    seq.serialize_element(event)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (event, qualifier) in entries {
                    map.serialize_entry(event, qualifier)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for Qualifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        if self.values.is_empty() {
            map.serialize_entry(&self.key, &())?;
        } else {
            map.serialize_entry(&self.key, &self.values)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// jobs:
// ---------------------------------------------------------------------------

/// Job bodies keyed by job name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Jobs(Vec<(String, JobBody)>);

impl Jobs {
    /// Insert or replace. A replaced job keeps its original position.
    pub fn insert(&mut self, name: String, body: JobBody) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = body,
            None => self.0.push((name, body)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&JobBody> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, body)| body)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JobBody)> {
        self.0.iter().map(|(n, body)| (n.as_str(), body))
    }
}

impl Serialize for Jobs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, body) in &self.0 {
            map.serialize_entry(name, body)?;
        }
        map.end()
    }
}

/// One entry under `jobs:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobBody {
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    pub steps: Vec<StepBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
}

/// One entry under `steps:`. `uses` / `run` only appear when non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

impl From<&Step> for StepBody {
    fn from(step: &Step) -> Self {
        Self {
            name: step.name.clone(),
            uses: step.action().map(str::to_owned),
            run: step.command().map(str::to_owned),
        }
    }
}
