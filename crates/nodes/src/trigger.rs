//! Trigger node payload.
//!
//! A trigger node holds an ordered list of [`TriggerSpec`]s, each describing
//! one start condition (`push`, `workflow_dispatch`, ...) and an optional
//! qualifier such as `branches: [main]`.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{check_index, EditError};

// ---------------------------------------------------------------------------
// TriggerSpec
// ---------------------------------------------------------------------------

/// One `(event, key?, values)` start condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// Event name, e.g. `push`.
    pub event: String,
    /// Qualifier name, e.g. `branches`. `None` means the event is unqualified.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_key"
    )]
    pub key: Option<String>,
    /// Qualifier values. Empty with a `key` present means "unconstrained".
    #[serde(default)]
    pub values: Vec<String>,
}

impl TriggerSpec {
    /// An unqualified event such as `workflow_dispatch`.
    pub fn event(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            key: None,
            values: Vec::new(),
        }
    }

    /// An event with a qualifier key and its values.
    pub fn keyed<I, S>(event: impl Into<String>, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            event: event.into(),
            key: Some(key.into()),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The spec a freshly added trigger row starts with.
    pub fn template() -> Self {
        Self::keyed("push", "branches", ["main"])
    }

    /// Placeholder used when a value row is added.
    pub const NEW_VALUE: &'static str = "new-value";
}

fn non_empty_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let key = Option::<String>::deserialize(deserializer)?;
    Ok(key.filter(|k| !k.trim().is_empty()))
}

// ---------------------------------------------------------------------------
// TriggerNodeData
// ---------------------------------------------------------------------------

/// Payload of a trigger node.
///
/// Accepts every encoding the canvas has stored over time (see
/// [`TriggerPayload`]); always writes the `{ "triggers": [...] }` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TriggerPayload")]
pub struct TriggerNodeData {
    pub triggers: Vec<TriggerSpec>,
}

/// On-disk shapes of a trigger node payload, newest first.
#[derive(Deserialize)]
#[serde(untagged)]
enum TriggerPayload {
    Current { triggers: Vec<TriggerSpec> },
    /// `{ "trigger": "on: push, pull_request" }`
    Legacy { trigger: String },
    Empty {},
}

impl From<TriggerPayload> for TriggerNodeData {
    fn from(payload: TriggerPayload) -> Self {
        match payload {
            TriggerPayload::Current { triggers } => Self { triggers },
            TriggerPayload::Legacy { trigger } => {
                debug!("upgrading legacy trigger payload '{}'", trigger);
                Self::from_legacy(&trigger)
            }
            TriggerPayload::Empty {} => Self::default(),
        }
    }
}

impl TriggerNodeData {
    pub fn new(triggers: Vec<TriggerSpec>) -> Self {
        Self { triggers }
    }

    /// Parse the legacy single-string label, e.g. `"on: push, pull_request"`.
    pub fn from_legacy(label: &str) -> Self {
        let body = label.trim();
        let body = body.strip_prefix("on:").unwrap_or(body);
        let triggers = body
            .split(',')
            .map(str::trim)
            .filter(|event| !event.is_empty())
            .map(TriggerSpec::event)
            .collect();
        Self { triggers }
    }

    /// Human-readable label shown on the node, e.g. `on: push, pull_request`.
    pub fn label(&self) -> String {
        let events: Vec<&str> = self.triggers.iter().map(|t| t.event.as_str()).collect();
        format!("on: {}", events.join(", "))
    }

    // ------ Trigger rows ------

    pub fn add_trigger(&mut self) -> usize {
        self.triggers.push(TriggerSpec::template());
        self.triggers.len() - 1
    }

    pub fn delete_trigger(&mut self, index: usize) -> Result<TriggerSpec, EditError> {
        check_index("trigger", index, self.triggers.len())?;
        Ok(self.triggers.remove(index))
    }

    pub fn set_event(&mut self, index: usize, event: impl Into<String>) -> Result<(), EditError> {
        self.spec_mut(index)?.event = event.into();
        Ok(())
    }

    /// Set the qualifier key; an empty string clears it.
    pub fn set_key(&mut self, index: usize, key: impl Into<String>) -> Result<(), EditError> {
        let key = key.into();
        self.spec_mut(index)?.key = if key.trim().is_empty() { None } else { Some(key) };
        Ok(())
    }

    // ------ Value rows ------

    pub fn add_value(&mut self, index: usize) -> Result<usize, EditError> {
        let spec = self.spec_mut(index)?;
        spec.values.push(TriggerSpec::NEW_VALUE.to_string());
        Ok(spec.values.len() - 1)
    }

    pub fn delete_value(&mut self, index: usize, value_index: usize) -> Result<String, EditError> {
        let spec = self.spec_mut(index)?;
        check_index("trigger value", value_index, spec.values.len())?;
        Ok(spec.values.remove(value_index))
    }

    pub fn set_value(
        &mut self,
        index: usize,
        value_index: usize,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        let spec = self.spec_mut(index)?;
        check_index("trigger value", value_index, spec.values.len())?;
        spec.values[value_index] = value.into();
        Ok(())
    }

    fn spec_mut(&mut self, index: usize) -> Result<&mut TriggerSpec, EditError> {
        check_index("trigger", index, self.triggers.len())?;
        Ok(&mut self.triggers[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_shape_deserializes() {
        let data: TriggerNodeData = serde_json::from_value(json!({
            "triggers": [
                { "event": "push", "key": "branches", "values": ["main"] },
                { "event": "workflow_dispatch" }
            ]
        }))
        .unwrap();

        assert_eq!(
            data.triggers,
            vec![
                TriggerSpec::keyed("push", "branches", ["main"]),
                TriggerSpec::event("workflow_dispatch"),
            ]
        );
    }

    #[test]
    fn legacy_label_is_upgraded() {
        let data: TriggerNodeData =
            serde_json::from_value(json!({ "trigger": "on: push, pull_request" })).unwrap();

        assert_eq!(
            data.triggers,
            vec![TriggerSpec::event("push"), TriggerSpec::event("pull_request")]
        );
        assert_eq!(data.label(), "on: push, pull_request");
    }

    #[test]
    fn missing_payload_is_empty() {
        let data: TriggerNodeData = serde_json::from_value(json!({})).unwrap();
        assert!(data.triggers.is_empty());
    }

    #[test]
    fn empty_key_reads_as_absent() {
        let spec: TriggerSpec =
            serde_json::from_value(json!({ "event": "push", "key": "", "values": [] })).unwrap();
        assert_eq!(spec.key, None);
    }

    #[test]
    fn always_serializes_current_shape() {
        let data: TriggerNodeData =
            serde_json::from_value(json!({ "trigger": "on: push" })).unwrap();
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({ "triggers": [{ "event": "push", "values": [] }] })
        );
    }

    #[test]
    fn value_rows_can_be_edited() {
        let mut data = TriggerNodeData::default();
        let t = data.add_trigger();
        let v = data.add_value(t).unwrap();
        data.set_value(t, v, "release/*").unwrap();
        data.delete_value(t, 0).unwrap();

        assert_eq!(data.triggers[0].values, vec!["release/*"]);
    }

    #[test]
    fn clearing_key_makes_spec_unqualified() {
        let mut data = TriggerNodeData::new(vec![TriggerSpec::template()]);
        data.set_key(0, "").unwrap();
        assert_eq!(data.triggers[0].key, None);
    }

    #[test]
    fn out_of_range_edit_is_rejected() {
        let mut data = TriggerNodeData::default();
        assert_eq!(
            data.set_event(2, "push"),
            Err(EditError::IndexOutOfRange { what: "trigger", index: 2, len: 0 })
        );
    }
}
