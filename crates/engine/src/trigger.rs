//! Normalization between a trigger node's [`TriggerSpec`]s and the `on`
//! field of a definition.
//!
//! Encoding picks the list shape when no spec carries a key and the mapping
//! shape otherwise. Decoding accepts every shape `on` is written in: a single
//! event string, a list of events, or a mapping of events to qualifiers.

use serde_yaml::Value;
use tracing::debug;

use nodes::TriggerSpec;

use crate::definition::{Qualifier, TriggerEncoding};

/// Encode a trigger node's specs into the `on` shape.
///
/// No de-duplication happens in the list shape. In the mapping shape a
/// repeated event replaces the earlier entry in place.
pub fn encode(specs: &[TriggerSpec]) -> TriggerEncoding {
    if specs.iter().all(|spec| qualifier_key(spec).is_none()) {
        return TriggerEncoding::List(specs.iter().map(|s| s.event.clone()).collect());
    }

    let mut entries: Vec<(String, Option<Qualifier>)> = Vec::with_capacity(specs.len());
    for spec in specs {
        let qualifier = qualifier_key(spec).map(|key| Qualifier {
            key: key.to_owned(),
            values: spec.values.clone(),
        });
        match entries.iter_mut().find(|(event, _)| *event == spec.event) {
            Some(slot) => slot.1 = qualifier,
            None => entries.push((spec.event.clone(), qualifier)),
        }
    }
    TriggerEncoding::Map(entries)
}

/// The spec's key, with a blank key read as absent.
fn qualifier_key(spec: &TriggerSpec) -> Option<&str> {
    spec.key.as_deref().filter(|key| !key.trim().is_empty())
}

/// Decode an `on` value into trigger specs.
pub fn decode(on: &Value) -> Vec<TriggerSpec> {
    match on {
        Value::Sequence(events) => events
            .iter()
            .filter_map(scalar_to_string)
            .map(TriggerSpec::event)
            .collect(),
        Value::Mapping(events) => events
            .iter()
            .filter_map(|(event, qualifier)| {
                let event = scalar_to_string(event)?;
                Some(decode_qualified(event, qualifier))
            })
            .collect(),
        Value::Tagged(tagged) => decode(&tagged.value),
        other => scalar_to_string(other)
            .map(TriggerSpec::event)
            .into_iter()
            .collect(),
    }
}

/// `event: { key: values }` or `event: <anything else>`.
fn decode_qualified(event: String, qualifier: &Value) -> TriggerSpec {
    let Value::Mapping(qualifier) = untag(qualifier) else {
        return TriggerSpec::event(event);
    };

    let mut entries = qualifier.iter();
    let Some((key, values)) = entries.next() else {
        return TriggerSpec::event(event);
    };
    if entries.next().is_some() {
        debug!("trigger '{}' has several qualifiers; keeping the first", event);
    }

    TriggerSpec {
        event,
        key: scalar_to_string(key).filter(|key| !key.trim().is_empty()),
        values: string_list(values),
    }
}

/// A list of strings, with a lone scalar coerced to one element and null to none.
pub fn string_list(value: &Value) -> Vec<String> {
    match untag(value) {
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

/// Stringify a scalar. Null and nested structures yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}
