use crate::error::Error;
use crate::model::{Categorization, Entry, EntryKind};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Validate an untrusted classifier payload against the entries that were
/// sent.
///
/// The payload is either a JSON array of results or an object holding them
/// under `elements`; any other shape is an error. Individual results with a
/// missing field, an unknown kind or a name that was not requested are
/// dropped, as are non-string targets. The listed kind of an entry wins over
/// the kind echoed by the classifier.
pub fn parse_categorizations(payload: &Value, requested: &[Entry]) -> Result<Vec<Categorization>, Error> {
    let elements = match payload {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("elements") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::Classifier(
                    "response object has no 'elements' array".to_string(),
                ))
            }
        },
        other => {
            return Err(Error::Classifier(format!(
                "expected an array of categorizations, got {}",
                json_type(other)
            )))
        }
    };

    let by_name: HashMap<&str, &Entry> = requested.iter().map(|e| (e.name.as_str(), e)).collect();
    let mut results = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        let Some(name) = element.pointer("/source/name").and_then(Value::as_str) else {
            warn!("Dropping categorization #{}: missing source name", index);
            continue;
        };
        let Some(kind) = element
            .pointer("/source/type")
            .and_then(Value::as_str)
            .and_then(EntryKind::parse)
        else {
            warn!("Dropping categorization for '{}': missing or unknown type", name);
            continue;
        };
        let Some(entry) = by_name.get(name) else {
            warn!("Dropping categorization for '{}': not a requested item", name);
            continue;
        };
        if entry.kind != kind {
            warn!(
                "Classifier reported '{}' as {}, listed as {}",
                name, kind, entry.kind
            );
        }
        let Some(raw_targets) = element.get("targets").and_then(Value::as_array) else {
            warn!("Dropping categorization for '{}': missing targets", name);
            continue;
        };

        let targets = raw_targets
            .iter()
            .filter_map(|target| match target.as_str() {
                Some(target) => Some(target.to_string()),
                None => {
                    warn!("Dropping non-string target {} for '{}'", target, name);
                    None
                }
            })
            .collect();

        results.push(Categorization {
            source: (*entry).clone(),
            targets,
        });
    }

    Ok(results)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
