//! The two merge disciplines.
//!
//! Additive merges update-or-append by natural key and never delete;
//! full-replace merges delete every prior document of an owned kind
//! before inserting the fresh generation. Both are deterministic, which
//! is why no merge-conflict error exists.

use indexmap::IndexMap;
use krmgen_core::{CoreError, Document, DocumentKey, Outcome, Result};
use serde_json::Value;
use std::hash::Hash;
use tracing::debug;

/// Order-preserving keyed overlay: the additive discipline.
///
/// Existing entries are re-emitted in their original order. A candidate
/// whose key matches an existing entry replaces it in place (`Updated`,
/// or `Unchanged` when equal); unmatched candidates append at the end
/// (`Created`). Existing entries without a matching candidate key always
/// survive untouched — including entries that carry no key at all.
pub fn merge_keyed<T, K, F>(
    existing: Vec<T>,
    candidates: Vec<T>,
    key_of: F,
) -> Result<(Vec<T>, Vec<(K, Outcome)>)>
where
    T: PartialEq,
    K: Eq + Hash + Clone,
    F: Fn(&T) -> Option<K>,
{
    let mut merged = existing;
    let mut index: IndexMap<K, usize> = IndexMap::new();
    for (position, entry) in merged.iter().enumerate() {
        if let Some(key) = key_of(entry) {
            index.insert(key, position);
        }
    }

    let mut outcomes = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let key = key_of(&candidate).ok_or_else(|| {
            CoreError::configuration("derived entry is missing its identity key")
        })?;
        match index.get(&key) {
            Some(&position) => {
                if merged[position] == candidate {
                    outcomes.push((key, Outcome::Unchanged));
                } else {
                    merged[position] = candidate;
                    outcomes.push((key, Outcome::Updated));
                }
            }
            None => {
                index.insert(key.clone(), merged.len());
                merged.push(candidate);
                outcomes.push((key, Outcome::Created));
            }
        }
    }

    Ok((merged, outcomes))
}

/// The natural key of one route entry: its exact rendered match string,
/// case-sensitive. Never the list position.
pub fn route_key(entry: &Value) -> Option<String> {
    entry.get("match").and_then(Value::as_str).map(str::to_owned)
}

/// Additively merge derived route entries into one routing resource's
/// `spec.routes` list.
pub fn inject_route_entries(
    doc: &mut Document,
    candidates: &[crate::routing::RouteEntry],
) -> Result<Vec<(String, Outcome)>> {
    let meta = (doc.kind.clone(), doc.metadata.name.clone());
    let malformed =
        |reason: &str| CoreError::malformed_document(&meta.0, &meta.1, reason);

    let spec = doc
        .body
        .entry("spec".to_string())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    let spec = spec
        .as_object_mut()
        .ok_or_else(|| malformed("spec is not a mapping"))?;

    let existing: Vec<Value> = match spec.get("routes") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(routes)) => routes.clone(),
        Some(_) => return Err(malformed("spec.routes is not a list")),
    };

    let candidate_values: Vec<Value> = candidates
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<_, _>>()?;

    let (merged, outcomes) = merge_keyed(existing, candidate_values, route_key)?;
    debug!(target = %format!("{}/{}", meta.0, meta.1), merged = merged.len(), "merged route entries");
    spec.insert("routes".to_string(), Value::Array(merged));
    Ok(outcomes)
}

/// The full-replace discipline for documents the engine exclusively owns:
/// every existing document of an owned kind is removed first, then the
/// fresh candidates are inserted in evaluation order. Outcomes are
/// computed against the removed prior generation by (kind, name).
pub fn full_replace(
    docs: Vec<Document>,
    owned_kinds: &[String],
    candidates: Vec<Document>,
) -> (Vec<Document>, Vec<(DocumentKey, Outcome)>) {
    let mut kept = Vec::with_capacity(docs.len());
    let mut prior: IndexMap<DocumentKey, Document> = IndexMap::new();
    for doc in docs {
        if owned_kinds.contains(&doc.kind) {
            prior.insert(doc.key(), doc);
        } else {
            kept.push(doc);
        }
    }

    let mut outcomes = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        let key = candidate.key();
        let outcome = match prior.get(&key) {
            Some(previous) if previous == candidate => Outcome::Unchanged,
            Some(_) => Outcome::Updated,
            None => Outcome::Created,
        };
        outcomes.push((key, outcome));
    }

    kept.extend(candidates);
    (kept, outcomes)
}
