//! Tastypie response envelopes.
//!
//! List endpoints answer with `{"meta": {...}, "objects": [...]}`; detail
//! endpoints answer with the bare object. Some deployments wrap a single
//! object as `{"objects": {...}}`. Parsing is lenient: anything that does not
//! look like an envelope is handed back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field holding the wrapped entities.
pub const OBJECTS_FIELD: &str = "objects";
/// Field holding list metadata.
pub const META_FIELD: &str = "meta";

/// How a response body wraps its entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// No `objects` field: the body is the entity (or a bare array).
    Bare,
    /// `objects` holds a single entity.
    SingleWrapped,
    /// `objects` holds a list of entities.
    ListWrapped,
}

impl EnvelopeShape {
    /// Classify a response body.
    ///
    /// A null, `false`, zero or empty-string `objects` value counts as absent.
    pub fn classify(body: &Value) -> Self {
        match objects(body) {
            Some(Value::Array(_)) => EnvelopeShape::ListWrapped,
            Some(_) => EnvelopeShape::SingleWrapped,
            None => EnvelopeShape::Bare,
        }
    }
}

/// Entities and metadata extracted from a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedList {
    /// The entities, in response order.
    pub entities: Vec<Value>,
    /// The `meta` object, when the response carried one.
    pub meta: Option<Value>,
}

/// Tastypie's standard list metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListMeta {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub total_count: Option<u64>,
    /// URL of the next page.
    pub next: Option<String>,
    /// URL of the previous page.
    pub previous: Option<String>,
}

impl ListMeta {
    /// Returns true if there is another page after this one.
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Extract a single entity from a response body.
///
/// Returns the first element of `objects` when it is a list, `objects`
/// itself when it is not, and the body unchanged otherwise. An empty
/// `objects` list yields the body unchanged.
pub fn parse_single(body: &Value) -> Value {
    match EnvelopeShape::classify(body) {
        EnvelopeShape::ListWrapped => objects(body)
            .and_then(|list| list.get(0))
            .filter(|first| is_truthy(first))
            .unwrap_or(body)
            .clone(),
        EnvelopeShape::SingleWrapped => objects(body).unwrap_or(body).clone(),
        EnvelopeShape::Bare => body.clone(),
    }
}

/// Extract the entity list and metadata from a response body.
///
/// Entities come from `objects` when present, otherwise from the body itself:
/// a bare array yields its elements, a bare object yields one entity, and
/// null yields none.
pub fn parse_many(body: &Value) -> ParsedList {
    let meta = body.get(META_FIELD).filter(|m| is_truthy(m)).cloned();

    let entities = match (EnvelopeShape::classify(body), objects(body)) {
        (EnvelopeShape::ListWrapped, Some(Value::Array(items))) => items.clone(),
        (EnvelopeShape::SingleWrapped, Some(single)) => vec![single.clone()],
        _ => match body {
            Value::Array(items) => items.clone(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        },
    };

    ParsedList { entities, meta }
}

fn objects(body: &Value) -> Option<&Value> {
    body.get(OBJECTS_FIELD).filter(|v| is_truthy(v))
}

/// JSON values that count as "present" when probing envelope fields.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
