//! Entities and collections the adapter persists.
//!
//! The adapter only needs a URL, a payload and a way to hand a response body
//! back; [`Resource`] is that seam. [`Model`] and [`Collection`] are small
//! JSON-backed implementations that follow tastypie's URL conventions.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{default_set_url, SetUrlConstructor};
use crate::envelope::{self, ListMeta};
use crate::error::Result;

/// Something that can be synced with the server.
pub trait Resource {
    /// Canonical URL of the resource, if it has one.
    fn url(&self) -> Option<String>;

    /// Request body for create/update/patch.
    fn payload(&self) -> Option<Value> {
        None
    }

    /// Returns true if the resource has never been saved.
    fn is_new(&self) -> bool {
        false
    }

    /// Update local state from a response body.
    fn apply(&mut self, body: &Value) -> Result<()>;
}

/// A single tastypie resource backed by a JSON attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    url_root: String,
    id_attribute: String,
    attributes: Map<String, Value>,
}

impl Model {
    /// Create an unsaved model under `url_root` (e.g. `/api/v1/entry/`).
    pub fn new(url_root: impl Into<String>) -> Self {
        Self {
            url_root: url_root.into(),
            id_attribute: "id".to_string(),
            attributes: Map::new(),
        }
    }

    /// Create a model with initial attributes.
    pub fn with_attributes(url_root: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            ..Self::new(url_root)
        }
    }

    /// Use a different identifier attribute.
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = name.into();
        self
    }

    /// Name of the identifier attribute.
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// The list endpoint this model lives under.
    pub fn url_root(&self) -> &str {
        &self.url_root
    }

    /// The identifier, if the model has one.
    pub fn id(&self) -> Option<&Value> {
        self.attributes
            .get(&self.id_attribute)
            .filter(|v| !v.is_null())
    }

    /// Get an attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// All attributes.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Deserialize the attributes into a typed value.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.attributes.clone()))?)
    }
}

impl Resource for Model {
    /// `<url_root>/<id>/`, or the url root itself for an unsaved model.
    fn url(&self) -> Option<String> {
        let base = self.url_root.trim_end_matches('/');
        match self.id().map(id_segment) {
            Some(id) => Some(format!("{}/{}/", base, id)),
            None => Some(format!("{}/", base)),
        }
    }

    fn payload(&self) -> Option<Value> {
        Some(Value::Object(self.attributes.clone()))
    }

    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    fn apply(&mut self, body: &Value) -> Result<()> {
        match envelope::parse_single(body) {
            Value::Object(attributes) => {
                self.attributes.extend(attributes);
            }
            other => {
                debug!(body = %other, "Ignoring non-object model payload");
            }
        }
        Ok(())
    }
}

fn id_segment(id: &Value) -> String {
    match id {
        Value::String(s) => urlencoding::encode(s).into_owned(),
        other => other.to_string(),
    }
}

/// A tastypie list endpoint and the models fetched from it.
#[derive(Clone)]
pub struct Collection {
    url: String,
    id_attribute: String,
    models: Vec<Model>,
    meta: Option<Value>,
    set_url: SetUrlConstructor,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("url", &self.url)
            .field("id_attribute", &self.id_attribute)
            .field("models", &self.models)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl Collection {
    /// Create an empty collection for the list endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id_attribute: "id".to_string(),
            models: Vec::new(),
            meta: None,
            set_url: Arc::new(default_set_url),
        }
    }

    /// Use a different identifier attribute for member models.
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = name.into();
        self
    }

    /// Use a different set-URL constructor.
    pub fn with_set_url_constructor(mut self, constructor: SetUrlConstructor) -> Self {
        self.set_url = constructor;
        self
    }

    /// The models currently in the collection.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if the collection holds no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Find a model by identifier.
    pub fn get(&self, id: &Value) -> Option<&Model> {
        self.models.iter().find(|m| m.id() == Some(id))
    }

    /// Metadata from the last list response that carried any.
    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    /// The metadata as tastypie's standard list meta.
    pub fn list_meta(&self) -> Option<ListMeta> {
        self.meta
            .as_ref()
            .and_then(|m| serde_json::from_value(m.clone()).ok())
    }

    /// URL addressing only the members with the given ids,
    /// e.g. `/api/v1/entry/set/1;3/`.
    pub fn set_url<I, S>(&self, ids: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<String> = ids
            .into_iter()
            .map(|id| urlencoding::encode(id.as_ref()).into_owned())
            .collect();
        let base = if self.url.ends_with('/') {
            self.url.clone()
        } else {
            format!("{}/", self.url)
        };
        format!("{}{}", base, (self.set_url)(&ids))
    }

    /// A new unsaved model that belongs to this collection.
    pub fn new_model(&self) -> Model {
        Model::new(self.url.clone()).with_id_attribute(self.id_attribute.clone())
    }

    fn model_from(&self, entity: Value) -> Model {
        let attributes = match entity {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert(self.id_attribute.clone(), other);
                map
            }
        };
        Model::with_attributes(self.url.clone(), attributes)
            .with_id_attribute(self.id_attribute.clone())
    }
}

impl Resource for Collection {
    fn url(&self) -> Option<String> {
        Some(self.url.clone())
    }

    /// Replaces the models with the response's entities and keeps the
    /// response's `meta`, if any.
    fn apply(&mut self, body: &Value) -> Result<()> {
        let parsed = envelope::parse_many(body);
        if let Some(meta) = parsed.meta {
            self.meta = Some(meta);
        }
        self.models = parsed
            .entities
            .into_iter()
            .map(|entity| self.model_from(entity))
            .collect();
        Ok(())
    }
}
