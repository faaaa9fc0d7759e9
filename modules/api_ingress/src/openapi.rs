//! OpenAPI registry backing `/openapi.json`.
//!
//! Operations and component schemas are collected while module routes are
//! registered, then rendered once into an OpenAPI 3.1 JSON document.

use std::collections::BTreeMap;

use anyhow::Result;
use modkit::api::{OpenApiRegistry, OperationSpec, ParamLocation, SchemaCollection};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use utoipa::openapi::{schema::Schema, RefOr};

#[derive(Default)]
pub struct OpenApiDocument {
    // (path, method) keeps the rendered document stable
    operations: Mutex<BTreeMap<(String, String), OperationSpec>>,
    schemas: Mutex<BTreeMap<String, RefOr<Schema>>>,
}

impl OpenApiDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.lock().len()
    }

    fn schema_ref(&self, content_type: &str, schema_name: Option<&str>, is_array: bool) -> Value {
        let schemas = self.schemas.lock();
        let item = match schema_name {
            Some(name) if schemas.contains_key(name) => {
                json!({ "$ref": format!("#/components/schemas/{name}") })
            }
            _ if content_type.ends_with("json") => json!({ "type": "object" }),
            _ => json!({}),
        };
        if is_array {
            json!({ "type": "array", "items": item })
        } else {
            item
        }
    }

    fn content(&self, content_type: &str, schema_name: Option<&str>, is_array: bool) -> Value {
        let mut content = Map::new();
        content.insert(
            content_type.to_string(),
            json!({ "schema": self.schema_ref(content_type, schema_name, is_array) }),
        );
        Value::Object(content)
    }

    fn operation(&self, spec: &OperationSpec) -> Value {
        let mut op = Map::new();
        if let Some(id) = &spec.operation_id {
            op.insert("operationId".into(), json!(id));
        }
        if let Some(summary) = &spec.summary {
            op.insert("summary".into(), json!(summary));
        }
        if let Some(description) = &spec.description {
            op.insert("description".into(), json!(description));
        }
        if !spec.tags.is_empty() {
            op.insert("tags".into(), json!(spec.tags));
        }

        if !spec.params.is_empty() {
            let params: Vec<Value> = spec
                .params
                .iter()
                .map(|p| {
                    let mut param = Map::new();
                    param.insert("name".into(), json!(p.name));
                    param.insert("in".into(), json!(p.location.as_str()));
                    // OpenAPI requires path params to be required
                    param.insert(
                        "required".into(),
                        json!(p.location == ParamLocation::Path || p.required),
                    );
                    if let Some(d) = &p.description {
                        param.insert("description".into(), json!(d));
                    }
                    param.insert("schema".into(), json!({ "type": p.param_type }));
                    Value::Object(param)
                })
                .collect();
            op.insert("parameters".into(), Value::Array(params));
        }

        if let Some(req) = &spec.request_body {
            let mut rb = Map::new();
            if let Some(d) = &req.description {
                rb.insert("description".into(), json!(d));
            }
            rb.insert("required".into(), json!(req.required));
            rb.insert(
                "content".into(),
                self.content(req.content_type, req.schema_name.as_deref(), false),
            );
            op.insert("requestBody".into(), Value::Object(rb));
        }

        let mut responses = Map::new();
        for r in &spec.responses {
            let mut resp = Map::new();
            resp.insert("description".into(), json!(r.description));
            if let Some(ct) = r.content_type {
                resp.insert(
                    "content".into(),
                    self.content(ct, r.schema_name.as_deref(), r.is_array),
                );
            }
            responses.insert(r.status.to_string(), Value::Object(resp));
        }
        op.insert("responses".into(), Value::Object(responses));

        Value::Object(op)
    }

    /// Render the document; every operation path is mounted under `prefix`.
    pub fn to_json(&self, prefix: &str, title: &str, version: &str) -> Result<Value> {
        let operations = self.operations.lock().clone();
        tracing::info!(operations = operations.len(), "building OpenAPI document");

        let mut paths: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
        for ((path, method), spec) in &operations {
            paths
                .entry(format!("{prefix}{path}"))
                .or_default()
                .insert(method.clone(), self.operation(spec));
        }

        let mut schemas = Map::new();
        for (name, schema) in self.schemas.lock().iter() {
            schemas.insert(name.clone(), serde_json::to_value(schema)?);
        }

        Ok(json!({
            "openapi": "3.1.0",
            "info": { "title": title, "version": version },
            "paths": paths,
            "components": { "schemas": schemas },
        }))
    }
}

impl OpenApiRegistry for OpenApiDocument {
    fn register_operation(&self, spec: &OperationSpec) {
        let key = (spec.path.clone(), spec.method.as_str().to_lowercase());
        let mut ops = self.operations.lock();
        if ops.contains_key(&key) {
            // first registration wins; a second one is a programming error
            tracing::error!(
                method = %spec.method,
                path = %spec.path,
                "duplicate (method, path) registration ignored"
            );
            return;
        }
        tracing::debug!(
            method = %spec.method,
            path = %spec.path,
            operation_id = spec.operation_id.as_deref().unwrap_or("-"),
            "registered API operation"
        );
        ops.insert(key, spec.clone());
    }

    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String {
        let mut registered = self.schemas.lock();
        for (component, schema) in schemas {
            registered.entry(component).or_insert(schema);
        }
        name.to_string()
    }
}
