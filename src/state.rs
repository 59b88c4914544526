//! Resource state
//!
//! [`ResourceData`] is the record a data source reads its inputs from and
//! writes its results to. Every assignment is checked against the schema.

use crate::error::{MultiError, Result, WafError};
use crate::schema::{FieldMode, Schema};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attributes and identity of one data source or resource instance
#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Schema,
    id: Option<String>,
    attributes: BTreeMap<String, Value>,
}

impl ResourceData {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Build from typed input values. All problems are reported together.
    pub fn with_inputs<I>(schema: Schema, inputs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut data = Self::new(schema);
        let mut errs = MultiError::new();

        for (name, value) in inputs {
            errs.push(data.set_input(&name, value));
        }
        errs.push(data.check_required());
        errs.into_result()?;

        Ok(data)
    }

    /// Build from `key=value` strings, parsing each value by its declared type
    pub fn from_raw_inputs(schema: Schema, pairs: &[(String, String)]) -> Result<Self> {
        let mut errs = MultiError::new();
        let mut inputs = Vec::new();

        for (name, raw) in pairs {
            match schema.field(name) {
                Some(field) => match field.kind.parse_raw(raw) {
                    Ok(value) => inputs.push((name.clone(), value)),
                    Err(reason) => errs.push(Err(WafError::field(name, reason))),
                },
                None => errs.push(Err(WafError::field(name, "not declared in the schema"))),
            }
        }
        errs.into_result()?;

        Self::with_inputs(schema, inputs)
    }

    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match self.schema.field(name) {
            Some(field) if !field.mode.is_input() => {
                Err(WafError::field(name, "computed attribute cannot be set"))
            }
            _ => self.set(name, value),
        }
    }

    /// Fail for every required input that is absent or empty
    pub fn check_required(&self) -> Result<()> {
        let mut errs = MultiError::new();
        for field in self.schema.required_fields() {
            let present = match self.attributes.get(field.name) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            };
            if !present {
                errs.push(Err(WafError::field(field.name, "required attribute is missing")));
            }
        }
        errs.into_result()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
    }

    /// Forget the identity, e.g. after the remote object disappeared
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    /// Non-empty string attribute
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_i64())
    }

    /// Assign an attribute after checking it against the declared type
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let Some(field) = self.schema.field(name) else {
            return Err(WafError::field(name, "not declared in the schema"));
        };
        field
            .kind
            .check(&value)
            .map_err(|reason| WafError::field(name, reason))?;

        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Input attributes only, as used when planning a change
    pub fn inputs(&self) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter(|(name, _)| {
                self.schema
                    .field(name)
                    .map(|f| f.mode != FieldMode::Computed)
                    .unwrap_or(false)
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// `{ "id": ..., <attributes> }`
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "id".to_string(),
            self.id.clone().map(Value::String).unwrap_or(Value::Null),
        );
        for (k, v) in &self.attributes {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

/// Source of identifiers for data sources not backed by a single object
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Random UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String> {
        Ok(uuid::Uuid::new_v4().to_string())
    }
}

/// Assign a fresh synthetic id
pub fn set_synthetic_id(data: &mut ResourceData, ids: &dyn IdGenerator) -> Result<()> {
    let id = ids.generate().map_err(|e| match e {
        err @ WafError::IdGeneration(_) => err,
        other => WafError::IdGeneration(other.to_string()),
    })?;
    data.set_id(id);
    Ok(())
}
