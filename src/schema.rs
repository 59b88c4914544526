//! Schema declarations
//!
//! Each data source and resource declares its fields up front. The declared
//! shape is what [`crate::state::ResourceData`] accepts: assigning an
//! undeclared field, or a value of the wrong type, is a field-assignment
//! error. `null` is accepted everywhere and means "absent".

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Value type of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "elem")]
pub enum FieldType {
    String,
    Int,
    Bool,
    List(Box<FieldType>),
    Map(Box<FieldType>),
    /// Nested block, a JSON object with its own declared fields
    Block(Vec<Field>),
}

impl FieldType {
    pub fn list(elem: FieldType) -> Self {
        Self::List(Box::new(elem))
    }

    pub fn map(elem: FieldType) -> Self {
        Self::Map(Box::new(elem))
    }

    /// Repeatable nested block
    pub fn blocks(fields: Vec<Field>) -> Self {
        Self::list(Self::Block(fields))
    }

    /// Check a value against this type, describing the first mismatch
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match (self, value) {
            (_, Value::Null) => Ok(()),
            (Self::String, Value::String(_)) => Ok(()),
            (Self::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
            (Self::Bool, Value::Bool(_)) => Ok(()),
            (Self::List(elem), Value::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    elem.check(item).map_err(|e| format!("[{}]: {}", idx, e))?;
                }
                Ok(())
            }
            (Self::Map(elem), Value::Object(map)) => {
                for (key, item) in map {
                    elem.check(item).map_err(|e| format!("[{}]: {}", key, e))?;
                }
                Ok(())
            }
            (Self::Block(fields), Value::Object(map)) => check_block(fields, map),
            (expected, got) => Err(format!("expected {}, got {}", expected.name(), json_type(got))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Block(_) => "block",
        }
    }

    /// Parse a command line value (`key=value`) into this type.
    /// Lists take comma-separated scalars.
    pub fn parse_raw(&self, raw: &str) -> std::result::Result<Value, String> {
        match self {
            Self::String => Ok(Value::String(raw.to_string())),
            Self::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| format!("'{}' is not an integer", raw)),
            Self::Bool => raw
                .trim()
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| format!("'{}' is not a boolean", raw)),
            Self::List(elem) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| elem.parse_raw(s))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array),
            Self::Map(_) | Self::Block(_) => serde_json::from_str(raw)
                .map_err(|e| format!("expected JSON for {}: {}", self.name(), e))
                .and_then(|v: Value| self.check(&v).map(|_| v)),
        }
    }
}

fn check_block(fields: &[Field], map: &Map<String, Value>) -> std::result::Result<(), String> {
    for (key, item) in map {
        let Some(field) = fields.iter().find(|f| f.name == key) else {
            return Err(format!("unexpected attribute '{}'", key));
        };
        field
            .kind
            .check(item)
            .map_err(|e| format!("{}: {}", key, e))?;
    }
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// How a field is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMode {
    Required,
    Optional,
    /// Set only by the read
    Computed,
    /// May be supplied, otherwise filled in by the read
    OptionalComputed,
}

impl FieldMode {
    pub fn is_input(self) -> bool {
        !matches!(self, Self::Computed)
    }
}

/// One declared field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldType,
    pub mode: FieldMode,
    /// Changing the value requires replacing the resource
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force_new: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,
}

impl Field {
    fn with_mode(name: &'static str, kind: FieldType, mode: FieldMode) -> Self {
        Self {
            name,
            kind,
            mode,
            force_new: false,
            description: "",
        }
    }

    pub fn required(name: &'static str, kind: FieldType) -> Self {
        Self::with_mode(name, kind, FieldMode::Required)
    }

    pub fn optional(name: &'static str, kind: FieldType) -> Self {
        Self::with_mode(name, kind, FieldMode::Optional)
    }

    pub fn computed(name: &'static str, kind: FieldType) -> Self {
        Self::with_mode(name, kind, FieldMode::Computed)
    }

    pub fn optional_computed(name: &'static str, kind: FieldType) -> Self {
        Self::with_mode(name, kind, FieldMode::OptionalComputed)
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// What applying a configuration change to an existing instance means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    NoOp,
    Update(Vec<&'static str>),
    /// Some force-new fields changed; the instance must be recreated
    Replace(Vec<&'static str>),
}

/// Declared fields of a data source or resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.mode == FieldMode::Required)
    }

    /// Compare the inputs of two configurations of the same instance
    pub fn plan_change(&self, old: &Map<String, Value>, new: &Map<String, Value>) -> PlanAction {
        let changed: BTreeSet<&'static str> = self
            .fields
            .iter()
            .filter(|f| f.mode.is_input())
            .filter(|f| {
                let before = old.get(f.name).unwrap_or(&Value::Null);
                let after = new.get(f.name).unwrap_or(&Value::Null);
                // unset optional-computed inputs keep the value the read filled in
                if f.mode == FieldMode::OptionalComputed && after.is_null() {
                    return false;
                }
                before != after
            })
            .map(|f| f.name)
            .collect();

        if changed.is_empty() {
            return PlanAction::NoOp;
        }

        let replacing: Vec<&'static str> = changed
            .iter()
            .copied()
            .filter(|name| self.field(name).map(|f| f.force_new).unwrap_or(false))
            .collect();

        if replacing.is_empty() {
            PlanAction::Update(changed.into_iter().collect())
        } else {
            PlanAction::Replace(replacing)
        }
    }
}
