//! Argument Schemas
//!
//! Parameter definitions advertised to the model, and the validated
//! argument representation tools receive after the schema check.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};

/// JSON Schema type of a parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    /// No type given; any JSON value is accepted
    Any,
}

impl ParamType {
    /// Parse a JSON Schema type name (case-insensitive)
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "array" => Self::Array,
            _ => Self::Any,
        }
    }

    /// Lowercase JSON Schema name, `None` for [`ParamType::Any`]
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::String => Some("string"),
            Self::Number => Some("number"),
            Self::Integer => Some("integer"),
            Self::Boolean => Some("boolean"),
            Self::Object => Some("object"),
            Self::Array => Some("array"),
            Self::Any => None,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().unwrap_or("any"))
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type
    #[serde(rename = "type")]
    pub param_type: ParamType,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Inclusive lower bound for numeric parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// Inclusive upper bound for numeric parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

impl ParameterSchema {
    /// Optional parameter of the given type
    pub fn new(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: false,
            default: None,
            minimum: None,
            maximum: None,
            enum_values: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    /// Read one entry of a JSON Schema `properties` object
    pub fn from_property(name: &str, property: &Value, required: bool) -> Self {
        let param_type = property
            .get("type")
            .and_then(Value::as_str)
            .map_or(ParamType::Any, ParamType::parse);

        Self {
            name: name.to_string(),
            param_type,
            description: property
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            required,
            default: property.get("default").cloned(),
            minimum: property.get("minimum").and_then(Value::as_f64),
            maximum: property.get("maximum").and_then(Value::as_f64),
            enum_values: property.get("enum").and_then(Value::as_array).cloned(),
        }
    }

    /// Render as a JSON Schema property
    pub fn to_property(&self) -> Value {
        let mut property = Map::new();
        if let Some(name) = self.param_type.as_str() {
            property.insert("type".into(), Value::String(name.into()));
        }
        if !self.description.is_empty() {
            property.insert("description".into(), Value::String(self.description.clone()));
        }
        if let Some(default) = &self.default {
            property.insert("default".into(), default.clone());
        }
        if let Some(minimum) = self.minimum {
            property.insert("minimum".into(), number(minimum));
        }
        if let Some(maximum) = self.maximum {
            property.insert("maximum".into(), number(maximum));
        }
        if let Some(values) = &self.enum_values {
            property.insert("enum".into(), Value::Array(values.clone()));
        }
        Value::Object(property)
    }

    /// Check one supplied value against this parameter
    pub fn check(&self, value: &Value) -> Result<ArgValue> {
        let arg = match self.param_type {
            ParamType::String => value
                .as_str()
                .map(|s| ArgValue::String(s.to_string()))
                .ok_or_else(|| self.type_error())?,
            ParamType::Number => {
                let n = value.as_f64().ok_or_else(|| self.type_error())?;
                self.check_bounds(n)?;
                ArgValue::Number(n)
            }
            ParamType::Integer => {
                let n = as_integer(value).ok_or_else(|| self.type_error())?;
                #[allow(clippy::cast_precision_loss)]
                let bound = n as f64;
                self.check_bounds(bound)?;
                ArgValue::Integer(n)
            }
            ParamType::Boolean => value
                .as_bool()
                .map(ArgValue::Boolean)
                .ok_or_else(|| self.type_error())?,
            ParamType::Object => value
                .as_object()
                .map(|m| ArgValue::Object(m.clone()))
                .ok_or_else(|| self.type_error())?,
            ParamType::Array => value
                .as_array()
                .map(|a| ArgValue::Array(a.clone()))
                .ok_or_else(|| self.type_error())?,
            ParamType::Any => ArgValue::from_json(value),
        };

        if let Some(allowed) = &self.enum_values {
            if !allowed.contains(value) {
                return Err(AgentError::ArgumentValidation(format!(
                    "{} must be one of {}",
                    self.name,
                    Value::Array(allowed.clone())
                )));
            }
        }

        Ok(arg)
    }

    fn type_error(&self) -> AgentError {
        AgentError::ArgumentValidation(format!("{} must be a {}", self.name, self.param_type))
    }

    fn check_bounds(&self, n: f64) -> Result<()> {
        let below = self.minimum.is_some_and(|min| n < min);
        let above = self.maximum.is_some_and(|max| n > max);
        if !below && !above {
            return Ok(());
        }

        let message = match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => format!("{} must be between {} and {}", self.name, min, max),
            (Some(min), None) => format!("{} must be at least {}", self.name, min),
            (None, Some(max)) => format!("{} must be at most {}", self.name, max),
            (None, None) => unreachable!("bounds checked above"),
        };
        Err(AgentError::ArgumentValidation(message))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
        .map(|f| f as i64)
}

/// A single validated argument
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl ArgValue {
    /// Wrap an arbitrary JSON value without a schema
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::String(s.clone()),
            Value::Bool(b) => Self::Boolean(*b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Number(n.as_f64().unwrap_or_default()), Self::Integer),
            Value::Array(a) => Self::Array(a.clone()),
            Value::Object(m) => Self::Object(m.clone()),
            Value::Null => Self::Object(Map::new()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => number(*n),
            Self::Integer(n) => Value::from(*n),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Array(a) => Value::Array(a.clone()),
            Self::Object(m) => Value::Object(m.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Number(n) => as_integer(&number(*n)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Tool arguments that passed the schema check
///
/// Produced once at the invocation boundary; opaque structured data afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedArgs(BTreeMap<String, ArgValue>);

impl ValidatedArgs {
    /// Validate a raw argument object against a parameter list
    ///
    /// `null` for an optional parameter counts as absent. Fields the schema
    /// does not mention are passed through untouched.
    pub fn validate(parameters: &[ParameterSchema], arguments: &Value) -> Result<Self> {
        let empty = Map::new();
        let object = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(AgentError::ArgumentValidation(format!(
                    "arguments must be a JSON object, got {other}"
                )));
            }
        };

        let mut args = BTreeMap::new();
        for param in parameters {
            match object.get(&param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(AgentError::ArgumentValidation(format!(
                            "Missing required parameter: {}",
                            param.name
                        )));
                    }
                }
                Some(value) => {
                    args.insert(param.name.clone(), param.check(value)?);
                }
            }
        }

        for (key, value) in object {
            if !value.is_null() && !args.contains_key(key) && !parameters.iter().any(|p| &p.name == key) {
                args.insert(key.clone(), ArgValue::from_json(value));
            }
        }

        Ok(Self(args))
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ArgValue::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ArgValue::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ArgValue::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wire form sent to the tool provider
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_params() -> Vec<ParameterSchema> {
        vec![
            ParameterSchema::new("query", ParamType::String, "Search query").required(),
            ParameterSchema::new("numResults", ParamType::Number, "Result count")
                .with_range(1.0, 20.0)
                .with_default(json!(10)),
            ParameterSchema::new("author", ParamType::String, "Author filter"),
        ]
    }

    #[test]
    fn test_validate_accepts_well_formed_arguments() {
        let args = ValidatedArgs::validate(
            &search_params(),
            &json!({"query": "transformers", "numResults": 5, "author": "Vaswani"}),
        )
        .unwrap();

        assert_eq!(args.get_str("query"), Some("transformers"));
        assert_eq!(args.get_i64("numResults"), Some(5));
        assert_eq!(args.get_str("author"), Some("Vaswani"));
        assert_eq!(args.to_json(), json!({"query": "transformers", "numResults": 5, "author": "Vaswani"}));
    }

    #[test]
    fn test_validate_missing_required() {
        let err = ValidatedArgs::validate(&search_params(), &json!({"author": "Vaswani"})).unwrap_err();
        assert!(matches!(err, AgentError::ArgumentValidation(ref m) if m.contains("query")));
    }

    #[test]
    fn test_validate_wrong_type_and_bounds() {
        let err = ValidatedArgs::validate(&search_params(), &json!({"query": 42})).unwrap_err();
        assert!(err.to_string().contains("query must be a string"));

        let err = ValidatedArgs::validate(&search_params(), &json!({"query": "q", "numResults": 50})).unwrap_err();
        assert!(err.to_string().contains("numResults must be between 1 and 20"));
    }

    #[test]
    fn test_validate_null_optional_is_absent() {
        let args = ValidatedArgs::validate(&search_params(), &json!({"query": "q", "author": null})).unwrap();
        assert!(!args.contains("author"));
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let err = ValidatedArgs::validate(&search_params(), &json!("q")).unwrap_err();
        assert!(matches!(err, AgentError::ArgumentValidation(_)));
    }

    #[test]
    fn test_enum_values() {
        let mut param = ParameterSchema::new("sort", ParamType::String, "Sort order");
        param.enum_values = Some(vec![json!("date"), json!("relevance")]);

        assert!(param.check(&json!("date")).is_ok());
        assert!(param.check(&json!("citations")).is_err());
    }

    #[test]
    fn test_property_conversion() {
        let property = json!({"type": "NUMBER", "description": "Year", "minimum": 1900, "maximum": 2025});
        let param = ParameterSchema::from_property("startYear", &property, false);

        assert_eq!(param.param_type, ParamType::Number);
        assert_eq!(param.minimum, Some(1900.0));
        assert_eq!(
            param.to_property(),
            json!({"type": "number", "description": "Year", "minimum": 1900, "maximum": 2025})
        );
    }
}
