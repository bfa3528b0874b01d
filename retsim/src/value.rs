use std::collections::HashMap;

/// A named configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Number(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match *self {
            Value::Text(ref s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON scalar; arrays, objects and null have no counterpart.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::Text(s.to_string())),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }
}

pub type ValueMap = HashMap<String, Value>;

/// Collects the scalar members of a JSON object into a [ValueMap].
pub fn values_from_json(json: &serde_json::Value) -> ValueMap {
    let mut map = ValueMap::new();
    if let Some(object) = json.as_object() {
        for (key, value) in object.iter() {
            if let Some(value) = Value::from_json(value) {
                map.insert(key.to_string(), value);
            }
        }
    }
    map
}

/// A recognized numeric parameter with its default and safe bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub help: &'static str,
}

impl ParamSpec {
    pub const fn new(
        key: &'static str,
        default: f64,
        min: f64,
        max: f64,
        help: &'static str,
    ) -> Self {
        ParamSpec {
            key,
            default,
            min,
            max,
            help,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else {
            value.max(self.min).min(self.max)
        }
    }

    /// Reads the parameter from `values`, falling back to the default and clamping into bounds.
    ///
    /// Booleans read as 0 or 1; text that parses as a number is accepted.
    pub fn resolve(&self, values: &ValueMap) -> f64 {
        let raw = match values.get(self.key) {
            Some(Value::Number(n)) => *n,
            Some(Value::Bool(b)) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Some(Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(n) => n,
                Err(_) => {
                    log::debug!("[values] ignoring non-numeric {}={:?}", self.key, s);
                    self.default
                }
            },
            None => self.default,
        };
        let value = self.clamp(raw);
        if value != raw {
            log::debug!("[values] clamped {} from {} to {}", self.key, raw, value);
        }
        value
    }

    pub fn resolve_f32(&self, values: &ValueMap) -> f32 {
        self.resolve(values) as f32
    }

    pub fn resolve_u64(&self, values: &ValueMap) -> u64 {
        self.resolve(values).round().max(0.0) as u64
    }

    pub fn resolve_usize(&self, values: &ValueMap) -> usize {
        self.resolve(values).round().max(0.0) as usize
    }
}
