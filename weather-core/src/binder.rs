//! Argument binding
//!
//! Validates and coerces the raw, untyped arguments of a request against a
//! descriptor's parameter schema. Parameters are visited in declaration
//! order; the first failure aborts the whole binding, so a handler never
//! sees a partially bound argument set. Keys that match no parameter are
//! ignored.

use serde_json::{Map, Value};

use crate::capability::{CapabilityDescriptor, Message, ParamSpec, ParamType, ParamValue, Role};
use crate::error::BindingError;

/// Coerced arguments, in parameter declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: Vec<(String, ParamValue)>,
}

impl BoundArguments {
    /// Look up a bound value by parameter name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Bound value by declaration position
    pub fn positional(&self, index: usize) -> Option<&ParamValue> {
        self.values.get(index).map(|(_, value)| value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    pub fn get_messages(&self, name: &str) -> Option<&[Message]> {
        self.get(name).and_then(ParamValue::as_messages)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Binds raw request arguments to a descriptor's schema
pub struct ArgumentBinder;

impl ArgumentBinder {
    /// Bind all parameters of `descriptor`, all-or-nothing
    ///
    /// An explicit JSON `null` counts as an omitted argument.
    pub fn bind(
        descriptor: &CapabilityDescriptor,
        raw: &Map<String, Value>,
    ) -> Result<BoundArguments, BindingError> {
        let mut values = Vec::with_capacity(descriptor.parameters().len());

        for spec in descriptor.parameters() {
            let value = match raw.get(&spec.name).filter(|v| !v.is_null()) {
                Some(raw_value) => coerce(spec, raw_value)?,
                None => match &spec.default {
                    Some(default) => default.clone(),
                    None => {
                        return Err(BindingError::MissingRequiredArgument {
                            parameter: spec.name.clone(),
                        })
                    }
                },
            };
            values.push((spec.name.clone(), value));
        }

        Ok(BoundArguments { values })
    }
}

fn coerce(spec: &ParamSpec, raw: &Value) -> Result<ParamValue, BindingError> {
    let mismatch = || BindingError::TypeCoercion {
        parameter: spec.name.clone(),
        expected: spec.param_type,
        actual: describe(raw),
    };

    match spec.param_type {
        ParamType::String => {
            let text = match raw {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(mismatch()),
            };
            let trimmed = text.trim();
            if trimmed.is_empty() && !spec.allow_empty {
                return Err(BindingError::EmptyValue {
                    parameter: spec.name.clone(),
                });
            }
            Ok(ParamValue::String(trimmed.to_string()))
        }
        ParamType::Integer => match raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(whole_number))
                .map(ParamValue::Integer)
                .ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(ParamValue::Integer)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ParamType::Float => match raw {
            Value::Number(n) => n.as_f64().map(ParamValue::Float).ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(ParamValue::Float)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ParamType::Boolean => match raw {
            Value::Bool(b) => Ok(ParamValue::Boolean(*b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(ParamValue::Boolean(true)),
                "false" | "no" | "off" | "0" => Ok(ParamValue::Boolean(false)),
                _ => Err(mismatch()),
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Ok(ParamValue::Boolean(true)),
                Some(0) => Ok(ParamValue::Boolean(false)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        ParamType::Messages => match raw {
            Value::Array(items) => items
                .iter()
                .map(message_from_json)
                .collect::<Option<Vec<_>>>()
                .map(ParamValue::Messages)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
    }
}

/// Accept floats like `3.0` for integer parameters
fn whole_number(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// `{"role": "...", "content": "..."}` or `{"role": "...", "content": {"type": "text", "text": "..."}}`
fn message_from_json(item: &Value) -> Option<Message> {
    let role = Role::parse(item.get("role")?.as_str()?)?;
    let content = match item.get("content")? {
        Value::String(text) => text.clone(),
        block @ Value::Object(_) => block.get("text")?.as_str()?.to_string(),
        _ => return None,
    };
    Some(Message::new(role, content))
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
        other => other.to_string(),
    }
}
