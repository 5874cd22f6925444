// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! JSON wire format for [`Expr`].
//!
//! Every node is an object whose `operator` field names the variant, with
//! operands under fixed field names:
//!
//! ```text
//! {"operator":"event_name","a":"signup"}
//! {"operator":"not","a":{...}}
//! {"operator":"and"|"or"|"then","a":{...},"b":{...}}
//! {"operator":"after","a":{...},"d":"36000000000"}
//! ```
//!
//! `d` is the duration's microsecond tick count as a base-10 string, so the
//! full `i64` range survives JSON readers that parse numbers as doubles.
//!
//! Decoding parses into a [`serde_json::Value`] and checks the schema by
//! hand, one node at a time. Every node must be an object; arrays and other
//! shapes are reported as [`CodecError::InvalidExpression`]. Nothing in the
//! decode path panics on untrusted input.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::error::Category;
use serde_json::{Map, Value};

use crate::expr::{Duration, Expr, Operator};

/// Error returned when encoding or decoding an expression fails.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Input is JSON but does not describe an expression: missing,
    /// non-string or unknown `operator`, missing or wrong-typed operands, or
    /// a non-numeric `d`.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// Input is not well-formed JSON, or serialization failed.
    #[error("malformed JSON: {0}")]
    Json(#[source] serde_json::Error),
}

impl CodecError {
    /// Returns true for [`CodecError::InvalidExpression`].
    #[must_use]
    pub const fn is_invalid_expression(&self) -> bool {
        matches!(self, Self::InvalidExpression(_))
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => Self::InvalidExpression(err.to_string()),
            Category::Io | Category::Syntax | Category::Eof => Self::Json(err),
        }
    }
}

fn invalid(msg: impl Into<String>) -> CodecError {
    CodecError::InvalidExpression(msg.into())
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serializes one node as `{"operator":..,"a":..,"b":..,"d":..}` in that
/// field order.
struct Wire<'a>(&'a Expr);

impl Serialize for Wire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let expr = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("operator", expr.operator().as_str())?;
        match expr {
            Expr::EventName(name) => map.serialize_entry("a", name)?,
            Expr::And(a, b) | Expr::Or(a, b) | Expr::Then(a, b) => {
                map.serialize_entry("a", &Wire(a))?;
                map.serialize_entry("b", &Wire(b))?;
            }
            Expr::Not(a) => map.serialize_entry("a", &Wire(a))?,
            Expr::After(a, d) => {
                map.serialize_entry("a", &Wire(a))?;
                map.serialize_entry("d", &d.as_micros().to_string())?;
            }
        }
        map.end()
    }
}

impl TryFrom<&Value> for Expr {
    type Error = CodecError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let Value::Object(node) = value else {
            return Err(invalid(format!("expected an object, found {}", kind(value))));
        };
        let op = match node.get("operator") {
            Some(Value::String(tag)) => Operator::from_wire(tag)
                .ok_or_else(|| invalid(format!("unknown operator {tag:?}")))?,
            Some(other) => {
                return Err(invalid(format!(
                    "operator must be a string, found {}",
                    kind(other)
                )));
            }
            None => return Err(invalid("missing field `operator`")),
        };
        Ok(match op {
            Operator::EventName => match field(node, op, "a")? {
                Value::String(name) => Self::EventName(name.clone()),
                other => {
                    return Err(invalid(format!(
                        "event_name: `a` must be a string, found {}",
                        kind(other)
                    )));
                }
            },
            Operator::And => Self::and(operand(node, op, "a")?, operand(node, op, "b")?),
            Operator::Or => Self::or(operand(node, op, "a")?, operand(node, op, "b")?),
            Operator::Not => Self::not(operand(node, op, "a")?),
            Operator::Then => Self::then(operand(node, op, "a")?, operand(node, op, "b")?),
            Operator::After => {
                let a = operand(node, op, "a")?;
                let ticks = match field(node, op, "d")? {
                    Value::String(d) => d
                        .parse::<i64>()
                        .map_err(|e| invalid(format!("invalid duration {d:?}: {e}")))?,
                    other => {
                        return Err(invalid(format!(
                            "after: `d` must be a string, found {}",
                            kind(other)
                        )));
                    }
                };
                Self::after(a, Duration(ticks))
            }
        })
    }
}

fn field<'v>(
    node: &'v Map<String, Value>,
    op: Operator,
    name: &str,
) -> Result<&'v Value, CodecError> {
    node.get(name)
        .ok_or_else(|| invalid(format!("{op}: missing field `{name}`")))
}

fn operand(node: &Map<String, Value>, op: Operator, name: &str) -> Result<Expr, CodecError> {
    Expr::try_from(field(node, op, name)?)
}

/// Encodes an expression to UTF-8 JSON bytes.
///
/// # Examples
///
/// ```
/// use triggers::expr::{codec, Expr};
///
/// let bytes = codec::encode(&Expr::not(Expr::event("churned"))).unwrap();
/// assert_eq!(
///     bytes,
///     br#"{"operator":"not","a":{"operator":"event_name","a":"churned"}}"#
/// );
/// ```
pub fn encode(expr: &Expr) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(&Wire(expr)).map_err(CodecError::Json)
}

/// Encodes an expression to a JSON string.
pub fn encode_to_string(expr: &Expr) -> Result<String, CodecError> {
    serde_json::to_string(&Wire(expr)).map_err(CodecError::Json)
}

/// Decodes an expression from JSON bytes.
///
/// # Errors
///
/// Returns [`CodecError::InvalidExpression`] if the JSON does not describe an
/// expression and [`CodecError::Json`] if it is not JSON at all.
pub fn decode(bytes: &[u8]) -> Result<Expr, CodecError> {
    let value: Value = serde_json::from_slice(bytes).inspect_err(|e| {
        log::debug!("rejecting encoded expression: {e}");
    })?;
    Expr::try_from(&value).inspect_err(|e| {
        log::debug!("rejecting encoded expression: {e}");
    })
}

/// Decodes an expression from a JSON string.
pub fn decode_str(s: &str) -> Result<Expr, CodecError> {
    decode(s.as_bytes())
}
