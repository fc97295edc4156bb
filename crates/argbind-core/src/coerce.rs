//! Type coercion: raw CLI tokens and JSON values into typed parameter values.
//!
//! Fields whose description says "supports equality constraints" accept an
//! operator prefix:
//!
//! | input     | operator | value  |
//! |-----------|----------|--------|
//! | `>400000` | gt       | 400000 |
//! | `<=5`     | lte      | 5      |
//! | `!=3`     | ne       | 3      |
//! | `10`      | eq       | 10     |
//!
//! A prefix followed by another operator character (`=>1`, `>>1`) or by nothing
//! is rejected rather than read as `eq`.

use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{bind::ParamValue, schema::ArgType, schema::Argument};

/// Two-character operators first so `>=` is never read as `>` followed by `=`.
const OPERATORS: [(&str, Operator); 6] = [
    (">=", Operator::Gte),
    ("<=", Operator::Lte),
    ("!=", Operator::Ne),
    (">", Operator::Gt),
    ("<", Operator::Lt),
    ("=", Operator::Eq),
];

const OPERATOR_CHARS: [char; 4] = ['<', '>', '=', '!'];

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    /// Comparison symbol accepted on input.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConstraintValue {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EqualityConstraint {
    pub operator: Operator,
    pub value: ConstraintValue,
}

impl EqualityConstraint {
    #[must_use]
    pub const fn new(operator: Operator, value: ConstraintValue) -> Self {
        Self { operator, value }
    }
}

/// A value did not fit its declared type. The binder attaches the argument name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, received '{received}'")]
pub struct CoercionError {
    pub expected: ArgType,
    pub received: String,
}

impl CoercionError {
    fn new(expected: ArgType, received: impl Into<String>) -> Self {
        Self {
            expected,
            received: received.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SCALARS
// ═══════════════════════════════════════════════════════════════════════════

/// Base-10 integer with an optional leading `-`, nothing else.
///
/// # Errors
///
/// Returns error on any other character, an empty string, or overflow.
pub fn parse_int(raw: &str) -> Result<i64, CoercionError> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoercionError::new(ArgType::Int, raw));
    }
    raw.parse::<i64>()
        .map_err(|_| CoercionError::new(ArgType::Int, raw))
}

/// Split an operator prefix off `raw` and coerce the remainder to `base`.
///
/// # Errors
///
/// Returns error if the remainder is empty, starts with another operator
/// character, or does not coerce to `base`.
pub fn parse_constraint(raw: &str, base: ArgType) -> Result<EqualityConstraint, CoercionError> {
    let (operator, rest) = OPERATORS
        .iter()
        .find_map(|(symbol, op)| raw.strip_prefix(*symbol).map(|rest| (*op, rest)))
        .unwrap_or((Operator::Eq, raw));

    if rest.is_empty() || rest.starts_with(OPERATOR_CHARS) {
        return Err(CoercionError::new(base, raw));
    }

    let value = match base {
        ArgType::Int => ConstraintValue::Int(parse_int(rest).map_err(|_| CoercionError::new(base, raw))?),
        ArgType::Str => ConstraintValue::Str(rest.to_string()),
        ArgType::Bool | ArgType::StrList => return Err(CoercionError::new(base, raw)),
    };
    Ok(EqualityConstraint::new(operator, value))
}

// ═══════════════════════════════════════════════════════════════════════════
// CLI TOKENS
// ═══════════════════════════════════════════════════════════════════════════

/// Coerce one CLI token for a scalar argument (`str` or `int`).
///
/// # Errors
///
/// Returns error if the token does not fit the argument's type.
pub fn coerce_token(arg: &Argument, raw: &str) -> Result<ParamValue, CoercionError> {
    if arg.supports_equality_constraints() {
        return parse_constraint(raw, arg.arg_type).map(ParamValue::Constraint);
    }
    match arg.arg_type {
        ArgType::Str => Ok(ParamValue::Str(raw.to_string())),
        ArgType::Int => parse_int(raw).map(ParamValue::Int),
        ArgType::StrList => Ok(ParamValue::List(vec![raw.to_string()])),
        ArgType::Bool => Err(CoercionError::new(ArgType::Bool, raw)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// JSON VALUES
// ═══════════════════════════════════════════════════════════════════════════

/// Coerce a JSON-RPC value to the argument's type.
///
/// # Errors
///
/// Returns error if the value's JSON type does not fit.
pub fn coerce_json(arg: &Argument, value: &Value) -> Result<ParamValue, CoercionError> {
    let mismatch = || CoercionError::new(arg.arg_type, describe(value));

    match (arg.arg_type, value) {
        (ArgType::Bool, Value::Bool(flag)) => Ok(ParamValue::Bool(*flag)),
        (ArgType::Int, Value::Number(number)) => {
            let int = number.as_i64().ok_or_else(mismatch)?;
            Ok(if arg.supports_equality_constraints() {
                ParamValue::Constraint(EqualityConstraint::new(Operator::Eq, ConstraintValue::Int(int)))
            } else {
                ParamValue::Int(int)
            })
        }
        (ArgType::Int | ArgType::Str, Value::String(raw)) => {
            coerce_token(arg, raw).map_err(|_| mismatch())
        }
        (ArgType::StrList, Value::String(raw)) => Ok(ParamValue::List(vec![raw.clone()])),
        (ArgType::StrList, Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::List),
        _ => Err(mismatch()),
    }
}

/// Compact rendering of a received value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
