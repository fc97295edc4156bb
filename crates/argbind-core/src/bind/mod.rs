//! Argument binder: raw CLI tokens or JSON-RPC params in, a complete typed
//! [`ParameterMap`] (or one [`BindingError`]) out.
//!
//! Both transports share one pipeline:
//!
//! 1. An adapter collects what the caller supplied, rejecting unknown names and
//!    scalars given twice (`cli`, `rpc`)
//! 2. Required and exclusive groups from the grammar are checked
//! 3. Every supplied value is coerced; absent arguments take their default or null
//!
//! Binding is pure. It performs no I/O and holds no shared state, so it can run
//! on any number of threads at once.

mod cli;
mod rpc;

use either::Either;
use im::OrdMap;
use serde::Serialize;
use serde_json::{json, Value};

pub use self::rpc::RpcParams;
use crate::{
    coerce::{coerce_json, coerce_token, CoercionError, ConstraintValue, EqualityConstraint},
    error::BindingError,
    grammar::Grammar,
    schema::{ArgType, Argument, Command},
};

/// Raw input for one call: argv after the command path, or JSON-RPC params.
pub type RawInput<'a> = Either<&'a [String], &'a RpcParams>;

/// Bound parameters keyed by argument name. Every declared argument is present.
pub type ParameterMap = OrdMap<String, ParamValue>;

// ═══════════════════════════════════════════════════════════════════════════
// PARAMETER VALUES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
    Constraint(EqualityConstraint),
}

impl ParamValue {
    /// Value for an argument the caller left out.
    #[must_use]
    pub fn from_default(arg: &Argument) -> Self {
        match (arg.arg_type, &arg.default) {
            (ArgType::Str, Some(Value::String(s))) => Self::Str(s.clone()),
            (ArgType::Int, Some(Value::Number(n))) => n.as_i64().map_or(Self::Null, Self::Int),
            (ArgType::Bool, Some(Value::Bool(b))) => Self::Bool(*b),
            (ArgType::StrList, Some(Value::Array(items))) => Self::List(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => Self::Null,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&ParamValue> for Value {
    fn from(value: &ParamValue) -> Self {
        match value {
            ParamValue::Null => Self::Null,
            ParamValue::Bool(v) => Self::Bool(*v),
            ParamValue::Int(v) => Self::from(*v),
            ParamValue::Str(v) => Self::String(v.clone()),
            ParamValue::List(v) => Self::from(v.clone()),
            ParamValue::Constraint(c) => {
                let value = match &c.value {
                    ConstraintValue::Int(v) => Self::from(*v),
                    ConstraintValue::Str(v) => Self::String(v.clone()),
                };
                json!({"operator": c.operator.to_string(), "value": value})
            }
        }
    }
}

/// Render a parameter map as a JSON object in argument-name order.
#[must_use]
pub fn to_json(params: &ParameterMap) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value)))
            .collect(),
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// SUPPLIED VALUES
// ═══════════════════════════════════════════════════════════════════════════

/// What an adapter saw for one argument, before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Supplied {
    /// Bare `--flag`.
    Flag,
    /// CLI values in the order given; more than one only for lists.
    Tokens(Vec<String>),
    Json(Value),
}

impl Supplied {
    /// A boolean only counts towards a group when it is true.
    fn counts(&self) -> bool {
        match self {
            Self::Flag | Self::Tokens(_) => true,
            Self::Json(Value::Bool(flag)) => *flag,
            Self::Json(value) => !value.is_null(),
        }
    }
}

pub(crate) type SuppliedMap = OrdMap<String, Supplied>;

// ═══════════════════════════════════════════════════════════════════════════
// BINDING
// ═══════════════════════════════════════════════════════════════════════════

/// Bind raw input against a command and its grammar.
///
/// # Errors
///
/// Returns the first failure, in this order:
/// - `UnknownArgument` / `DuplicateArgument` while collecting input
/// - `MissingRequired` / `MutexViolation` from the grammar's groups
/// - `TypeCoercion` for the first value (in declaration order) that does not fit
pub fn bind(
    command: &Command,
    grammar: &Grammar,
    input: RawInput<'_>,
) -> Result<ParameterMap, BindingError> {
    let supplied = match input {
        Either::Left(argv) => cli::collect(command, grammar, argv)?,
        Either::Right(params) => rpc::collect(command, params)?,
    };

    check_groups(grammar, &supplied)?;

    let params = command
        .arguments()
        .map(|arg| {
            let value = match supplied.get(&arg.name) {
                Some(raw) => coerce_supplied(arg, raw)?,
                None => ParamValue::from_default(arg),
            };
            Ok((arg.name.clone(), value))
        })
        .collect::<Result<ParameterMap, BindingError>>()?;

    tracing::debug!(
        command = %command.key(),
        supplied = supplied.len(),
        "arguments bound"
    );
    Ok(params)
}

fn check_groups(grammar: &Grammar, supplied: &SuppliedMap) -> Result<(), BindingError> {
    for group in grammar.mutex_groups() {
        let present: Vec<String> = group
            .members
            .iter()
            .filter(|name| supplied.get(*name).is_some_and(Supplied::counts))
            .cloned()
            .collect();

        if let [only] = group.members.as_slice() {
            if group.required && present.is_empty() {
                return Err(BindingError::MissingRequired {
                    argument: only.clone(),
                });
            }
            continue;
        }

        let violated = if group.required {
            present.len() != 1
        } else {
            present.len() > 1
        };
        if violated {
            return Err(BindingError::MutexViolation {
                members: group.members.clone(),
                supplied: present,
                required: group.required,
            });
        }
    }
    Ok(())
}

fn coerce_supplied(arg: &Argument, raw: &Supplied) -> Result<ParamValue, BindingError> {
    let coerced = match raw {
        Supplied::Flag => Ok(ParamValue::Bool(true)),
        Supplied::Tokens(values) if arg.arg_type.is_list() => Ok(ParamValue::List(values.clone())),
        Supplied::Tokens(values) => match values.as_slice() {
            [value] => coerce_token(arg, value),
            _ => Err(CoercionError {
                expected: arg.arg_type,
                received: values.join(" "),
            }),
        },
        Supplied::Json(value) => coerce_json(arg, value),
    };
    coerced.map_err(|err| type_error(arg, err.received))
}

pub(crate) fn type_error(arg: &Argument, received: impl Into<String>) -> BindingError {
    BindingError::TypeCoercion {
        argument: arg.name.clone(),
        expected_type: arg.arg_type,
        received: received.into(),
    }
}

/// Record a value-carrying token; lists accumulate, scalars may appear once.
pub(crate) fn push_token(
    supplied: &mut SuppliedMap,
    arg: &Argument,
    value: String,
) -> Result<(), BindingError> {
    match supplied.get_mut(&arg.name) {
        Some(Supplied::Tokens(values)) if arg.arg_type.is_list() => {
            values.push(value);
            Ok(())
        }
        Some(_) => Err(BindingError::DuplicateArgument {
            argument: arg.name.clone(),
        }),
        None => {
            supplied.insert(arg.name.clone(), Supplied::Tokens(vec![value]));
            Ok(())
        }
    }
}

/// Record a value that must not already be present.
pub(crate) fn insert_once(
    supplied: &mut SuppliedMap,
    arg: &Argument,
    value: Supplied,
) -> Result<(), BindingError> {
    if supplied.contains_key(&arg.name) {
        return Err(BindingError::DuplicateArgument {
            argument: arg.name.clone(),
        });
    }
    supplied.insert(arg.name.clone(), value);
    Ok(())
}
