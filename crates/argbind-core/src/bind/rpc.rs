//! RPC adapter: JSON-RPC `params` keyed by argument name.

use serde_json::{Map, Value};

use super::{insert_once, Supplied, SuppliedMap};
use crate::{error::BindingError, schema::Command};

/// Normalized JSON-RPC params.
///
/// Accepted shapes: `{...}`, `[]`, `[{...}]` and `[[positional...], {...}]`.
/// Positional values map onto the command's arguments in declaration order.
/// A `null` value counts as not supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcParams {
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl RpcParams {
    /// # Errors
    ///
    /// Returns a description of the problem if `params` has none of the
    /// accepted shapes.
    pub fn from_value(params: &Value) -> Result<Self, String> {
        match params {
            Value::Null => Ok(Self::default()),
            Value::Object(kwargs) => Ok(Self::from(kwargs.clone())),
            Value::Array(items) => match items.as_slice() {
                [] => Ok(Self::default()),
                [Value::Object(kwargs)] => Ok(Self::from(kwargs.clone())),
                [Value::Array(args)] => Ok(Self {
                    args: args.clone(),
                    kwargs: Map::new(),
                }),
                [Value::Array(args), Value::Object(kwargs)] => Ok(Self {
                    args: args.clone(),
                    kwargs: kwargs.clone(),
                }),
                _ => Err(
                    "params must be an object, [{...}] or [[positional...], {...}]".to_string(),
                ),
            },
            other => Err(format!("params must be an object or array, got {other}")),
        }
    }
}

impl From<Map<String, Value>> for RpcParams {
    fn from(kwargs: Map<String, Value>) -> Self {
        Self {
            args: Vec::new(),
            kwargs,
        }
    }
}

pub(super) fn collect(command: &Command, params: &RpcParams) -> Result<SuppliedMap, BindingError> {
    let declared: Vec<_> = command.arguments().collect();

    let mut unknown: Vec<String> = params
        .kwargs
        .keys()
        .filter(|key| command.argument(key).is_none())
        .cloned()
        .collect();
    unknown.extend((declared.len()..params.args.len()).map(|index| format!("[{index}]")));
    if !unknown.is_empty() {
        unknown.sort();
        return Err(BindingError::UnknownArgument { names: unknown });
    }

    let mut supplied = SuppliedMap::new();
    for (arg, value) in declared.iter().zip(&params.args) {
        if !value.is_null() {
            insert_once(&mut supplied, arg, Supplied::Json(value.clone()))?;
        }
    }
    for (key, value) in &params.kwargs {
        if value.is_null() {
            continue;
        }
        if let Some(arg) = command.argument(key) {
            insert_once(&mut supplied, arg, Supplied::Json(value.clone()))?;
        }
    }
    Ok(supplied)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_params_shapes() {
        let kwargs = json!({"a": 1});
        assert_eq!(RpcParams::from_value(&json!(null)).unwrap(), RpcParams::default());
        assert_eq!(RpcParams::from_value(&json!([])).unwrap(), RpcParams::default());
        assert_eq!(
            RpcParams::from_value(&kwargs).unwrap().kwargs.get("a"),
            Some(&json!(1))
        );
        assert_eq!(
            RpcParams::from_value(&json!([{"a": 1}])).unwrap(),
            RpcParams::from_value(&kwargs).unwrap()
        );
        let both = RpcParams::from_value(&json!([["x"], {"a": 1}])).unwrap();
        assert_eq!(both.args, vec![json!("x")]);
        assert_eq!(both.kwargs.len(), 1);
    }

    #[test]
    fn test_bad_params_shapes() {
        assert!(RpcParams::from_value(&json!("x")).is_err());
        assert!(RpcParams::from_value(&json!([1, 2])).is_err());
        assert!(RpcParams::from_value(&json!([{}, {}])).is_err());
    }
}
