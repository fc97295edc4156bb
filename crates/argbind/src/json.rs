//! JSON output envelopes.

use argbind_core::{BindingError, Error};
use serde::Serialize;
use serde_json::{json, Value};

/// Successful command output.
#[derive(Debug, Serialize)]
pub struct SuccessOutput {
    pub success: bool,
    pub result: Value,
}

/// Failed command output.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorDetail {
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        Self {
            code: err.code().as_str().to_string(),
            message: err.to_string(),
            details: details(err),
            suggestion: err.suggestion().map(str::to_string),
        }
    }
}

/// Structured payload for binding failures: the class code plus the
/// arguments involved.
#[must_use]
pub fn details(err: &Error) -> Option<Value> {
    let Error::Binding(binding) = err else {
        return None;
    };
    let mut payload = json!({
        "code": binding.code().as_str(),
        "arguments": binding.arguments(),
    });
    if let BindingError::MutexViolation {
        supplied, required, ..
    } = binding
    {
        payload["supplied"] = json!(supplied);
        payload["required"] = json!(required);
    }
    Some(payload)
}

/// Serialize for stdout, indented when `pretty`.
#[must_use]
pub fn render<T: Serialize>(value: &T, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_else(|e| {
        json!({"success": false, "error": {"code": "IO_ERROR", "message": e.to_string()}})
            .to_string()
    })
}

#[must_use]
pub fn success(result: Value, pretty: bool) -> String {
    render(
        &SuccessOutput {
            success: true,
            result,
        },
        pretty,
    )
}

#[must_use]
pub fn error(err: &Error, pretty: bool) -> String {
    render(
        &ErrorOutput {
            success: false,
            error: ErrorDetail::from_error(err),
        },
        pretty,
    )
}
