//! Line-delimited JSON-RPC 2.0 over a byte stream (stdio in production).
//!
//! One request (or batch array) per line. Requests are bound and dispatched
//! concurrently on tokio tasks, at most [`MAX_IN_FLIGHT`] at a time; responses
//! are written as they complete, so callers must match them by `id`.
//!
//! A 2.0 request without an `id` is a notification and gets no reply. Requests
//! that omit `jsonrpc` altogether are still served; without an `id` they are
//! answered with `id: null`.

use std::sync::Arc;

use argbind_core::Engine;
use serde_json::{json, Value};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::{mpsc, Semaphore},
};

use crate::{dispatch::Dispatch, json::details};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INTERNAL_ERROR: i64 = -32603;

/// Request lines handled concurrently before reading pauses.
pub const MAX_IN_FLIGHT: usize = 64;

/// Serve requests from `reader` until it closes, writing responses to `writer`.
///
/// # Errors
///
/// Returns error if reading or writing the stream fails.
pub async fn serve<R, W>(
    engine: Arc<Engine>,
    dispatcher: Arc<dyn Dispatch>,
    reader: R,
    writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_with_limit(engine, dispatcher, reader, writer, MAX_IN_FLIGHT).await
}

/// [`serve`] with an explicit cap on concurrently handled lines.
///
/// # Errors
///
/// Returns error if reading or writing the stream fails.
pub async fn serve_with_limit<R, W>(
    engine: Arc<Engine>,
    dispatcher: Arc<dyn Dispatch>,
    reader: R,
    mut writer: W,
    limit: usize,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::channel::<String>(64);
    let permits = Arc::new(Semaphore::new(limit.max(1)));

    let read = async move {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            // the semaphore is never closed
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let tx = tx.clone();
            let engine = Arc::clone(&engine);
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                let response = handle_line(&engine, dispatcher.as_ref(), &line);
                drop(permit);
                if let Some(response) = response {
                    // receiver only goes away once the writer has failed
                    let _ = tx.send(response.to_string()).await;
                }
            });
        }
        Ok::<_, std::io::Error>(())
    };

    let write = async {
        while let Some(response) = rx.recv().await {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    };

    let (read, write) = tokio::join!(read, write);
    read?;
    write
}

/// Handle one request line. `None` when nothing needs an answer.
#[must_use]
pub fn handle_line(engine: &Engine, dispatcher: &dyn Dispatch, line: &str) -> Option<Value> {
    let request: Value = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "unparsable rpc request");
            return Some(error_response(
                &Value::Null,
                PARSE_ERROR,
                &format!("Parse error: {e}"),
                None,
            ));
        }
    };
    match &request {
        Value::Array(batch) => handle_batch(engine, dispatcher, batch),
        _ => handle_request(engine, dispatcher, &request),
    }
}

/// Handle a batch. The reply holds one entry per request that needs an
/// answer, or is `None` when the batch held only notifications.
#[must_use]
pub fn handle_batch(engine: &Engine, dispatcher: &dyn Dispatch, batch: &[Value]) -> Option<Value> {
    if batch.is_empty() {
        return Some(error_response(
            &Value::Null,
            INVALID_REQUEST,
            "Invalid Request: empty batch",
            None,
        ));
    }
    tracing::debug!(requests = batch.len(), "rpc batch");
    let responses: Vec<Value> = batch
        .iter()
        .filter_map(|request| handle_request(engine, dispatcher, request))
        .collect();
    (!responses.is_empty()).then_some(Value::Array(responses))
}

/// Handle one parsed request. `None` for notifications.
#[must_use]
pub fn handle_request(engine: &Engine, dispatcher: &dyn Dispatch, request: &Value) -> Option<Value> {
    let id = request.get("id").cloned();
    let reply_id = id.clone().unwrap_or(Value::Null);

    let (method, notification) = match validate(request) {
        Ok(valid) => valid,
        Err((code, message)) => {
            return Some(error_response(&reply_id, code, &message, None));
        }
    };

    tracing::info!(method, id = ?id, "rpc request");

    let params = request.get("params").cloned().unwrap_or(Value::Null);
    let outcome = engine
        .bind_rpc(method, &params)
        .map_err(|err| {
            let data = details(&err).unwrap_or_else(|| json!({"code": err.code().as_str()}));
            (err.rpc_code(), err.to_string(), Some(data))
        })
        .and_then(|call| {
            dispatcher
                .dispatch(&call)
                .map_err(|err| (INTERNAL_ERROR, format!("{err:#}"), None))
        });

    let response = match outcome {
        Ok(result) => json!({"jsonrpc": "2.0", "id": reply_id, "result": result}),
        Err((code, message, data)) => {
            tracing::debug!(method, code, %message, "rpc request failed");
            error_response(&reply_id, code, &message, data)
        }
    };

    (!notification).then_some(response)
}

/// The method name, and whether the request is a 2.0 notification.
fn validate(request: &Value) -> Result<(&str, bool), (i64, String)> {
    let invalid = |message: &str| (INVALID_REQUEST, format!("Invalid Request: {message}"));

    let Some(object) = request.as_object() else {
        return Err(invalid("expected a JSON object"));
    };
    let versioned = match object.get("jsonrpc") {
        None => false,
        Some(Value::String(version)) if version == "2.0" => true,
        Some(_) => return Err(invalid("jsonrpc must be \"2.0\"")),
    };
    if let Some(id) = object.get("id") {
        if !(id.is_string() || id.is_number() || id.is_null()) {
            return Err(invalid("id must be a string, number or null"));
        }
    }
    let method = object
        .get("method")
        .filter(|method| !method.is_null())
        .ok_or_else(|| {
            (
                METHOD_NOT_FOUND,
                "Missing 'method' value in request.".to_string(),
            )
        })?
        .as_str()
        .ok_or_else(|| invalid("method must be a string"))?;
    Ok((method, versioned && !object.contains_key("id")))
}

fn error_response(id: &Value, code: i64, message: &str, data: Option<Value>) -> Value {
    let mut error = json!({"code": code, "message": message});
    if let Some(data) = data {
        error["data"] = data;
    }
    json!({"jsonrpc": "2.0", "id": id, "error": error})
}
