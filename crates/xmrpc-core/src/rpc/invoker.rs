use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::CoreError;

use super::protocol::{parse_response, JsonRpcRequest, JSONRPC_VERSION};
use super::Transport;

/// Generic JSON-RPC 2.0 caller.
///
/// Builds a fresh envelope for every call, hands it to the transport and
/// normalizes the answer. Holds no session state apart from the id counter,
/// so one invoker can be shared between tasks.
pub struct RpcInvoker<T> {
    transport: T,
    next_id: AtomicU64,
}

impl<T: Transport> RpcInvoker<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Invoke `method` with optional `params` and return the raw `result`.
    ///
    /// `params` may be any JSON value (scalar, object or array); it is left
    /// out of the envelope entirely when `None`.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CoreError> {
        if method.trim().is_empty() {
            return Err(CoreError::InvalidRequest(
                "method name must not be empty".to_owned(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.has_params = params.is_some(),
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: id.to_string(),
            method,
            params: params.as_ref(),
        };
        let body = serde_json::to_vec(&req)
            .map_err(|e| CoreError::InvalidRequest(format!("encode JSON-RPC request: {e}")))?;

        let response = self.transport.send(body).await?;
        debug!(
            rpc.id = id,
            rpc.method = method,
            status = %response.status,
            body_len = response.body.len(),
            "rpc response"
        );
        trace!(
            rpc.id = id,
            rpc.method = method,
            body = %String::from_utf8_lossy(&response.body),
            "rpc response body"
        );

        parse_response(&response.body)
    }

    /// Like [`call`](Self::call), then deserialize the result into `R`.
    pub async fn call_as<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<R, CoreError> {
        let raw = self.call(method, params).await?;
        serde_json::from_value(raw).map_err(|e| {
            CoreError::MalformedResponse(format!("unexpected `{method}` result shape: {e}"))
        })
    }
}
