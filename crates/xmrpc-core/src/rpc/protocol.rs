use serde_json::Value;

use crate::error::{body_excerpt, CoreError, RpcError};

pub(super) const JSONRPC_VERSION: &str = "2.0";

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: String,
    pub(super) method: &'a str,
    // Some daemons reject an explicit `"params": null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) params: Option<&'a Value>,
}

/// Decode a response body into the `result` value or a normalized error.
///
/// `"error": null` is treated as absent. A body with neither member is
/// malformed, while `"result": null` is a legitimate answer.
pub(super) fn parse_response(body: &[u8]) -> Result<Value, CoreError> {
    let decoded: Value = serde_json::from_slice(body).map_err(|e| {
        CoreError::MalformedResponse(format!(
            "decode JSON-RPC response: {e}; body={}",
            body_excerpt(&String::from_utf8_lossy(body))
        ))
    })?;

    let mut envelope = match decoded {
        Value::Object(envelope) => envelope,
        other => {
            return Err(CoreError::MalformedResponse(format!(
                "expected a JSON object, got {other}"
            )));
        }
    };

    match envelope.remove("error") {
        Some(Value::Null) | None => {}
        Some(err) => return Err(parse_jsonrpc_error(err)),
    }

    envelope.remove("result").ok_or_else(|| {
        CoreError::MalformedResponse("response has neither `result` nor `error`".to_owned())
    })
}

/// Parse a JSON-RPC error value into a structured `CoreError`.
///
/// Errors shaped `{"code": <int>, "message": <string>, "data"?: <any>}`
/// become `Rpc`; anything else is a malformed response.
pub(super) fn parse_jsonrpc_error(err: Value) -> CoreError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
        #[serde(default)]
        data: Option<Value>,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => CoreError::Rpc(RpcError {
            code: parsed.code,
            message: parsed.message,
            data: parsed.data,
        }),
        Err(_) => CoreError::MalformedResponse(format!(
            "non-standard JSON-RPC error: {}",
            body_excerpt(&err.to_string())
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_omits_absent_params() {
        let req = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: "0".to_owned(),
            method: "get_info",
            params: None,
        };
        let encoded = serde_json::to_string(&req).expect("request serializes");
        assert_eq!(encoded, r#"{"jsonrpc":"2.0","id":"0","method":"get_info"}"#);
    }

    #[test]
    fn null_result_is_returned() {
        let value = parse_response(br#"{"id":"0","jsonrpc":"2.0","result":null}"#)
            .expect("null result is valid");
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn null_error_member_is_ignored() {
        let value = parse_response(br#"{"result":{"count":7},"error":null}"#)
            .expect("result should win over null error");
        assert_eq!(value, json!({"count": 7}));
    }

    #[test]
    fn error_carries_optional_data() {
        let err = parse_response(
            br#"{"error":{"code":-5,"message":"busy","data":{"retry":true}}}"#,
        )
        .expect_err("error envelope must fail");
        match err {
            CoreError::Rpc(rpc) => {
                assert_eq!(rpc.code, -5);
                assert_eq!(rpc.message, "busy");
                assert_eq!(rpc.data, Some(json!({"retry": true})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_standard_error_is_malformed() {
        let err = parse_response(br#"{"error":"boom"}"#).expect_err("must fail");
        assert!(matches!(err, CoreError::MalformedResponse(msg) if msg.contains("boom")));
    }

    #[test]
    fn missing_members_is_malformed() {
        let err = parse_response(br#"{"id":"0","jsonrpc":"2.0"}"#).expect_err("must fail");
        assert!(matches!(err, CoreError::MalformedResponse(_)));
    }

    #[test]
    fn large_non_json_body_is_truncated_in_error() {
        let page = format!("<html>{}</html>", "x".repeat(100_000));
        let err = parse_response(page.as_bytes()).expect_err("must fail");
        let message = err.to_string();
        assert!(message.len() < 2_000, "error message must stay bounded");
        assert!(message.contains("bytes total"));
    }

    #[test]
    fn non_object_is_malformed() {
        let err = parse_response(b"[1,2,3]").expect_err("must fail");
        assert!(matches!(err, CoreError::MalformedResponse(_)));
    }
}
