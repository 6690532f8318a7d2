//! Named entry points for the daemon's JSON-RPC methods.
//!
//! Each [`DaemonMethod`] is just a method name plus a parameter shape; the
//! [`DaemonClient`] methods forward them to [`RpcInvoker::call`] and return
//! the result untouched.

use serde_json::{json, Value};

use crate::error::CoreError;
use crate::rpc::{ClientConfig, HttpTransport, RpcInvoker, Transport};

// ==============================================================================
// Method Table
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonMethod {
    BlockCount,
    Info,
    HardForkInfo,
    LastBlockHeader,
    BlockHeaderByHash(String),
    BlockHeaderByHeight(u64),
    BlockByHash(String),
    BlockByHeight(u64),
    BlockHash(u64),
    Bans,
    Connections,
    FeeEstimate,
    SyncInfo,
}

impl DaemonMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BlockCount => "getblockcount",
            Self::Info => "get_info",
            Self::HardForkInfo => "hard_fork_info",
            Self::LastBlockHeader => "getlastblockheader",
            Self::BlockHeaderByHash(_) => "getblockheaderbyhash",
            Self::BlockHeaderByHeight(_) => "getblockheaderbyheight",
            Self::BlockByHash(_) | Self::BlockByHeight(_) => "getblock",
            Self::BlockHash(_) => "on_getblockhash",
            Self::Bans => "get_bans",
            Self::Connections => "get_connections",
            Self::FeeEstimate => "get_fee_estimate",
            Self::SyncInfo => "sync_info",
        }
    }

    /// Parameters sent with the method. `getblock` takes the height as a
    /// decimal string, `getblockheaderbyheight` wants `{"height": N}` and
    /// `on_getblockhash` a one-element array.
    pub fn params(&self) -> Option<Value> {
        match self {
            Self::BlockHeaderByHash(hash) | Self::BlockByHash(hash) => {
                Some(Value::String(hash.clone()))
            }
            Self::BlockHeaderByHeight(height) => Some(json!({ "height": height })),
            Self::BlockByHeight(height) => Some(Value::String(height.to_string())),
            Self::BlockHash(height) => Some(Value::Array(vec![Value::from(*height)])),
            Self::BlockCount
            | Self::Info
            | Self::HardForkInfo
            | Self::LastBlockHeader
            | Self::Bans
            | Self::Connections
            | Self::FeeEstimate
            | Self::SyncInfo => None,
        }
    }
}

// ==============================================================================
// Client
// ==============================================================================

/// Monero daemon client: the generic invoker plus one convenience method
/// per [`DaemonMethod`].
pub struct DaemonClient<T = HttpTransport> {
    invoker: RpcInvoker<T>,
}

impl DaemonClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport> DaemonClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            invoker: RpcInvoker::new(transport),
        }
    }

    pub fn invoker(&self) -> &RpcInvoker<T> {
        &self.invoker
    }

    /// Call any method by name.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CoreError> {
        self.invoker.call(method, params).await
    }

    pub async fn invoke(&self, method: &DaemonMethod) -> Result<Value, CoreError> {
        self.invoker.call(method.name(), method.params()).await
    }

    /// Number of blocks in the longest chain known to the node.
    pub async fn get_block_count(&self) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::BlockCount).await
    }

    /// General node and network state.
    pub async fn get_info(&self) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::Info).await
    }

    /// Hard fork voting and readiness.
    pub async fn hard_fork_info(&self) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::HardForkInfo).await
    }

    pub async fn get_last_block_header(&self) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::LastBlockHeader).await
    }

    pub async fn get_block_header_by_hash(&self, hash: &str) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::BlockHeaderByHash(hash.to_owned()))
            .await
    }

    pub async fn get_block_header_by_height(&self, height: u64) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::BlockHeaderByHeight(height)).await
    }

    pub async fn get_block_by_hash(&self, hash: &str) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::BlockByHash(hash.to_owned())).await
    }

    pub async fn get_block_by_height(&self, height: u64) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::BlockByHeight(height)).await
    }

    pub async fn get_block_hash(&self, height: u64) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::BlockHash(height)).await
    }

    /// Banned peers.
    pub async fn get_bans(&self) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::Bans).await
    }

    pub async fn get_connections(&self) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::Connections).await
    }

    pub async fn get_fee_estimate(&self) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::FeeEstimate).await
    }

    pub async fn sync_info(&self) -> Result<Value, CoreError> {
        self.invoke(&DaemonMethod::SyncInfo).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rpc::mock::MockTransport;

    fn client() -> DaemonClient<MockTransport> {
        DaemonClient::with_transport(
            MockTransport::builder()
                .with_body(r#"{"result":{"status":"OK"}}"#)
                .build(),
        )
    }

    fn last_request(client: &DaemonClient<MockTransport>) -> Value {
        client
            .invoker()
            .transport()
            .sent_json()
            .pop()
            .expect("a request was sent")
    }

    #[tokio::test]
    async fn height_is_sent_as_string() {
        let client = client();
        client.get_block_by_height(1).await.expect("call succeeds");

        let req = last_request(&client);
        assert_eq!(req["method"], "getblock");
        assert_eq!(req["params"], json!("1"));
    }

    #[tokio::test]
    async fn header_by_height_sends_height_object() {
        let client = client();
        client
            .get_block_header_by_height(912_345)
            .await
            .expect("call succeeds");

        let req = last_request(&client);
        assert_eq!(req["method"], "getblockheaderbyheight");
        assert_eq!(req["params"], json!({"height": 912_345}));
    }

    #[tokio::test]
    async fn header_by_hash_uses_hash_method() {
        let client = client();
        let hash = "e22cf75f39ae720e8b71b3d120a5ac03f0db50bba6379e2850975b4859190bc6";
        client
            .get_block_header_by_hash(hash)
            .await
            .expect("call succeeds");

        let req = last_request(&client);
        assert_eq!(req["method"], "getblockheaderbyhash");
        assert_eq!(req["params"], json!(hash));
    }

    #[tokio::test]
    async fn parameterless_methods_omit_params() {
        let client = client();
        let cases = [
            (DaemonMethod::BlockCount, "getblockcount"),
            (DaemonMethod::Info, "get_info"),
            (DaemonMethod::HardForkInfo, "hard_fork_info"),
            (DaemonMethod::LastBlockHeader, "getlastblockheader"),
            (DaemonMethod::Bans, "get_bans"),
        ];
        for (method, name) in cases {
            client.invoke(&method).await.expect("call succeeds");
            let req = last_request(&client);
            assert_eq!(req["method"], name);
            assert!(req.get("params").is_none(), "{name} must not send params");
        }
    }

    #[tokio::test]
    async fn block_hash_takes_height_array() {
        let client = client();
        client.get_block_hash(912_345).await.expect("call succeeds");

        let req = last_request(&client);
        assert_eq!(req["method"], "on_getblockhash");
        assert_eq!(req["params"], json!([912_345]));
    }

    #[tokio::test]
    async fn result_is_not_reshaped() {
        let client = client();
        let info = client.get_info().await.expect("call succeeds");
        assert_eq!(info, json!({"status": "OK"}));
    }
}
