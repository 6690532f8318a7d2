//! Monero daemon JSON-RPC abstraction layer.
//!
//! Defines the [`Transport`] trait, the generic [`RpcInvoker`] that speaks
//! JSON-RPC 2.0 over any transport, and an HTTP implementation
//! ([`HttpTransport`]) with digest/basic challenge handling. Tests use
//! `mock::MockTransport`.

mod http_adapter;
mod invoker;
#[cfg(test)]
pub mod mock;
mod protocol;
pub mod types;

pub use http_adapter::{resolve_auth, HttpTransport};
pub use invoker::RpcInvoker;
pub use types::{ClientConfig, Credentials, Endpoint, RawResponse, Scheme};

use async_trait::async_trait;

use crate::error::CoreError;

/// Moves one serialized request to the daemon and brings back the body.
///
/// Implementations own connection parameters and authentication. They
/// return only successful (2xx) responses; everything else is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, body: Vec<u8>) -> Result<RawResponse, CoreError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, body: Vec<u8>) -> Result<RawResponse, CoreError> {
        (**self).send(body).await
    }
}
