//! HTTP(S) transport for the daemon's `/json_rpc` endpoint.
//!
//! Implements [`Transport`](super::Transport) using `reqwest`, with
//! HTTP Digest and Basic challenge handling, a cached challenge for
//! pre-emptive authentication, configurable timeouts, and optional request
//! rate limiting.

mod client;
mod connection;
mod digest;

pub use client::HttpTransport;
pub use connection::resolve_auth;
