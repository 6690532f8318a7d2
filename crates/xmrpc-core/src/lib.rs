pub mod daemon;
pub mod error;
pub mod rpc;

pub use daemon::{DaemonClient, DaemonMethod};
pub use error::{CoreError, RpcError};
