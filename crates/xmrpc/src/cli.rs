use clap::{Args, Parser, Subcommand};

/// xmrpc — query a Monero daemon over its JSON-RPC interface.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Daemon host.
    #[arg(long, default_value = "127.0.0.1", env = "XMRPC_HOST")]
    pub host: String,

    /// Daemon RPC port.
    #[arg(long, default_value = "18081", env = "XMRPC_PORT")]
    pub port: u16,

    /// `http` or `https`.
    #[arg(long, default_value = "http", env = "XMRPC_SCHEME")]
    pub scheme: String,

    /// RPC username (for daemons started with --rpc-login).
    #[arg(long, env = "XMRPC_USER")]
    pub user: Option<String>,

    /// RPC password.
    #[arg(long, env = "XMRPC_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Credentials as `username:password`, the --rpc-login format.
    #[arg(long, env = "XMRPC_LOGIN", hide_env_values = true)]
    pub login: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value = "30", env = "XMRPC_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Maximum outbound requests per second.
    #[arg(long, env = "XMRPC_RPS")]
    pub rps: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Call any JSON-RPC method.
    Call {
        method: String,
        /// Parameters as JSON (object, array or scalar).
        params: Option<String>,
    },
    /// Number of blocks in the longest chain.
    BlockCount,
    /// General node and network state.
    Info,
    /// Hard fork voting state.
    HardForkInfo,
    /// Header of the most recent block.
    LastBlockHeader,
    /// Block header by hash or height.
    BlockHeader(BlockSelector),
    /// Full block by hash or height.
    Block(BlockSelector),
    /// Hash of the block at a height.
    BlockHash { height: u64 },
    /// Banned peers.
    Bans,
    /// Open peer connections.
    Connections,
    /// Current fee estimate.
    FeeEstimate,
    /// Synchronisation state.
    SyncInfo,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct BlockSelector {
    #[arg(long)]
    pub hash: Option<String>,

    #[arg(long)]
    pub height: Option<u64>,
}
