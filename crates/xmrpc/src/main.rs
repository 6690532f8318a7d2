mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};

use xmrpc_core::rpc::{resolve_auth, ClientConfig, Endpoint, Scheme};
use xmrpc_core::{CoreError, DaemonClient, DaemonMethod};

use cli::{BlockSelector, Command};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let scheme: Scheme = args.scheme.parse().context("parse --scheme")?;
    let mut endpoint = Endpoint::new(scheme, args.host.clone(), args.port);
    if let Some(credentials) = resolve_auth(
        args.user.as_deref(),
        args.pass.as_deref(),
        args.login.as_deref(),
    )
    .context("resolve RPC credentials")?
    {
        endpoint = endpoint.with_credentials(credentials);
    }
    let url = endpoint.url();

    let config = ClientConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        requests_per_second: args.rps,
        ..ClientConfig::new(endpoint)
    };
    let client = DaemonClient::new(config).context("build RPC client")?;

    let (method, params) = resolve_command(args.command)?;
    tracing::debug!(%url, method = %method, "invoking daemon");

    let result = client
        .call(&method, params)
        .await
        .map_err(|err| eyre!(format_rpc_error(&url, &err)))
        .wrap_err_with(|| format!("while calling `{method}`"))?;

    let pretty = serde_json::to_string_pretty(&result).context("render result")?;
    println!("{pretty}");
    Ok(())
}

/// Map a subcommand to the method name and params it forwards.
fn resolve_command(command: Command) -> eyre::Result<(String, Option<serde_json::Value>)> {
    let method = match command {
        Command::Call { method, params } => {
            let params = params
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("params must be valid JSON")?;
            return Ok((method, params));
        }
        Command::BlockCount => DaemonMethod::BlockCount,
        Command::Info => DaemonMethod::Info,
        Command::HardForkInfo => DaemonMethod::HardForkInfo,
        Command::LastBlockHeader => DaemonMethod::LastBlockHeader,
        Command::BlockHeader(selector) => match selector {
            BlockSelector {
                hash: Some(hash), ..
            } => DaemonMethod::BlockHeaderByHash(hash),
            BlockSelector {
                height: Some(height),
                ..
            } => DaemonMethod::BlockHeaderByHeight(height),
            _ => return Err(eyre!("either --hash or --height is required")),
        },
        Command::Block(selector) => match selector {
            BlockSelector {
                hash: Some(hash), ..
            } => DaemonMethod::BlockByHash(hash),
            BlockSelector {
                height: Some(height),
                ..
            } => DaemonMethod::BlockByHeight(height),
            _ => return Err(eyre!("either --hash or --height is required")),
        },
        Command::BlockHash { height } => DaemonMethod::BlockHash(height),
        Command::Bans => DaemonMethod::Bans,
        Command::Connections => DaemonMethod::Connections,
        Command::FeeEstimate => DaemonMethod::FeeEstimate,
        Command::SyncInfo => DaemonMethod::SyncInfo,
    };
    Ok((method.name().to_owned(), method.params()))
}

fn format_rpc_error(url: &str, err: &CoreError) -> String {
    let mut lines = vec![format!("RPC error: {err}")];

    match err {
        CoreError::Transport(source) if source.is_timeout() => lines.push(
            "hint: the daemon did not answer in time; raise --timeout-secs or check that it is not still syncing"
                .into(),
        ),
        CoreError::Transport(source) if source.is_connect() => lines.push(format!(
            "hint: could not connect to `{url}`; verify that monerod is running and --rpc-bind-port matches --port"
        )),
        CoreError::Authentication { .. } => lines.push(
            "hint: authentication failed; verify --user/--pass or --login against the daemon's --rpc-login"
                .into(),
        ),
        CoreError::HttpStatus { status, .. } if status.as_u16() == 404 => lines.push(
            "hint: endpoint not found; verify host and port point at the daemon RPC, not the P2P port"
                .into(),
        ),
        CoreError::Rpc(rpc) if rpc.code == -32601 => lines.push(
            "hint: the daemon does not know this method; restricted RPC ports hide some methods"
                .into(),
        ),
        _ => {}
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use xmrpc_core::RpcError;

    #[test]
    fn block_height_command_marshals_string_param() {
        let (method, params) = resolve_command(Command::Block(BlockSelector {
            hash: None,
            height: Some(1),
        }))
        .expect("must resolve");
        assert_eq!(method, "getblock");
        assert_eq!(params, Some(json!("1")));
    }

    #[test]
    fn call_command_parses_params_json() {
        let (method, params) = resolve_command(Command::Call {
            method: "get_block_header_by_height".to_owned(),
            params: Some(r#"{"height": 912345}"#.to_owned()),
        })
        .expect("must resolve");
        assert_eq!(method, "get_block_header_by_height");
        assert_eq!(params, Some(json!({"height": 912345})));
    }

    #[test]
    fn call_command_rejects_bad_json() {
        let err = resolve_command(Command::Call {
            method: "get_info".to_owned(),
            params: Some("{not json".to_owned()),
        })
        .expect_err("must reject");
        assert!(err.to_string().contains("valid JSON"));
    }

    #[test]
    fn auth_error_gets_hint() {
        let err = CoreError::Authentication {
            url: "http://127.0.0.1:18081/json_rpc".to_owned(),
            reason: "credentials rejected".to_owned(),
        };
        let message = format_rpc_error("http://127.0.0.1:18081/json_rpc", &err);
        assert!(message.contains("hint: authentication failed"));
    }

    #[test]
    fn unknown_method_gets_hint() {
        let err = CoreError::Rpc(RpcError {
            code: -32601,
            message: "Method not found".to_owned(),
            data: None,
        });
        let message = format_rpc_error("http://127.0.0.1:18081/json_rpc", &err);
        assert!(message.starts_with("RPC error: daemon returned error -32601: Method not found"));
        assert!(message.contains("restricted RPC"));
    }
}
