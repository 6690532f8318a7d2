use reqwest::Url;

use crate::error::CoreError;
use crate::rpc::types::{Credentials, Endpoint};

/// Work out which credentials to use.
///
/// Precedence:
/// 1. explicit `user` + `pass`
/// 2. a `login` string in monerod's `--rpc-login` form, `username:password`
/// 3. no auth
pub fn resolve_auth(
    user: Option<&str>,
    pass: Option<&str>,
    login: Option<&str>,
) -> Result<Option<Credentials>, CoreError> {
    match (user, pass) {
        (Some(u), Some(p)) => return Ok(Some(Credentials::new(u, p))),
        (Some(_), None) | (None, Some(_)) => {
            return Err(CoreError::Config(
                "both rpc user and rpc pass must be set together".to_owned(),
            ));
        }
        (None, None) => {}
    }

    let Some(login) = login.map(str::trim) else {
        return Ok(None);
    };

    let (login_user, login_pass) = login.split_once(':').ok_or_else(|| {
        CoreError::Config("rpc login must have the form `username:password`".to_owned())
    })?;
    if login_user.is_empty() || login_pass.is_empty() {
        return Err(CoreError::Config(
            "rpc login must contain non-empty `username:password`".to_owned(),
        ));
    }

    Ok(Some(Credentials::new(login_user, login_pass)))
}

/// Build and sanity-check the URL for `endpoint`.
pub(super) fn parse_endpoint(endpoint: &Endpoint) -> Result<Url, CoreError> {
    if endpoint.host.trim().is_empty() {
        return Err(CoreError::Config("daemon host must not be empty".to_owned()));
    }
    let url = endpoint.url();
    let parsed = Url::parse(&url)
        .map_err(|e| CoreError::Config(format!("invalid daemon endpoint `{url}`: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CoreError::Config(format!(
            "unsupported connection scheme `{other}`; expected http or https"
        ))),
    }
}
