//! `WWW-Authenticate` challenge parsing and `Authorization` computation.
//!
//! Covers HTTP Digest (RFC 7616, with the RFC 2617 `MD5` variants monerod
//! uses) and falls back to Basic when that is all the server offers.

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::rpc::types::Credentials;

// ==============================================================================
// Algorithm
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Algorithm {
    Md5,
    Md5Sess,
    Sha256,
    Sha256Sess,
}

impl Algorithm {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "MD5" => Some(Self::Md5),
            "MD5-SESS" => Some(Self::Md5Sess),
            "SHA-256" => Some(Self::Sha256),
            "SHA-256-SESS" => Some(Self::Sha256Sess),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Md5Sess => "MD5-sess",
            Self::Sha256 => "SHA-256",
            Self::Sha256Sess => "SHA-256-sess",
        }
    }

    fn is_session(self) -> bool {
        matches!(self, Self::Md5Sess | Self::Sha256Sess)
    }

    fn hash(self, data: &str) -> String {
        match self {
            Self::Md5 | Self::Md5Sess => hex::encode(Md5::digest(data.as_bytes())),
            Self::Sha256 | Self::Sha256Sess => hex::encode(Sha256::digest(data.as_bytes())),
        }
    }
}

// ==============================================================================
// Challenge
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DigestChallenge {
    pub(super) realm: String,
    pub(super) nonce: String,
    pub(super) opaque: Option<String>,
    pub(super) algorithm: Algorithm,
    /// Server offered `qop=auth`. `auth-int` alone is not supported.
    pub(super) qop_auth: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Challenge {
    Digest(DigestChallenge),
    Basic,
}

/// Pick the challenge to answer from all `WWW-Authenticate` header values.
///
/// A single header value may carry several challenges. The first supported
/// Digest challenge wins; Basic is used only when no Digest challenge is
/// usable.
pub(super) fn select_challenge<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<Challenge> {
    let mut basic = false;
    for challenge in headers.into_iter().flat_map(split_challenges) {
        match parse_challenge(&challenge) {
            Some(challenge @ Challenge::Digest(_)) => return Some(challenge),
            Some(Challenge::Basic) => basic = true,
            None => {}
        }
    }
    basic.then_some(Challenge::Basic)
}

/// Split one `WWW-Authenticate` value into its challenges (RFC 7235 §4.1).
///
/// Items are separated by commas outside quoted strings. An item whose text
/// before the first `=` contains whitespace, or that has no `=` at all,
/// starts a new challenge (`<scheme> <param>` or a bare scheme).
fn split_challenges(header: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;
    for c in header.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted => {
                items.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    items.push(current);

    let mut challenges: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let head = item.split_once('=').map_or(item, |(head, _)| head);
        let starts_challenge = !item.contains('=') || head.trim().contains(char::is_whitespace);
        match challenges.last_mut() {
            Some(last) if !starts_challenge => {
                last.push_str(", ");
                last.push_str(item);
            }
            _ => challenges.push(item.to_owned()),
        }
    }
    challenges
}

fn parse_challenge(header: &str) -> Option<Challenge> {
    let header = header.trim();
    let (scheme, rest) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));

    if scheme.eq_ignore_ascii_case("basic") {
        return Some(Challenge::Basic);
    }
    if !scheme.eq_ignore_ascii_case("digest") {
        return None;
    }

    let mut realm = None;
    let mut nonce = None;
    let mut opaque = None;
    // RFC 2617: a missing algorithm means MD5.
    let mut algorithm = Some(Algorithm::Md5);
    let mut qop = None;

    for (key, value) in parse_params(rest) {
        match key.to_ascii_lowercase().as_str() {
            "realm" => realm = Some(value),
            "nonce" => nonce = Some(value),
            "opaque" => opaque = Some(value),
            "algorithm" => algorithm = Algorithm::parse(&value),
            "qop" => qop = Some(value),
            _ => {}
        }
    }

    let qop_auth = match qop {
        None => false,
        Some(options) if options.split(',').any(|o| o.trim().eq_ignore_ascii_case("auth")) => {
            true
        }
        Some(_) => return None,
    };

    Some(Challenge::Digest(DigestChallenge {
        realm: realm?,
        nonce: nonce?,
        opaque,
        algorithm: algorithm?,
        qop_auth,
    }))
}

/// Split `k1=v1, k2="v 2", ...` into pairs, unquoting values.
fn parse_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c == ',' {
                break;
            }
            key.push(c);
            chars.next();
        }
        let key = key.trim().to_owned();
        if key.is_empty() {
            break;
        }
        if chars.next() != Some('=') {
            // Bare token without a value.
            continue;
        }
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    other => value.push(other),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                value.push(c);
                chars.next();
            }
            value = value.trim().to_owned();
        }
        params.push((key, value));
    }

    params
}

// ==============================================================================
// Authorization
// ==============================================================================

impl DigestChallenge {
    /// Build the `Authorization` header value for one request.
    ///
    /// `nonce_count` is the number of requests already answered with this
    /// nonce, including this one.
    pub(super) fn authorization(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        nonce_count: u32,
        cnonce: &str,
    ) -> String {
        let algorithm = self.algorithm;
        let nc = format!("{nonce_count:08x}");

        let mut ha1 = algorithm.hash(&format!(
            "{}:{}:{}",
            credentials.username, self.realm, credentials.password
        ));
        if algorithm.is_session() {
            ha1 = algorithm.hash(&format!("{ha1}:{}:{cnonce}", self.nonce));
        }
        let ha2 = algorithm.hash(&format!("{method}:{uri}"));

        let response = if self.qop_auth {
            algorithm.hash(&format!("{ha1}:{}:{nc}:{cnonce}:auth:{ha2}", self.nonce))
        } else {
            algorithm.hash(&format!("{ha1}:{}:{ha2}", self.nonce))
        };

        let mut header = format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{uri}\", algorithm={}, response=\"{response}\"",
            quote_escape(&credentials.username),
            quote_escape(&self.realm),
            quote_escape(&self.nonce),
            algorithm.as_str(),
        );
        if self.qop_auth {
            header.push_str(&format!(", qop=auth, nc={nc}, cnonce=\"{cnonce}\""));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque=\"{}\"", quote_escape(opaque)));
        }
        header
    }
}

fn quote_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Fresh client nonce: 16 random bytes, hex-encoded.
pub(super) fn generate_cnonce() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}
