use base64::prelude::*;

use crate::core::config::AdminConfig;

/// Decides whether a request may reach a gated route.
pub trait Authorizer: Send + Sync {
    /// `authorization` is the raw `Authorization` header, if present.
    fn authorize(&self, authorization: Option<&str>) -> bool;
}

/// A single fixed username/password pair checked via HTTP Basic auth
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl Authorizer for StaticCredentials {
    fn authorize(&self, authorization: Option<&str>) -> bool {
        match authorization.and_then(decode_basic) {
            Some((username, password)) => username == self.username && password == self.password,
            None => false,
        }
    }
}

/// Split a `Basic <base64(user:pass)>` header into its credential pair.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let creds = String::from_utf8(decoded).ok()?;
    let (username, password) = creds.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
