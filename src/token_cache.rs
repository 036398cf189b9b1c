//! Access token left in `<config dir>/sso/cache` by `aws sso login`.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedToken {
    pub start_url: String,
    pub region: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Cache entries are named after the SHA-1 of the session name.
pub fn cache_file(config_dir: &Path, session_name: &str) -> PathBuf {
    let mut hasher = Sha1::new();
    hasher.update(session_name.as_bytes());
    let name = format!("{:x}.json", hasher.finalize());
    config_dir.join("sso").join("cache").join(name)
}

pub fn load(config_dir: &Path, session_name: &str) -> Result<CachedToken> {
    let path = cache_file(config_dir, session_name);
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(Error::TokenNotFound(path)),
        Err(err) => return Err(Error::io("unable to read", path, err)),
    };
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::TokenParse { path, source })
}

/// Returns the cached access token for `session_name`.
pub fn fetch_token(config_dir: &Path, session_name: &str) -> Result<String> {
    let token = load(config_dir, session_name)?;
    if token.is_expired() {
        tracing::warn!(
            session = session_name,
            expires_at = %token.expires_at,
            "cached SSO token has already expired"
        );
    }
    tracing::debug!(session = session_name, start_url = %token.start_url, "loaded cached SSO token");
    Ok(token.access_token)
}
