//! Canonical form of the SSO start URL.

use crate::error::StartUrlError;
use url::Url;

/// Path used when the start URL points at the portal root.
const DEFAULT_START_PATH: &str = "/start/";

/// Turns user input into an absolute `https` start URL whose path ends in `/`.
///
/// A missing scheme is assumed to be `https`, and an empty or root path
/// becomes `/start/`:
///
/// ```text
/// example.com                    -> https://example.com/start/
/// https://foo.awsapps.com/start  -> https://foo.awsapps.com/start/
/// ```
pub fn normalize(raw: &str) -> Result<String, StartUrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StartUrlError::Empty);
    }
    // Without this `example.com:8443/start` would parse with `example.com` as the scheme.
    let candidate = if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let mut url = Url::parse(&candidate)?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(StartUrlError::MissingHost);
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(StartUrlError::UserInfo);
    }
    let path = url.path().to_string();
    if path.is_empty() || path == "/" {
        url.set_path(DEFAULT_START_PATH);
    } else if !path.ends_with('/') {
        url.set_path(&format!("{path}/"));
    }
    Ok(url.to_string())
}

/// True when `raw` starts with `<scheme>://`.
fn has_scheme(raw: &str) -> bool {
    match raw.split_once("://") {
        Some((scheme, _)) => {
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
