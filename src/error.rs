//! Error types for the config bootstrap.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a start URL is rejected.
#[derive(Debug, Error)]
pub enum StartUrlError {
    #[error("start URL is empty")]
    Empty,

    #[error("not a valid URL: {0}")]
    Malformed(#[from] url::ParseError),

    #[error("missing host")]
    MissingHost,

    #[error("user credentials are not allowed")]
    UserInfo,
}

/// Every failure aborts the run; the message is shown to the user as is.
#[derive(Debug, Error)]
pub enum Error {
    /// The start URL given on the command line cannot be used.
    #[error("invalid START_URL {input}: {source}")]
    InvalidStartUrl {
        input: String,
        #[source]
        source: StartUrlError,
    },

    /// A config file is already present and overwriting was not requested.
    #[error("config found at {} (use --force to overwrite)", .0.display())]
    ConfigExists(PathBuf),

    #[error("unable to locate the home directory")]
    HomeDirectory,

    /// Filesystem operation failed.
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The login step did not leave a cached token behind.
    #[error("no cached SSO token at {}, did the login complete?", .0.display())]
    TokenNotFound(PathBuf),

    #[error("invalid SSO token cache {}: {source}", .path.display())]
    TokenParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to run aws sso login: {0}")]
    LoginSpawn(#[source] io::Error),

    /// The login helper exited unsuccessfully (`None` when killed by a signal).
    #[error("aws sso login failed{}", exit_suffix(.0))]
    LoginFailed(Option<i32>),

    /// A page request against the SSO catalog failed.
    #[error("unable to {operation}: {message}")]
    Catalog {
        operation: &'static str,
        message: String,
    },

    #[error("malformed SSO response: {0}")]
    MalformedResponse(String),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => String::from(": terminated by signal"),
    }
}

impl Error {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
