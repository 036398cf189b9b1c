//! Interactive SSO login through the AWS CLI.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::env;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Performs the SSO login that populates the token cache.
#[async_trait]
pub trait AuthenticationLauncher: Send + Sync {
    /// Blocks until the login for `session_name` completes or fails.
    async fn login(&self, session_name: &str) -> Result<()>;
}

/// Runs `aws sso login --sso-session <name>`.
///
/// The child gets the terminal so the user can follow the device
/// authorization prompt, and an empty environment.
pub struct AwsCli {
    program: PathBuf,
}

impl AwsCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves `aws` against the current `PATH`. The child's environment is
    /// cleared, so the lookup cannot be left to the spawn.
    pub fn locate() -> Self {
        let name = if cfg!(windows) { "aws.exe" } else { "aws" };
        let program = env::var_os("PATH")
            .and_then(|paths| {
                env::split_paths(&paths)
                    .map(|dir| dir.join(name))
                    .find(|candidate| candidate.is_file())
            })
            .unwrap_or_else(|| PathBuf::from(name));
        Self::new(program)
    }

    fn command(&self, session_name: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["sso", "login", "--sso-session", session_name])
            .env_clear()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

#[async_trait]
impl AuthenticationLauncher for AwsCli {
    async fn login(&self, session_name: &str) -> Result<()> {
        let mut cmd = self.command(session_name);
        tracing::debug!("executing `{:?}`", cmd);
        let status = cmd.status().await.map_err(Error::LoginSpawn)?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::LoginFailed(status.code()))
        }
    }
}
