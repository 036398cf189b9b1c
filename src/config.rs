use crate::aws_sso::{Profile, SSOSession};
use crate::error::{Error, Result};
use ini::Ini;
use std::fs::{create_dir_all, remove_dir_all};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The shared config file, `~/.aws/config`.
pub fn default_config_file() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::HomeDirectory)?;
    Ok(home.join(".aws").join("config"))
}

/// Directory holding the config file; the SSO cache lives beneath it.
pub fn config_dir(config_file: &Path) -> &Path {
    match config_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    create_dir_all(config_dir).map_err(|err| Error::io("unable to create", config_dir, err))
}

/// Removes `<config_dir>/sso` and every token cached under it.
pub fn remove_sso_cache(config_dir: &Path) -> Result<()> {
    let sso_dir = config_dir.join("sso");
    match remove_dir_all(&sso_dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::io("unable to remove", sso_dir, err)),
    }
}

/// In-memory `~/.aws/config` document, rebuilt from scratch on every run.
pub struct Config {
    path: PathBuf,
    document: Ini,
}

impl Config {
    /// Starts an empty document for `path`.
    ///
    /// Fails with [`Error::ConfigExists`] when a file is already present and
    /// `force` is not set. Nothing is touched on disk either way.
    pub fn initialize(path: impl Into<PathBuf>, force: bool) -> Result<Self> {
        let path = path.into();
        if !force && path.exists() {
            return Err(Error::ConfigExists(path));
        }
        Ok(Self {
            path,
            document: Ini::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_session(&mut self, session: &SSOSession) {
        self.document
            .with_section(Some(format!("sso-session {}", session.name())))
            .set("sso_region", session.region())
            .set("sso_start_url", session.start_url());
    }

    /// Adds a `[profile <name>]` section. A repeated name lands in the same
    /// section and its keys take the latest values.
    pub fn add_profile(&mut self, profile: &Profile) {
        self.document
            .with_section(Some(format!("profile {}", profile.name())))
            .set("sso_session", profile.get_session_name())
            .set("sso_account_id", profile.sso_account_id())
            .set("sso_role_name", profile.sso_role_name())
            .set("region", profile.region());
    }

    /// Writes the whole document over the config file.
    ///
    /// The content goes to a temporary file next to the target which is then
    /// renamed into place.
    pub fn save(&self) -> Result<()> {
        let dir = config_dir(&self.path);
        ensure_config_dir(dir)?;
        let file =
            NamedTempFile::new_in(dir).map_err(|err| Error::io("unable to write", dir, err))?;
        let mut writer = BufWriter::new(file);
        self.document
            .write_to(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|err| Error::io("unable to write", &self.path, err))?;
        let file = writer
            .into_inner()
            .map_err(|err| Error::io("unable to write", &self.path, err.into_error()))?;
        file.persist(&self.path)
            .map_err(|err| Error::io("unable to write", &self.path, err.error))?;
        Ok(())
    }
}
