use crate::catalog::{self, CatalogConnector, CatalogService};
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::login::AuthenticationLauncher;
use crate::start_url;
use crate::token_cache;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new("[^a-zA-Z0-9]+").unwrap());

/// Replaces every run of characters outside `[a-zA-Z0-9]` with a single `_`.
pub fn sanitize(account_name: &str) -> String {
    NON_ALPHANUMERIC.replace_all(account_name, "_").into_owned()
}

#[derive(Debug)]
pub struct Profile {
    name: String,
    sso_session: String,
    sso_account_id: String,
    sso_role_name: String,
    region: String,
}

impl Profile {
    /// The profile is named `<sanitized account name>/<role name>`.
    pub fn new(
        account_name: &str,
        sso_session_name: String,
        sso_account_id: String,
        sso_role_name: String,
        region: String,
    ) -> Self {
        Self {
            name: format!("{}/{}", sanitize(account_name), sso_role_name),
            sso_session: sso_session_name,
            sso_account_id,
            sso_role_name,
            region,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_session_name(&self) -> &str {
        self.sso_session.as_str()
    }

    pub fn sso_account_id(&self) -> &str {
        &self.sso_account_id
    }

    pub fn sso_role_name(&self) -> &str {
        &self.sso_role_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[derive(Debug)]
pub struct SSOSession {
    name: String,
    region: String,
    start_url: String,
}

impl SSOSession {
    pub fn new(name: String, region: String, start_url: String) -> Self {
        Self {
            name,
            region,
            start_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn start_url(&self) -> &str {
        &self.start_url
    }
}

/// Everything one run needs, taken from the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub config_file: PathBuf,
    pub start_url: String,
    pub sso_session_name: String,
    pub sso_region: String,
    /// Region written into every profile.
    pub default_region: String,
    /// Overwrite an existing config file.
    pub force: bool,
}

/// Walks every account and its roles, producing one profile per pair in
/// catalog order.
pub async fn build_profiles(
    catalog: &dyn CatalogService,
    access_token: &str,
    session: &SSOSession,
    default_region: &str,
) -> Result<Vec<Profile>> {
    let mut profiles = Vec::new();
    let accounts = catalog::list_accounts(catalog, access_token).await?;
    for account in accounts {
        println!("Account: {} ({})", account.account_name, account.account_id);
        let roles = catalog::list_roles(catalog, access_token, &account.account_id).await?;
        println!("Roles:");
        for role in roles {
            println!("  - {}", role.role_name);
            profiles.push(Profile::new(
                &account.account_name,
                session.name().to_string(),
                account.account_id.clone(),
                role.role_name,
                default_region.to_string(),
            ));
        }
        println!();
    }
    Ok(profiles)
}

pub struct SSO<L, C> {
    options: Options,
    launcher: L,
    connector: C,
}

impl<L, C> SSO<L, C>
where
    L: AuthenticationLauncher,
    C: CatalogConnector,
{
    pub fn new(options: Options, launcher: L, connector: C) -> Self {
        Self {
            options,
            launcher,
            connector,
        }
    }

    /// Rebuilds the config file from a fresh SSO login.
    ///
    /// The session-only config is saved before logging in, since the login
    /// helper reads it. Any later failure leaves that file behind.
    pub async fn update_config(&self) -> Result<Vec<Profile>> {
        let options = &self.options;
        let mut document = Config::initialize(&options.config_file, options.force)?;
        let start_url =
            start_url::normalize(&options.start_url).map_err(|source| Error::InvalidStartUrl {
                input: options.start_url.clone(),
                source,
            })?;

        println!("Initialize config");
        let config_dir = config::config_dir(&options.config_file).to_path_buf();
        config::ensure_config_dir(&config_dir)?;

        println!("Remove SSO cache");
        config::remove_sso_cache(&config_dir)?;

        println!("Write config: {}", document.path().display());
        let session = SSOSession::new(
            options.sso_session_name.clone(),
            options.sso_region.clone(),
            start_url,
        );
        document.set_session(&session);
        document.save()?;

        println!("Login");
        self.launcher.login(session.name()).await?;

        println!("Fetch access token");
        let access_token = token_cache::fetch_token(&config_dir, session.name())?;

        println!("Create SSO client");
        let catalog = self.connector.connect(session.region()).await?;

        println!("Get AWS accounts & roles...\n");
        let profiles = build_profiles(
            catalog.as_ref(),
            &access_token,
            &session,
            &options.default_region,
        )
        .await?;

        for profile in profiles.iter() {
            document.add_profile(profile);
            println!("Added profile '{}' to config", profile.name());
        }
        println!("Saving config to: {}", document.path().display());
        document.save()?;
        Ok(profiles)
    }
}
