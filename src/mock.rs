//! In-memory stand-ins for the login helper and the SSO portal API.

use crate::catalog::{AccountInfo, CatalogConnector, CatalogService, Page, RoleInfo};
use crate::error::{Error, Result};
use crate::token_cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Behaves like `aws sso login`: on success it writes the token cache entry
/// for the session under `config_dir`.
pub struct MockLauncher {
    config_dir: PathBuf,
    access_token: String,
    /// Exit code to fail with instead of logging in.
    pub exit_code: Option<i32>,
    logins: Mutex<Vec<String>>,
}

impl MockLauncher {
    pub fn new(config_dir: impl Into<PathBuf>, access_token: &str) -> Self {
        Self {
            config_dir: config_dir.into(),
            access_token: access_token.to_string(),
            exit_code: None,
            logins: Mutex::new(Vec::new()),
        }
    }

    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().unwrap().clone()
    }
}

#[async_trait]
impl crate::login::AuthenticationLauncher for MockLauncher {
    async fn login(&self, session_name: &str) -> Result<()> {
        self.logins.lock().unwrap().push(session_name.to_string());
        if let Some(code) = self.exit_code {
            return Err(Error::LoginFailed(Some(code)));
        }
        let path = token_cache::cache_file(&self.config_dir, session_name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let cache = serde_json::json!({
            "startUrl": "https://x-abcdef0123.awsapps.com/start/",
            "region": "us-east-1",
            "accessToken": self.access_token,
            "expiresAt": "2100-01-01T00:00:00Z"
        });
        fs::write(path, cache.to_string()).unwrap();
        Ok(())
    }
}

#[derive(Default)]
struct Catalog {
    account_pages: Vec<Vec<AccountInfo>>,
    role_pages: HashMap<String, Vec<Vec<RoleInfo>>>,
    fail_roles_page: Option<(String, usize)>,
    requests: Vec<String>,
    regions: Vec<String>,
}

/// Serves scripted pages; continuation tokens are page indexes.
#[derive(Clone, Default)]
pub struct MockCatalog {
    inner: Arc<Mutex<Catalog>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account_pages(self, pages: Vec<Vec<(&str, &str)>>) -> Self {
        self.inner.lock().unwrap().account_pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|(account_id, account_name)| AccountInfo {
                        account_id: account_id.to_string(),
                        account_name: account_name.to_string(),
                    })
                    .collect()
            })
            .collect();
        self
    }

    pub fn with_role_pages(self, account_id: &str, pages: Vec<Vec<&str>>) -> Self {
        let pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|role_name| RoleInfo {
                        role_name: role_name.to_string(),
                    })
                    .collect()
            })
            .collect();
        self.inner
            .lock()
            .unwrap()
            .role_pages
            .insert(account_id.to_string(), pages);
        self
    }

    /// Makes the role page at `index` (zero based) of `account_id` fail.
    pub fn fail_roles_page(self, account_id: &str, index: usize) -> Self {
        self.inner.lock().unwrap().fail_roles_page = Some((account_id.to_string(), index));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn regions(&self) -> Vec<String> {
        self.inner.lock().unwrap().regions.clone()
    }
}

fn page_of<T: Clone>(pages: &[Vec<T>], next_token: Option<&str>) -> Page<T> {
    let index = next_token.map_or(0, |token| token.parse::<usize>().unwrap());
    let items = pages.get(index).cloned().unwrap_or_default();
    let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
    Page { items, next_token }
}

#[async_trait]
impl CatalogService for MockCatalog {
    async fn list_accounts_page(
        &self,
        access_token: &str,
        next_token: Option<String>,
    ) -> Result<Page<AccountInfo>> {
        let mut catalog = self.inner.lock().unwrap();
        catalog.requests.push(format!(
            "list_accounts token={access_token} next={}",
            next_token.as_deref().unwrap_or("-")
        ));
        Ok(page_of(&catalog.account_pages, next_token.as_deref()))
    }

    async fn list_roles_page(
        &self,
        access_token: &str,
        account_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<RoleInfo>> {
        let mut catalog = self.inner.lock().unwrap();
        catalog.requests.push(format!(
            "list_roles {account_id} token={access_token} next={}",
            next_token.as_deref().unwrap_or("-")
        ));
        let index = next_token.as_deref().map_or(0, |token| token.parse::<usize>().unwrap());
        if catalog.fail_roles_page == Some((account_id.to_string(), index)) {
            return Err(Error::Catalog {
                operation: "list roles",
                message: String::from("TooManyRequestsException: Rate exceeded"),
            });
        }
        let pages = catalog.role_pages.get(account_id).cloned().unwrap_or_default();
        Ok(page_of(&pages, next_token.as_deref()))
    }
}

#[async_trait]
impl CatalogConnector for MockCatalog {
    async fn connect(&self, region: &str) -> Result<Box<dyn CatalogService>> {
        self.inner.lock().unwrap().regions.push(region.to_string());
        Ok(Box::new(self.clone()))
    }
}
