//! Accounts and roles reachable with an SSO access token.
//!
//! A [`CatalogService`] only knows how to fetch a single page. [`paginate`]
//! drives it until the service stops handing out continuation tokens, so an
//! enumeration is always a fresh loop and never resumes a previous one.

use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_sdk_sso::config::Region;
use aws_sdk_sso::error::DisplayErrorContext;
use std::future::Future;

#[derive(Debug, PartialEq, Clone)]
pub struct AccountInfo {
    pub account_id: String,
    pub account_name: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RoleInfo {
    pub role_name: String,
}

/// One page of results and the token for the next one, if any.
#[derive(Debug, PartialEq, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_accounts_page(
        &self,
        access_token: &str,
        next_token: Option<String>,
    ) -> Result<Page<AccountInfo>>;

    async fn list_roles_page(
        &self,
        access_token: &str,
        account_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<RoleInfo>>;
}

/// Builds a [`CatalogService`] for the SSO region.
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    async fn connect(&self, region: &str) -> Result<Box<dyn CatalogService>>;
}

/// Requests pages until the service reports none remain.
///
/// The first failing page aborts the whole enumeration. The loop also stops
/// when the service echoes back the token it was just given.
pub async fn paginate<T, F, Fut>(mut next_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = next_page(token.clone()).await?;
        items.extend(page.items);
        match page.next_token {
            Some(next) if !next.is_empty() && token.as_deref() != Some(next.as_str()) => {
                token = Some(next)
            }
            _ => break,
        }
    }
    Ok(items)
}

pub async fn list_accounts(
    catalog: &dyn CatalogService,
    access_token: &str,
) -> Result<Vec<AccountInfo>> {
    paginate(move |next| catalog.list_accounts_page(access_token, next)).await
}

pub async fn list_roles(
    catalog: &dyn CatalogService,
    access_token: &str,
    account_id: &str,
) -> Result<Vec<RoleInfo>> {
    paginate(move |next| catalog.list_roles_page(access_token, account_id, next)).await
}

impl TryFrom<&aws_sdk_sso::types::AccountInfo> for AccountInfo {
    type Error = Error;

    fn try_from(account: &aws_sdk_sso::types::AccountInfo) -> Result<Self> {
        let account_id = account
            .account_id()
            .ok_or_else(|| Error::MalformedResponse(String::from("account without id")))?
            .to_string();
        let account_name = account
            .account_name()
            .map(String::from)
            .unwrap_or_else(|| account_id.clone());
        Ok(Self {
            account_id,
            account_name,
        })
    }
}

impl TryFrom<&aws_sdk_sso::types::RoleInfo> for RoleInfo {
    type Error = Error;

    fn try_from(role: &aws_sdk_sso::types::RoleInfo) -> Result<Self> {
        let role_name = role.role_name().ok_or_else(|| {
            Error::MalformedResponse(format!(
                "role without name in account {}",
                role.account_id().unwrap_or("?")
            ))
        })?;
        Ok(Self {
            role_name: role_name.to_string(),
        })
    }
}

/// Keeps the `Display` chain of an SDK error for the user; the full context,
/// which may include the raw response, only goes to the debug log.
fn catalog_error<E>(operation: &'static str, err: &E) -> Error
where
    E: std::error::Error + 'static,
{
    tracing::debug!(operation, error = %DisplayErrorContext(err), "SSO request failed");
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::Catalog { operation, message }
}

/// The AWS SSO portal API.
pub struct SsoCatalog {
    client: aws_sdk_sso::Client,
}

impl SsoCatalog {
    pub fn new(client: aws_sdk_sso::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogService for SsoCatalog {
    async fn list_accounts_page(
        &self,
        access_token: &str,
        next_token: Option<String>,
    ) -> Result<Page<AccountInfo>> {
        let output = self
            .client
            .list_accounts()
            .access_token(access_token)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|err| catalog_error("list accounts", &err))?;
        let items = output
            .account_list()
            .unwrap_or_default()
            .iter()
            .map(AccountInfo::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            next_token: output.next_token().map(String::from),
        })
    }

    async fn list_roles_page(
        &self,
        access_token: &str,
        account_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<RoleInfo>> {
        let output = self
            .client
            .list_account_roles()
            .access_token(access_token)
            .account_id(account_id)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|err| catalog_error("list roles", &err))?;
        let items = output
            .role_list()
            .unwrap_or_default()
            .iter()
            .map(RoleInfo::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            next_token: output.next_token().map(String::from),
        })
    }
}

/// Connects to the SSO portal API of a region with the ambient SDK settings.
pub struct SsoConnector;

#[async_trait]
impl CatalogConnector for SsoConnector {
    async fn connect(&self, region: &str) -> Result<Box<dyn CatalogService>> {
        let aws_config = aws_config::from_env()
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Ok(Box::new(SsoCatalog::new(aws_sdk_sso::Client::new(
            &aws_config,
        ))))
    }
}
