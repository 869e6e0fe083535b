use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::domain::{Product, User};
use tracing::{debug, info};
use url::Url;

pub mod mapping;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only origin of loosely-typed records for one entity type.
#[async_trait]
pub trait RemoteSource<T>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<T>>;
}

/// Stand-in for entity types that only ever load from local storage.
pub struct NoRemote;

#[async_trait]
impl<T: Send + 'static> RemoteSource<T> for NoRemote {
    async fn fetch_all(&self) -> Result<Vec<T>> {
        Err(anyhow!("no remote source configured"))
    }
}

/// Client for the public placeholder REST API (`/users`, `/posts`).
#[derive(Clone)]
pub struct PlaceholderApi {
    http: Client,
    base_url: Url,
}

impl PlaceholderApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid api base url '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_list(&self, path: &str) -> Result<Vec<Value>> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("invalid api path '{path}'"))?;
        debug!(%url, "fetching remote records");
        let values: Vec<Value> = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("response from {url} is not a json array"))?;
        info!(%url, count = values.len(), "fetched remote records");
        Ok(values)
    }
}

#[async_trait]
impl RemoteSource<User> for PlaceholderApi {
    async fn fetch_all(&self) -> Result<Vec<User>> {
        let values = self.get_list("users").await?;
        Ok(mapping::users_from_placeholder(values))
    }
}

#[async_trait]
impl RemoteSource<Product> for PlaceholderApi {
    async fn fetch_all(&self) -> Result<Vec<Product>> {
        let values = self.get_list("posts").await?;
        Ok(mapping::products_from_posts(values))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
