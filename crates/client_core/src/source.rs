//! Data sources for remote list controllers.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use shared::{
    domain::{affiliate_path, Affiliate},
    protocol::{CollectionSpec, ListRequest, Page},
};
use tracing::debug;

use crate::error::FetchError;

#[async_trait]
pub trait ListSource<R>: Send + Sync {
    async fn fetch_page(&self, request: &ListRequest) -> Result<Page<R>, FetchError>;
}

/// Authenticated handle on the admin service. Owns no session logic; the caller
/// supplies the HTTP client and, optionally, a bearer token.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl AdminClient {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn list_source(&self, collection: CollectionSpec) -> HttpListSource {
        HttpListSource {
            client: self.clone(),
            collection,
        }
    }

    /// `GET /affiliates/<code>`: the detail record that feeds the uses sub-list.
    pub async fn fetch_affiliate(&self, code: &str) -> Result<Affiliate, FetchError> {
        let url = self.url_for(&affiliate_path(code))?;
        let affiliate = self
            .authorize(self.http.get(url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(affiliate)
    }

    fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Paged `GET` against one collection of the admin service.
#[derive(Debug, Clone)]
pub struct HttpListSource {
    client: AdminClient,
    collection: CollectionSpec,
}

impl HttpListSource {
    pub fn collection(&self) -> &CollectionSpec {
        &self.collection
    }
}

#[async_trait]
impl<R> ListSource<R> for HttpListSource
where
    R: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, request: &ListRequest) -> Result<Page<R>, FetchError> {
        let url = self.client.url_for(&self.collection.path)?;
        debug!(
            url = %url,
            page = request.page,
            per_page = request.per_page,
            "fetching list page"
        );
        let body: serde_json::Value = self
            .client
            .authorize(self.client.http.get(url))
            .query(&request.query_pairs())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(self.collection.decode_page(body)?)
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
