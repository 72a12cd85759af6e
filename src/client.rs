//! Remote battle operations.
//!
//! [`BattleApi`] is the seam the orchestrator and the history browser
//! depend on; [`HttpBattleClient`] implements it over HTTP with `reqwest`.
//! Each call is a single request/response with no caching and no retry.

use log::{debug, warn};
use reqwest::{Client, Method, Request, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::battle::Battle;
use crate::config::ClientConfig;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
    /// Used by non-HTTP implementations and test doubles.
    #[error("{0}")]
    Other(String),
}

#[allow(async_fn_in_trait)]
pub trait BattleApi {
    /// Asks the server to pick two creatures and store a pending battle.
    async fn create_random_battle(&self) -> Result<Battle, ClientError>;

    /// Resolves the pending battle `id` on the server.
    async fn simulate_battle(&self, id: u64) -> Result<Battle, ClientError>;

    /// Lists past battles. `None` means no filter.
    async fn list_battles(&self, query: Option<&str>) -> Result<Vec<Battle>, ClientError>;
}

impl<T: BattleApi> BattleApi for &T {
    async fn create_random_battle(&self) -> Result<Battle, ClientError> {
        (**self).create_random_battle().await
    }

    async fn simulate_battle(&self, id: u64) -> Result<Battle, ClientError> {
        (**self).simulate_battle(id).await
    }

    async fn list_battles(&self, query: Option<&str>) -> Result<Vec<Battle>, ClientError> {
        (**self).list_battles(query).await
    }
}

#[derive(Clone, Debug)]
pub struct HttpBattleClient {
    http: Client,
    base_url: Url,
}

impl HttpBattleClient {
    pub fn new(config: &ClientConfig) -> Result<HttpBattleClient, ClientError> {
        let base = config.base_url.trim_end_matches('/');
        let base_url = Url::parse(base).map_err(|e| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "not a hierarchical url".to_string(),
            });
        }
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(HttpBattleClient { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn create_request(&self) -> Result<Request, ClientError> {
        Ok(self
            .http
            .request(Method::POST, self.endpoint(&["random"]))
            .json(&serde_json::json!({}))
            .build()?)
    }

    pub fn simulate_request(&self, id: u64) -> Result<Request, ClientError> {
        let id = id.to_string();
        Ok(self
            .http
            .request(Method::POST, self.endpoint(&[&id, "simulate"]))
            .json(&serde_json::json!({}))
            .build()?)
    }

    /// An absent or empty query leaves out the `q` parameter entirely.
    pub fn list_request(&self, query: Option<&str>) -> Result<Request, ClientError> {
        let mut builder = self.http.request(Method::GET, self.base_url.clone());
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            builder = builder.query(&[("q", q)]);
        }
        Ok(builder.build()?)
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T, ClientError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!("{} {}", method, url);
        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} {} failed with {}", method, url, status);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

impl BattleApi for HttpBattleClient {
    async fn create_random_battle(&self) -> Result<Battle, ClientError> {
        let request = self.create_request()?;
        self.execute(request).await
    }

    async fn simulate_battle(&self, id: u64) -> Result<Battle, ClientError> {
        let request = self.simulate_request(id)?;
        self.execute(request).await
    }

    async fn list_battles(&self, query: Option<&str>) -> Result<Vec<Battle>, ClientError> {
        let request = self.list_request(query)?;
        self.execute(request).await
    }
}
