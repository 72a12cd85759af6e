//! Creature roster backed by the PokeAPI REST service.
//!
//! The name listing and every creature detail are cached after the first
//! successful fetch. Any failure clears both caches, so the next battle
//! starts from fresh data. Server errors (5xx) and I/O failures are retried
//! with a growing delay; everything else fails immediately.

use std::collections::HashMap;
use std::time::Instant;

use log::{error, info, warn};
use reqwest::{Client, Url};
use rocket::futures::lock::Mutex;
use rocket::serde::Deserialize;
use serde::de::DeserializeOwned;

use super::roster::{CreatureProfile, CreatureSource};
use super::ServiceError;
use crate::config::PokeApiConfig;

/// Upper bound on the names requested in one listing.
pub const MAX_POKEMON_COUNT: u32 = 100_000;

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
struct NameList {
    results: Option<Vec<NamedResource>>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
struct NamedResource {
    name: String,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
struct PokemonDetail {
    id: Option<u32>,
    name: Option<String>,
    types: Option<Vec<TypeSlot>>,
    sprites: Option<Sprites>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
struct Sprites {
    front_default: Option<String>,
}

impl PokemonDetail {
    /// Joins the type names with `", "`. A missing id, a blank name or no
    /// types at all make the creature invalid.
    fn into_profile(self) -> Result<CreatureProfile, ServiceError> {
        let has_id = self.id.is_some();
        let types = self
            .types
            .unwrap_or_default()
            .into_iter()
            .map(|slot| slot.kind.name)
            .collect::<Vec<_>>()
            .join(", ");
        let profile = CreatureProfile {
            name: self.name.unwrap_or_default(),
            types,
            image_url: self
                .sprites
                .and_then(|s| s.front_default)
                .filter(|url| !url.trim().is_empty()),
        };
        if !has_id {
            return Err(ServiceError::InvalidCreature(format!("{:?}", profile)));
        }
        profile.validate()?;
        Ok(profile)
    }
}

struct Failure {
    error: ServiceError,
    retryable: bool,
}

fn transport_failure(url: &Url, e: reqwest::Error) -> Failure {
    Failure {
        retryable: !(e.is_builder() || e.is_decode()),
        error: ServiceError::PokeApi {
            status: e.status().map(|s| s.as_u16()),
            reason: format!("GET {}: {}", url, e),
        },
    }
}

pub struct PokeApiRoster {
    http: Client,
    base_url: Url,
    config: PokeApiConfig,
    names: Mutex<Option<Vec<String>>>,
    details: Mutex<HashMap<String, CreatureProfile>>,
}

impl PokeApiRoster {
    pub fn new(base_url: &str, config: PokeApiConfig) -> Result<PokeApiRoster, ServiceError> {
        let invalid = |reason: String| ServiceError::PokeApi { status: None, reason };
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| invalid(format!("invalid base url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid(format!("invalid base url {}", base_url)));
        }
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(PokeApiRoster {
            http,
            base_url,
            config,
            names: Mutex::new(None),
            details: Mutex::new(HashMap::new()),
        })
    }

    pub async fn clear_caches(&self) {
        info!("clear caches");
        *self.names.lock().await = None;
        self.details.lock().await.clear();
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn names_url(&self) -> Url {
        let mut url = self.endpoint(&["pokemon"]);
        url.query_pairs_mut()
            .append_pair("limit", &MAX_POKEMON_COUNT.to_string())
            .append_pair("offset", "0");
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        let mut retry = 0;
        loop {
            match self.try_get_json(&url).await {
                Ok(value) => return Ok(value),
                Err(failure) if failure.retryable && retry < self.config.max_retries => {
                    let delay = self.config.retry_delay(retry);
                    retry += 1;
                    warn!(
                        "{}; retry {}/{} in {} ms",
                        failure.error,
                        retry,
                        self.config.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, Failure> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_failure(url, e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Failure {
                retryable: status.is_server_error(),
                error: ServiceError::PokeApi {
                    status: Some(status.as_u16()),
                    reason: format!("GET {} answered {}: {}", url, status, body),
                },
            });
        }
        response.json::<T>().await.map_err(|e| transport_failure(url, e))
    }

    async fn fetch_names(&self) -> Result<Vec<String>, ServiceError> {
        if let Some(names) = self.names.lock().await.as_ref() {
            return Ok(names.clone());
        }
        let list: NameList = self.get_json(self.names_url()).await?;
        let names: Vec<String> = list
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        *self.names.lock().await = Some(names.clone());
        Ok(names)
    }

    async fn fetch_creature(&self, name: &str) -> Result<CreatureProfile, ServiceError> {
        if let Some(profile) = self.details.lock().await.get(name) {
            return Ok(profile.clone());
        }
        let detail: PokemonDetail = self.get_json(self.endpoint(&["pokemon", name])).await?;
        let profile = detail.into_profile()?;
        self.details.lock().await.insert(name.to_string(), profile.clone());
        Ok(profile)
    }
}

#[rocket::async_trait]
impl CreatureSource for PokeApiRoster {
    async fn list_names(&self) -> Result<Vec<String>, ServiceError> {
        let started = Instant::now();
        info!("list_names() started");
        let result = self.fetch_names().await;
        if let Err(e) = &result {
            error!("list_names() failed: {}", e);
            self.clear_caches().await;
        }
        info!("list_names() ended in {} ms.", started.elapsed().as_millis());
        result
    }

    async fn creature(&self, name: &str) -> Result<CreatureProfile, ServiceError> {
        let started = Instant::now();
        info!("creature({}) started", name);
        let result = self.fetch_creature(name).await;
        if let Err(e) = &result {
            error!("creature({}) failed: {}", name, e);
            self.clear_caches().await;
        }
        info!("creature({}) ended in {} ms.", name, started.elapsed().as_millis());
        result
    }
}
