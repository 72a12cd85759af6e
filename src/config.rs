//! Configuration for the battle client and the reference server.
//!
//! Both are layered with [`rocket::figment`]: the client reads
//! defaults, then an optional `BattleClient.toml`, then `BATTLE_CLIENT_*`
//! environment variables. The server reads its section from the regular
//! Rocket figment (`Rocket.toml`, `ROCKET_*`).

use std::path::Path;
use std::time::Duration;

use rocket::figment::providers::{Env, Format, Serialized, Toml};
use rocket::figment::Figment;
use rocket::serde::{Deserialize, Serialize};

use crate::client::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/battles";
pub const DEFAULT_CLIENT_CONFIG_FILE: &str = "BattleClient.toml";
pub const DEFAULT_FALLBACK_SPRITE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/0.png";
pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ClientConfig {
    /// Root of the battle resource, e.g. `http://host:8000/api/battles`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 5,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> ClientConfig {
        ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("BATTLE_CLIENT_"))
    }

    pub fn load(file: &Path) -> Result<ClientConfig, ClientError> {
        ClientConfig::figment(file)
            .extract()
            .map_err(|e| ClientError::Config(e.to_string()))
    }
}

/// Remote creature roster. Read from the `pokeapi` table of the Rocket
/// configuration; the built-in roster is used while `base_url` is unset.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct PokeApiConfig {
    /// e.g. [`POKEAPI_BASE_URL`].
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// Retries after the first attempt, for 5xx answers and I/O failures.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub retry_multiplier: f64,
    pub max_retry_delay_ms: u64,
}

impl Default for PokeApiConfig {
    fn default() -> Self {
        PokeApiConfig {
            base_url: None,
            timeout_secs: 5,
            max_retries: 4,
            retry_delay_ms: 500,
            retry_multiplier: 1.5,
            max_retry_delay_ms: 3000,
        }
    }
}

impl PokeApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Wait before retry number `retry` (zero based): the initial delay
    /// grown by the multiplier, capped at the maximum delay.
    pub fn retry_delay(&self, retry: u32) -> Duration {
        let max = Duration::from_millis(self.max_retry_delay_ms);
        let grown = self.retry_delay_ms as f64 * self.retry_multiplier.powi(retry.min(64) as i32);
        Duration::try_from_secs_f64(grown / 1000.0).map_or(max, |delay| delay.min(max))
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct BattleServerConfig {
    pub max_returned_battles: usize,
    pub min_power: u8,
    pub max_power: u8,
    pub fallback_sprite: String,
    /// Fixed RNG seed; battles are rolled from entropy when unset.
    pub seed: Option<u64>,
    pub pokeapi: PokeApiConfig,
}

impl Default for BattleServerConfig {
    fn default() -> Self {
        BattleServerConfig {
            max_returned_battles: 20,
            min_power: 1,
            max_power: 20,
            fallback_sprite: DEFAULT_FALLBACK_SPRITE.to_string(),
            seed: None,
            pokeapi: PokeApiConfig::default(),
        }
    }
}

impl BattleServerConfig {
    pub fn from_figment(figment: &Figment) -> BattleServerConfig {
        match figment.extract::<BattleServerConfig>() {
            Ok(config) => config.normalized(),
            Err(e) => {
                log::warn!("invalid battle server configuration, using defaults: {}", e);
                BattleServerConfig::default()
            }
        }
    }

    /// Swaps an inverted power range so rolling never panics.
    pub fn normalized(mut self) -> BattleServerConfig {
        if self.min_power > self.max_power {
            std::mem::swap(&mut self.min_power, &mut self.max_power);
        }
        self
    }
}
