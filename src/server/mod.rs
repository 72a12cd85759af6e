//! Reference battle server: the remote side of the battle client.

use log::{info, warn};
use thiserror::Error;

use crate::config::BattleServerConfig;
use pokeapi::PokeApiRoster;
use roster::{CreatureSource, StaticRoster};

pub mod endpoints;
pub mod pokeapi;
pub mod roster;
pub mod service;

pub use service::BattleService;

/// Mount point of the battle resource.
pub const BATTLES_BASE: &str = "/api/battles";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Battle not found with id: {0}")]
    NotFound(u64),
    #[error("Not enough Pokemon available to create a battle ({0} known).")]
    NotEnoughCreatures(usize),
    #[error("Unknown Pokemon: {0}")]
    UnknownCreature(String),
    #[error("Invalid pokemon: {0}")]
    InvalidCreature(String),
    /// The remote roster failed; `status` is set when it answered with one.
    #[error("Error occurred during PokeAPI call: {reason}")]
    PokeApi { status: Option<u16>, reason: String },
}

/// The PokeAPI roster when `pokeapi.base_url` is configured, the built-in
/// roster otherwise or when the remote one cannot be set up.
pub fn creature_source(config: &BattleServerConfig) -> Box<dyn CreatureSource> {
    let Some(base_url) = config.pokeapi.base_url.as_deref() else {
        info!("using the built-in roster");
        return Box::new(StaticRoster::default());
    };
    match PokeApiRoster::new(base_url, config.pokeapi.clone()) {
        Ok(roster) => {
            info!("using the PokeAPI roster at {}", base_url);
            Box::new(roster)
        }
        Err(e) => {
            warn!("{}; falling back to the built-in roster", e);
            Box::new(StaticRoster::default())
        }
    }
}
