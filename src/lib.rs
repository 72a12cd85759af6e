//! # Pokemon Battle
//!
//! Two random Pokemon meet, the server decides who wins, and past battles
//! can be searched.
//!
//! ## Overview
//!
//! The client side is built around [`orchestrator::BattleOrchestrator`],
//! which creates a battle and then simulates it through a
//! [`client::BattleApi`], publishing every phase through an observable
//! state holder. [`history::HistoryBrowser`] fetches the list of past
//! battles and keeps only the latest response. [`presentation`] derives the
//! facts a view needs (winner name, winner/loser pair) and renders them as
//! text.
//!
//! ## Architecture
//!
//! The reference server in [`server`] is a Rocket application with
//! OpenAPI documentation. Battles live in memory behind an async mutex so
//! concurrent HTTP requests can share them.

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub mod battle;
pub mod client;
pub mod config;
pub mod history;
pub mod orchestrator;
pub mod presentation;
pub mod router;
pub mod server;
pub mod state;
pub mod status_messages;

use crate::config::BattleServerConfig;
use crate::server::roster::CreatureSource;
use crate::server::{creature_source, BattleService, BATTLES_BASE};

/// Builds the battle server from the settings found in the Rocket
/// configuration, including which creature roster to use.
///
/// # Example
///
/// ```no_run
/// use pokemon_battle::rocket_initialize;
///
/// #[rocket::main]
/// async fn main() {
///     rocket_initialize().launch().await.expect("Failed to launch rocket");
/// }
/// ```
pub fn rocket_initialize() -> rocket::Rocket<rocket::Build> {
    let figment = rocket::Config::figment();
    let config = BattleServerConfig::from_figment(&figment);
    rocket_initialize_with(creature_source(&config), config)
}

pub fn rocket_initialize_with(
    roster: Box<dyn CreatureSource>,
    config: BattleServerConfig,
) -> rocket::Rocket<rocket::Build> {
    use crate::server::endpoints::okapi_add_operation_for_create_random_battle_;
    use crate::server::endpoints::okapi_add_operation_for_list_battles_;
    use crate::server::endpoints::okapi_add_operation_for_simulate_battle_;
    use crate::server::endpoints::{create_random_battle, list_battles, simulate_battle};

    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    rocket::build()
        .mount(
            BATTLES_BASE,
            openapi_get_routes![create_random_battle, simulate_battle, list_battles],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
        .manage(BattleService::new(roster, config))
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: format!("{}/openapi.json", BATTLES_BASE),
        ..Default::default()
    }
}
