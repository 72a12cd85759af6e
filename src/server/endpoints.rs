use log::error;
use rocket::http::Status as HttpStatus;
use rocket::response::status::{Custom, NotFound};
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use super::{BattleService, ServiceError};
use crate::battle::Battle;
use crate::status_messages::{new_status, Status};

/// Create a battle between two random Pokemon
#[openapi]
#[post("/random")]
pub async fn create_random_battle(
    service: &State<BattleService>,
) -> Result<Json<Battle>, Custom<Json<Status>>> {
    match service.create_random_battle().await {
        Ok(battle) => Ok(Json(battle)),
        Err(e) => {
            error!("create_random_battle failed: {}", e);
            Err(Custom(HttpStatus::ServiceUnavailable, new_status(e.to_string())))
        }
    }
}

/// Simulate a pending battle and return it with its winner
#[openapi]
#[post("/<id>/simulate")]
pub async fn simulate_battle(
    service: &State<BattleService>,
    id: u64,
) -> Result<Json<Battle>, NotFound<Json<Status>>> {
    service.simulate_battle(id).await.map(Json).map_err(|e| {
        if !matches!(e, ServiceError::NotFound(_)) {
            error!("simulate_battle({}) failed: {}", id, e);
        }
        NotFound(new_status(e.to_string()))
    })
}

/// List the latest finished battles, optionally filtered by Pokemon name
#[openapi]
#[get("/?<q>")]
pub async fn list_battles(service: &State<BattleService>, q: Option<String>) -> Json<Vec<Battle>> {
    Json(service.search_battles(q.as_deref()).await)
}
