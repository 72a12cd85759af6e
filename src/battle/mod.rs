use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

pub use crate::battle::creature::Creature;

pub mod creature;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleStatus {
    /// Created, not yet simulated.
    Pending,
    Finished,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinnerSide {
    First,
    Second,
    /// Both sides had equal power.
    Draw,
}

/// A battle snapshot as held by the server and returned on the wire.
///
/// `winner_side` and `finished_at` are present exactly when `status` is
/// [`BattleStatus::Finished`].
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct Battle {
    pub id: u64,
    pub status: BattleStatus,
    pub first: Creature,
    pub second: Creature,
    pub winner_side: Option<WinnerSide>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Battle {
    pub fn pending(id: u64, first: Creature, second: Creature, created_at: DateTime<Utc>) -> Battle {
        Battle {
            id,
            status: BattleStatus::Pending,
            first,
            second,
            winner_side: None,
            created_at,
            finished_at: None,
        }
    }

    /// Returns the finished form of this battle. Identity, creatures and
    /// creation time carry over unchanged.
    pub fn finish(&self, winner_side: WinnerSide, finished_at: DateTime<Utc>) -> Battle {
        Battle {
            status: BattleStatus::Finished,
            winner_side: Some(winner_side),
            finished_at: Some(finished_at),
            ..self.clone()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == BattleStatus::Finished
    }

    /// Checks the status/outcome invariant of a snapshot.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            BattleStatus::Pending => self.winner_side.is_none() && self.finished_at.is_none(),
            BattleStatus::Finished => self.winner_side.is_some() && self.finished_at.is_some(),
        }
    }
}
