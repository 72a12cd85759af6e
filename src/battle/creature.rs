use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

/// A creature taking part in a battle.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct Creature {
    pub name: String,
    /// Comma separated, e.g. "fire, flying".
    #[serde(default)]
    pub types: String,
    #[serde(default)]
    pub image_url: String,
    /// Combat power rolled at battle creation, 1..=20 by default.
    #[serde(default)]
    pub power: u8,
}

impl Creature {
    pub fn new(name: &str, types: &str, image_url: &str, power: u8) -> Creature {
        Creature {
            name: name.to_string(),
            types: types.to_string(),
            image_url: image_url.to_string(),
            power,
        }
    }

    pub fn named(name: &str) -> Creature {
        Creature::new(name, "", "", 0)
    }
}
