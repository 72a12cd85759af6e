//! Where the server gets its creatures from.

use super::ServiceError;

/// Species data before a battle rolls its power.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CreatureProfile {
    pub name: String,
    pub types: String,
    /// `None` when the source has no sprite; the service substitutes its fallback.
    pub image_url: Option<String>,
}

impl CreatureProfile {
    pub fn new(name: &str, types: &str, image_url: Option<&str>) -> CreatureProfile {
        CreatureProfile {
            name: name.to_string(),
            types: types.to_string(),
            image_url: image_url.map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() || self.types.trim().is_empty() {
            return Err(ServiceError::InvalidCreature(format!("{:?}", self)));
        }
        Ok(())
    }
}

#[rocket::async_trait]
pub trait CreatureSource: Send + Sync {
    async fn list_names(&self) -> Result<Vec<String>, ServiceError>;

    async fn creature(&self, name: &str) -> Result<CreatureProfile, ServiceError>;
}

#[derive(Clone, Debug)]
pub struct StaticRoster {
    profiles: Vec<CreatureProfile>,
}

const SPRITE_BASE: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

impl StaticRoster {
    pub fn new(profiles: Vec<CreatureProfile>) -> StaticRoster {
        StaticRoster { profiles }
    }
}

impl Default for StaticRoster {
    fn default() -> Self {
        let entries: [(u32, &str, &str); 12] = [
            (1, "bulbasaur", "grass, poison"),
            (4, "charmander", "fire"),
            (6, "charizard", "fire, flying"),
            (7, "squirtle", "water"),
            (25, "pikachu", "electric"),
            (39, "jigglypuff", "normal, fairy"),
            (52, "meowth", "normal"),
            (54, "psyduck", "water"),
            (63, "abra", "psychic"),
            (94, "gengar", "ghost, poison"),
            (95, "onix", "rock, ground"),
            (133, "eevee", "normal"),
        ];
        StaticRoster::new(
            entries
                .iter()
                .map(|(id, name, types)| CreatureProfile {
                    name: name.to_string(),
                    types: types.to_string(),
                    image_url: Some(format!("{}/{}.png", SPRITE_BASE, id)),
                })
                .collect(),
        )
    }
}

#[rocket::async_trait]
impl CreatureSource for StaticRoster {
    async fn list_names(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.profiles.iter().map(|p| p.name.clone()).collect())
    }

    async fn creature(&self, name: &str) -> Result<CreatureProfile, ServiceError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownCreature(name.to_string()))
    }
}
