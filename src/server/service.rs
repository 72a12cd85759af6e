use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::Utc;
use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Lcg64Xsh32;
use rocket::futures::lock::Mutex;

use super::roster::{CreatureProfile, CreatureSource};
use super::ServiceError;
use crate::battle::{Battle, BattleStatus, Creature, WinnerSide};
use crate::config::BattleServerConfig;

#[derive(Default)]
struct BattleStore {
    by_id: HashMap<u64, Battle>,
    /// Finished battles, newest first.
    finished: Vec<Battle>,
}

/// In-memory battle store with random creation and power-based simulation.
pub struct BattleService {
    roster: Box<dyn CreatureSource>,
    config: BattleServerConfig,
    store: Mutex<BattleStore>,
    next_id: AtomicU64,
    rng: Mutex<Lcg64Xsh32>,
}

impl BattleService {
    pub fn new(roster: Box<dyn CreatureSource>, config: BattleServerConfig) -> BattleService {
        let config = config.normalized();
        let rng = match config.seed {
            Some(seed) => Lcg64Xsh32::seed_from_u64(seed),
            None => Lcg64Xsh32::from_entropy(),
        };
        BattleService {
            roster,
            config,
            store: Mutex::new(BattleStore::default()),
            next_id: AtomicU64::new(0),
            rng: Mutex::new(rng),
        }
    }

    pub async fn create_random_battle(&self) -> Result<Battle, ServiceError> {
        let started = Instant::now();
        info!("create_random_battle() started");
        let result = self.roll_battle().await;
        info!("create_random_battle() ended in {} ms.", started.elapsed().as_millis());
        result
    }

    async fn roll_battle(&self) -> Result<Battle, ServiceError> {
        let names = self.roster.list_names().await?;
        if names.len() < 2 {
            return Err(ServiceError::NotEnoughCreatures(names.len()));
        }

        let (first_name, second_name, first_power, second_power) = {
            let mut rng = self.rng.lock().await;
            let first = rng.gen_range(0..names.len());
            let mut second = rng.gen_range(0..names.len() - 1);
            if second >= first {
                second += 1;
            }
            let range = self.config.min_power..=self.config.max_power;
            (
                &names[first],
                &names[second],
                rng.gen_range(range.clone()),
                rng.gen_range(range),
            )
        };

        let first = self.to_creature(self.roster.creature(first_name).await?, first_power)?;
        let second = self.to_creature(self.roster.creature(second_name).await?, second_power)?;

        let battle = Battle::pending(self.next_id.fetch_add(1, Ordering::SeqCst), first, second, Utc::now());
        self.store.lock().await.by_id.insert(battle.id, battle.clone());
        Ok(battle)
    }

    fn to_creature(&self, profile: CreatureProfile, power: u8) -> Result<Creature, ServiceError> {
        profile.validate()?;
        let image_url = profile
            .image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.config.fallback_sprite.clone());
        Ok(Creature {
            name: profile.name,
            types: profile.types,
            image_url,
            power,
        })
    }

    /// Resolves a pending battle. Simulating an already finished battle
    /// returns it unchanged.
    pub async fn simulate_battle(&self, id: u64) -> Result<Battle, ServiceError> {
        let started = Instant::now();
        info!("simulate_battle({}) started", id);
        let result = {
            let mut store = self.store.lock().await;
            match store.by_id.get(&id) {
                None => Err(ServiceError::NotFound(id)),
                Some(existing) if existing.status == BattleStatus::Finished => Ok(existing.clone()),
                Some(existing) => {
                    let side = decide_winner(&existing.first, &existing.second);
                    let finished = existing.finish(side, Utc::now());
                    store.by_id.insert(id, finished.clone());
                    store.finished.insert(0, finished.clone());
                    Ok(finished)
                }
            }
        };
        info!("simulate_battle({}) ended in {} ms.", id, started.elapsed().as_millis());
        result
    }

    /// Finished battles, newest first, filtered by creature name and capped
    /// at `max_returned_battles`.
    pub async fn search_battles(&self, query: Option<&str>) -> Vec<Battle> {
        let started = Instant::now();
        info!("search_battles() started");
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let found = self
            .store
            .lock()
            .await
            .finished
            .iter()
            .filter(|b| matches_query(b, query))
            .take(self.config.max_returned_battles)
            .cloned()
            .collect();
        info!("search_battles() ended in {} ms.", started.elapsed().as_millis());
        found
    }
}

pub fn decide_winner(first: &Creature, second: &Creature) -> WinnerSide {
    use std::cmp::Ordering as Cmp;
    match first.power.cmp(&second.power) {
        Cmp::Greater => WinnerSide::First,
        Cmp::Less => WinnerSide::Second,
        Cmp::Equal => WinnerSide::Draw,
    }
}

/// Case-insensitive substring match on either creature name. Pending
/// battles never match.
pub fn matches_query(battle: &Battle, query: Option<&str>) -> bool {
    if battle.status != BattleStatus::Finished {
        return false;
    }
    match query {
        None => true,
        Some(q) => {
            let q = q.to_lowercase();
            battle.first.name.to_lowercase().contains(&q) || battle.second.name.to_lowercase().contains(&q)
        }
    }
}
