//! Persistent player state
//!
//! The fight code never owns player data; it reads the active rooster and
//! hands back a [`Settlement`] through [`PlayerStore`].

use serde::{Deserialize, Serialize};

use crate::combat::{Combatant, CombatantStats};
use crate::core::error::{GameError, Result};
use crate::core::types::{Level, Payout, PlayerId, Timestamp};
use crate::economy::ShieldState;
use crate::player::storage::KeyValueStore;

/// Key under which the ledger is saved
pub const PLAYER_KEY: &str = "player";

/// Gold price of one healing potion
pub const HEAL_POTION_PRICE: u64 = 30;

/// Health one potion restores, up to the rooster's maximum
pub const HEAL_POTION_AMOUNT: f32 = 50.0;

/// A rooster the player owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rooster {
    pub combatant: Combatant,
    pub xp: u32,
    pub max_xp: u32,
    pub energy: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
}

impl Rooster {
    pub fn hatch(name: impl Into<String>) -> Self {
        Self {
            combatant: Combatant::new(name, 1, CombatantStats::starter()),
            xp: 0,
            max_xp: 100,
            energy: 100,
            matches_won: 0,
            matches_lost: 0,
        }
    }

    pub fn level(&self) -> Level {
        self.combatant.level
    }

    /// Add xp; returns how many levels were gained
    ///
    /// Each level-up carries the remainder and raises the next threshold
    /// by 20%.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut levels = 0;
        while self.max_xp > 0 && self.xp >= self.max_xp {
            self.xp -= self.max_xp;
            self.combatant.level += 1;
            self.max_xp = self.max_xp.saturating_mul(6) / 5;
            levels += 1;
        }
        levels
    }
}

/// How one fight ends for the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Settlement {
    pub won: bool,
    pub payout: Payout,
    pub energy_cost: u32,
    /// Health the active rooster lost during the fight
    pub damage_taken: f32,
    /// Largest single blow the player landed
    pub best_hit: u32,
}

/// Lifetime counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub total_battles: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_ad_views: u64,
    pub max_damage_dealt: u32,
    pub highest_level_reached: Level,
}

/// What the game needs from whoever keeps player data
pub trait PlayerStore: Send {
    fn active_rooster(&self) -> Option<&Rooster>;

    /// Apply a fight outcome to the active rooster and wallet; returns levels gained
    fn settle(&mut self, settlement: &Settlement) -> Result<u32>;

    /// Credit gold to the wallet and xp to the active rooster; returns levels gained
    fn apply_reward(&mut self, payout: Payout) -> Result<u32>;

    /// Spend energy from the active rooster, stopping at zero
    fn apply_energy_cost(&mut self, cost: u32) -> Result<()>;

    /// Wound the active rooster, stopping at zero health
    fn apply_damage(&mut self, amount: f32) -> Result<()>;

    fn credit_gold(&mut self, amount: u64);
    fn debit_gold(&mut self, amount: u64) -> Result<()>;
    fn credit_crystals(&mut self, amount: u64);

    fn shield(&self) -> &ShieldState;
    fn shield_mut(&mut self) -> &mut ShieldState;

    fn record_ad_view(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLedger {
    pub id: PlayerId,
    pub username: String,
    pub gold: u64,
    pub crystals: u64,
    pub roosters: Vec<Rooster>,
    #[serde(default)]
    pub shield: ShieldState,
    #[serde(default)]
    pub record: PlayerRecord,
    pub created_at: Timestamp,
}

impl PlayerLedger {
    /// Fresh account with one starter rooster
    pub fn new_player(id: impl Into<String>, username: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: PlayerId::new(id),
            username: username.into(),
            gold: 500,
            crystals: 10,
            roosters: vec![Rooster::hatch("Scrapper")],
            shield: ShieldState::default(),
            record: PlayerRecord {
                highest_level_reached: 1,
                ..PlayerRecord::default()
            },
            created_at: now,
        }
    }

    pub fn active_rooster_mut(&mut self) -> Option<&mut Rooster> {
        self.roosters.first_mut()
    }

    /// Buy and drink a healing potion; returns the active rooster's health
    pub fn drink_heal_potion(&mut self) -> Result<f32> {
        if self.roosters.is_empty() {
            return Err(GameError::NoActiveCombatant);
        }
        self.debit_gold(HEAL_POTION_PRICE)?;
        let rooster = self
            .roosters
            .first_mut()
            .ok_or(GameError::NoActiveCombatant)?;
        rooster.combatant.stats.heal(HEAL_POTION_AMOUNT);
        Ok(rooster.combatant.stats.health)
    }

    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>> {
        let Some(raw) = store.get(PLAYER_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        store.put(PLAYER_KEY, &raw)?;
        Ok(())
    }

    pub fn clear(store: &dyn KeyValueStore) -> Result<()> {
        store.remove(PLAYER_KEY)?;
        Ok(())
    }
}

impl PlayerStore for PlayerLedger {
    fn active_rooster(&self) -> Option<&Rooster> {
        self.roosters.first()
    }

    fn settle(&mut self, settlement: &Settlement) -> Result<u32> {
        self.apply_energy_cost(settlement.energy_cost)?;
        self.apply_damage(settlement.damage_taken)?;
        let levels = self.apply_reward(settlement.payout)?;

        let rooster = self
            .roosters
            .first_mut()
            .ok_or(GameError::NoActiveCombatant)?;
        if settlement.won {
            rooster.matches_won += 1;
            self.record.wins += 1;
        } else {
            rooster.matches_lost += 1;
            self.record.losses += 1;
        }
        self.record.total_battles += 1;
        self.record.max_damage_dealt = self.record.max_damage_dealt.max(settlement.best_hit);

        tracing::info!(
            won = settlement.won,
            gold = settlement.payout.gold,
            xp = settlement.payout.xp,
            levels,
            "Fight settled"
        );
        Ok(levels)
    }

    fn apply_reward(&mut self, payout: Payout) -> Result<u32> {
        let rooster = self
            .roosters
            .first_mut()
            .ok_or(GameError::NoActiveCombatant)?;
        let levels = rooster.gain_xp(payout.xp);
        let level = rooster.level();

        self.gold = self.gold.saturating_add(u64::from(payout.gold));
        self.record.highest_level_reached = self.record.highest_level_reached.max(level);
        Ok(levels)
    }

    fn apply_energy_cost(&mut self, cost: u32) -> Result<()> {
        let rooster = self
            .roosters
            .first_mut()
            .ok_or(GameError::NoActiveCombatant)?;
        rooster.energy = rooster.energy.saturating_sub(cost);
        Ok(())
    }

    fn apply_damage(&mut self, amount: f32) -> Result<()> {
        let rooster = self
            .roosters
            .first_mut()
            .ok_or(GameError::NoActiveCombatant)?;
        let health = rooster.combatant.stats.take_damage(amount);
        tracing::debug!(amount, health, "Rooster wounded");
        Ok(())
    }

    fn credit_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    fn debit_gold(&mut self, amount: u64) -> Result<()> {
        if amount > self.gold {
            return Err(GameError::NotEnoughGold {
                have: self.gold,
                need: amount,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    fn credit_crystals(&mut self, amount: u64) {
        self.crystals = self.crystals.saturating_add(amount);
    }

    fn shield(&self) -> &ShieldState {
        &self.shield
    }

    fn shield_mut(&mut self) -> &mut ShieldState {
        &mut self.shield
    }

    fn record_ad_view(&mut self) {
        self.record.total_ad_views += 1;
    }
}
