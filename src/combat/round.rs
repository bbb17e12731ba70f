//! Fight log entries and final results

use serde::{Deserialize, Serialize};

use crate::core::types::{CombatantId, Payout};

/// One resolved turn
///
/// Health values are the post-round health of this round's attacker and
/// defender, never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatRound {
    pub attacker_id: CombatantId,
    pub defender_id: CombatantId,
    pub damage: u32,
    pub is_critical: bool,
    pub is_miss: bool,
    pub commentary: String,
    pub attacker_health: f32,
    pub defender_health: f32,
}

impl CombatRound {
    pub fn hit(
        attacker_id: CombatantId,
        defender_id: CombatantId,
        damage: u32,
        is_critical: bool,
        commentary: String,
        health: (f32, f32),
    ) -> Self {
        Self {
            attacker_id,
            defender_id,
            damage,
            is_critical,
            is_miss: false,
            commentary,
            attacker_health: health.0.max(0.0),
            defender_health: health.1.max(0.0),
        }
    }

    pub fn miss(
        attacker_id: CombatantId,
        defender_id: CombatantId,
        commentary: String,
        health: (f32, f32),
    ) -> Self {
        Self {
            attacker_id,
            defender_id,
            damage: 0,
            is_critical: false,
            is_miss: true,
            commentary,
            attacker_health: health.0.max(0.0),
            defender_health: health.1.max(0.0),
        }
    }

    /// Health of `id` after this round, if it took part
    pub fn health_of(&self, id: CombatantId) -> Option<f32> {
        if id == self.attacker_id {
            Some(self.attacker_health)
        } else if id == self.defender_id {
            Some(self.defender_health)
        } else {
            None
        }
    }
}

/// What the initiating attacker takes home
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    pub payout: Payout,
    /// Catalog id of a dropped item
    pub item: Option<String>,
}

impl Rewards {
    pub fn new(payout: Payout) -> Self {
        Self { payout, item: None }
    }

    pub fn gold(&self) -> u32 {
        self.payout.gold
    }

    pub fn xp(&self) -> u32 {
        self.payout.xp
    }
}

/// Terminal outcome of a fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub winner_id: CombatantId,
    pub loser_id: CombatantId,
    pub rounds: Vec<CombatRound>,
    pub rewards: Rewards,
    /// True when the round cap ended the fight with both sides standing
    pub decided_on_points: bool,
}

impl CombatResult {
    pub fn is_winner(&self, id: CombatantId) -> bool {
        self.winner_id == id
    }

    /// Last recorded health of `id`
    pub fn final_health(&self, id: CombatantId) -> Option<f32> {
        self.rounds.iter().rev().find_map(|r| r.health_of(id))
    }

    pub fn total_damage_by(&self, id: CombatantId) -> u32 {
        self.rounds
            .iter()
            .filter(|r| r.attacker_id == id)
            .map(|r| r.damage)
            .sum()
    }
}
