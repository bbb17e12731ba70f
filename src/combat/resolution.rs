//! Turn-based fight resolution
//!
//! Sides alternate turns. Each turn is one hit roll and, on a hit, one
//! critical roll. The round cap guarantees termination.

use std::sync::Arc;

use crate::combat::{
    check_matchup, CombatError, CombatResult, CombatRound, Combatant, Commentary,
    CommentaryCategory, CommentaryTable, Rewards,
};
use crate::core::config::CombatConfig;
use crate::core::rng::RandomSource;
use crate::core::types::Payout;

/// Resolves a whole fight in one call
#[derive(Clone)]
pub struct TurnBasedResolver {
    config: CombatConfig,
    commentary: Arc<dyn Commentary>,
}

impl TurnBasedResolver {
    pub fn new(config: CombatConfig) -> Self {
        Self::with_commentary(config, Arc::new(CommentaryTable))
    }

    pub fn with_commentary(config: CombatConfig, commentary: Arc<dyn Commentary>) -> Self {
        Self { config, commentary }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Chance that `acting_speed` lands a blow on `target_speed`
    pub fn hit_chance(&self, acting_speed: f32, target_speed: f32) -> f64 {
        let delta = acting_speed as f64 - target_speed as f64;
        (self.config.base_hit_chance + self.config.hit_chance_per_speed * delta)
            .clamp(self.config.min_hit_chance, self.config.max_hit_chance)
    }

    /// Damage of a landed blow, never below 1
    pub fn damage(&self, attack: f32, target_defense: f32, critical: bool) -> u32 {
        let raw = if critical {
            attack * self.config.critical_multiplier
        } else {
            attack
        };
        let reduced = (raw - self.config.defense_factor * target_defense).floor();
        reduced.max(1.0) as u32
    }

    /// What the initiating attacker earns
    /// Payout for the attacker; a win also rolls once on the loot table
    pub fn rewards(
        &self,
        attacker_won: bool,
        loser: &Combatant,
        rng: &mut dyn RandomSource,
    ) -> Rewards {
        if !attacker_won {
            return Rewards::new(self.config.consolation);
        }
        let mut rewards = Rewards::new(Payout::new(
            loser.level.saturating_mul(self.config.gold_per_loser_level),
            loser.level.saturating_mul(self.config.xp_per_loser_level),
        ));
        let table = &self.config.loot_table;
        if !table.is_empty() && rng.next_unit() < self.config.loot_chance {
            let pick = rng.below(table.len().min(u32::MAX as usize) as u32) as usize;
            rewards.item = Some(table[pick].clone());
        }
        rewards
    }

    /// Fight `attacker` against `defender` until one drops or the cap hits
    ///
    /// Inputs are not mutated; the caller applies the outcome to whatever
    /// persistent state it keeps.
    pub fn resolve(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RandomSource,
    ) -> Result<CombatResult, CombatError> {
        check_matchup(attacker, defender)?;

        let fighters = [attacker, defender];
        let mut health = [attacker.stats.health, defender.stats.health];
        // Index 0 is the initiating attacker; ties go to them
        let mut acting = if attacker.stats.speed >= defender.stats.speed {
            0
        } else {
            1
        };

        let cap = self.config.max_rounds as usize;
        let mut rounds = Vec::with_capacity(cap);
        let mut hits = 0usize;
        let mut misses = 0usize;
        let mut crits = 0usize;

        while health[0] > 0.0 && health[1] > 0.0 && rounds.len() < cap {
            let target = 1 - acting;
            let a = fighters[acting];
            let t = fighters[target];

            let landed = rng.next_unit() < self.hit_chance(a.stats.speed, t.stats.speed);
            let round = if landed {
                let critical = rng.next_unit() < a.stats.critical_probability();
                let damage = self.damage(a.stats.attack, t.stats.defense, critical);
                health[target] = (health[target] - damage as f32).max(0.0);
                let commentary = if critical {
                    crits += 1;
                    self.commentary.line(CommentaryCategory::Critical, crits - 1)
                } else {
                    hits += 1;
                    self.commentary.line(CommentaryCategory::Hit, hits - 1)
                };
                CombatRound::hit(
                    a.id,
                    t.id,
                    damage,
                    critical,
                    commentary,
                    (health[acting], health[target]),
                )
            } else {
                misses += 1;
                let commentary = self.commentary.line(CommentaryCategory::Miss, misses - 1);
                CombatRound::miss(a.id, t.id, commentary, (health[acting], health[target]))
            };
            rounds.push(round);
            acting = target;
        }

        let decided_on_points = health[0] > 0.0 && health[1] > 0.0;
        let attacker_won = if health[1] <= 0.0 {
            true
        } else if health[0] <= 0.0 {
            false
        } else {
            // On points; an exact tie leaves the defender standing
            health[0] > health[1]
        };

        let (winner, loser) = if attacker_won {
            (attacker, defender)
        } else {
            (defender, attacker)
        };

        tracing::debug!(
            winner = %winner.name,
            loser = %loser.name,
            rounds = rounds.len(),
            decided_on_points,
            "Fight resolved"
        );

        Ok(CombatResult {
            winner_id: winner.id,
            loser_id: loser.id,
            rounds,
            rewards: self.rewards(attacker_won, loser, rng),
            decided_on_points,
        })
    }
}

impl Default for TurnBasedResolver {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl std::fmt::Debug for TurnBasedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnBasedResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
