//! Pluggable fight resolution
//!
//! The turn-based resolver and the slingshot autoplayer both produce a
//! [`CombatResult`], so callers can swap one for the other.

use crate::combat::{CombatError, CombatResult, Combatant, TurnBasedResolver};
use crate::core::rng::RandomSource;
use crate::player::notify::{Notification, NotificationSink};

pub trait CombatEngine: Send {
    /// Short label for logs
    fn name(&self) -> &'static str;

    fn resolve(
        &mut self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RandomSource,
    ) -> Result<CombatResult, CombatError>;
}

impl CombatEngine for TurnBasedResolver {
    fn name(&self) -> &'static str {
        "turn-based"
    }

    fn resolve(
        &mut self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RandomSource,
    ) -> Result<CombatResult, CombatError> {
        TurnBasedResolver::resolve(self, attacker, defender, rng)
    }
}

/// Resolve a fight and announce it
///
/// Emits `BattleStart`, one `Hit` per landed blow by the attacker, then
/// `Success` or `Error` depending on who won.
pub fn fight(
    engine: &mut dyn CombatEngine,
    attacker: &Combatant,
    defender: &Combatant,
    rng: &mut dyn RandomSource,
    sink: &dyn NotificationSink,
) -> Result<CombatResult, CombatError> {
    let result = engine.resolve(attacker, defender, rng)?;

    sink.notify(Notification::BattleStart {
        opponent: defender.name.clone(),
    });
    for round in result
        .rounds
        .iter()
        .filter(|r| r.attacker_id == attacker.id && !r.is_miss)
    {
        sink.notify(Notification::Hit {
            damage: round.damage,
            critical: round.is_critical,
        });
    }
    if result.is_winner(attacker.id) {
        sink.notify(Notification::success(format!(
            "{} wins! +{} gold, +{} xp",
            attacker.name,
            result.rewards.gold(),
            result.rewards.xp()
        )));
    } else {
        sink.notify(Notification::error(format!(
            "{} was knocked out by {}",
            attacker.name, defender.name
        )));
    }

    tracing::info!(
        engine = engine.name(),
        attacker = %attacker.name,
        defender = %defender.name,
        won = result.is_winner(attacker.id),
        rounds = result.rounds.len(),
        "Fight finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::CombatantStats;
    use crate::core::rng::ScriptedRolls;
    use crate::player::notify::RecordingNotifier;

    #[test]
    fn test_fight_announces_start_hits_and_outcome() {
        let a = Combatant::new("Hero", 1, CombatantStats::new(100.0, 50.0, 0.0, 10.0, 0.0));
        let b = Combatant::new("Mook", 2, CombatantStats::new(60.0, 1.0, 0.0, 1.0, 0.0));
        let mut engine = TurnBasedResolver::default();
        let sink = RecordingNotifier::new();
        // hit, hit (B misses in between)
        let mut rolls = ScriptedRolls::new([0.0, 0.99, 0.99, 0.0, 0.99]);

        let result = fight(&mut engine, &a, &b, &mut rolls, &sink).unwrap();
        assert!(result.is_winner(a.id));

        let seen = sink.snapshot();
        assert!(matches!(seen.first(), Some(Notification::BattleStart { .. })));
        assert_eq!(sink.count(|n| matches!(n, Notification::Hit { .. })), 2);
        assert!(matches!(seen.last(), Some(Notification::Success { .. })));
    }

    #[test]
    fn test_rejected_fight_is_silent() {
        let a = Combatant::starter();
        let sink = RecordingNotifier::new();
        let mut engine = TurnBasedResolver::default();
        let mut rolls = ScriptedRolls::new([]);
        assert!(fight(&mut engine, &a, &a, &mut rolls, &sink).is_err());
        assert!(sink.snapshot().is_empty());
    }
}
