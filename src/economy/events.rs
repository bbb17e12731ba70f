//! Global event register
//!
//! Exactly one event is active at a time. The register only holds the value;
//! consumers read [`GlobalEvent::effects`] and branch on it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalEvent {
    #[default]
    None,
    CyberAttack,
    MarketCrash,
    PoliceRaid,
    BountyHunt,
}

impl GlobalEvent {
    pub const ALL: [GlobalEvent; 5] = [
        GlobalEvent::None,
        GlobalEvent::CyberAttack,
        GlobalEvent::MarketCrash,
        GlobalEvent::PoliceRaid,
        GlobalEvent::BountyHunt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalEvent::None => "NONE",
            GlobalEvent::CyberAttack => "CYBER_ATTACK",
            GlobalEvent::MarketCrash => "MARKET_CRASH",
            GlobalEvent::PoliceRaid => "POLICE_RAID",
            GlobalEvent::BountyHunt => "BOUNTY_HUNT",
        }
    }

    pub fn effects(&self) -> EventEffects {
        match self {
            GlobalEvent::None => EventEffects::NEUTRAL,
            GlobalEvent::BountyHunt => EventEffects {
                combat_reward: 2.0,
                ..EventEffects::NEUTRAL
            },
            GlobalEvent::PoliceRaid => EventEffects {
                raid_risk: 2.0,
                ..EventEffects::NEUTRAL
            },
            GlobalEvent::CyberAttack => EventEffects {
                crystal_price: 1.5,
                ..EventEffects::NEUTRAL
            },
            GlobalEvent::MarketCrash => EventEffects {
                gold_price: 0.5,
                ..EventEffects::NEUTRAL
            },
        }
    }
}

impl fmt::Display for GlobalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlobalEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        GlobalEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == wanted)
            .ok_or_else(|| format!("unknown event '{s}'"))
    }
}

/// Multipliers an event applies to downstream systems
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventEffects {
    pub combat_reward: f32,
    pub raid_risk: f32,
    pub crystal_price: f32,
    pub gold_price: f32,
}

impl EventEffects {
    pub const NEUTRAL: EventEffects = EventEffects {
        combat_reward: 1.0,
        raid_risk: 1.0,
        crystal_price: 1.0,
        gold_price: 1.0,
    };
}
