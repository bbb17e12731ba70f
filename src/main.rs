//! Rooster Empire - command line driver
//!
//! Headless front ends for the game core: batch duels, offline economy
//! simulation, a bot-played slingshot fight and the live economy ticker.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use rooster_empire::arena::autoplay::LAUNCH_STEP_LIMIT;
use rooster_empire::arena::{random_pull, Arena, Encounter, Outcome, PointerInput, SlingshotEngine};
use rooster_empire::combat::{CombatEngine, Combatant, CombatantStats, TurnBasedResolver};
use rooster_empire::core::clock::{Clock, ManualClock, SystemClock};
use rooster_empire::core::config::GameConfig;
use rooster_empire::core::error::Result;
use rooster_empire::core::rng::GameRng;
use rooster_empire::core::types::MS_PER_HOUR;
use rooster_empire::economy::ticker::{share, snapshot};
use rooster_empire::economy::{spawn_ticker, EconomyEngine, GlobalEvent, MarketMood};
use rooster_empire::player::{
    EnemyProvider, FileStore, PlayerLedger, PlayerStore, ScaledEnemyProvider, TracingNotifier,
};

#[derive(Parser, Debug)]
#[command(name = "rooster-empire")]
#[command(about = "Rooster street-fighting game core")]
struct Cli {
    /// TOML configuration file; defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Batch of starter-vs-zone fights, resolved in parallel
    Duel {
        #[arg(long, default_value = "d1")]
        zone: String,

        #[arg(long, default_value_t = 1000)]
        count: u32,

        #[arg(long, value_enum, default_value_t = EngineKind::TurnBased)]
        engine: EngineKind,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Run the economy offline for a number of simulated hours
    Economy {
        #[arg(long, default_value_t = 24)]
        hours: u64,

        /// Global event to force at the start
        #[arg(long)]
        event: Option<GlobalEvent>,

        /// Crystals claimed by the player base per tick
        #[arg(long, default_value_t = 0)]
        claims_per_tick: u32,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Bot-played slingshot fight against a zone enemy
    Arena {
        #[arg(long, default_value = "d1")]
        zone: String,

        #[arg(long)]
        event: Option<GlobalEvent>,

        /// Keep the player ledger in this directory between runs
        #[arg(long)]
        save_dir: Option<PathBuf>,

        #[arg(long, default_value_t = 50)]
        max_launches: u32,

        /// Buy and drink healing potions before the fight
        #[arg(long, default_value_t = 0)]
        potions: u32,
    },

    /// Live economy ticker for a few seconds
    Ticker {
        #[arg(long, default_value_t = 5)]
        seconds: u64,

        #[arg(long, default_value_t = 500)]
        period_ms: u64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EngineKind {
    TurnBased,
    Slingshot,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rooster_empire=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "Rooster Empire starting");

    match cli.command {
        Command::Duel {
            zone,
            count,
            engine,
            format,
        } => run_duels(&config, &zone, count, engine, format, seed),
        Command::Economy {
            hours,
            event,
            claims_per_tick,
            format,
        } => run_economy(&config, hours, event, claims_per_tick, format, seed),
        Command::Arena {
            zone,
            event,
            save_dir,
            max_launches,
            potions,
        } => run_arena(
            &config,
            &zone,
            event,
            save_dir.as_deref(),
            max_launches,
            potions,
            seed,
        ),
        Command::Ticker { seconds, period_ms } => run_ticker(&config, seconds, period_ms, seed),
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => {
            let config = GameConfig::load(path)?;
            tracing::info!(path = %path.display(), "Loaded config");
            Ok(config)
        }
        None => Ok(GameConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize, Debug, Default)]
struct DuelSummary {
    engine: &'static str,
    zone: String,
    fights: u32,
    wins: u32,
    losses: u32,
    decided_on_points: u32,
    average_rounds: f64,
    gold_earned: u64,
    xp_earned: u64,
    items_found: Vec<String>,
    seed: u64,
}

fn make_engine(config: &GameConfig, kind: EngineKind) -> Result<Box<dyn CombatEngine>> {
    Ok(match kind {
        EngineKind::TurnBased => Box::new(TurnBasedResolver::new(config.combat.clone())),
        EngineKind::Slingshot => Box::new(SlingshotEngine::new(
            config.arena.clone(),
            config.combat.max_rounds,
        )?),
    })
}

fn run_duels(
    config: &GameConfig,
    zone: &str,
    count: u32,
    kind: EngineKind,
    format: Format,
    seed: u64,
) -> Result<()> {
    let provider = ScaledEnemyProvider::new(config.zones.clone());
    let opponent = provider.enemy_for_zone(zone, &mut GameRng::seeded(seed))?;
    let hero = Combatant::new("Scrapper", 1, CombatantStats::starter());
    let engine_name = make_engine(config, kind)?.name();

    let results = (0..count)
        .into_par_iter()
        .map(|i| -> Result<_> {
            let mut engine = make_engine(config, kind)?;
            let mut rng = GameRng::seeded(seed.wrapping_add(u64::from(i)));
            Ok(engine.resolve(&hero, &opponent, &mut rng)?)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut summary = DuelSummary {
        engine: engine_name,
        zone: zone.to_string(),
        fights: count,
        seed,
        ..DuelSummary::default()
    };
    let mut rounds = 0usize;
    for result in &results {
        rounds += result.rounds.len();
        if result.is_winner(hero.id) {
            summary.wins += 1;
        } else {
            summary.losses += 1;
        }
        if result.decided_on_points {
            summary.decided_on_points += 1;
        }
        summary.gold_earned += u64::from(result.rewards.gold());
        summary.xp_earned += u64::from(result.rewards.xp());
        summary.items_found.extend(result.rewards.item.clone());
    }
    if !results.is_empty() {
        summary.average_rounds = rounds as f64 / results.len() as f64;
    }

    match format {
        Format::Json => print_json(&summary)?,
        Format::Text => {
            println!(
                "{} vs {} ({}), {} fights, {} engine",
                hero.name, opponent.name, zone, summary.fights, summary.engine
            );
            println!(
                "  wins {}  losses {}  on points {}",
                summary.wins, summary.losses, summary.decided_on_points
            );
            println!(
                "  avg rounds {:.1}  gold {}  xp {}  items {}",
                summary.average_rounds,
                summary.gold_earned,
                summary.xp_earned,
                summary.items_found.len()
            );
        }
    }
    Ok(())
}

fn run_economy(
    config: &GameConfig,
    hours: u64,
    event: Option<GlobalEvent>,
    claims_per_tick: u32,
    format: Format,
    seed: u64,
) -> Result<()> {
    let clock = ManualClock::starting_at(SystemClock.now());
    let mut rng = GameRng::seeded(seed);
    let mut engine = EconomyEngine::new(config.economy.clone(), clock.now())?;
    if let Some(event) = event {
        engine.set_event(event, clock.now());
    }

    let step = config.economy.tick_interval_ms.max(1);
    let start = clock.now();
    let end = start.saturating_add(hours.saturating_mul(MS_PER_HOUR));
    let mut rejected = 0u32;
    while clock.now() < end {
        let now = clock.advance(step);
        let report = engine.tick(now, &mut rng);
        if claims_per_tick > 0 && engine.claim(claims_per_tick).is_err() {
            rejected += 1;
        }
        if report.drains > 0 && format == Format::Text {
            println!(
                "[{:>6.1}h] drain x{}: stability {:.1} (-{:.2})",
                (now - start) as f64 / MS_PER_HOUR as f64,
                report.drains,
                engine.state().stability_index,
                report.stability_lost
            );
        }
    }

    let state = engine.current_state();
    match format {
        Format::Json => print_json(&state)?,
        Format::Text => {
            let mood = MarketMood::assess(&state);
            println!(
                "after {hours}h: stability {:.1} ({:?}), pool {}/{} claimed ({:.0}%), event {}",
                state.stability_index,
                state.status,
                state.claimed_crystals,
                state.daily_crystal_pool,
                mood.pool_usage * 100.0,
                state.current_event
            );
            println!(
                "  crystal price x{:.2}  gold price x{:.2}",
                mood.crystal_price, mood.gold_price
            );
            println!(
                "  volatility {:?}  sentiment {:?}  black market {}  rejected claims {}",
                mood.volatility,
                mood.sentiment,
                if engine.black_market_open() { "open" } else { "closed" },
                rejected
            );
        }
    }
    Ok(())
}

fn run_arena(
    config: &GameConfig,
    zone: &str,
    event: Option<GlobalEvent>,
    save_dir: Option<&Path>,
    max_launches: u32,
    potions: u32,
    seed: u64,
) -> Result<()> {
    let files = save_dir.map(FileStore::open).transpose()?;
    let mut ledger = match &files {
        Some(files) => PlayerLedger::load(files)?,
        None => None,
    }
    .unwrap_or_else(|| PlayerLedger::new_player("local", "player", SystemClock.now()));
    for _ in 0..potions {
        let health = ledger.drink_heal_potion()?;
        println!("Potion: health {health:.0}, gold {}", ledger.gold);
    }

    let mut rng = GameRng::seeded(seed);
    let arena = Arena::standard(&config.arena)?;
    let mut encounter = Encounter::begin(
        config.arena.clone(),
        arena,
        &ledger,
        &ScaledEnemyProvider::new(config.zones.clone()),
        zone,
        event.unwrap_or_default(),
        &mut rng,
        Arc::new(TracingNotifier),
    )?;
    println!("{} vs {}", encounter.player().name, encounter.enemy().name);

    let anchor = arena.anchor;
    for launch in 1..=max_launches {
        let pull = anchor + random_pull(&config.arena, &mut rng);
        for input in [
            PointerInput::Down {
                x: anchor.x,
                y: anchor.y,
            },
            PointerInput::Move {
                x: pull.x,
                y: pull.y,
            },
            PointerInput::Up,
        ] {
            encounter.handle_input(input)?;
        }
        // Fly until the sling is ready again
        let mut steps = 0;
        while !encounter.session().is_over() && steps < LAUNCH_STEP_LIMIT {
            encounter.step();
            steps += 1;
            let player = encounter.session().player();
            if !player.is_flying && !player.is_dragging {
                break;
            }
        }
        let view = encounter.view();
        println!(
            "launch {launch:>2}: player {:.0}/{:.0}  enemy {:.0}/{:.0}",
            view.player_hp, view.player_max_hp, view.enemy_hp, view.enemy_max_hp
        );
        if encounter.session().is_over() {
            break;
        }
    }

    match encounter.settle(&mut ledger)? {
        Some(settlement) => {
            let verdict = match encounter.outcome() {
                Some(Outcome::Win) => "WIN",
                _ => "LOSE",
            };
            println!(
                "{verdict}: +{} gold, +{} xp, -{} energy, -{:.0} health",
                settlement.payout.gold,
                settlement.payout.xp,
                settlement.energy_cost,
                settlement.damage_taken
            );
        }
        None => println!("No decision after {max_launches} launches"),
    }
    if let Some(rooster) = ledger.active_rooster() {
        println!(
            "{}: level {}, health {:.0}/{:.0}, xp {}/{}, energy {}, gold {}",
            rooster.combatant.name,
            rooster.level(),
            rooster.combatant.stats.health,
            rooster.combatant.stats.max_health,
            rooster.xp,
            rooster.max_xp,
            rooster.energy,
            ledger.gold
        );
    }
    if let Some(files) = &files {
        ledger.save(files)?;
    }
    Ok(())
}

fn run_ticker(config: &GameConfig, seconds: u64, period_ms: u64, seed: u64) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let economy = share(EconomyEngine::new(config.economy.clone(), clock.now())?);
        let handle = spawn_ticker(
            Arc::clone(&economy),
            clock,
            GameRng::seeded(seed),
            Duration::from_millis(period_ms.max(1)),
        );
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        let ticks = handle.stop().await;

        let state = snapshot(&economy);
        println!(
            "{ticks} ticks: stability {:.1} ({:?}), {} active players, {} ad views",
            state.stability_index, state.status, state.active_players, state.total_ad_views_today
        );
        Ok(())
    })
}
