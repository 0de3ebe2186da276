//! Lich's Portfolio - Entry Point
//!
//! Headless driver for the simulation. Awakens the lich, buys a modest
//! starter spread, then slumbers through the requested cycles. Events
//! that demand a decision are resolved with their first listed option,
//! and a summary of the run is printed at the end.

use clap::Parser;

use lichs_portfolio::core::bignum::BigNumber;
use lichs_portfolio::core::config::GameConfig;
use lichs_portfolio::core::error::Result;
use lichs_portfolio::core::types::{KingdomId, RegionId};
use lichs_portfolio::game::GameData;
use lichs_portfolio::investment::{FinancialType, PropertyType, TradeType};

/// Turn-based incremental simulation of an immortal investor
#[derive(Parser, Debug)]
#[command(name = "lichs-portfolio")]
#[command(about = "Slumber through the centuries and let the portfolio compound")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 847)]
    seed: u64,

    /// Years per slumber cycle
    #[arg(long, default_value_t = 50)]
    years: u32,

    /// Number of slumber cycles to run
    #[arg(long, default_value_t = 4)]
    slumbers: u32,

    /// TOML file overriding the default configuration
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    let config = match &args.config {
        Some(path) => GameConfig::load_from_file(path)?,
        None => GameConfig::default(),
    };

    tracing::info!(seed = args.seed, year = config.starting_year, "the lich awakens");
    let mut game = GameData::new(config, args.seed);
    buy_starter_spread(&mut game)?;

    for cycle in 1..=args.slumbers {
        run_cycle(&mut game, args.years)?;
        tracing::info!(
            cycle,
            year = game.current_year(),
            gold = %game.gold(),
            "slumber cycle finished"
        );
    }

    print_summary(&game);
    Ok(())
}

/// The traditional first acquisitions of a newly risen lich: land,
/// a trade route, and paper on a stable crown.
fn buy_starter_spread(game: &mut GameData) -> Result<()> {
    game.buy_property(
        "Goldport Farmland",
        PropertyType::Agricultural,
        RegionId::from("region-goldport"),
        BigNumber::new(300.0),
    )?;
    game.buy_trade(
        "Goldport-Midlands Route",
        TradeType::Route,
        Some(RegionId::from("region-goldport")),
        Some(RegionId::from("region-midlands")),
        BigNumber::new(300.0),
    )?;
    game.buy_financial(
        "Valdrian Crown Bond",
        FinancialType::CrownBond,
        Some(KingdomId::from("kingdom-valdria")),
        0,
        BigNumber::new(300.0),
    )?;
    Ok(())
}

/// Slumbers until `years` have passed, pausing to resolve any event
/// that wakes the lich for a decision.
fn run_cycle(game: &mut GameData, years: u32) -> Result<()> {
    let target = game.current_year() + years as u64;
    while game.current_year() < target {
        let remaining = (target - game.current_year()) as u32;
        game.slumber(remaining)?;
        resolve_pending(game)?;
    }
    Ok(())
}

/// Takes the first listed option of every queued decision.
fn resolve_pending(game: &mut GameData) -> Result<()> {
    while let Some(choice_id) = game
        .pending_choice()
        .and_then(|event| event.choices().first().map(|choice| choice.id.clone()))
    {
        tracing::info!(choice = %choice_id, "the lich stirs to decide");
        game.provide_choice(&choice_id)?;
    }
    Ok(())
}

fn print_summary(game: &GameData) {
    let exposure = game.exposure();
    println!();
    println!("=== THE LICH'S LEDGER ===");
    println!("Year:              {}", game.current_year());
    println!("Gold:              {}", game.gold().format_short());
    println!("Portfolio value:   {}", game.total_value().format_short());
    println!("Holdings:          {}", game.portfolio().count());
    println!(
        "Exposure:          {} ({})",
        exposure.exposure(),
        exposure.level().name()
    );
    println!("Chronicled events: {}", game.chronicle().len());
    println!("Active synergies:  {}", game.synergy().count());
    println!(
        "Prestige:          {}",
        if game.can_prestige() {
            format!("ready ({} echoes)", game.prestige_reward().format_short())
        } else {
            "not yet".to_string()
        }
    );
}
