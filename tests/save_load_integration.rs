//! Integration tests for whole-game persistence
//!
//! These tests verify that a running game survives the vault:
//! - Full state equality after an in-memory save/load cycle
//! - Numbered slots and the autosave on a real directory
//! - The scribe refusing to work while a decision is pending

use tempfile::tempdir;

use lichs_portfolio::agent::Agent;
use lichs_portfolio::core::bignum::BigNumber;
use lichs_portfolio::core::config::GameConfig;
use lichs_portfolio::core::error::LichError;
use lichs_portfolio::core::types::{AgentType, AssetClass, EchoTree, RiskLevel};
use lichs_portfolio::game::GameData;
use lichs_portfolio::investment::{FinancialType, PropertyType, TradeType};
use lichs_portfolio::save::{SaveContext, SaveManager};

fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.yearly_event_chance = 0.0;
    config.decade_event_chance = 0.0;
    config.era_event_chance = 0.0;
    config
}

fn eventful_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.yearly_event_chance = 1.0;
    config.decade_event_chance = 1.0;
    config.era_event_chance = 1.0;
    config
}

/// Buys one investment of each family so every variant's save path runs.
fn stock_the_portfolio(game: &mut GameData) {
    let first = game.world().regions()[0].id.clone();
    let second = game.world().regions()[1].id.clone();
    let crown = game.world().kingdoms()[0].id.clone();

    game.buy_property("Harbor Granary", PropertyType::Coastal, first.clone(), BigNumber::new(600.0))
        .unwrap();
    game.buy_trade(
        "Amber Road",
        TradeType::Route,
        Some(first),
        Some(second),
        BigNumber::new(500.0),
    )
    .unwrap();
    game.buy_financial("War Bond", FinancialType::CrownBond, Some(crown), 0, BigNumber::new(400.0))
        .unwrap();
    game.buy_holding("Shrouded Reliquary", AssetClass::Dark, RiskLevel::Extreme, BigNumber::new(300.0))
        .unwrap();
}

#[test]
fn test_rebirth_survives_the_vault() {
    let mut config = eventful_config();
    config.starting_gold = 20_000.0;
    config.prestige_min_years = 10;
    config.prestige_min_gold = 1000.0;
    let mut game = GameData::new(config.clone(), 17);

    stock_the_portfolio(&mut game);
    // No agents means fifty eventful years run without interruption.
    game.slumber(50).unwrap();
    game.perform_prestige().unwrap();
    // Spend an echo so the saved trees are not all pristine.
    game.unlock_upgrade(EchoTree::Scholar, "memory-fragments").unwrap();

    let mut ctx = SaveContext::new();
    game.save_game(&mut ctx).unwrap();
    let json = ctx.to_json().unwrap();

    let mut restored = GameData::new(config, 999);
    let mut ctx = SaveContext::from_json(&json).unwrap();
    restored.load_game(&mut ctx).unwrap();

    // Every observable getter agrees with the original.
    assert_eq!(restored.current_year(), game.current_year());
    assert_eq!(restored.total_years_played(), game.total_years_played());
    assert_eq!(restored.years_this_run(), game.years_this_run());
    assert_eq!(restored.gold().to_string(), game.gold().to_string());
    assert_eq!(restored.total_value().to_string(), game.total_value().to_string());
    assert_eq!(restored.portfolio().count(), game.portfolio().count());
    assert_eq!(restored.agents().count(), game.agents().count());
    assert_eq!(restored.exposure().exposure(), game.exposure().exposure());
    assert_eq!(restored.ledger().discovered_count(), game.ledger().discovered_count());
    assert_eq!(restored.chronicle().len(), game.chronicle().len());
    assert_eq!(
        restored.chronicle().milestones().len(),
        game.chronicle().milestones().len()
    );
    assert_eq!(
        restored.prestige().times_prestiged(),
        game.prestige().times_prestiged()
    );
    assert_eq!(
        restored.prestige().echoes().to_string(),
        game.prestige().echoes().to_string()
    );
    assert!(restored.prestige().has_upgrade(EchoTree::Scholar, "memory-fragments"));
    assert_eq!(restored.synergy().count(), game.synergy().count());
    assert!(!restored.has_pending_choice());

    // The rebirth itself is on the books.
    let last = restored.chronicle().milestones().last().unwrap();
    assert_eq!(last.title, "The Long Slumber");
}

#[test]
fn test_save_slots_round_trip_on_disk() {
    let dir = tempdir().unwrap();
    let manager = SaveManager::new(dir.path(), 5);

    let mut config = quiet_config();
    config.starting_gold = 20_000.0;
    let mut game = GameData::new(config, 23);
    stock_the_portfolio(&mut game);
    game.add_agent(Agent::individual("agent-maela", "Maela", 30, 90, 85, 70))
        .unwrap();
    game.slumber(25).unwrap();

    game.save_to_slot(&manager, 2).unwrap();
    assert!(manager.slot_exists(2));
    assert_eq!(manager.list_slots().len(), 1);

    // The slot header is readable without a full restore.
    let info = manager.slot_info(2).unwrap();
    assert_eq!(info.year, 872);
    assert_eq!(info.gold, game.gold().to_string());

    let mut restored = GameData::new(quiet_config(), 1);
    restored.load_from_slot(&manager, 2).unwrap();
    assert_eq!(restored.current_year(), 872);
    assert_eq!(restored.gold().to_string(), game.gold().to_string());
    assert_eq!(restored.portfolio().count(), 4);
    assert_eq!(restored.agents().count(), game.agents().count());
    assert_eq!(restored.agents().agents()[0].agent_type, AgentType::Individual);
    assert_eq!(restored.ledger().discovered_count(), game.ledger().discovered_count());
    assert_eq!(restored.exposure().exposure(), game.exposure().exposure());

    // The restored game keeps running.
    restored.slumber(10).unwrap();
    assert_eq!(restored.current_year(), 882);

    // The autosave lives beside the slots, not in one.
    game.autosave(&manager).unwrap();
    let auto = manager.load_autosave().unwrap();
    assert_eq!(auto.read_uint("summary-year", 0), 872);
    assert_eq!(manager.list_slots().len(), 1);
}

#[test]
fn test_pending_choice_blocks_the_scribe() {
    let dir = tempdir().unwrap();
    let manager = SaveManager::new(dir.path(), 5);

    let mut game = GameData::new(eventful_config(), 3);
    game.add_agent(Agent::cult("cult-vessar", "Circle of Vessar", 60, 90, 60))
        .unwrap();
    game.slumber(800).unwrap();
    assert!(game.has_pending_choice());

    // A suspended event is not persisted, so saving is refused outright.
    let err = game.save_to_slot(&manager, 0).unwrap_err();
    assert!(matches!(err, LichError::PendingChoice(_)));
    assert!(!manager.slot_exists(0));

    let choice = game.pending_choice().unwrap().choices()[0].id.clone();
    game.provide_choice(&choice).unwrap();
    game.save_to_slot(&manager, 0).unwrap();
    assert!(manager.slot_exists(0));
}
