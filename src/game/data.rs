//! Top-level game state and the slumber loop
//!
//! `GameData` owns every subsystem plus the rng and the signal log they
//! write into. The order of operations inside a slumbered year is fixed:
//! the world advances and its events resolve first, then agents age,
//! then income banks, then exposure accrues and decays, then synergies
//! refresh and crusades roll. Personal events that demand a decision
//! suspend the loop; `slumber`, `prestige`, and saving all refuse to run
//! until the choice is supplied.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::agent::agent::Agent;
use crate::agent::manager::AgentManager;
use crate::core::bignum::BigNumber;
use crate::core::config::GameConfig;
use crate::core::error::{LichError, Result};
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{AgentId, AssetClass, EchoTree, InvestmentId, KingdomId, LedgerCategory, RegionId, RiskLevel};
use crate::event::chronicle::EventChronicle;
use crate::event::event::{Event, EventChoice, EventKind};
use crate::investment::financial::FinancialType;
use crate::investment::investment::Investment;
use crate::investment::portfolio::Portfolio;
use crate::investment::property::PropertyType;
use crate::investment::trade::TradeType;
use crate::prestige::manager::PrestigeManager;
use crate::save::context::{SaveContext, Saveable};
use crate::save::manager::SaveManager;
use crate::tracking::exposure::ExposureTracker;
use crate::tracking::ledger::Ledger;
use crate::tracking::synergy::SynergyTracker;
use crate::world::generator::standard_world;
use crate::world::simulation::WorldSimulation;

/// Ledger id for the first venture into forbidden assets.
const FORBIDDEN_HOLDINGS_ENTRY: &str = "forbidden-holdings";

pub struct GameData {
    config: GameConfig,
    portfolio: Portfolio,
    agents: AgentManager,
    world: WorldSimulation,
    chronicle: EventChronicle,
    exposure: ExposureTracker,
    synergy: SynergyTracker,
    ledger: Ledger,
    prestige: PrestigeManager,
    rng: ChaCha8Rng,
    signals: SignalLog,
    total_years_played: u64,
    // Choice events waiting on the player, resolved front to back.
    pending: VecDeque<Event>,
}

impl GameData {
    /// A fresh game on the standard map, seeded for reproducible runs.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut world = standard_world(&mut rng);
        world.set_current_year(config.starting_year as u64);
        Self::apply_event_chances(&mut world, &config);

        let mut exposure = ExposureTracker::new();
        exposure.set_decay_rate(config.exposure_decay_rate as u32);

        let prestige = PrestigeManager::with_requirements(
            config.prestige_min_years as u64,
            config.prestige_min_gold,
        );
        let portfolio = Portfolio::with_gold(BigNumber::new(config.starting_gold));

        tracing::info!(seed, year = world.current_year(), "new unlife begins");

        GameData {
            config,
            portfolio,
            agents: AgentManager::new(),
            world,
            chronicle: EventChronicle::new(),
            exposure,
            synergy: SynergyTracker::new(),
            ledger: Ledger::new(),
            prestige,
            rng,
            signals: SignalLog::new(),
            total_years_played: 0,
            pending: VecDeque::new(),
        }
    }

    fn apply_event_chances(world: &mut WorldSimulation, config: &GameConfig) {
        let generator = world.generator_mut();
        generator.set_yearly_event_chance(config.yearly_event_chance);
        generator.set_decade_event_chance(config.decade_event_chance);
        generator.set_era_event_chance(config.era_event_chance);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn agents(&self) -> &AgentManager {
        &self.agents
    }

    pub fn world(&self) -> &WorldSimulation {
        &self.world
    }

    pub fn chronicle(&self) -> &EventChronicle {
        &self.chronicle
    }

    pub fn exposure(&self) -> &ExposureTracker {
        &self.exposure
    }

    pub fn synergy(&self) -> &SynergyTracker {
        &self.synergy
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn prestige(&self) -> &PrestigeManager {
        &self.prestige
    }

    pub fn current_year(&self) -> u64 {
        self.world.current_year()
    }

    pub fn total_years_played(&self) -> u64 {
        self.total_years_played
    }

    /// Years elapsed in the current unlife. Prestige eligibility counts
    /// these, not the lifetime total.
    pub fn years_this_run(&self) -> u64 {
        self.world
            .current_year()
            .saturating_sub(self.config.starting_year as u64)
    }

    pub fn gold(&self) -> BigNumber {
        self.portfolio.gold()
    }

    pub fn total_value(&self) -> BigNumber {
        self.portfolio.total_value()
    }

    /// The event currently waiting on a decision, if any.
    pub fn pending_choice(&self) -> Option<&Event> {
        self.pending.front()
    }

    pub fn has_pending_choice(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Hands accumulated signals to the caller and empties the log.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        self.signals.drain()
    }

    /// Income multiplier applied to banked slumber earnings: prestige
    /// depth, compound mastery, and portfolio synergies all stack.
    pub fn income_multiplier(&self) -> f64 {
        self.prestige.bonus_multiplier()
            * (1.0 + self.prestige.compound_interest_bonus())
            * self.synergy.total_bonus()
    }

    fn ensure_no_pending(&self, operation: &str) -> Result<()> {
        match self.pending.front() {
            Some(event) => Err(LichError::PendingChoice(format!(
                "cannot {} while '{}' awaits a decision",
                operation, event.name
            ))),
            None => Ok(()),
        }
    }

    /// Sleeps through up to `years` years and returns every event that
    /// fired, oldest first.
    ///
    /// A year runs to completion even when one of its events demands a
    /// decision, but no further year starts until [`GameData::provide_choice`]
    /// resolves the queue. Events that demand nothing are applied and
    /// chronicled on the spot.
    pub fn slumber(&mut self, years: u32) -> Result<Vec<Event>> {
        self.ensure_no_pending("slumber")?;

        let mut fired = Vec::new();
        for _ in 0..years {
            self.advance_one_year(&mut fired);
            if !self.pending.is_empty() {
                break;
            }
        }

        tracing::info!(
            year = self.world.current_year(),
            events = fired.len(),
            gold = %self.portfolio.gold(),
            "slumber interrupted or complete"
        );
        Ok(fired)
    }

    fn advance_one_year(&mut self, fired: &mut Vec<Event>) {
        let world_mark = self.signals.len();
        let events = self.world.advance_year(&mut self.rng, &mut self.signals);
        self.total_years_played += 1;
        let year = self.world.current_year();

        for mut event in events {
            self.world.apply_event(&event, &mut self.rng, &mut self.signals);
            self.route_personal_target(&mut event);
            self.signals.emit(Signal::EventOccurred {
                id: event.id.clone(),
                name: event.name.clone(),
            });

            let needs_choice = event.has_choices()
                && matches!(&event.kind, EventKind::Personal(p) if p.target_agent.is_some());
            if needs_choice {
                self.signals.emit(Signal::ChoiceRequired {
                    id: event.id.clone(),
                    prompt: event.name.clone(),
                });
                fired.push(event.clone());
                self.pending.push_back(event);
                continue;
            }

            self.portfolio.apply_event(&event, &mut self.signals);
            let delta = event.exposure_delta();
            if delta != 0 {
                self.exposure.add_exposure(delta, &mut self.signals);
            }
            self.chronicle.record(&event, year, None, 0, delta as f64);
            fired.push(event);
        }

        // Competitors showing a new face go into the ledger.
        self.discover_stance_changes(world_mark);

        let agent_mark = self.signals.len();
        self.agents.advance_year(&mut self.rng, &mut self.signals);
        let spike: i64 = self
            .signals
            .iter()
            .skip(agent_mark)
            .filter_map(|signal| match signal {
                Signal::AgentBetrayed { exposure_spike, .. } => Some(*exposure_spike as i64),
                _ => None,
            })
            .sum();
        if spike > 0 {
            self.exposure.add_exposure(spike as i32, &mut self.signals);
        }

        let multiplier = self.income_multiplier();
        let agents = &self.agents;
        self.portfolio.apply_slumber_with(
            1,
            multiplier,
            |id| agents.income_modifier_for(id),
            &mut self.signals,
        );

        let passive = self.portfolio.total_exposure_contribution()
            + self.agents.total_exposure_contribution();
        if passive > 0 {
            self.exposure.add_exposure(passive as i32, &mut self.signals);
        }
        self.exposure.apply_decay(1, &mut self.signals);

        self.synergy.recalculate(Some(&self.portfolio), &mut self.signals);
        self.world
            .roll_crusades(self.exposure.is_detected(), &mut self.rng, &mut self.signals);

        if year % 100 == 0 {
            self.chronicle.add_milestone(
                year,
                "Turn of the Century",
                &format!("The chronicle enters the year {} with the portfolio intact.", year),
            );
        }
    }

    /// Personal events arrive untargeted; aim them at a random living
    /// servant so the consequences land on somebody.
    fn route_personal_target(&mut self, event: &mut Event) {
        let EventKind::Personal(personal) = &mut event.kind else {
            return;
        };
        if personal.target_agent.is_some() {
            return;
        }
        let roster = self.agents.agents();
        if roster.is_empty() {
            return;
        }
        let idx = self.rng.gen_range(0..roster.len());
        personal.target_agent = Some(roster[idx].id.clone());
    }

    fn discover_stance_changes(&mut self, mark: usize) {
        let changed: Vec<String> = self
            .signals
            .iter()
            .skip(mark)
            .filter_map(|signal| match signal {
                Signal::StanceChanged { id, .. } => Some(id.as_str().to_string()),
                _ => None,
            })
            .collect();
        for id in changed {
            self.ledger
                .discover(&id, LedgerCategory::Competitor, &mut self.signals);
        }
    }

    /// Resolves the front pending event with the given choice.
    ///
    /// Gold-gated options are charged first; a failed payment leaves the
    /// event pending so a different option can be picked. The resolution
    /// is chronicled with the choice id attached.
    pub fn provide_choice(&mut self, choice_id: &str) -> Result<()> {
        let Some(event) = self.pending.front().cloned() else {
            return Err(LichError::Validation(
                "no event is awaiting a decision".to_string(),
            ));
        };
        let Some(choice) = event.choices().into_iter().find(|c| c.id == choice_id) else {
            return Err(LichError::Validation(format!(
                "'{}' is not an option for '{}'",
                choice_id, event.name
            )));
        };

        if choice.requires_gold {
            self.portfolio
                .subtract_gold(BigNumber::new(choice.gold_cost), &mut self.signals)?;
        }

        let target = match &event.kind {
            EventKind::Personal(personal) => personal.target_agent.clone(),
            _ => None,
        };
        let exposure_delta = self.apply_choice_consequence(&choice, target.as_ref());

        let year = self.world.current_year();
        let gold_impact = if choice.requires_gold {
            -(choice.gold_cost as i64)
        } else {
            0
        };
        self.chronicle.record_with_choice(
            &event,
            year,
            &choice.id,
            Some(choice.consequence.clone()),
            gold_impact,
            exposure_delta as f64,
        );
        self.signals.emit(Signal::EventResolved {
            id: event.id.clone(),
            outcome: choice.consequence.clone(),
        });
        self.pending.pop_front();
        tracing::info!(event = %event.id, choice = choice_id, "choice resolved");
        Ok(())
    }

    fn apply_choice_consequence(
        &mut self,
        choice: &EventChoice,
        target: Option<&AgentId>,
    ) -> i32 {
        let mut exposure_delta = 0;
        match choice.id.as_str() {
            "punish" => {
                // The traitor's knowledge dies with them.
                if let Some(id) = target {
                    self.agents.remove_agent(id);
                }
            }
            "forgive" => {
                if let Some(agent) = target.and_then(|id| self.agents.get_mut(id)) {
                    let wavering = agent.loyalty() as i32 - 10;
                    agent.set_loyalty(wavering);
                }
            }
            "turn" => {
                if let Some(agent) = target.and_then(|id| self.agents.get_mut(id)) {
                    agent.set_loyalty(100);
                }
            }
            "accept" => {
                if let Some(id) = target.cloned() {
                    self.agents.process_death(&id, &mut self.signals);
                }
            }
            "raise" => {
                if let Some(agent) = target.and_then(|id| self.agents.get_mut(id)) {
                    agent.raise_as_bound();
                }
                exposure_delta = 15;
            }
            _ => {}
        }
        if exposure_delta != 0 {
            self.exposure.add_exposure(exposure_delta, &mut self.signals);
        }
        exposure_delta
    }

    /// Buys a property in a region. The region is entered into the
    /// ledger on first purchase.
    pub fn buy_property(
        &mut self,
        name: &str,
        subtype: PropertyType,
        region: RegionId,
        cost: BigNumber,
    ) -> Result<InvestmentId> {
        let investment = Investment::property(
            Investment::fresh_id("property"),
            name,
            subtype,
            region.clone(),
            cost,
            self.world.current_year(),
        );
        self.complete_purchase(investment, cost, &[region])
    }

    /// Buys a trade venture. Both endpoints, when known, enter the ledger.
    pub fn buy_trade(
        &mut self,
        name: &str,
        subtype: TradeType,
        source: Option<RegionId>,
        destination: Option<RegionId>,
        cost: BigNumber,
    ) -> Result<InvestmentId> {
        let regions: Vec<RegionId> = source
            .iter()
            .chain(destination.iter())
            .cloned()
            .collect();
        let investment = Investment::trade(
            Investment::fresh_id("trade"),
            name,
            subtype,
            source,
            destination,
            cost,
            self.world.current_year(),
        );
        self.complete_purchase(investment, cost, &regions)
    }

    /// Buys a financial instrument at face value.
    pub fn buy_financial(
        &mut self,
        name: &str,
        subtype: FinancialType,
        issuer: Option<KingdomId>,
        maturity_year: u64,
        cost: BigNumber,
    ) -> Result<InvestmentId> {
        let investment = Investment::financial(
            Investment::fresh_id("financial"),
            name,
            subtype,
            cost,
            issuer,
            maturity_year,
            cost,
            self.world.current_year(),
        );
        self.complete_purchase(investment, cost, &[])
    }

    /// Buys a plain holding (magical, political, or dark).
    pub fn buy_holding(
        &mut self,
        name: &str,
        class: AssetClass,
        risk: RiskLevel,
        cost: BigNumber,
    ) -> Result<InvestmentId> {
        let investment = Investment::holding(
            Investment::fresh_id("holding"),
            name,
            class,
            risk,
            cost,
            self.world.current_year(),
        );
        self.complete_purchase(investment, cost, &[])
    }

    fn complete_purchase(
        &mut self,
        investment: Investment,
        cost: BigNumber,
        regions: &[RegionId],
    ) -> Result<InvestmentId> {
        self.portfolio.subtract_gold(cost, &mut self.signals)?;
        let id = investment.id.clone();
        let dark = investment.is_dark();
        self.portfolio.add_investment(investment, &mut self.signals)?;

        for region in regions {
            self.ledger
                .discover(region.as_str(), LedgerCategory::Economic, &mut self.signals);
        }
        if dark {
            self.ledger.discover(
                FORBIDDEN_HOLDINGS_ENTRY,
                LedgerCategory::Hidden,
                &mut self.signals,
            );
        }
        self.synergy.recalculate(Some(&self.portfolio), &mut self.signals);
        tracing::debug!(id = %id, cost = %cost, "investment purchased");
        Ok(id)
    }

    /// Sells an investment at its current value.
    pub fn sell_investment(&mut self, id: &InvestmentId) -> Result<BigNumber> {
        let Some(investment) = self.portfolio.get_by_id(id) else {
            return Err(LichError::Validation(format!(
                "no investment '{}' to sell",
                id
            )));
        };
        if !investment.can_sell() {
            return Err(LichError::Validation(format!(
                "'{}' cannot be sold right now",
                investment.name
            )));
        }
        let proceeds = investment.current_value;

        self.portfolio.remove_investment(id, &mut self.signals);
        self.portfolio.add_gold(proceeds, &mut self.signals);
        for agent in self.agents.agents_mut() {
            agent.unassign_investment(id);
        }
        self.synergy.recalculate(Some(&self.portfolio), &mut self.signals);
        tracing::debug!(id = %id, proceeds = %proceeds, "investment sold");
        Ok(proceeds)
    }

    /// Adds a servant to the roster and notes them in the ledger.
    pub fn add_agent(&mut self, agent: Agent) -> Result<()> {
        let id = agent.id.as_str().to_string();
        self.agents.add_agent(agent)?;
        self.ledger
            .discover(&id, LedgerCategory::Agent, &mut self.signals);
        Ok(())
    }

    /// Has an individual servant train a successor, who joins the
    /// roster and the ledger.
    pub fn recruit_successor(&mut self, parent_id: &AgentId) -> Result<AgentId> {
        let id = self.agents.recruit_successor(parent_id, &mut self.rng)?;
        self.ledger
            .discover(id.as_str(), LedgerCategory::Agent, &mut self.signals);
        Ok(id)
    }

    /// Puts a servant in charge of a holding; their competence then
    /// scales its banked income.
    pub fn assign_agent(&mut self, agent_id: &AgentId, investment_id: &InvestmentId) -> Result<()> {
        if self.portfolio.get_by_id(investment_id).is_none() {
            return Err(LichError::Validation(format!(
                "no investment '{}' to assign",
                investment_id
            )));
        }
        let Some(agent) = self.agents.get_mut(agent_id) else {
            return Err(LichError::Validation(format!(
                "no agent '{}' on the roster",
                agent_id
            )));
        };
        agent.assign_investment(investment_id.clone());
        Ok(())
    }

    /// Spends echoes on a specialization tree node.
    pub fn unlock_upgrade(&mut self, tree: EchoTree, upgrade_id: &str) -> Result<()> {
        self.prestige.unlock_upgrade(tree, upgrade_id, &mut self.signals)
    }

    /// Whether the prestige gate is open right now.
    pub fn can_prestige(&self) -> bool {
        self.prestige
            .can_prestige(self.portfolio.total_value(), self.years_this_run())
    }

    /// Echoes a prestige would pay out right now.
    pub fn prestige_reward(&self) -> BigNumber {
        self.prestige
            .calculate_echo_reward(self.portfolio.total_value(), self.years_this_run())
    }

    /// Ends the current unlife: banks echoes, tears the run down, and
    /// wakes the lich on a fresh map.
    ///
    /// The chronicle, the echo balance, purchased upgrades, and the
    /// lifetime year count all survive. The ledger and gold survive only
    /// to the extent the retention upgrades allow. Returns the echoes
    /// earned.
    pub fn perform_prestige(&mut self) -> Result<BigNumber> {
        self.ensure_no_pending("prestige")?;

        let years = self.years_this_run();
        let wealth = self.portfolio.total_value();
        let reward = self.prestige.perform_prestige(wealth, years, &mut self.signals)?;

        // Retentions are captured before anything is torn down.
        let ledger_retention = self.prestige.ledger_retention();
        let gold_retention = self.prestige.gold_retention();
        let retained_gold = self.portfolio.gold().mul_f64(gold_retention);

        let ended_year = self.world.current_year();
        self.chronicle.add_milestone(
            ended_year,
            "The Long Slumber",
            &format!(
                "After {} years the lich withdraws from the world, carrying {} echoes into the dark.",
                years, reward
            ),
        );

        self.portfolio.reset();
        self.agents.reset();
        self.world = standard_world(&mut self.rng);
        self.world.set_current_year(self.config.starting_year as u64);
        Self::apply_event_chances(&mut self.world, &self.config);
        self.exposure.reset();
        self.exposure.set_decay_rate(self.config.exposure_decay_rate as u32);
        self.synergy.reset(&mut self.signals);
        self.ledger.retain_fraction(ledger_retention);
        self.pending.clear();

        let starting = BigNumber::new(self.config.starting_gold)
            .mul_f64(self.prestige.starting_gold_multiplier());
        self.portfolio.set_gold(starting.add(retained_gold), &mut self.signals);

        tracing::info!(
            reward = %reward,
            times_prestiged = self.prestige.times_prestiged(),
            gold = %self.portfolio.gold(),
            "the lich rises again"
        );
        Ok(reward)
    }

    /// Writes the whole game into a save context. Refused while a
    /// choice is pending, since the suspended event is not persisted.
    pub fn save_game(&self, ctx: &mut SaveContext) -> Result<()> {
        self.ensure_no_pending("save")?;

        // Summary fields stay at the top level so slot listings can
        // peek at them without a full load.
        ctx.write_uint("summary-year", self.world.current_year());
        ctx.write_string("summary-gold", &self.portfolio.gold().to_string());
        ctx.write_uint("total-years-played", self.total_years_played);

        ctx.begin_section("portfolio");
        self.portfolio.save(ctx);
        ctx.end_section();

        ctx.begin_section("agent-manager");
        self.agents.save(ctx);
        ctx.end_section();

        ctx.begin_section("world-simulation");
        self.world.save(ctx);
        ctx.end_section();

        ctx.begin_section("event-chronicle");
        self.chronicle.save(ctx);
        ctx.end_section();

        ctx.begin_section("exposure");
        self.exposure.save(ctx);
        ctx.end_section();

        ctx.begin_section("ledger");
        self.ledger.save(ctx);
        ctx.end_section();

        ctx.begin_section("prestige-manager");
        self.prestige.save(ctx);
        ctx.end_section();

        Ok(())
    }

    /// Restores the whole game from a save context. Any section that
    /// fails to load abandons the load with an error; synergies are not
    /// persisted and are recomputed at the end.
    pub fn load_game(&mut self, ctx: &mut SaveContext) -> Result<()> {
        self.total_years_played = ctx.read_uint("total-years-played", 0);

        ctx.begin_section("portfolio");
        let loaded = self.portfolio.load(ctx);
        ctx.end_section();
        loaded?;

        ctx.begin_section("agent-manager");
        let loaded = self.agents.load(ctx);
        ctx.end_section();
        loaded?;

        ctx.begin_section("world-simulation");
        let loaded = self.world.load(ctx);
        ctx.end_section();
        loaded?;

        ctx.begin_section("event-chronicle");
        let loaded = self.chronicle.load(ctx);
        ctx.end_section();
        loaded?;

        ctx.begin_section("exposure");
        let loaded = self.exposure.load(ctx);
        ctx.end_section();
        loaded?;

        ctx.begin_section("ledger");
        let loaded = self.ledger.load(ctx);
        ctx.end_section();
        loaded?;

        ctx.begin_section("prestige-manager");
        let loaded = self.prestige.load(ctx);
        ctx.end_section();
        loaded?;

        self.pending.clear();
        self.signals.clear();
        self.synergy.recalculate(Some(&self.portfolio), &mut self.signals);

        tracing::info!(
            year = self.world.current_year(),
            gold = %self.portfolio.gold(),
            "game loaded"
        );
        Ok(())
    }

    /// Saves into a numbered slot through the given manager.
    pub fn save_to_slot(&self, manager: &SaveManager, slot: u8) -> Result<()> {
        let mut ctx = SaveContext::new();
        self.save_game(&mut ctx)?;
        manager.save_to_slot(slot, &mut ctx)
    }

    /// Loads a numbered slot through the given manager.
    pub fn load_from_slot(&mut self, manager: &SaveManager, slot: u8) -> Result<()> {
        let mut ctx = manager.load_from_slot(slot)?;
        self.load_game(&mut ctx)
    }

    /// Writes the rolling autosave file.
    pub fn autosave(&self, manager: &SaveManager) -> Result<()> {
        let mut ctx = SaveContext::new();
        self.save_game(&mut ctx)?;
        manager.autosave(&mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentType;

    fn quiet_config() -> GameConfig {
        // No random events: years advance without surprises.
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

    fn first_region(game: &GameData) -> RegionId {
        game.world().regions()[0].id.clone()
    }

    /// Slumbers one year at a time until an event demands a decision.
    fn slumber_until_pending(game: &mut GameData, cap: u32) -> bool {
        for _ in 0..cap {
            game.slumber(1).unwrap();
            if game.has_pending_choice() {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_new_game_starts_on_the_standard_map() {
        let game = GameData::new(GameConfig::default(), 1);

        assert_eq!(game.current_year(), 847);
        assert_eq!(game.total_years_played(), 0);
        assert_eq!(game.years_this_run(), 0);
        assert_eq!(game.gold().to_f64(), 1000.0);
        assert!(game.portfolio().is_empty());
        assert!(game.agents().is_empty());
        assert!(!game.has_pending_choice());
        assert_eq!(game.world().regions().len(), 6);
        assert_eq!(game.world().kingdoms().len(), 3);
        assert_eq!(game.world().competitors().len(), 5);
        assert_eq!(game.exposure().exposure(), 0);
    }

    #[test]
    fn test_slumber_advances_years() {
        let mut game = GameData::new(quiet_config(), 7);
        let events = game.slumber(10).unwrap();

        assert!(events.is_empty());
        assert_eq!(game.current_year(), 857);
        assert_eq!(game.total_years_played(), 10);
        assert_eq!(game.years_this_run(), 10);
    }

    #[test]
    fn test_slumber_banks_income_from_holdings() {
        let mut game = GameData::new(quiet_config(), 7);
        let region = first_region(&game);
        game.buy_property("Old Granary", PropertyType::Agricultural, region, BigNumber::new(500.0))
            .unwrap();

        let before = game.gold().to_f64();
        game.slumber(10).unwrap();
        assert!(game.gold().to_f64() > before);
    }

    #[test]
    fn test_slumber_chronicles_fired_events() {
        let mut game = GameData::new(eventful_config(), 13);
        let events = game.slumber(5).unwrap();

        assert!(!events.is_empty());
        // Oldest first, within the window we slept through.
        for pair in events.windows(2) {
            assert!(pair[0].year_occurred <= pair[1].year_occurred);
        }
        for event in &events {
            assert!(event.year_occurred > 847 && event.year_occurred <= game.current_year());
        }
        // No agents means no choice events, so every fired event is on
        // record already.
        assert!(!game.has_pending_choice());
        assert_eq!(game.chronicle().len(), events.len());
    }

    #[test]
    fn test_pending_choice_suspends_the_loop() {
        let mut game = GameData::new(eventful_config(), 3);
        // A cult never dies of old age, so the roster stays targetable.
        game.add_agent(Agent::cult("cult-vessar", "Circle of Vessar", 60, 90, 60))
            .unwrap();

        assert!(slumber_until_pending(&mut game, 400));
        let pending = game.pending_choice().unwrap().clone();
        assert!(pending.has_choices());

        let err = game.slumber(1).unwrap_err();
        assert!(matches!(err, LichError::PendingChoice(_)));
        let err = game.perform_prestige().unwrap_err();
        assert!(matches!(err, LichError::PendingChoice(_)));
        let mut ctx = SaveContext::new();
        let err = game.save_game(&mut ctx).unwrap_err();
        assert!(matches!(err, LichError::PendingChoice(_)));

        // The first listed option never requires gold in either template.
        let first = pending.choices()[0].id.clone();
        game.provide_choice(&first).unwrap();
        assert!(!game.has_pending_choice());
        game.slumber(1).unwrap();

        // The resolution carries the choice id into the chronicle.
        let entry = game
            .chronicle()
            .entries()
            .iter()
            .find(|e| e.event_id == pending.id)
            .expect("resolved event chronicled");
        assert_eq!(entry.player_choice.as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_choice_gold_gate_leaves_event_pending() {
        let mut config = eventful_config();
        config.starting_gold = 5.0;
        let mut game = GameData::new(config, 3);
        game.add_agent(Agent::cult("cult-vessar", "Circle of Vessar", 60, 90, 60))
            .unwrap();

        assert!(slumber_until_pending(&mut game, 400));
        let pending = game.pending_choice().unwrap().clone();
        let gated = pending
            .choices()
            .into_iter()
            .find(|c| c.requires_gold)
            .expect("both templates offer one gold-gated option");

        let err = game.provide_choice(&gated.id).unwrap_err();
        assert!(matches!(err, LichError::InsufficientGold { .. }));
        assert!(game.has_pending_choice());

        game.provide_choice(&pending.choices()[0].id).unwrap();
        assert!(!game.has_pending_choice());
    }

    #[test]
    fn test_unknown_choice_rejected() {
        let mut game = GameData::new(quiet_config(), 5);
        let err = game.provide_choice("punish").unwrap_err();
        assert!(matches!(err, LichError::Validation(_)));
    }

    #[test]
    fn test_buying_discovers_regions_and_dark_secrets() {
        let mut game = GameData::new(quiet_config(), 11);
        let region = first_region(&game);
        let other = game.world().regions()[1].id.clone();

        game.buy_property("Dock Ward", PropertyType::Urban, region.clone(), BigNumber::new(300.0))
            .unwrap();
        game.buy_trade(
            "Salt Road",
            TradeType::Route,
            Some(region.clone()),
            Some(other.clone()),
            BigNumber::new(200.0),
        )
        .unwrap();
        game.buy_holding("Bone Reliquary", AssetClass::Dark, RiskLevel::High, BigNumber::new(100.0))
            .unwrap();

        assert_eq!(game.portfolio().count(), 3);
        assert!(game.ledger().has_discovered(region.as_str()));
        assert!(game.ledger().has_discovered(other.as_str()));
        assert!(game.ledger().has_discovered("forbidden-holdings"));
        assert_eq!(
            game.ledger().discovered_in_category(LedgerCategory::Economic),
            2
        );
        assert_eq!(game.ledger().discovered_in_category(LedgerCategory::Hidden), 1);
    }

    #[test]
    fn test_purchase_requires_gold() {
        let mut game = GameData::new(quiet_config(), 11);
        let region = first_region(&game);

        let err = game
            .buy_property("Grand Estate", PropertyType::Urban, region, BigNumber::new(5000.0))
            .unwrap_err();
        assert!(matches!(err, LichError::InsufficientGold { .. }));
        assert!(game.portfolio().is_empty());
        assert_eq!(game.gold().to_f64(), 1000.0);
        assert_eq!(game.ledger().discovered_count(), 0);
    }

    #[test]
    fn test_sell_returns_current_value() {
        let mut game = GameData::new(quiet_config(), 11);
        let region = first_region(&game);
        let id = game
            .buy_property("Dock Ward", PropertyType::Urban, region, BigNumber::new(400.0))
            .unwrap();

        let proceeds = game.sell_investment(&id).unwrap();
        assert_eq!(proceeds.to_f64(), 400.0);
        assert!(game.portfolio().is_empty());
        assert_eq!(game.gold().to_f64(), 1000.0);

        let err = game.sell_investment(&id).unwrap_err();
        assert!(matches!(err, LichError::Validation(_)));
    }

    #[test]
    fn test_recruiting_feeds_the_ledger() {
        let mut game = GameData::new(quiet_config(), 17);
        game.add_agent(Agent::individual("agent-hesper", "Hesper", 40, 80, 70, 65))
            .unwrap();
        assert!(game.ledger().has_discovered("agent-hesper"));

        let recruit = game.recruit_successor(&AgentId::from("agent-hesper")).unwrap();
        assert_eq!(game.agents().count(), 2);
        assert!(game.ledger().has_discovered(recruit.as_str()));
        assert_eq!(game.ledger().discovered_in_category(LedgerCategory::Agent), 2);
    }

    #[test]
    fn test_assign_agent_requires_both_sides() {
        let mut game = GameData::new(quiet_config(), 17);
        let region = first_region(&game);
        let id = game
            .buy_property("Dock Ward", PropertyType::Urban, region, BigNumber::new(400.0))
            .unwrap();

        let missing_agent = game.assign_agent(&AgentId::from("agent-none"), &id);
        assert!(missing_agent.is_err());

        game.add_agent(Agent::individual("agent-hesper", "Hesper", 40, 80, 70, 100))
            .unwrap();
        let missing_investment =
            game.assign_agent(&AgentId::from("agent-hesper"), &InvestmentId::from("nothing"));
        assert!(missing_investment.is_err());

        game.assign_agent(&AgentId::from("agent-hesper"), &id).unwrap();
        assert_eq!(game.agents().income_modifier_for(&id), 1.5);
    }

    #[test]
    fn test_income_multiplier_composes_synergies() {
        let mut game = GameData::new(quiet_config(), 19);
        assert_eq!(game.income_multiplier(), 1.0);

        let regions: Vec<RegionId> =
            game.world().regions().iter().map(|r| r.id.clone()).collect();
        game.buy_property("Dock Ward", PropertyType::Urban, regions[0].clone(), BigNumber::new(100.0))
            .unwrap();
        game.buy_trade(
            "Salt Road",
            TradeType::Route,
            Some(regions[1].clone()),
            Some(regions[2].clone()),
            BigNumber::new(100.0),
        )
        .unwrap();
        game.buy_financial("Crown Bond", FinancialType::CrownBond, None, 900, BigNumber::new(100.0))
            .unwrap();
        game.buy_holding("Scrying Glass", AssetClass::Magical, RiskLevel::Medium, BigNumber::new(100.0))
            .unwrap();

        // Four asset classes: Diversified Holdings and nothing else.
        assert!((game.income_multiplier() - 1.10).abs() < 1e-9);
    }

    #[test]
    fn test_prestige_blocked_below_gate() {
        let mut game = GameData::new(quiet_config(), 23);
        assert!(!game.can_prestige());
        let err = game.perform_prestige().unwrap_err();
        assert!(matches!(err, LichError::PrestigeRequirementsUnmet { .. }));
        assert_eq!(game.current_year(), 847);
        assert_eq!(game.prestige().times_prestiged(), 0);
    }

    #[test]
    fn test_prestige_resets_run_and_keeps_legacy() {
        let mut config = quiet_config();
        config.starting_gold = 50_000.0;
        config.prestige_min_years = 10;
        config.prestige_min_gold = 1_000.0;
        let mut game = GameData::new(config, 29);

        let region = first_region(&game);
        game.buy_property("Dock Ward", PropertyType::Urban, region.clone(), BigNumber::new(400.0))
            .unwrap();
        game.add_agent(Agent::individual("agent-hesper", "Hesper", 40, 80, 70, 65))
            .unwrap();
        game.slumber(10).unwrap();
        assert!(game.can_prestige());

        let chronicle_before = game.chronicle().len();
        let reward = game.perform_prestige().unwrap();
        assert!(reward.to_f64() >= 1.0);

        // The run is gone.
        assert_eq!(game.current_year(), 847);
        assert_eq!(game.years_this_run(), 0);
        assert!(game.portfolio().is_empty());
        assert!(game.agents().is_empty());
        assert_eq!(game.exposure().exposure(), 0);
        assert_eq!(game.synergy().count(), 0);
        // No retention upgrades: the ledger empties and gold restarts.
        assert_eq!(game.ledger().discovered_count(), 0);
        assert_eq!(game.gold().to_f64(), 50_000.0);

        // The legacy survives.
        assert_eq!(game.prestige().times_prestiged(), 1);
        assert_eq!(game.total_years_played(), 10);
        assert_eq!(game.chronicle().len(), chronicle_before);
        let milestone = game.chronicle().milestones().last().unwrap();
        assert_eq!(milestone.title, "The Long Slumber");
        assert_eq!(milestone.year, 857);
        // A fresh map is in place.
        assert_eq!(game.world().regions().len(), 6);
    }

    #[test]
    fn test_save_load_round_trip_preserves_state() {
        let mut game = GameData::new(quiet_config(), 31);
        let region = first_region(&game);
        game.buy_property("Dock Ward", PropertyType::Urban, region, BigNumber::new(300.0))
            .unwrap();
        game.add_agent(Agent::cult("cult-murk", "Cult of the Silent Coin", 40, 75, 50))
            .unwrap();
        game.slumber(5).unwrap();

        let mut ctx = SaveContext::new();
        game.save_game(&mut ctx).unwrap();
        assert_eq!(ctx.read_uint("summary-year", 0), 852);
        let json = ctx.to_json().unwrap();

        let mut restored = GameData::new(quiet_config(), 99);
        let mut ctx = SaveContext::from_json(&json).unwrap();
        restored.load_game(&mut ctx).unwrap();

        assert_eq!(restored.current_year(), game.current_year());
        assert_eq!(restored.total_years_played(), game.total_years_played());
        assert_eq!(restored.gold().to_string(), game.gold().to_string());
        assert_eq!(restored.portfolio().count(), game.portfolio().count());
        assert_eq!(restored.agents().count(), game.agents().count());
        assert_eq!(restored.exposure().exposure(), game.exposure().exposure());
        assert_eq!(restored.ledger().discovered_count(), game.ledger().discovered_count());
        assert_eq!(restored.chronicle().len(), game.chronicle().len());
        // Synergies are recomputed, not persisted.
        assert_eq!(restored.synergy().count(), game.synergy().count());
        assert_eq!(
            restored.agents().agents()[0].agent_type,
            AgentType::Cult
        );
    }
}
