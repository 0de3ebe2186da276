//! The living world: regions, kingdoms, rivals, and the event stream.
//!
//! `WorldSimulation` owns everything outside the player's direct
//! control and advances it one year at a time. Each year the kingdoms
//! drift, collapse rolls and war rolls fire, competitors scheme, and
//! the event generator produces the year's news. Generated events are
//! returned to the caller, which applies them back through
//! [`WorldSimulation::apply_event`] in a fixed order.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{CompetitorId, EconomicPhase, EventSeverity, KingdomId, RegionId};
use crate::event::event::{Event, EventKind};
use crate::event::generator::EventGenerator;
use crate::save::context::{SaveContext, Saveable};
use crate::world::competitor::Competitor;
use crate::world::kingdom::Kingdom;
use crate::world::region::Region;

/// Year of the lich's awakening; every run starts here.
pub const DEFAULT_STARTING_YEAR: u64 = 847;

/// Length of the full economic cycle in years.
const ECONOMIC_CYCLE_LENGTH: u64 = 50;

/// Yearly chance that an ongoing war resolves.
const WAR_RESOLUTION_CHANCE: f64 = 0.15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSimulation {
    current_year: u64,
    regions: Vec<Region>,
    kingdoms: Vec<Kingdom>,
    competitors: Vec<Competitor>,
    generator: EventGenerator,
}

impl Default for WorldSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldSimulation {
    /// An empty world at the starting year. The generator module
    /// builds the populated default map.
    pub fn new() -> Self {
        WorldSimulation {
            current_year: DEFAULT_STARTING_YEAR,
            regions: Vec::new(),
            kingdoms: Vec::new(),
            competitors: Vec::new(),
            generator: EventGenerator::new(),
        }
    }

    pub fn current_year(&self) -> u64 {
        self.current_year
    }

    pub fn set_current_year(&mut self, year: u64) {
        self.current_year = year;
    }

    /// Position in the economic cycle, derived from the year.
    pub fn economic_phase(&self) -> EconomicPhase {
        Self::phase_for_year(self.current_year)
    }

    fn phase_for_year(year: u64) -> EconomicPhase {
        match (year / (ECONOMIC_CYCLE_LENGTH / 4)) % 4 {
            0 => EconomicPhase::Expansion,
            1 => EconomicPhase::Peak,
            2 => EconomicPhase::Recession,
            _ => EconomicPhase::Recovery,
        }
    }

    pub fn base_growth_rate(&self) -> f64 {
        self.economic_phase().growth_rate()
    }

    pub fn generator_mut(&mut self) -> &mut EventGenerator {
        &mut self.generator
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn kingdoms(&self) -> &[Kingdom] {
        &self.kingdoms
    }

    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    pub fn competitors_mut(&mut self) -> &mut [Competitor] {
        &mut self.competitors
    }

    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == *id)
    }

    pub fn region_mut(&mut self, id: &RegionId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == *id)
    }

    pub fn kingdom(&self, id: &KingdomId) -> Option<&Kingdom> {
        self.kingdoms.iter().find(|k| k.id == *id)
    }

    pub fn kingdom_mut(&mut self, id: &KingdomId) -> Option<&mut Kingdom> {
        self.kingdoms.iter_mut().find(|k| k.id == *id)
    }

    pub fn competitor(&self, id: &CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == *id)
    }

    pub fn competitor_mut(&mut self, id: &CompetitorId) -> Option<&mut Competitor> {
        self.competitors.iter_mut().find(|c| c.id == *id)
    }

    pub fn add_region(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn add_kingdom(&mut self, kingdom: Kingdom) {
        self.kingdoms.push(kingdom);
    }

    pub fn add_competitor(&mut self, competitor: Competitor) {
        self.competitors.push(competitor);
    }

    /// Advances the world one year and returns the events it produced,
    /// in generation order. The caller is responsible for applying
    /// them back through [`WorldSimulation::apply_event`].
    pub fn advance_year(&mut self, rng: &mut ChaCha8Rng, signals: &mut SignalLog) -> Vec<Event> {
        self.current_year += 1;

        for kingdom in &mut self.kingdoms {
            kingdom.tick_year(rng);
        }

        // Collapse rolls; a fallen kingdom's regions revert to the wild.
        let mut released = Vec::new();
        for kingdom in &mut self.kingdoms {
            if kingdom.roll_collapse(rng, signals) {
                released.extend(kingdom.release_regions());
            }
        }
        for region_id in released {
            if let Some(region) = self.region_mut(&region_id) {
                region.set_owning_kingdom(None, signals);
            }
        }

        self.roll_wars(rng, signals);
        self.resolve_wars(rng, signals);

        for competitor in &mut self.competitors {
            competitor.tick_year(rng, signals);
        }

        let year = self.current_year;
        let mut events = self.generator.generate_yearly_events(year, rng);
        if year % 10 == 0 {
            events.extend(self.generator.generate_decade_events(year, rng));
        }
        if year % 100 == 0 {
            events.extend(self.generator.generate_era_events(year, rng));
        }
        for event in &mut events {
            self.route_event(event, rng);
        }

        tracing::debug!(
            year,
            phase = self.economic_phase().name(),
            events = events.len(),
            "world advanced"
        );
        signals.emit(Signal::YearAdvanced { year });

        events
    }

    /// Each kingdom at peace sizes up one random neighbor per year.
    fn roll_wars(&mut self, rng: &mut ChaCha8Rng, signals: &mut SignalLog) {
        for i in 0..self.kingdoms.len() {
            let target = {
                let me = &self.kingdoms[i];
                if me.is_collapsed() || me.is_at_war() {
                    continue;
                }
                let candidates: Vec<KingdomId> = self
                    .kingdoms
                    .iter()
                    .filter(|k| k.id != me.id && !k.is_collapsed() && !k.is_at_war())
                    .map(|k| k.id.clone())
                    .collect();
                if candidates.is_empty() {
                    continue;
                }
                candidates[rng.gen_range(0..candidates.len())].clone()
            };

            if self.kingdoms[i].roll_war(&target, rng, signals) {
                let aggressor_id = self.kingdoms[i].id.clone();
                if let Some(defender) = self.kingdom_mut(&target) {
                    defender.enter_war(aggressor_id);
                }
            }
        }
    }

    /// Ongoing wars have a yearly chance to resolve. The stronger army
    /// usually wins; the loser cedes one region to the victor.
    fn resolve_wars(&mut self, rng: &mut ChaCha8Rng, signals: &mut SignalLog) {
        let mut handled: Vec<KingdomId> = Vec::new();

        for i in 0..self.kingdoms.len() {
            let (id, enemy_id) = {
                let k = &self.kingdoms[i];
                (k.id.clone(), k.at_war_with().cloned())
            };
            let Some(enemy_id) = enemy_id else { continue };
            if handled.contains(&id) {
                continue;
            }
            handled.push(enemy_id.clone());

            let enemy_collapsed = self
                .kingdom(&enemy_id)
                .map(|k| k.is_collapsed())
                .unwrap_or(true);

            if !enemy_collapsed && rng.gen::<f64>() >= WAR_RESOLUTION_CHANCE {
                continue;
            }

            let victory = if enemy_collapsed {
                true
            } else {
                let mine = self.kingdoms[i].military() + rng.gen_range(0..20);
                let theirs = self
                    .kingdom(&enemy_id)
                    .map(|k| k.military())
                    .unwrap_or(0)
                    + rng.gen_range(0..20);
                mine >= theirs
            };

            self.kingdoms[i].end_war(victory, signals);
            if let Some(enemy) = self.kingdom_mut(&enemy_id) {
                enemy.end_war(!victory, signals);
            }

            let (winner, loser) = if victory {
                (id, enemy_id)
            } else {
                (enemy_id, id)
            };
            self.transfer_one_region(&loser, &winner, signals);
        }
    }

    /// Moves the loser's first region to the winner, if it has one.
    fn transfer_one_region(
        &mut self,
        loser_id: &KingdomId,
        winner_id: &KingdomId,
        signals: &mut SignalLog,
    ) {
        let spoils = self
            .kingdom(loser_id)
            .and_then(|k| k.region_ids().first().cloned());
        let Some(region_id) = spoils else { return };

        if let Some(loser) = self.kingdom_mut(loser_id) {
            loser.remove_region(&region_id);
        }
        if let Some(winner) = self.kingdom_mut(winner_id) {
            winner.add_region(region_id.clone());
        }
        if let Some(region) = self.region_mut(&region_id) {
            region.set_owning_kingdom(Some(winner_id.clone()), signals);
        }
    }

    /// Attaches target ids to a freshly generated event so downstream
    /// systems can locate what it touches.
    fn route_event(&self, event: &mut Event, rng: &mut ChaCha8Rng) {
        match &event.kind {
            EventKind::Political(_) => {
                let candidates: Vec<KingdomId> = self
                    .kingdoms
                    .iter()
                    .filter(|k| !k.is_collapsed())
                    .map(|k| k.id.clone())
                    .collect();
                if !candidates.is_empty() {
                    event.affects_kingdom =
                        Some(candidates[rng.gen_range(0..candidates.len())].clone());
                }
            }
            EventKind::Economic(economic) => {
                if economic.affected_class == Some(crate::core::types::AssetClass::Trade)
                    && !self.regions.is_empty()
                {
                    let idx = rng.gen_range(0..self.regions.len());
                    event.affects_region = Some(self.regions[idx].id.clone());
                }
            }
            EventKind::Magical(_) => {
                if event.severity >= EventSeverity::Major && !self.regions.is_empty() {
                    let idx = rng.gen_range(0..self.regions.len());
                    event.affects_region = Some(self.regions[idx].id.clone());
                }
            }
            EventKind::Personal(_) => {}
        }
    }

    /// Applies an event's world-side effects: stability shocks, forced
    /// wars, devastation, and competitor reactions. Portfolio and
    /// exposure effects are the caller's concern.
    pub fn apply_event(&mut self, event: &Event, rng: &mut ChaCha8Rng, signals: &mut SignalLog) {
        if let EventKind::Political(political) = &event.kind {
            if let Some(kingdom_id) = event.affects_kingdom.clone() {
                if let Some(kingdom) = self.kingdom_mut(&kingdom_id) {
                    kingdom.set_stability(kingdom.stability() + political.stability_impact);
                }
                if political.causes_war {
                    self.force_war(&kingdom_id, rng, signals);
                }
                if event.severity == EventSeverity::Catastrophic {
                    let ravaged = self
                        .kingdom(&kingdom_id)
                        .map(|k| k.region_ids().to_vec())
                        .unwrap_or_default();
                    for region_id in ravaged {
                        if let Some(region) = self.region_mut(&region_id) {
                            region.devastate(0.5, signals);
                        }
                    }
                }
            }
        }

        if let EventKind::Magical(_) = &event.kind {
            if event.severity == EventSeverity::Catastrophic {
                if let Some(region_id) = event.affects_region.clone() {
                    if let Some(region) = self.region_mut(&region_id) {
                        region.devastate(0.6, signals);
                    }
                }
            }
        }

        for competitor in &mut self.competitors {
            competitor.react_to_event(event.event_type(), event.severity);
        }
    }

    /// Drags the affected kingdom into a war with a random rival.
    fn force_war(
        &mut self,
        aggressor_id: &KingdomId,
        rng: &mut ChaCha8Rng,
        signals: &mut SignalLog,
    ) {
        let ready = self
            .kingdom(aggressor_id)
            .map(|k| !k.is_collapsed() && !k.is_at_war())
            .unwrap_or(false);
        if !ready {
            return;
        }

        let candidates: Vec<KingdomId> = self
            .kingdoms
            .iter()
            .filter(|k| k.id != *aggressor_id && !k.is_collapsed() && !k.is_at_war())
            .map(|k| k.id.clone())
            .collect();
        if candidates.is_empty() {
            return;
        }
        let target = candidates[rng.gen_range(0..candidates.len())].clone();

        if let Some(aggressor) = self.kingdom_mut(aggressor_id) {
            aggressor.enter_war(target.clone());
        }
        if let Some(defender) = self.kingdom_mut(&target) {
            defender.enter_war(aggressor_id.clone());
        }
        tracing::info!(aggressor = %aggressor_id, defender = %target, "event forced a war");
        signals.emit(Signal::WarDeclared {
            aggressor: aggressor_id.clone(),
            defender: target,
        });
    }

    /// Lets every kingdom that could crusade roll for one. Returns how
    /// many launched this year.
    pub fn roll_crusades(
        &mut self,
        exposure_detected: bool,
        rng: &mut ChaCha8Rng,
        signals: &mut SignalLog,
    ) -> u32 {
        let mut launched = 0;
        for kingdom in &mut self.kingdoms {
            if kingdom.roll_crusade(exposure_detected, rng, signals) {
                launched += 1;
            }
        }
        launched
    }

    /// Returns to an empty world at the given year. Used by prestige.
    pub fn reset(&mut self, starting_year: u64) {
        tracing::debug!(starting_year, "resetting world simulation");
        self.current_year = starting_year;
        self.regions.clear();
        self.kingdoms.clear();
        self.competitors.clear();
        self.generator.reset();
    }
}

impl Saveable for WorldSimulation {
    fn save(&self, ctx: &mut SaveContext) {
        ctx.write_uint("current-year", self.current_year);
        ctx.write_uint("economic-phase", self.economic_phase().index() as u64);
        ctx.write_double("base-growth-rate", self.base_growth_rate());

        ctx.write_uint("region-count", self.regions.len() as u64);
        for (i, region) in self.regions.iter().enumerate() {
            ctx.begin_section(&format!("region-{}", i));
            region.save(ctx);
            ctx.end_section();
        }

        ctx.write_uint("kingdom-count", self.kingdoms.len() as u64);
        for (i, kingdom) in self.kingdoms.iter().enumerate() {
            ctx.begin_section(&format!("kingdom-{}", i));
            kingdom.save(ctx);
            ctx.end_section();
        }

        ctx.write_uint("competitor-count", self.competitors.len() as u64);
        for (i, competitor) in self.competitors.iter().enumerate() {
            ctx.begin_section(&format!("competitor-{}", i));
            competitor.save(ctx);
            ctx.end_section();
        }

        ctx.begin_section("generator");
        self.generator.save(ctx);
        ctx.end_section();
    }

    fn load(&mut self, ctx: &mut SaveContext) -> Result<()> {
        self.reset(ctx.read_uint("current-year", DEFAULT_STARTING_YEAR));
        // Phase and growth rate are derived from the year; the stored
        // copies are informational only.

        let region_count = ctx.read_uint("region-count", 0);
        for i in 0..region_count {
            ctx.begin_section(&format!("region-{}", i));
            let region = Region::load_from(ctx);
            ctx.end_section();
            self.regions.push(region?);
        }

        let kingdom_count = ctx.read_uint("kingdom-count", 0);
        for i in 0..kingdom_count {
            ctx.begin_section(&format!("kingdom-{}", i));
            let kingdom = Kingdom::load_from(ctx);
            ctx.end_section();
            self.kingdoms.push(kingdom);
        }

        let competitor_count = ctx.read_uint("competitor-count", 0);
        for i in 0..competitor_count {
            ctx.begin_section(&format!("competitor-{}", i));
            let competitor = Competitor::load_from(ctx);
            ctx.end_section();
            self.competitors.push(competitor?);
        }

        if ctx.has_section("generator") {
            ctx.begin_section("generator");
            self.generator = EventGenerator::load_from(ctx);
            ctx.end_section();
        }

        tracing::debug!(
            year = self.current_year,
            regions = self.regions.len(),
            kingdoms = self.kingdoms.len(),
            "world simulation loaded"
        );
        Ok(())
    }
}
