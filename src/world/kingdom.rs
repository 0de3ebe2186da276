//! Kingdoms: the mortal polities whose fortunes move the markets.
//!
//! Five attributes in [0, 100] drift every simulated year. Stability
//! and prosperity reinforce each other; war drains both while building
//! the military. A kingdom whose stability bottoms out may collapse,
//! releasing its regions. Intolerant kingdoms may launch crusades once
//! the player's exposure is detected.

use ahash::AHashMap;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{KingdomId, KingdomRelation, RegionId};
use crate::save::context::SaveContext;

const DEFAULT_ATTRIBUTE: i32 = 50;

/// Maximum random attribute movement per year.
const YEARLY_ATTRIBUTE_DRIFT: i32 = 2;

/// Stability at or below this makes collapse possible.
const COLLAPSE_THRESHOLD: i32 = 10;
const COLLAPSE_BASE_CHANCE: f64 = 0.05;

/// Minimum military strength before a kingdom considers war.
const WAR_MILITARY_THRESHOLD: i32 = 60;
const WAR_BASE_CHANCE: f64 = 0.02;

/// Tolerance at or below this makes crusades possible.
const CRUSADE_TOLERANCE_THRESHOLD: i32 = 30;
const CRUSADE_BASE_CHANCE: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kingdom {
    pub id: KingdomId,
    pub name: String,
    pub ruler_name: String,
    stability: i32,
    prosperity: i32,
    military: i32,
    culture: i32,
    tolerance: i32,
    dynasty_years: u64,
    is_collapsed: bool,
    at_war_with: Option<KingdomId>,
    region_ids: Vec<RegionId>,
    relations: AHashMap<KingdomId, KingdomRelation>,
}

impl Kingdom {
    pub fn new(
        id: impl Into<KingdomId>,
        name: impl Into<String>,
        ruler_name: impl Into<String>,
    ) -> Self {
        Kingdom {
            id: id.into(),
            name: name.into(),
            ruler_name: ruler_name.into(),
            stability: DEFAULT_ATTRIBUTE,
            prosperity: DEFAULT_ATTRIBUTE,
            military: DEFAULT_ATTRIBUTE,
            culture: DEFAULT_ATTRIBUTE,
            tolerance: DEFAULT_ATTRIBUTE,
            dynasty_years: 0,
            is_collapsed: false,
            at_war_with: None,
            region_ids: Vec::new(),
            relations: AHashMap::new(),
        }
    }

    pub fn stability(&self) -> i32 {
        self.stability
    }

    pub fn prosperity(&self) -> i32 {
        self.prosperity
    }

    pub fn military(&self) -> i32 {
        self.military
    }

    pub fn culture(&self) -> i32 {
        self.culture
    }

    pub fn tolerance(&self) -> i32 {
        self.tolerance
    }

    pub fn set_stability(&mut self, value: i32) {
        self.stability = value.clamp(0, 100);
    }

    pub fn set_prosperity(&mut self, value: i32) {
        self.prosperity = value.clamp(0, 100);
    }

    pub fn set_military(&mut self, value: i32) {
        self.military = value.clamp(0, 100);
    }

    pub fn set_culture(&mut self, value: i32) {
        self.culture = value.clamp(0, 100);
    }

    pub fn set_tolerance(&mut self, value: i32) {
        self.tolerance = value.clamp(0, 100);
    }

    pub fn dynasty_years(&self) -> u64 {
        self.dynasty_years
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    pub fn at_war_with(&self) -> Option<&KingdomId> {
        self.at_war_with.as_ref()
    }

    pub fn is_at_war(&self) -> bool {
        self.at_war_with.is_some()
    }

    pub fn region_ids(&self) -> &[RegionId] {
        &self.region_ids
    }

    pub fn add_region(&mut self, region: RegionId) {
        if !self.region_ids.contains(&region) {
            self.region_ids.push(region);
        }
    }

    pub fn remove_region(&mut self, region: &RegionId) -> bool {
        let before = self.region_ids.len();
        self.region_ids.retain(|id| id != region);
        self.region_ids.len() != before
    }

    /// Marks this kingdom as a party to a war without rolling for it.
    /// Used for the defender's side of a declaration and for wars forced
    /// by world events.
    pub fn enter_war(&mut self, enemy: KingdomId) {
        self.set_relation(enemy.clone(), KingdomRelation::War);
        self.at_war_with = Some(enemy);
    }

    /// Strips all region ownership, returning the released ids. Called
    /// when the kingdom collapses.
    pub fn release_regions(&mut self) -> Vec<RegionId> {
        std::mem::take(&mut self.region_ids)
    }

    /// Relation to another kingdom. Unknown pairs default to neutral.
    pub fn relation(&self, other: &KingdomId) -> KingdomRelation {
        self.relations
            .get(other)
            .copied()
            .unwrap_or(KingdomRelation::Neutral)
    }

    pub fn set_relation(&mut self, other: KingdomId, relation: KingdomRelation) {
        tracing::debug!(kingdom = %self.id, other = %other, relation = ?relation, "relation set");
        self.relations.insert(other, relation);
    }

    /// Advances the kingdom one year. Attributes drift randomly with
    /// pressure from prosperity, stability, and any ongoing war. A
    /// collapsed kingdom is inert.
    pub fn tick_year(&mut self, rng: &mut ChaCha8Rng) {
        if self.is_collapsed {
            return;
        }

        self.dynasty_years += 1;

        let mut drift = rng.gen_range(-YEARLY_ATTRIBUTE_DRIFT..=YEARLY_ATTRIBUTE_DRIFT);
        if self.prosperity > 60 {
            drift += 1;
        }
        if self.prosperity < 40 {
            drift -= 1;
        }
        if self.at_war_with.is_some() {
            drift -= 2;
        }
        self.set_stability(self.stability + drift);

        let mut drift = rng.gen_range(-YEARLY_ATTRIBUTE_DRIFT..=YEARLY_ATTRIBUTE_DRIFT);
        if self.stability > 60 {
            drift += 1;
        }
        if self.stability < 40 {
            drift -= 1;
        }
        if self.at_war_with.is_some() {
            drift -= 1;
        }
        self.set_prosperity(self.prosperity + drift);

        let mut drift = rng.gen_range(-YEARLY_ATTRIBUTE_DRIFT / 2..=YEARLY_ATTRIBUTE_DRIFT / 2);
        if self.at_war_with.is_some() {
            drift += 2;
        }
        self.set_military(self.military + drift);

        let drift = rng.gen_range(-1..=1);
        self.set_culture(self.culture + drift);

        let drift = rng.gen_range(-1..=1);
        self.set_tolerance(self.tolerance + drift);
    }

    /// Rolls for collapse. Only possible at stability 10 or below; the
    /// chance climbs from 5% at the threshold to 20% at zero stability.
    pub fn roll_collapse(&mut self, rng: &mut ChaCha8Rng, signals: &mut SignalLog) -> bool {
        if self.is_collapsed || self.stability > COLLAPSE_THRESHOLD {
            return false;
        }

        let chance = COLLAPSE_BASE_CHANCE
            + ((COLLAPSE_THRESHOLD - self.stability) as f64 / COLLAPSE_THRESHOLD as f64) * 0.15;

        if rng.gen::<f64>() < chance {
            self.collapse(signals);
            return true;
        }
        false
    }

    /// Rolls for a declaration of war against the target. Requires a
    /// standing military of 60+, no current war, and no alliance with
    /// the target. Rivalries triple the base chance.
    pub fn roll_war(
        &mut self,
        target: &KingdomId,
        rng: &mut ChaCha8Rng,
        signals: &mut SignalLog,
    ) -> bool {
        if self.is_collapsed || self.at_war_with.is_some() {
            return false;
        }
        if self.military < WAR_MILITARY_THRESHOLD {
            return false;
        }

        let relation = self.relation(target);
        if relation == KingdomRelation::Alliance {
            return false;
        }

        let mut chance = WAR_BASE_CHANCE;
        if relation == KingdomRelation::Rivalry {
            chance *= 3.0;
        }
        chance += (self.military - WAR_MILITARY_THRESHOLD) as f64 / 100.0 * 0.05;

        if rng.gen::<f64>() < chance {
            self.at_war_with = Some(target.clone());
            self.set_relation(target.clone(), KingdomRelation::War);
            tracing::info!(aggressor = %self.id, defender = %target, "war declared");
            signals.emit(Signal::WarDeclared {
                aggressor: self.id.clone(),
                defender: target.clone(),
            });
            return true;
        }
        false
    }

    /// Rolls for a crusade against the player. Only intolerant kingdoms
    /// (tolerance 30 or below) that have detected the player's exposure
    /// will consider one; high culture sharpens the zeal.
    pub fn roll_crusade(
        &mut self,
        exposure_detected: bool,
        rng: &mut ChaCha8Rng,
        signals: &mut SignalLog,
    ) -> bool {
        if self.is_collapsed || !exposure_detected {
            return false;
        }
        if self.tolerance > CRUSADE_TOLERANCE_THRESHOLD {
            return false;
        }

        let mut chance = CRUSADE_BASE_CHANCE
            + ((CRUSADE_TOLERANCE_THRESHOLD - self.tolerance) as f64
                / CRUSADE_TOLERANCE_THRESHOLD as f64)
                * 0.10;
        if self.culture > 70 {
            chance *= 1.5;
        }

        if rng.gen::<f64>() < chance {
            tracing::warn!(kingdom = %self.id, "crusade launched against the undead");
            signals.emit(Signal::CrusadeLaunched {
                kingdom: self.id.clone(),
            });
            return true;
        }
        false
    }

    /// Ends the current war. Victory lifts stability and prosperity;
    /// defeat costs all three martial attributes. Either way the former
    /// enemies settle into rivalry.
    pub fn end_war(&mut self, victory: bool, signals: &mut SignalLog) {
        let enemy = match self.at_war_with.take() {
            Some(enemy) => enemy,
            None => return,
        };

        if victory {
            self.set_stability(self.stability + 10);
            self.set_prosperity(self.prosperity + 5);
            tracing::info!(kingdom = %self.id, enemy = %enemy, "war won");
        } else {
            self.set_stability(self.stability - 15);
            self.set_prosperity(self.prosperity - 10);
            self.set_military(self.military - 10);
            tracing::info!(kingdom = %self.id, enemy = %enemy, "war lost");
        }

        self.set_relation(enemy.clone(), KingdomRelation::Rivalry);
        signals.emit(Signal::WarEnded {
            kingdom: self.id.clone(),
            enemy,
            victory,
        });
    }

    pub fn collapse(&mut self, signals: &mut SignalLog) {
        if self.is_collapsed {
            return;
        }
        self.is_collapsed = true;
        self.stability = 0;
        tracing::warn!(kingdom = %self.id, name = %self.name, "kingdom collapsed");
        signals.emit(Signal::KingdomCollapsed {
            id: self.id.clone(),
        });
    }

    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_string("id", &self.id.0);
        ctx.write_string("name", &self.name);
        ctx.write_string("ruler-name", &self.ruler_name);

        ctx.write_int("stability", self.stability as i64);
        ctx.write_int("prosperity", self.prosperity as i64);
        ctx.write_int("military", self.military as i64);
        ctx.write_int("culture", self.culture as i64);
        ctx.write_int("tolerance", self.tolerance as i64);

        ctx.write_uint("dynasty-years", self.dynasty_years);
        ctx.write_bool("is-collapsed", self.is_collapsed);
        if let Some(enemy) = &self.at_war_with {
            ctx.write_string("at-war-with-id", &enemy.0);
        }

        ctx.write_uint("region-count", self.region_ids.len() as u64);
        for (i, region) in self.region_ids.iter().enumerate() {
            ctx.write_string(&format!("region-{}", i), &region.0);
        }

        ctx.write_uint("relation-count", self.relations.len() as u64);
        for (i, (other, relation)) in self.relations.iter().enumerate() {
            ctx.write_string(&format!("relation-{}-kingdom", i), &other.0);
            ctx.write_int(&format!("relation-{}-type", i), relation.index() as i64);
        }
    }

    pub fn load_from(ctx: &SaveContext) -> Kingdom {
        let mut kingdom = Kingdom::new(
            ctx.read_string("id", "unknown"),
            ctx.read_string("name", "Unknown Kingdom"),
            ctx.read_string("ruler-name", ""),
        );

        kingdom.set_stability(ctx.read_int("stability", DEFAULT_ATTRIBUTE as i64) as i32);
        kingdom.set_prosperity(ctx.read_int("prosperity", DEFAULT_ATTRIBUTE as i64) as i32);
        kingdom.set_military(ctx.read_int("military", DEFAULT_ATTRIBUTE as i64) as i32);
        kingdom.set_culture(ctx.read_int("culture", DEFAULT_ATTRIBUTE as i64) as i32);
        kingdom.set_tolerance(ctx.read_int("tolerance", DEFAULT_ATTRIBUTE as i64) as i32);

        kingdom.dynasty_years = ctx.read_uint("dynasty-years", 0);
        kingdom.is_collapsed = ctx.read_bool("is-collapsed", false);
        if ctx.has_key("at-war-with-id") {
            kingdom.at_war_with = Some(KingdomId(ctx.read_string("at-war-with-id", "")));
        }

        let region_count = ctx.read_uint("region-count", 0);
        for i in 0..region_count {
            let region = ctx.read_string(&format!("region-{}", i), "");
            if !region.is_empty() {
                kingdom.region_ids.push(RegionId(region));
            }
        }

        let relation_count = ctx.read_uint("relation-count", 0);
        for i in 0..relation_count {
            let other = ctx.read_string(&format!("relation-{}-kingdom", i), "");
            let index = ctx.read_int(&format!("relation-{}-type", i), 1);
            if let (false, Some(relation)) =
                (other.is_empty(), KingdomRelation::from_index(index as u8))
            {
                kingdom.relations.insert(KingdomId(other), relation);
            }
        }

        kingdom
    }
}
