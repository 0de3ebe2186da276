//! Rival immortals competing for the same mortal wealth.
//!
//! Competitors are opaque to the player until discovered. Four traits
//! in [0, 100] drive their behavior: aggression and cunning shape the
//! stance they take toward the player, greed and power feed their
//! reactions to world events. Destroying one retires it permanently.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{LichError, Result};
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{
    CompetitorId, CompetitorStance, CompetitorType, EventSeverity, EventType, RegionId,
};
use crate::save::context::SaveContext;

const DEFAULT_TRAIT: i32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    pub competitor_type: CompetitorType,
    stance: CompetitorStance,
    power_level: i32,
    aggression: i32,
    greed: i32,
    cunning: i32,
    is_active: bool,
    is_known: bool,
    territory_region_ids: Vec<RegionId>,
    player_threat_level: u32,
}

impl Competitor {
    pub fn new(
        id: impl Into<CompetitorId>,
        name: impl Into<String>,
        competitor_type: CompetitorType,
    ) -> Self {
        Competitor {
            id: id.into(),
            name: name.into(),
            competitor_type,
            stance: CompetitorStance::Unknown,
            power_level: DEFAULT_TRAIT,
            aggression: DEFAULT_TRAIT,
            greed: DEFAULT_TRAIT,
            cunning: DEFAULT_TRAIT,
            is_active: true,
            is_known: false,
            territory_region_ids: Vec::new(),
            player_threat_level: 0,
        }
    }

    pub fn stance(&self) -> CompetitorStance {
        self.stance
    }

    pub fn power_level(&self) -> i32 {
        self.power_level
    }

    pub fn aggression(&self) -> i32 {
        self.aggression
    }

    pub fn greed(&self) -> i32 {
        self.greed
    }

    pub fn cunning(&self) -> i32 {
        self.cunning
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_known(&self) -> bool {
        self.is_known
    }

    pub fn player_threat_level(&self) -> u32 {
        self.player_threat_level
    }

    pub fn territory_region_ids(&self) -> &[RegionId] {
        &self.territory_region_ids
    }

    pub fn set_power_level(&mut self, value: i32) {
        self.power_level = value.clamp(0, 100);
    }

    pub fn set_aggression(&mut self, value: i32) {
        self.aggression = value.clamp(0, 100);
    }

    pub fn set_greed(&mut self, value: i32) {
        self.greed = value.clamp(0, 100);
    }

    pub fn set_cunning(&mut self, value: i32) {
        self.cunning = value.clamp(0, 100);
    }

    /// The world's read on how much the player endangers this rival.
    /// Fed from exposure and portfolio scale by the orchestrator.
    pub fn set_player_threat_level(&mut self, level: u32) {
        self.player_threat_level = level.min(100);
    }

    /// Explicit stance changes (alliances, diplomatic action). Drift
    /// never reaches the allied stance on its own.
    pub fn set_stance(&mut self, stance: CompetitorStance, signals: &mut SignalLog) {
        if self.stance == stance {
            return;
        }
        self.stance = stance;
        signals.emit(Signal::StanceChanged {
            id: self.id.clone(),
            stance,
        });
    }

    /// Advances the competitor one year. Cunning rivals who rate the
    /// player a real threat re-evaluate their stance; power wanders
    /// slightly either way.
    pub fn tick_year(&mut self, rng: &mut ChaCha8Rng, signals: &mut SignalLog) {
        if !self.is_active {
            return;
        }

        if self.cunning > 50 && self.player_threat_level > 30 {
            self.evaluate_stance(signals);
        }

        self.power_level = (self.power_level + rng.gen_range(-2..=2)).clamp(0, 100);
    }

    /// Recomputes stance from aggression, perceived threat, and
    /// temperament. Scores at 20 or below leave the stance alone.
    fn evaluate_stance(&mut self, signals: &mut SignalLog) {
        let mut hostility = self.aggression;
        hostility += (self.player_threat_level / 2) as i32;

        if self.cunning > 60 {
            hostility -= 20;
        }

        if self.greed > 70 {
            if self.player_threat_level > 50 {
                hostility += 10;
            } else {
                hostility -= 10;
            }
        }

        let next = if hostility > 80 {
            CompetitorStance::Hostile
        } else if hostility > 60 {
            CompetitorStance::Wary
        } else if hostility > 40 {
            CompetitorStance::Neutral
        } else if hostility > 20 {
            CompetitorStance::Friendly
        } else {
            return;
        };

        if next != self.stance {
            tracing::debug!(
                competitor = %self.id,
                old = self.stance.name(),
                new = next.name(),
                hostility,
                "stance shifted"
            );
            self.set_stance(next, signals);
        }
    }

    /// Species-specific reaction to a world event.
    pub fn react_to_event(&mut self, event_type: EventType, severity: EventSeverity) {
        if !self.is_active {
            return;
        }

        match self.competitor_type {
            CompetitorType::Dragon => {
                if event_type == EventType::Political && severity >= EventSeverity::Major {
                    self.set_aggression(self.aggression + 10);
                }
            }
            CompetitorType::Vampire => {
                if event_type == EventType::Political && severity >= EventSeverity::Moderate {
                    self.set_power_level(self.power_level + 5);
                }
            }
            CompetitorType::Lich => {
                if event_type == EventType::Magical {
                    self.set_cunning(self.cunning + 5);
                }
            }
            CompetitorType::Fae => {
                if event_type == EventType::Magical && severity >= EventSeverity::Major {
                    self.set_greed(self.greed + 10);
                }
            }
            CompetitorType::Demon => {
                if severity >= EventSeverity::Catastrophic {
                    self.set_aggression(self.aggression + 15);
                }
            }
        }
    }

    /// Reveals the competitor to the player. Idempotent.
    pub fn discover(&mut self, signals: &mut SignalLog) {
        if self.is_known {
            return;
        }
        self.is_known = true;
        tracing::info!(competitor = %self.id, name = %self.name, "competitor discovered");
        signals.emit(Signal::CompetitorDiscovered {
            id: self.id.clone(),
            name: self.name.clone(),
        });
    }

    /// Permanently retires the competitor. Idempotent.
    pub fn destroy(&mut self, signals: &mut SignalLog) {
        if !self.is_active {
            return;
        }
        self.is_active = false;
        tracing::info!(competitor = %self.id, name = %self.name, "competitor destroyed");
        signals.emit(Signal::CompetitorDestroyed {
            id: self.id.clone(),
            name: self.name.clone(),
        });
    }

    /// Open hostility toward the player, skipping the usual drift.
    pub fn declare_conflict(&mut self, signals: &mut SignalLog) {
        self.set_stance(CompetitorStance::Hostile, signals);
    }

    pub fn add_territory(&mut self, region: RegionId) -> bool {
        if self.territory_region_ids.contains(&region) {
            return false;
        }
        self.territory_region_ids.push(region);
        true
    }

    pub fn remove_territory(&mut self, region: &RegionId) -> bool {
        let before = self.territory_region_ids.len();
        self.territory_region_ids.retain(|id| id != region);
        self.territory_region_ids.len() != before
    }

    pub fn has_territory(&self, region: &RegionId) -> bool {
        self.territory_region_ids.contains(region)
    }

    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_string("id", &self.id.0);
        ctx.write_string("name", &self.name);
        ctx.write_string("competitor-type", self.competitor_type.name());
        ctx.write_string("stance", self.stance.name());

        ctx.write_int("power-level", self.power_level as i64);
        ctx.write_int("aggression", self.aggression as i64);
        ctx.write_int("greed", self.greed as i64);
        ctx.write_int("cunning", self.cunning as i64);

        ctx.write_bool("is-active", self.is_active);
        ctx.write_bool("is-known", self.is_known);
        ctx.write_uint("player-threat-level", self.player_threat_level as u64);

        ctx.write_uint("territory-count", self.territory_region_ids.len() as u64);
        for (i, region) in self.territory_region_ids.iter().enumerate() {
            ctx.write_string(&format!("territory-{}", i), &region.0);
        }
    }

    pub fn load_from(ctx: &SaveContext) -> Result<Competitor> {
        let type_name = ctx.read_string("competitor-type", "");
        let competitor_type = CompetitorType::from_name(&type_name)
            .ok_or_else(|| LichError::Load(format!("unknown competitor type '{}'", type_name)))?;

        let mut competitor = Competitor::new(
            ctx.read_string("id", "unknown"),
            ctx.read_string("name", "Unknown Rival"),
            competitor_type,
        );
        competitor.stance = CompetitorStance::from_name(&ctx.read_string("stance", "unknown"))
            .unwrap_or(CompetitorStance::Unknown);

        competitor.set_power_level(ctx.read_int("power-level", DEFAULT_TRAIT as i64) as i32);
        competitor.set_aggression(ctx.read_int("aggression", DEFAULT_TRAIT as i64) as i32);
        competitor.set_greed(ctx.read_int("greed", DEFAULT_TRAIT as i64) as i32);
        competitor.set_cunning(ctx.read_int("cunning", DEFAULT_TRAIT as i64) as i32);

        competitor.is_active = ctx.read_bool("is-active", true);
        competitor.is_known = ctx.read_bool("is-known", false);
        competitor.player_threat_level = ctx.read_uint("player-threat-level", 0) as u32;

        let territory_count = ctx.read_uint("territory-count", 0);
        for i in 0..territory_count {
            let region = ctx.read_string(&format!("territory-{}", i), "");
            if !region.is_empty() {
                competitor.territory_region_ids.push(RegionId(region));
            }
        }
        Ok(competitor)
    }
}
