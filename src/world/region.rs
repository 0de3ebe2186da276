//! Regions: the territorial cells of the world map.
//!
//! A region belongs to at most one kingdom at a time and may be wired
//! into the undirected trade-route graph. Geography is fixed at founding
//! and feeds passive bonuses into the economic subsystems; population
//! and resource output move with events (war, devastation).

use serde::{Deserialize, Serialize};

use crate::core::error::{LichError, Result};
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{GeographyType, KingdomId, RegionId};
use crate::save::context::SaveContext;

const DEFAULT_POPULATION: u64 = 10_000;
const DEFAULT_RESOURCE_MODIFIER: f64 = 1.0;

/// Devastation below this severity is absorbed quietly.
const DEVASTATION_SIGNAL_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub geography: GeographyType,
    owning_kingdom: Option<KingdomId>,
    population: u64,
    resource_modifier: f64,
    trade_connected: bool,
    trade_route_ids: Vec<RegionId>,
}

impl Region {
    pub fn new(id: impl Into<RegionId>, name: impl Into<String>, geography: GeographyType) -> Self {
        Region {
            id: id.into(),
            name: name.into(),
            geography,
            owning_kingdom: None,
            population: DEFAULT_POPULATION,
            resource_modifier: DEFAULT_RESOURCE_MODIFIER,
            trade_connected: false,
            trade_route_ids: Vec::new(),
        }
    }

    pub fn owning_kingdom(&self) -> Option<&KingdomId> {
        self.owning_kingdom.as_ref()
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn resource_modifier(&self) -> f64 {
        self.resource_modifier
    }

    pub fn is_trade_connected(&self) -> bool {
        self.trade_connected
    }

    pub fn trade_route_ids(&self) -> &[RegionId] {
        &self.trade_route_ids
    }

    /// Transfers the region to a new owner (or to none, when a kingdom
    /// collapses). Emits the ownership change with both sides of the
    /// transfer so observers can update their maps.
    pub fn set_owning_kingdom(&mut self, owner: Option<KingdomId>, signals: &mut SignalLog) {
        if self.owning_kingdom == owner {
            return;
        }
        let old_owner = self.owning_kingdom.take();
        self.owning_kingdom = owner.clone();
        tracing::info!(
            region = %self.id,
            old = old_owner.as_ref().map(|k| k.0.as_str()).unwrap_or("none"),
            new = owner.as_ref().map(|k| k.0.as_str()).unwrap_or("none"),
            "region changed hands"
        );
        signals.emit(Signal::OwnershipChanged {
            region: self.id.clone(),
            old_owner,
            new_owner: owner,
        });
    }

    /// Applies devastation of the given severity, clamped into [0, 1].
    ///
    /// Population falls by `floor(pop * severity * 0.5)` and the resource
    /// modifier by `severity * 0.3`, floored at 0.1. Only severities at or
    /// above 0.5 are loud enough to signal.
    pub fn devastate(&mut self, severity: f64, signals: &mut SignalLog) {
        let severity = severity.clamp(0.0, 1.0);

        let population_loss = (self.population as f64 * severity * 0.5) as u64;
        self.population = self.population.saturating_sub(population_loss);

        let resource_loss = severity * 0.3;
        if resource_loss > 0.0 {
            self.resource_modifier = (self.resource_modifier - resource_loss).max(0.1);
        }

        tracing::warn!(
            region = %self.id,
            severity = format!("{:.0}%", severity * 100.0),
            population_loss,
            resource_modifier = self.resource_modifier,
            "region devastated"
        );

        if severity >= DEVASTATION_SIGNAL_THRESHOLD {
            signals.emit(Signal::RegionDevastated {
                id: self.id.clone(),
                severity,
            });
        }
    }

    /// Adds an undirected trade link to another region. Duplicate links
    /// are ignored. Returns whether the link was added.
    pub fn add_trade_route(&mut self, other: RegionId) -> bool {
        if self.trade_route_ids.contains(&other) {
            return false;
        }
        self.trade_route_ids.push(other);
        self.trade_connected = true;
        true
    }

    /// Removes a trade link. A region with no remaining links drops off
    /// the trade network entirely.
    pub fn remove_trade_route(&mut self, other: &RegionId) -> bool {
        let before = self.trade_route_ids.len();
        self.trade_route_ids.retain(|id| id != other);
        if self.trade_route_ids.len() == before {
            return false;
        }
        if self.trade_route_ids.is_empty() {
            self.trade_connected = false;
        }
        true
    }

    pub fn has_trade_route(&self, other: &RegionId) -> bool {
        self.trade_route_ids.contains(other)
    }

    pub fn trade_bonus(&self) -> f64 {
        self.geography.trade_bonus()
    }

    pub fn resource_bonus(&self) -> f64 {
        self.geography.resource_bonus()
    }

    pub fn concealment_bonus(&self) -> f64 {
        self.geography.concealment_bonus()
    }

    /// Net resource output factor: geography bonus scaled by the mutable
    /// modifier that devastation erodes.
    pub fn resource_output(&self) -> f64 {
        self.resource_bonus() * self.resource_modifier
    }

    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_string("id", &self.id.0);
        ctx.write_string("name", &self.name);
        ctx.write_string("geography", self.geography.name());
        if let Some(owner) = &self.owning_kingdom {
            ctx.write_string("owning-kingdom-id", &owner.0);
        }
        ctx.write_uint("population", self.population);
        ctx.write_double("resource-modifier", self.resource_modifier);
        ctx.write_bool("trade-connected", self.trade_connected);

        ctx.write_uint("trade-route-count", self.trade_route_ids.len() as u64);
        for (i, route) in self.trade_route_ids.iter().enumerate() {
            ctx.write_string(&format!("trade-route-{}", i), &route.0);
        }
    }

    pub fn load_from(ctx: &SaveContext) -> Result<Region> {
        let geography_name = ctx.read_string("geography", "inland");
        let geography = GeographyType::from_name(&geography_name)
            .ok_or_else(|| LichError::Load(format!("unknown geography '{}'", geography_name)))?;

        let mut region = Region::new(
            ctx.read_string("id", "unknown"),
            ctx.read_string("name", "Unknown Region"),
            geography,
        );
        if ctx.has_key("owning-kingdom-id") {
            region.owning_kingdom = Some(KingdomId(ctx.read_string("owning-kingdom-id", "")));
        }
        region.population = ctx.read_uint("population", DEFAULT_POPULATION);
        region.resource_modifier = ctx
            .read_double("resource-modifier", DEFAULT_RESOURCE_MODIFIER)
            .clamp(0.1, 10.0);
        region.trade_connected = ctx.read_bool("trade-connected", false);

        let route_count = ctx.read_uint("trade-route-count", 0);
        for i in 0..route_count {
            let route = ctx.read_string(&format!("trade-route-{}", i), "");
            if !route.is_empty() {
                region.trade_route_ids.push(RegionId(route));
            }
        }
        Ok(region)
    }
}
