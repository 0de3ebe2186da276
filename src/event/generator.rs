//! Random event generation.
//!
//! Events are drawn from fixed template tables bucketed by severity.
//! Three cadences roll independently: a yearly check for small news, a
//! decade check for bigger shifts, and a century check for events that
//! reshape the world. The tables fix each event's mechanical payload;
//! severity only selects which table is in play.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{AssetClass, EventSeverity, EventType};
use crate::event::event::Event;
use crate::save::context::SaveContext;

const DEFAULT_YEARLY_CHANCE: f64 = 0.3;
const DEFAULT_DECADE_CHANCE: f64 = 0.7;
const DEFAULT_ERA_CHANCE: f64 = 0.9;

struct EconomicTemplate {
    name: &'static str,
    description: &'static str,
    market_modifier: f64,
    affected_class: Option<AssetClass>,
}

struct PoliticalTemplate {
    name: &'static str,
    description: &'static str,
    stability_impact: i32,
    causes_war: bool,
}

struct MagicalTemplate {
    name: &'static str,
    description: &'static str,
    exposure_impact: i32,
    affects_dark: bool,
}

struct PersonalTemplate {
    name: &'static str,
    description: &'static str,
    is_betrayal: bool,
    is_death: bool,
}

const ECONOMIC_MINOR: [EconomicTemplate; 4] = [
    EconomicTemplate {
        name: "Trade Fair",
        description: "A regional trade fair boosts commerce",
        market_modifier: 1.05,
        affected_class: Some(AssetClass::Trade),
    },
    EconomicTemplate {
        name: "Poor Harvest",
        description: "A below-average harvest affects food prices",
        market_modifier: 0.95,
        affected_class: Some(AssetClass::Property),
    },
    EconomicTemplate {
        name: "New Mine Discovery",
        description: "A new vein of ore is discovered",
        market_modifier: 1.08,
        affected_class: None,
    },
    EconomicTemplate {
        name: "Tax Increase",
        description: "Local taxes are raised slightly",
        market_modifier: 0.97,
        affected_class: Some(AssetClass::Property),
    },
];

const ECONOMIC_MODERATE: [EconomicTemplate; 4] = [
    EconomicTemplate {
        name: "Trade Route Opens",
        description: "A new trade route brings prosperity",
        market_modifier: 1.15,
        affected_class: Some(AssetClass::Trade),
    },
    EconomicTemplate {
        name: "Banking Crisis",
        description: "Several money lenders fail",
        market_modifier: 0.85,
        affected_class: Some(AssetClass::Financial),
    },
    EconomicTemplate {
        name: "Resource Boom",
        description: "Valuable resources flood the market",
        market_modifier: 1.20,
        affected_class: None,
    },
    EconomicTemplate {
        name: "Trade Embargo",
        description: "Political tensions disrupt trade",
        market_modifier: 0.80,
        affected_class: Some(AssetClass::Trade),
    },
];

const ECONOMIC_MAJOR: [EconomicTemplate; 4] = [
    EconomicTemplate {
        name: "Market Crash",
        description: "Financial markets collapse",
        market_modifier: 0.60,
        affected_class: None,
    },
    EconomicTemplate {
        name: "Golden Age",
        description: "Unprecedented prosperity sweeps the land",
        market_modifier: 1.40,
        affected_class: None,
    },
    EconomicTemplate {
        name: "Currency Devaluation",
        description: "The currency loses significant value",
        market_modifier: 0.70,
        affected_class: Some(AssetClass::Financial),
    },
    EconomicTemplate {
        name: "Discovery of New Lands",
        description: "New territories bring vast opportunity",
        market_modifier: 1.50,
        affected_class: Some(AssetClass::Trade),
    },
];

const POLITICAL_MINOR: [PoliticalTemplate; 4] = [
    PoliticalTemplate {
        name: "Noble Scandal",
        description: "A minor noble is caught in scandal",
        stability_impact: -5,
        causes_war: false,
    },
    PoliticalTemplate {
        name: "Royal Proclamation",
        description: "The crown issues new edicts",
        stability_impact: 5,
        causes_war: false,
    },
    PoliticalTemplate {
        name: "Border Skirmish",
        description: "Minor conflict on the frontier",
        stability_impact: -10,
        causes_war: false,
    },
    PoliticalTemplate {
        name: "Diplomatic Visit",
        description: "Foreign dignitaries improve relations",
        stability_impact: 10,
        causes_war: false,
    },
];

const POLITICAL_MODERATE: [PoliticalTemplate; 4] = [
    PoliticalTemplate {
        name: "Succession Dispute",
        description: "Questions arise about the line of succession",
        stability_impact: -25,
        causes_war: false,
    },
    PoliticalTemplate {
        name: "Reform Movement",
        description: "Calls for change sweep the populace",
        stability_impact: -15,
        causes_war: false,
    },
    PoliticalTemplate {
        name: "Alliance Formed",
        description: "A powerful alliance is announced",
        stability_impact: 20,
        causes_war: false,
    },
    PoliticalTemplate {
        name: "Peasant Unrest",
        description: "The common folk grow restless",
        stability_impact: -20,
        causes_war: false,
    },
];

const POLITICAL_MAJOR: [PoliticalTemplate; 4] = [
    PoliticalTemplate {
        name: "Civil War",
        description: "The realm tears itself apart",
        stability_impact: -50,
        causes_war: true,
    },
    PoliticalTemplate {
        name: "Revolution",
        description: "The old order is overthrown",
        stability_impact: -60,
        causes_war: true,
    },
    PoliticalTemplate {
        name: "Conquest",
        description: "Foreign armies march on the capital",
        stability_impact: -40,
        causes_war: true,
    },
    PoliticalTemplate {
        name: "Golden Peace",
        description: "A century-long peace treaty is signed",
        stability_impact: 50,
        causes_war: false,
    },
];

const MAGICAL_MINOR: [MagicalTemplate; 4] = [
    MagicalTemplate {
        name: "Strange Lights",
        description: "Unusual lights seen in the sky",
        exposure_impact: 5,
        affects_dark: false,
    },
    MagicalTemplate {
        name: "Witch Accusations",
        description: "Rumors of witchcraft spread",
        exposure_impact: 10,
        affects_dark: false,
    },
    MagicalTemplate {
        name: "Blessed Harvest",
        description: "The harvest is miraculously bountiful",
        exposure_impact: -5,
        affects_dark: false,
    },
    MagicalTemplate {
        name: "Cursed Well",
        description: "A village well turns bitter",
        exposure_impact: 8,
        affects_dark: true,
    },
];

const MAGICAL_MODERATE: [MagicalTemplate; 4] = [
    MagicalTemplate {
        name: "Artifact Discovered",
        description: "An ancient artifact is unearthed",
        exposure_impact: 20,
        affects_dark: true,
    },
    MagicalTemplate {
        name: "Magical Plague",
        description: "A mysterious illness spreads",
        exposure_impact: 25,
        affects_dark: true,
    },
    MagicalTemplate {
        name: "Divine Vision",
        description: "A saint receives a holy vision",
        exposure_impact: -15,
        affects_dark: false,
    },
    MagicalTemplate {
        name: "Demonic Sighting",
        description: "Reports of demon activity",
        exposure_impact: 30,
        affects_dark: true,
    },
];

const MAGICAL_MAJOR: [MagicalTemplate; 4] = [
    MagicalTemplate {
        name: "The Veil Thins",
        description: "The barrier between worlds weakens",
        exposure_impact: 50,
        affects_dark: true,
    },
    MagicalTemplate {
        name: "Divine Intervention",
        description: "The gods manifest their power",
        exposure_impact: -40,
        affects_dark: false,
    },
    MagicalTemplate {
        name: "Magical Catastrophe",
        description: "A spell goes terribly wrong",
        exposure_impact: 60,
        affects_dark: true,
    },
    MagicalTemplate {
        name: "Age of Miracles",
        description: "Magic becomes commonplace",
        exposure_impact: 40,
        affects_dark: true,
    },
];

const PERSONAL_MINOR: [PersonalTemplate; 4] = [
    PersonalTemplate {
        name: "Agent Illness",
        description: "One of your agents falls ill",
        is_betrayal: false,
        is_death: false,
    },
    PersonalTemplate {
        name: "Agent Promotion",
        description: "An agent gains influence",
        is_betrayal: false,
        is_death: false,
    },
    PersonalTemplate {
        name: "Family Dispute",
        description: "Quarrel among your servants",
        is_betrayal: false,
        is_death: false,
    },
    PersonalTemplate {
        name: "New Contact",
        description: "An agent makes a valuable connection",
        is_betrayal: false,
        is_death: false,
    },
];

const PERSONAL_MODERATE: [PersonalTemplate; 4] = [
    PersonalTemplate {
        name: "Agent Investigated",
        description: "Authorities take interest in an agent",
        is_betrayal: false,
        is_death: false,
    },
    PersonalTemplate {
        name: "Wavering Loyalty",
        description: "An agent questions their service",
        is_betrayal: true,
        is_death: false,
    },
    PersonalTemplate {
        name: "Agent Marriage",
        description: "An agent's family grows",
        is_betrayal: false,
        is_death: false,
    },
    PersonalTemplate {
        name: "Agent Accident",
        description: "Serious injury befalls an agent",
        is_betrayal: false,
        is_death: false,
    },
];

const PERSONAL_MAJOR: [PersonalTemplate; 4] = [
    PersonalTemplate {
        name: "Betrayal",
        description: "An agent reveals secrets to your enemies",
        is_betrayal: true,
        is_death: false,
    },
    PersonalTemplate {
        name: "Agent Death",
        description: "A valued servant meets their end",
        is_betrayal: false,
        is_death: true,
    },
    PersonalTemplate {
        name: "Inquisitor Interest",
        description: "Church investigators target your network",
        is_betrayal: true,
        is_death: false,
    },
    PersonalTemplate {
        name: "Martyr's End",
        description: "An agent dies protecting your secrets",
        is_betrayal: true,
        is_death: true,
    },
];

/// Rolls and instantiates events from the template tables.
///
/// Ids are deterministic given the rng seed: a per-run counter joined
/// with the year of generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventGenerator {
    yearly_event_chance: f64,
    decade_event_chance: f64,
    era_event_chance: f64,
    event_counter: u32,
}

impl Default for EventGenerator {
    fn default() -> Self {
        EventGenerator {
            yearly_event_chance: DEFAULT_YEARLY_CHANCE,
            decade_event_chance: DEFAULT_DECADE_CHANCE,
            era_event_chance: DEFAULT_ERA_CHANCE,
            event_counter: 0,
        }
    }
}

impl EventGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yearly_event_chance(&self) -> f64 {
        self.yearly_event_chance
    }

    pub fn set_yearly_event_chance(&mut self, chance: f64) {
        self.yearly_event_chance = chance.clamp(0.0, 1.0);
    }

    pub fn decade_event_chance(&self) -> f64 {
        self.decade_event_chance
    }

    pub fn set_decade_event_chance(&mut self, chance: f64) {
        self.decade_event_chance = chance.clamp(0.0, 1.0);
    }

    pub fn era_event_chance(&self) -> f64 {
        self.era_event_chance
    }

    pub fn set_era_event_chance(&mut self, chance: f64) {
        self.era_event_chance = chance.clamp(0.0, 1.0);
    }

    fn next_id(&mut self, prefix: &str, year: u64) -> String {
        self.event_counter += 1;
        format!("{}-{}-{}", prefix, year, self.event_counter)
    }

    fn pick_type(rng: &mut ChaCha8Rng) -> EventType {
        match rng.gen_range(0..4) {
            0 => EventType::Economic,
            1 => EventType::Political,
            2 => EventType::Magical,
            _ => EventType::Personal,
        }
    }

    fn create_typed(
        &mut self,
        event_type: EventType,
        severity: EventSeverity,
        year: u64,
        rng: &mut ChaCha8Rng,
    ) -> Event {
        match event_type {
            EventType::Economic => self.create_economic_event(severity, year, rng),
            EventType::Political => self.create_political_event(severity, year, rng),
            EventType::Magical => self.create_magical_event(severity, year, rng),
            EventType::Personal => self.create_personal_event(severity, year, rng),
        }
    }

    /// Rolls the yearly cadence: at most one event, usually minor.
    pub fn generate_yearly_events(&mut self, year: u64, rng: &mut ChaCha8Rng) -> Vec<Event> {
        if rng.gen::<f64>() >= self.yearly_event_chance {
            return Vec::new();
        }

        let event_type = Self::pick_type(rng);
        let severity = if rng.gen::<f64>() < 0.75 {
            EventSeverity::Minor
        } else {
            EventSeverity::Moderate
        };

        vec![self.create_typed(event_type, severity, year, rng)]
    }

    /// Rolls the decade cadence: one or occasionally two events of
    /// moderate or major severity.
    pub fn generate_decade_events(&mut self, year: u64, rng: &mut ChaCha8Rng) -> Vec<Event> {
        if rng.gen::<f64>() >= self.decade_event_chance {
            return Vec::new();
        }

        let count = if rng.gen::<f64>() < 0.3 { 2 } else { 1 };
        let mut events = Vec::with_capacity(count);
        for _ in 0..count {
            let severity = if rng.gen::<f64>() < 0.6 {
                EventSeverity::Moderate
            } else {
                EventSeverity::Major
            };
            let event_type = Self::pick_type(rng);
            events.push(self.create_typed(event_type, severity, year, rng));
        }
        events
    }

    /// Rolls the century cadence: one world-shaking event, sometimes
    /// with an economic aftershock.
    pub fn generate_era_events(&mut self, year: u64, rng: &mut ChaCha8Rng) -> Vec<Event> {
        if rng.gen::<f64>() >= self.era_event_chance {
            return Vec::new();
        }

        let severity = if rng.gen::<f64>() < 0.7 {
            EventSeverity::Major
        } else {
            EventSeverity::Catastrophic
        };

        let mut events = Vec::new();
        match rng.gen_range(0..3) {
            0 => {
                // Political upheaval with economic consequences.
                events.push(self.create_political_event(severity, year, rng));
                events.push(self.create_economic_event(EventSeverity::Moderate, year, rng));
            }
            1 => events.push(self.create_magical_event(severity, year, rng)),
            _ => events.push(self.create_economic_event(severity, year, rng)),
        }
        events
    }

    pub fn create_economic_event(
        &mut self,
        severity: EventSeverity,
        year: u64,
        rng: &mut ChaCha8Rng,
    ) -> Event {
        let table: &[EconomicTemplate] = match severity {
            EventSeverity::Minor => &ECONOMIC_MINOR,
            EventSeverity::Moderate => &ECONOMIC_MODERATE,
            EventSeverity::Major | EventSeverity::Catastrophic => &ECONOMIC_MAJOR,
        };
        let tmpl = &table[rng.gen_range(0..table.len())];

        let mut event = Event::economic(
            self.next_id("econ", year),
            tmpl.name,
            severity,
            year,
            tmpl.market_modifier,
            tmpl.affected_class,
        );
        event.description = tmpl.description.to_string();
        event
    }

    pub fn create_political_event(
        &mut self,
        severity: EventSeverity,
        year: u64,
        rng: &mut ChaCha8Rng,
    ) -> Event {
        let table: &[PoliticalTemplate] = match severity {
            EventSeverity::Minor => &POLITICAL_MINOR,
            EventSeverity::Moderate => &POLITICAL_MODERATE,
            EventSeverity::Major | EventSeverity::Catastrophic => &POLITICAL_MAJOR,
        };
        let tmpl = &table[rng.gen_range(0..table.len())];

        let mut event = Event::political(
            self.next_id("poli", year),
            tmpl.name,
            severity,
            year,
            tmpl.stability_impact,
            tmpl.causes_war,
        );
        event.description = tmpl.description.to_string();
        event
    }

    pub fn create_magical_event(
        &mut self,
        severity: EventSeverity,
        year: u64,
        rng: &mut ChaCha8Rng,
    ) -> Event {
        let table: &[MagicalTemplate] = match severity {
            EventSeverity::Minor => &MAGICAL_MINOR,
            EventSeverity::Moderate => &MAGICAL_MODERATE,
            EventSeverity::Major | EventSeverity::Catastrophic => &MAGICAL_MAJOR,
        };
        let tmpl = &table[rng.gen_range(0..table.len())];

        let mut event = Event::magical(
            self.next_id("magi", year),
            tmpl.name,
            severity,
            year,
            tmpl.exposure_impact,
            tmpl.affects_dark,
        );
        event.description = tmpl.description.to_string();
        event
    }

    pub fn create_personal_event(
        &mut self,
        severity: EventSeverity,
        year: u64,
        rng: &mut ChaCha8Rng,
    ) -> Event {
        let table: &[PersonalTemplate] = match severity {
            EventSeverity::Minor => &PERSONAL_MINOR,
            EventSeverity::Moderate => &PERSONAL_MODERATE,
            EventSeverity::Major | EventSeverity::Catastrophic => &PERSONAL_MAJOR,
        };
        let tmpl = &table[rng.gen_range(0..table.len())];

        // The target agent is routed in by the orchestrator, which knows
        // the living roster.
        let mut event = Event::personal(
            self.next_id("pers", year),
            tmpl.name,
            severity,
            year,
            None,
            tmpl.is_betrayal,
            tmpl.is_death,
        );
        event.description = tmpl.description.to_string();
        event
    }

    pub fn reset(&mut self) {
        self.event_counter = 0;
    }

    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_double("yearly-event-chance", self.yearly_event_chance);
        ctx.write_double("decade-event-chance", self.decade_event_chance);
        ctx.write_double("era-event-chance", self.era_event_chance);
        ctx.write_uint("event-counter", self.event_counter as u64);
    }

    pub fn load_from(ctx: &SaveContext) -> EventGenerator {
        let mut generator = EventGenerator::new();
        generator.set_yearly_event_chance(
            ctx.read_double("yearly-event-chance", DEFAULT_YEARLY_CHANCE),
        );
        generator.set_decade_event_chance(
            ctx.read_double("decade-event-chance", DEFAULT_DECADE_CHANCE),
        );
        generator.set_era_event_chance(ctx.read_double("era-event-chance", DEFAULT_ERA_CHANCE));
        generator.event_counter = ctx.read_uint("event-counter", 0) as u32;
        generator
    }
}
