//! World events and their per-kind behavior
//!
//! An [`Event`] pairs routing fields (who and where it hits, how long it
//! lasts) with an [`EventKind`] payload. The kind decides how the event
//! scales each asset class, which player choices it offers, and how its
//! narrative reads.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, AssetClass, EventId, EventSeverity, EventType, KingdomId, RegionId};

/// One option presented to the player by a choice event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChoice {
    pub id: String,
    pub text: String,
    pub consequence: String,
    pub requires_gold: bool,
    pub gold_cost: f64,
    pub requires_agent: bool,
}

impl EventChoice {
    fn new(id: &str, text: &str, consequence: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            consequence: consequence.to_string(),
            requires_gold: false,
            gold_cost: 0.0,
            requires_agent: false,
        }
    }

    fn with_gold_cost(mut self, cost: f64) -> Self {
        self.requires_gold = true;
        self.gold_cost = cost;
        self
    }
}

/// Market swing hitting one asset class, or all of them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicEvent {
    pub market_modifier: f64,
    /// None means every class is affected.
    pub affected_class: Option<AssetClass>,
}

/// Stability shift in a kingdom, possibly open war
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliticalEvent {
    pub stability_impact: i32,
    pub causes_war: bool,
}

/// Arcane disturbance shifting how visible dark dealings are
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicalEvent {
    pub exposure_impact: i32,
    pub affects_dark: bool,
}

/// Something happening to one of the lich's own servants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalEvent {
    pub target_agent: Option<AgentId>,
    pub is_betrayal: bool,
    pub is_death: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    Economic(EconomicEvent),
    Political(PoliticalEvent),
    Magical(MagicalEvent),
    Personal(PersonalEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub severity: EventSeverity,
    pub year_occurred: u64,
    pub affects_region: Option<RegionId>,
    pub affects_kingdom: Option<KingdomId>,
    /// Remaining active years; 0 means instantaneous.
    pub duration_years: u32,
    pub is_active: bool,
    pub kind: EventKind,
}

impl Event {
    fn new(
        id: impl Into<EventId>,
        name: impl Into<String>,
        severity: EventSeverity,
        year_occurred: u64,
        kind: EventKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            severity,
            year_occurred,
            affects_region: None,
            affects_kingdom: None,
            duration_years: 0,
            is_active: true,
            kind,
        }
    }

    pub fn economic(
        id: impl Into<EventId>,
        name: impl Into<String>,
        severity: EventSeverity,
        year_occurred: u64,
        market_modifier: f64,
        affected_class: Option<AssetClass>,
    ) -> Self {
        Self::new(
            id,
            name,
            severity,
            year_occurred,
            EventKind::Economic(EconomicEvent {
                market_modifier,
                affected_class,
            }),
        )
    }

    pub fn political(
        id: impl Into<EventId>,
        name: impl Into<String>,
        severity: EventSeverity,
        year_occurred: u64,
        stability_impact: i32,
        causes_war: bool,
    ) -> Self {
        Self::new(
            id,
            name,
            severity,
            year_occurred,
            EventKind::Political(PoliticalEvent {
                stability_impact,
                causes_war,
            }),
        )
    }

    pub fn magical(
        id: impl Into<EventId>,
        name: impl Into<String>,
        severity: EventSeverity,
        year_occurred: u64,
        exposure_impact: i32,
        affects_dark: bool,
    ) -> Self {
        Self::new(
            id,
            name,
            severity,
            year_occurred,
            EventKind::Magical(MagicalEvent {
                exposure_impact,
                affects_dark,
            }),
        )
    }

    pub fn personal(
        id: impl Into<EventId>,
        name: impl Into<String>,
        severity: EventSeverity,
        year_occurred: u64,
        target_agent: Option<AgentId>,
        is_betrayal: bool,
        is_death: bool,
    ) -> Self {
        Self::new(
            id,
            name,
            severity,
            year_occurred,
            EventKind::Personal(PersonalEvent {
                target_agent,
                is_betrayal,
                is_death,
            }),
        )
    }

    pub fn event_type(&self) -> EventType {
        match self.kind {
            EventKind::Economic(_) => EventType::Economic,
            EventKind::Political(_) => EventType::Political,
            EventKind::Magical(_) => EventType::Magical,
            EventKind::Personal(_) => EventType::Personal,
        }
    }

    /// Multiplier this event applies to an investment of the given
    /// class. 1.0 means untouched.
    pub fn investment_modifier(&self, class: AssetClass) -> f64 {
        match &self.kind {
            EventKind::Economic(economic) => match economic.affected_class {
                None => economic.market_modifier,
                Some(affected) if affected == class => economic.market_modifier,
                Some(_) => 1.0,
            },
            EventKind::Political(political) => {
                if political.causes_war {
                    // War is devastating for everything
                    0.5
                } else if political.stability_impact < -20 {
                    match class {
                        AssetClass::Trade | AssetClass::Property => 0.7,
                        // Political holdings thrive in instability
                        AssetClass::Political => 1.3,
                        _ => 1.0,
                    }
                } else if political.stability_impact > 20 && class == AssetClass::Trade {
                    1.2
                } else {
                    1.0
                }
            }
            EventKind::Magical(magical) => {
                if magical.affects_dark && class == AssetClass::Dark {
                    if magical.exposure_impact > 0 {
                        0.6
                    } else {
                        1.4
                    }
                } else if class == AssetClass::Magical {
                    if magical.exposure_impact > 20 {
                        0.8
                    } else if magical.exposure_impact < -20 {
                        1.3
                    } else {
                        1.0
                    }
                } else {
                    1.0
                }
            }
            EventKind::Personal(_) => 1.0,
        }
    }

    /// Exposure points this event adds or removes when applied.
    pub fn exposure_delta(&self) -> i32 {
        match &self.kind {
            EventKind::Magical(magical) => magical.exposure_impact,
            _ => 0,
        }
    }

    /// Player choices this event demands, if any. Only personal events
    /// about betrayal or death require a decision.
    pub fn choices(&self) -> Vec<EventChoice> {
        let EventKind::Personal(personal) = &self.kind else {
            return Vec::new();
        };
        if personal.is_betrayal {
            vec![
                EventChoice::new(
                    "punish",
                    "Make an example of the traitor",
                    "The traitor is destroyed. Other agents take note.",
                ),
                EventChoice::new(
                    "forgive",
                    "Show unexpected mercy",
                    "The agent's loyalty wavers. Some see wisdom, others weakness.",
                ),
                EventChoice::new(
                    "turn",
                    "Bind them more tightly to your will",
                    "Dark magic ensures future loyalty, but at great cost.",
                )
                .with_gold_cost(10_000.0),
            ]
        } else if personal.is_death {
            vec![
                EventChoice::new(
                    "accept",
                    "Accept the natural order",
                    "The agent passes. Their knowledge is lost.",
                ),
                EventChoice::new(
                    "raise",
                    "Raise them from death",
                    "The agent returns, changed. Exposure increases significantly.",
                )
                .with_gold_cost(50_000.0),
            ]
        } else {
            Vec::new()
        }
    }

    pub fn has_choices(&self) -> bool {
        !self.choices().is_empty()
    }

    /// Multi-line flavor text for the chronicle and the player.
    pub fn narrative_text(&self) -> String {
        match &self.kind {
            EventKind::Economic(economic) => {
                let impact = if economic.market_modifier > 1.2 {
                    "Markets surge with opportunity"
                } else if economic.market_modifier > 1.0 {
                    "Markets show modest gains"
                } else if economic.market_modifier > 0.8 {
                    "Markets experience minor turbulence"
                } else {
                    "Markets plunge into crisis"
                };
                format!(
                    "{}\n\n{}\n\n{} ({:.0}% modifier)",
                    self.name,
                    self.description,
                    impact,
                    economic.market_modifier * 100.0
                )
            }
            EventKind::Political(political) => {
                let consequence = if political.causes_war {
                    "The drums of war thunder across the land"
                } else if political.stability_impact < -30 {
                    "The foundations of power crumble"
                } else if political.stability_impact < -10 {
                    "Unrest spreads through the populace"
                } else if political.stability_impact > 30 {
                    "A new era of peace dawns"
                } else if political.stability_impact > 10 {
                    "Order is restored to the realm"
                } else {
                    "The political landscape shifts subtly"
                };
                format!("{}\n\n{}\n\n{}", self.name, self.description, consequence)
            }
            EventKind::Magical(magical) => {
                let arcane = if magical.exposure_impact > 30 {
                    "The veil between worlds grows thin - mortals sense dark powers"
                } else if magical.exposure_impact > 10 {
                    "Whispers of sorcery spread through the land"
                } else if magical.exposure_impact < -30 {
                    "A shroud of forgetfulness descends upon the realm"
                } else if magical.exposure_impact < -10 {
                    "The mundane world remains blissfully ignorant"
                } else {
                    "The currents of magic shift imperceptibly"
                };
                let mut text =
                    format!("{}\n\n{}\n\n{}", self.name, self.description, arcane);
                if magical.affects_dark {
                    text.push_str("\n\nYour dark investments tremble...");
                }
                text
            }
            EventKind::Personal(personal) => {
                let note = if personal.is_death && personal.is_betrayal {
                    "Treachery and death intertwine - a fitting end for the disloyal"
                } else if personal.is_death {
                    "The mortal coil releases another servant"
                } else if personal.is_betrayal {
                    "Trust, once broken, demands response"
                } else {
                    "The affairs of mortals demand attention"
                };
                let mut text = format!("{}\n\n{}\n\n{}", self.name, self.description, note);
                if let Some(agent) = &personal.target_agent {
                    text.push_str(&format!("\n\n[Involves: {}]", agent));
                }
                text
            }
        }
    }

    /// Advances a lasting event by one year; returns false once expired.
    pub fn tick_year(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        if self.duration_years > 0 {
            self.duration_years -= 1;
        }
        if self.duration_years == 0 {
            self.is_active = false;
        }
        self.is_active
    }
}
