//! Game configuration with documented constants
//!
//! All tuning numbers are collected here with explanations of their purpose
//! and how they interact with each other. A TOML file can override any of
//! them at startup.

use crate::core::error::{LichError, Result};
use std::path::Path;

/// Configuration for the simulation
///
/// These values have been tuned to produce a run that feels meaningful over
/// a few centuries. Changing them will affect pacing and difficulty.
#[derive(Debug, Clone)]
pub struct GameConfig {
    // === ECONOMY ===
    /// Gold a fresh unlife starts with
    ///
    /// First prestige multiplies this via the starting-gold echo bonus,
    /// so the opening decades shrink on later runs.
    pub starting_gold: f64,

    /// Calendar year the chronicle opens on
    ///
    /// Purely cosmetic except that prestige eligibility counts years
    /// elapsed since this one.
    pub starting_year: u32,

    // === EXPOSURE ===
    /// Exposure points that fade per quiet year
    ///
    /// Passive income keeps generating exposure, so decay only wins
    /// when the portfolio is small or well covered.
    pub exposure_decay_rate: f64,

    // === EVENTS ===
    /// Chance of a minor event in any ordinary year
    pub yearly_event_chance: f64,

    /// Chance of an event in a decade year (year % 10 == 0)
    ///
    /// Decade events roll a second event 30% of the time, so eventful
    /// decades cluster.
    pub decade_event_chance: f64,

    /// Chance of a major event in an era year (year % 100 == 0)
    pub era_event_chance: f64,

    // === PRESTIGE ===
    /// Years that must elapse in the current unlife before slumbering
    /// through the centuries (prestige) becomes available
    pub prestige_min_years: u32,

    /// Gold required before prestige becomes available
    ///
    /// Also the scale anchor for the echo formula: log10 of gold is 6
    /// right at this floor.
    pub prestige_min_gold: f64,

    // === SAVES ===
    /// Number of numbered save slots (slot 0 doubles as quicksave)
    pub max_save_slots: u8,

    /// Directory save files are written to, relative to the working dir
    pub save_dir: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Economy
            starting_gold: 1000.0,
            starting_year: 847,

            // Exposure
            exposure_decay_rate: 5.0,

            // Events (yearly < decade < era)
            yearly_event_chance: 0.3,
            decade_event_chance: 0.7,
            era_event_chance: 0.9,

            // Prestige
            prestige_min_years: 100,
            prestige_min_gold: 1_000_000.0,

            // Saves
            max_save_slots: 10,
            save_dir: "saves".to_string(),
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML string, overriding defaults for any key present
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let toml: toml::Value = content
            .parse()
            .map_err(|e| LichError::Validation(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(v) = toml.get("starting_gold").and_then(|v| v.as_float()) {
            config.starting_gold = v;
        }
        if let Some(v) = toml.get("starting_year").and_then(|v| v.as_integer()) {
            config.starting_year = v as u32;
        }
        if let Some(v) = toml.get("exposure_decay_rate").and_then(|v| v.as_float()) {
            config.exposure_decay_rate = v;
        }
        if let Some(v) = toml.get("yearly_event_chance").and_then(|v| v.as_float()) {
            config.yearly_event_chance = v;
        }
        if let Some(v) = toml.get("decade_event_chance").and_then(|v| v.as_float()) {
            config.decade_event_chance = v;
        }
        if let Some(v) = toml.get("era_event_chance").and_then(|v| v.as_float()) {
            config.era_event_chance = v;
        }
        if let Some(v) = toml.get("prestige_min_years").and_then(|v| v.as_integer()) {
            config.prestige_min_years = v as u32;
        }
        if let Some(v) = toml.get("prestige_min_gold").and_then(|v| v.as_float()) {
            config.prestige_min_gold = v;
        }
        if let Some(v) = toml.get("max_save_slots").and_then(|v| v.as_integer()) {
            config.max_save_slots = v as u8;
        }
        if let Some(v) = toml.get("save_dir").and_then(|v| v.as_str()) {
            config.save_dir = v.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk, falling back to defaults for
    /// anything the file does not mention
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.starting_gold <= 0.0 {
            return Err(LichError::Validation(format!(
                "starting_gold ({}) must be positive",
                self.starting_gold
            )));
        }
        for (name, chance) in [
            ("yearly_event_chance", self.yearly_event_chance),
            ("decade_event_chance", self.decade_event_chance),
            ("era_event_chance", self.era_event_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(LichError::Validation(format!(
                    "{} ({}) must be within [0, 1]",
                    name, chance
                )));
            }
        }
        if self.exposure_decay_rate < 0.0 {
            return Err(LichError::Validation(format!(
                "exposure_decay_rate ({}) must not be negative",
                self.exposure_decay_rate
            )));
        }
        if self.max_save_slots == 0 {
            return Err(LichError::Validation(
                "max_save_slots must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
