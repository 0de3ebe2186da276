//! How visible the lich is to the mortal world
//!
//! Exposure is a single integer in [0, 100]. Events push it up, careful
//! years of slumber let it decay back down. Crossing a quartile boundary
//! changes the [`ExposureLevel`], and at the hunt level the world starts
//! treating the lich as a confirmed threat (kingdoms may crusade).

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::ExposureLevel;
use crate::save::context::{SaveContext, Saveable};

const MAX_EXPOSURE: u32 = 100;
const DEFAULT_DECAY_RATE: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureTracker {
    exposure: u32,
    decay_rate: u32,
}

impl Default for ExposureTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ExposureTracker {
    pub fn new() -> Self {
        Self {
            exposure: 0,
            decay_rate: DEFAULT_DECAY_RATE,
        }
    }

    pub fn exposure(&self) -> u32 {
        self.exposure
    }

    pub fn level(&self) -> ExposureLevel {
        ExposureLevel::from_value(self.exposure)
    }

    /// True once the world actively hunts the lich. Kingdoms only roll
    /// for crusades while this holds.
    pub fn is_detected(&self) -> bool {
        self.level() >= ExposureLevel::Hunt
    }

    /// Sets the exposure value, clamped to [0, 100].
    pub fn set_exposure(&mut self, value: u32, signals: &mut SignalLog) {
        let clamped = value.min(MAX_EXPOSURE);
        if self.exposure == clamped {
            return;
        }

        let old_level = self.level();
        self.exposure = clamped;
        let new_level = self.level();

        signals.emit(Signal::ExposureChanged { value: clamped });
        if old_level != new_level {
            tracing::info!(
                from = old_level.name(),
                to = new_level.name(),
                value = clamped,
                "exposure threshold crossed"
            );
            signals.emit(Signal::ThresholdCrossed { level: new_level });
        }
    }

    /// Shifts exposure by a signed amount, clamped into [0, 100].
    pub fn add_exposure(&mut self, amount: i32, signals: &mut SignalLog) {
        let shifted = (self.exposure as i64 + amount as i64).clamp(0, MAX_EXPOSURE as i64);
        self.set_exposure(shifted as u32, signals);
    }

    pub fn decay_rate(&self) -> u32 {
        self.decay_rate
    }

    pub fn set_decay_rate(&mut self, rate: u32) {
        self.decay_rate = rate.min(MAX_EXPOSURE);
    }

    /// Applies the yearly decay for `years` slumbered years. Exposure
    /// never decays below zero.
    pub fn apply_decay(&mut self, years: u32, signals: &mut SignalLog) {
        if years == 0 || self.exposure == 0 {
            return;
        }
        let amount = self.decay_rate.saturating_mul(years);
        tracing::debug!(years, rate = self.decay_rate, amount, "exposure decays");
        self.add_exposure(-(amount.min(i32::MAX as u32) as i32), signals);
    }

    pub fn reset(&mut self) {
        tracing::debug!("resetting exposure");
        self.exposure = 0;
        self.decay_rate = DEFAULT_DECAY_RATE;
    }
}

impl Saveable for ExposureTracker {
    fn save(&self, ctx: &mut SaveContext) {
        ctx.write_uint("exposure", self.exposure as u64);
        ctx.write_uint("decay-rate", self.decay_rate as u64);
    }

    fn load(&mut self, ctx: &mut SaveContext) -> Result<()> {
        self.exposure = (ctx.read_uint("exposure", 0) as u32).min(MAX_EXPOSURE);
        self.decay_rate = (ctx.read_uint("decay-rate", DEFAULT_DECAY_RATE as u64) as u32)
            .min(MAX_EXPOSURE);
        Ok(())
    }
}
