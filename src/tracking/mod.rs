//! Cross-cutting trackers: exposure, synergies, and the discovery ledger

pub mod exposure;
pub mod ledger;
pub mod synergy;

pub use exposure::ExposureTracker;
pub use ledger::Ledger;
pub use synergy::{ActiveSynergy, SynergyTracker};
