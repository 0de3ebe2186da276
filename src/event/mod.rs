//! Event generation, application, and historical record

pub mod chronicle;
pub mod event;
pub mod generator;

pub use chronicle::{ChronicleEntry, EventChronicle, Milestone};
pub use event::{Event, EventChoice, EventKind};
pub use generator::EventGenerator;
