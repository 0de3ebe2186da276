//! World model: regions, kingdoms, competitors, and the simulation
//! that advances them through the years.

pub mod competitor;
pub mod generator;
pub mod kingdom;
pub mod region;
pub mod simulation;

pub use competitor::Competitor;
pub use generator::standard_world;
pub use kingdom::Kingdom;
pub use region::Region;
pub use simulation::{WorldSimulation, DEFAULT_STARTING_YEAR};
