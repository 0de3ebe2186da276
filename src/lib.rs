//! Lich's Portfolio - Immortal Wealth Simulation

pub mod agent;
pub mod core;
pub mod event;
pub mod game;
pub mod investment;
pub mod prestige;
pub mod save;
pub mod tracking;
pub mod world;
