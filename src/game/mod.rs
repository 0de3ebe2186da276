//! The assembled game: every subsystem wired into one turn loop

pub mod data;

pub use data::GameData;
