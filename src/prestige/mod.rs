//! Echoes, specialization trees, and the prestige gate

pub mod manager;
pub mod trees;
pub mod unlock_tree;

pub use manager::PrestigeManager;
pub use unlock_tree::{UnlockNode, UnlockTree};
