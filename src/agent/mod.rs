//! Agents: the mortals who manage the lich's holdings

pub mod agent;
pub mod manager;

pub use agent::{Agent, AgentKind, CultState, FamilyState, IndividualState};
pub use manager::AgentManager;
