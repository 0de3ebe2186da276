//! Agent roster and lifecycle
//!
//! The manager owns every agent, runs the yearly lifecycle, and handles
//! death and succession. Successors are ordinary roster members linked
//! by id; on load the links are validated in a second pass once all
//! agents exist.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::agent::agent::Agent;
use crate::core::error::{LichError, Result};
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{AgentId, AgentType, InvestmentId};
use crate::save::context::{SaveContext, Saveable};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentManager {
    agents: Vec<Agent>,
}

impl AgentManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn count(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| &agent.id == id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| &agent.id == id)
    }

    pub fn add_agent(&mut self, agent: Agent) -> Result<()> {
        if self.get(&agent.id).is_some() {
            return Err(LichError::Validation(format!(
                "duplicate agent id '{}'",
                agent.id
            )));
        }
        self.agents.push(agent);
        Ok(())
    }

    pub fn remove_agent(&mut self, id: &AgentId) -> Option<Agent> {
        let index = self.agents.iter().position(|agent| &agent.id == id)?;
        Some(self.agents.remove(index))
    }

    pub fn agents_by_type(&self, agent_type: AgentType) -> Vec<&Agent> {
        self.agents
            .iter()
            .filter(|agent| agent.agent_type == agent_type)
            .collect()
    }

    /// Ages every agent one year, then runs the death path for those
    /// who reached max age.
    pub fn advance_year(&mut self, rng: &mut ChaCha8Rng, signals: &mut SignalLog) {
        let mut deaths = Vec::new();
        for agent in &mut self.agents {
            if agent.advance_year(rng, signals) {
                deaths.push(agent.id.clone());
            }
        }
        for id in deaths {
            self.process_death(&id, signals);
        }
    }

    /// Succession runs to completion before the death notification:
    /// the successor inherits competence and every assigned investment.
    pub fn process_death(&mut self, id: &AgentId, signals: &mut SignalLog) {
        let Some(index) = self.agents.iter().position(|agent| &agent.id == id) else {
            return;
        };

        let successor_id = self.agents[index]
            .individual_state()
            .and_then(|state| state.successor.clone());
        let retention = self.agents[index]
            .individual_state()
            .map(|state| state.skill_retention())
            .unwrap_or(0.25);
        let parent_competence = self.agents[index].competence();
        let parent_name = self.agents[index].name.clone();
        let assigned = self.agents[index].take_assigned_investments();

        match successor_id.as_ref().and_then(|s| self.get_mut(s)) {
            Some(successor) => {
                let transferred = (parent_competence as f64 * retention) as i32;
                let inherited = transferred.max(successor.competence() as i32);
                successor.set_competence(inherited);
                for investment in assigned {
                    successor.assign_investment(investment);
                }
                tracing::info!(
                    parent = %id,
                    successor = %successor.id,
                    competence = inherited,
                    "succession complete"
                );
            }
            None => {
                tracing::info!(agent = %id, "agent died with no successor");
            }
        }

        signals.emit(Signal::AgentDied {
            id: id.clone(),
            name: parent_name,
        });
        self.agents.remove(index);
    }

    /// Recruits a random successor for the given agent and links it.
    /// The recruit joins the roster as a full agent.
    pub fn recruit_successor(
        &mut self,
        parent_id: &AgentId,
        rng: &mut ChaCha8Rng,
    ) -> Result<AgentId> {
        let Some(parent) = self.get(parent_id) else {
            return Err(LichError::Validation(format!(
                "unknown agent '{}'",
                parent_id
            )));
        };
        if !parent.can_recruit() {
            return Err(LichError::Validation(format!(
                "agent '{}' cannot recruit a successor",
                parent_id
            )));
        }
        let parent_name = parent.name.clone();

        let id = loop {
            let candidate = AgentId(format!("agent-{}", rng.gen::<u32>()));
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        let age = rng.gen_range(18..30);
        let max_age = rng.gen_range(60..85);
        let loyalty = rng.gen_range(40..70);
        let competence = rng.gen_range(20..50);

        let recruit = Agent::individual(
            id.clone(),
            format!("Recruit of {}", parent_name),
            age,
            max_age,
            loyalty,
            competence,
        );
        tracing::info!(
            parent = %parent_id,
            recruit = %id,
            age,
            loyalty,
            competence,
            "successor recruited"
        );
        self.agents.push(recruit);

        if let Some(parent) = self.get_mut(parent_id) {
            if let Some(state) = parent.individual_state_mut() {
                state.successor = Some(id.clone());
                state.training_progress = 0.0;
            }
        }
        Ok(id)
    }

    /// Exposure points per year contributed by the whole roster.
    pub fn total_exposure_contribution(&self) -> u32 {
        self.agents
            .iter()
            .map(|agent| agent.exposure_contribution())
            .sum()
    }

    /// Income multiplier for one investment: the manager's modifier if
    /// an agent is assigned to it, otherwise neutral.
    pub fn income_modifier_for(&self, investment: &InvestmentId) -> f64 {
        self.agents
            .iter()
            .find(|agent| agent.assigned_investments().contains(investment))
            .map(|agent| agent.income_modifier())
            .unwrap_or(1.0)
    }

    pub fn reset(&mut self) {
        self.agents.clear();
    }
}

impl Saveable for AgentManager {
    fn save(&self, ctx: &mut SaveContext) {
        ctx.write_uint("agent-count", self.agents.len() as u64);
        for (i, agent) in self.agents.iter().enumerate() {
            ctx.begin_section(&format!("agent-{}", i));
            agent.save(ctx);
            ctx.end_section();
        }
    }

    fn load(&mut self, ctx: &mut SaveContext) -> Result<()> {
        self.agents.clear();

        let count = ctx.read_uint("agent-count", 0);
        for i in 0..count {
            ctx.begin_section(&format!("agent-{}", i));
            let agent = Agent::load_from(ctx);
            ctx.end_section();
            self.add_agent(agent?)?;
        }

        // second pass: successor links must point at loaded agents
        let known: Vec<AgentId> = self.agents.iter().map(|a| a.id.clone()).collect();
        for agent in &mut self.agents {
            let agent_id = agent.id.clone();
            if let Some(state) = agent.individual_state_mut() {
                if let Some(successor) = &state.successor {
                    if !known.contains(successor) {
                        tracing::warn!(
                            agent = %agent_id,
                            successor = %successor,
                            "dropping dangling successor link"
                        );
                        state.successor = None;
                    }
                }
            }
        }
        Ok(())
    }
}
