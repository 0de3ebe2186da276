//! Servants of the lich in the daylight world
//!
//! An [`Agent`] manages investments on the lich's behalf. Individuals
//! age, train successors, and eventually die; families never die as
//! such but advance to a fresh generation head; cults drift in
//! followers and keep a devotional loyalty floor; bound servants are
//! undead, perfectly loyal, and conspicuous when uncovered. Loyalty
//! and competence are clamped to [0,100] on every write.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{AgentId, AgentType, CoverStatus, InvestmentId, KnowledgeLevel};
use crate::save::context::SaveContext;

/// Per-year betrayal chance is capped here regardless of loyalty.
const MAX_BETRAYAL_CHANCE: i32 = 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualState {
    /// Roster id of the designated successor, if one was recruited.
    pub successor: Option<AgentId>,
    /// Successor training progress in [0.0, 1.0].
    pub training_progress: f64,
}

impl IndividualState {
    fn new() -> Self {
        Self {
            successor: None,
            training_progress: 0.0,
        }
    }

    /// Fraction of the mentor's competence a successor inherits.
    pub fn skill_retention(&self) -> f64 {
        if self.successor.is_none() {
            return 0.25;
        }
        0.25 + self.training_progress * 0.50
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyState {
    pub family_name: String,
    /// 1 is the founding generation.
    pub generation: u32,
    pub founding_year: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CultState {
    /// Congregation size, never below 1.
    pub followers: u32,
}

impl CultState {
    /// Bigger congregations are harder to hide.
    pub fn follower_tier(&self) -> u32 {
        match self.followers {
            0..=24 => 1,
            25..=99 => 2,
            100..=499 => 3,
            _ => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentKind {
    Individual(IndividualState),
    Family(FamilyState),
    Cult(CultState),
    Bound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub age: u32,
    pub max_age: u32,
    loyalty: u32,
    competence: u32,
    pub agent_type: AgentType,
    pub cover_status: CoverStatus,
    pub knowledge_level: KnowledgeLevel,
    assigned_investments: Vec<InvestmentId>,
    pub kind: AgentKind,
}

impl Agent {
    pub fn individual(
        id: impl Into<AgentId>,
        name: impl Into<String>,
        age: u32,
        max_age: u32,
        loyalty: i32,
        competence: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            max_age,
            loyalty: loyalty.clamp(0, 100) as u32,
            competence: competence.clamp(0, 100) as u32,
            agent_type: AgentType::Individual,
            cover_status: CoverStatus::Secure,
            knowledge_level: KnowledgeLevel::None,
            assigned_investments: Vec::new(),
            kind: AgentKind::Individual(IndividualState::new()),
        }
    }

    pub fn family(
        id: impl Into<AgentId>,
        family_name: impl Into<String>,
        founding_year: u64,
        loyalty: i32,
        competence: i32,
    ) -> Self {
        let family_name = family_name.into();
        Self {
            id: id.into(),
            name: format!("{} Founder (Gen 1)", family_name),
            age: 30,
            max_age: 70,
            loyalty: loyalty.clamp(0, 100) as u32,
            competence: competence.clamp(0, 100) as u32,
            agent_type: AgentType::Family,
            cover_status: CoverStatus::Secure,
            knowledge_level: KnowledgeLevel::None,
            assigned_investments: Vec::new(),
            kind: AgentKind::Family(FamilyState {
                family_name,
                generation: 1,
                founding_year,
            }),
        }
    }

    /// A cult's age counts from its founding. The institution never
    /// dies of age; fading devotion is caught by the loyalty floor.
    pub fn cult(
        id: impl Into<AgentId>,
        name: impl Into<String>,
        followers: u32,
        loyalty: i32,
        competence: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age: 0,
            max_age: 100,
            loyalty: loyalty.clamp(0, 100) as u32,
            competence: competence.clamp(0, 100) as u32,
            agent_type: AgentType::Cult,
            cover_status: CoverStatus::Secure,
            knowledge_level: KnowledgeLevel::None,
            assigned_investments: Vec::new(),
            kind: AgentKind::Cult(CultState {
                followers: followers.max(1),
            }),
        }
    }

    /// Bound servants are undead: ageless, perfectly loyal, and fully
    /// aware of who they serve.
    pub fn bound(id: impl Into<AgentId>, name: impl Into<String>, competence: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age: 0,
            max_age: 0,
            loyalty: 100,
            competence: competence.clamp(0, 100) as u32,
            agent_type: AgentType::Bound,
            cover_status: CoverStatus::Secure,
            knowledge_level: KnowledgeLevel::Full,
            assigned_investments: Vec::new(),
            kind: AgentKind::Bound,
        }
    }

    pub fn loyalty(&self) -> u32 {
        self.loyalty
    }

    pub fn competence(&self) -> u32 {
        self.competence
    }

    pub fn set_loyalty(&mut self, value: i32) {
        self.loyalty = value.clamp(0, 100) as u32;
    }

    pub fn set_competence(&mut self, value: i32) {
        self.competence = value.clamp(0, 100) as u32;
    }

    /// Rebinds this servant as an undead bound agent. Age and succession
    /// stop mattering; what they learned in life they keep in death.
    pub fn raise_as_bound(&mut self) {
        self.agent_type = AgentType::Bound;
        self.kind = AgentKind::Bound;
        self.max_age = 0;
        self.loyalty = 100;
        self.knowledge_level = KnowledgeLevel::Full;
    }

    pub fn individual_state(&self) -> Option<&IndividualState> {
        match &self.kind {
            AgentKind::Individual(state) => Some(state),
            _ => None,
        }
    }

    pub fn individual_state_mut(&mut self) -> Option<&mut IndividualState> {
        match &mut self.kind {
            AgentKind::Individual(state) => Some(state),
            _ => None,
        }
    }

    pub fn family_state(&self) -> Option<&FamilyState> {
        match &self.kind {
            AgentKind::Family(state) => Some(state),
            _ => None,
        }
    }

    pub fn cult_state(&self) -> Option<&CultState> {
        match &self.kind {
            AgentKind::Cult(state) => Some(state),
            _ => None,
        }
    }

    /// Ages the agent by one year. Returns true when the agent has
    /// reached max age and the roster must run the death path; a family
    /// instead advances its generation, and cults and bound servants
    /// never die of age at all.
    pub fn advance_year(&mut self, rng: &mut ChaCha8Rng, signals: &mut SignalLog) -> bool {
        self.age += 1;
        if self.age >= self.max_age {
            match &self.kind {
                AgentKind::Family(_) => {
                    self.advance_generation(rng, signals);
                    return false;
                }
                AgentKind::Individual(_) => return true,
                AgentKind::Cult(_) | AgentKind::Bound => {}
            }
        }

        // Devotion holds a cult together no matter how old it grows.
        let floor = match &self.kind {
            AgentKind::Cult(_) => 30,
            _ => 0,
        };
        self.decay_loyalty(floor, signals);

        if let AgentKind::Cult(state) = &mut self.kind {
            let drift = rng.gen_range(-3i32..=3);
            state.followers = (state.followers as i64 + drift as i64).max(1) as u32;
        }

        if self.roll_betrayal(rng) {
            self.cover_status = CoverStatus::Exposed;
            tracing::warn!(agent = %self.id, knowledge = ?self.knowledge_level, "agent betrayal");
            signals.emit(Signal::AgentBetrayed {
                id: self.id.clone(),
                name: self.name.clone(),
                exposure_spike: self.exposure_contribution(),
            });
        }

        self.train_successor(1, signals);

        if let AgentKind::Bound = self.kind {
            self.loyalty = 100;
        }
        false
    }

    /// Loyalty erodes once an agent outlives its comfortable years,
    /// one point per tenth of max age beyond the sixth, never below
    /// `floor`.
    fn decay_loyalty(&mut self, floor: u32, signals: &mut SignalLog) {
        if self.max_age == 0 {
            return;
        }
        let decay = (10 * self.age / self.max_age).saturating_sub(6);
        // The floor blocks further erosion but never restores loyalty.
        let next = self.loyalty.saturating_sub(decay).max(floor.min(self.loyalty));
        if next == self.loyalty {
            return;
        }
        self.loyalty = next;
        signals.emit(Signal::LoyaltyChanged {
            id: self.id.clone(),
            loyalty: self.loyalty,
        });
    }

    /// Betrayal chance is disloyalty scaled down by ignorance: an agent
    /// who knows nothing has little to betray. The bound cannot betray.
    fn roll_betrayal(&self, rng: &mut ChaCha8Rng) -> bool {
        if let AgentKind::Bound = self.kind {
            return false;
        }
        let chance = (100 - self.loyalty as i32) / self.knowledge_level.betrayal_divisor() as i32;
        let chance = chance.clamp(0, MAX_BETRAYAL_CHANCE);
        rng.gen_range(0..100) < chance
    }

    /// Advances successor training; emits *successor-trained* the year
    /// progress first reaches completion. No-op without a successor.
    pub fn train_successor(&mut self, years: u32, signals: &mut SignalLog) {
        let competence = self.competence;
        let AgentKind::Individual(state) = &mut self.kind else {
            return;
        };
        if state.successor.is_none() || state.training_progress >= 1.0 {
            return;
        }
        let rate = 0.05 + (competence as f64 / 100.0) * 0.15;
        state.training_progress = (state.training_progress + rate * years as f64).min(1.0);
        if state.training_progress >= 1.0 {
            signals.emit(Signal::SuccessorTrained {
                id: self.id.clone(),
                competence,
            });
        }
    }

    /// Replaces a dying family head with the next generation: new name,
    /// reset age, and a small loyalty dip for the less-devoted heir.
    pub fn advance_generation(&mut self, rng: &mut ChaCha8Rng, signals: &mut SignalLog) {
        let AgentKind::Family(state) = &mut self.kind else {
            return;
        };
        state.generation += 1;
        let generation = state.generation;
        let family_name = state.family_name.clone();

        self.age = rng.gen_range(18..25);
        self.max_age = rng.gen_range(60..85);
        let epithet = if rng.gen_range(0..2) == 1 { "Senior" } else { "Junior" };
        self.name = format!("{} {} (Gen {})", family_name, epithet, generation);

        let dip = rng.gen_range(0..10);
        self.set_loyalty(self.loyalty as i32 - dip);

        tracing::info!(family = %family_name, generation, "family generation advanced");
        signals.emit(Signal::GenerationAdvanced {
            id: self.id.clone(),
            generation,
        });
    }

    /// Whether this agent may recruit a successor right now.
    pub fn can_recruit(&self) -> bool {
        if self.loyalty < 50 || self.competence < 30 {
            return false;
        }
        if self.cover_status == CoverStatus::Exposed {
            return false;
        }
        match &self.kind {
            AgentKind::Individual(state) => state.successor.is_none(),
            // Families advance generations, cults outlive their leaders,
            // and the bound need no heirs.
            AgentKind::Family(_) | AgentKind::Cult(_) | AgentKind::Bound => false,
        }
    }

    /// Income multiplier this agent earns on managed holdings:
    /// 0.5x at zero competence up to 1.5x at full.
    pub fn income_modifier(&self) -> f64 {
        0.5 + self.competence as f64 / 100.0
    }

    /// Exposure points per year from this agent's cover state, scaled
    /// by how much they actually know. A crowd of followers magnifies
    /// a blown cover, and an uncovered walking corpse is unmistakable.
    pub fn exposure_contribution(&self) -> u32 {
        let base = self.cover_status.exposure_base();
        let scaled = (base as f64 * self.knowledge_level.exposure_multiplier()) as u32;
        match &self.kind {
            AgentKind::Cult(state) => scaled * state.follower_tier(),
            AgentKind::Bound => scaled * 2,
            _ => scaled,
        }
    }

    pub fn assigned_investments(&self) -> &[InvestmentId] {
        &self.assigned_investments
    }

    pub fn assign_investment(&mut self, id: InvestmentId) {
        if !self.assigned_investments.contains(&id) {
            self.assigned_investments.push(id);
        }
    }

    pub fn unassign_investment(&mut self, id: &InvestmentId) {
        self.assigned_investments.retain(|inv| inv != id);
    }

    pub fn take_assigned_investments(&mut self) -> Vec<InvestmentId> {
        std::mem::take(&mut self.assigned_investments)
    }

    // --- persistence ---

    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_string("agent-type", self.agent_type.name());
        ctx.write_string("id", self.id.as_str());
        ctx.write_string("name", &self.name);
        ctx.write_uint("age", self.age as u64);
        ctx.write_uint("max-age", self.max_age as u64);
        ctx.write_uint("loyalty", self.loyalty as u64);
        ctx.write_uint("competence", self.competence as u64);
        ctx.write_string("cover-status", self.cover_status.name());
        ctx.write_string("knowledge-level", self.knowledge_level.name());

        match &self.kind {
            AgentKind::Individual(state) => {
                ctx.write_string(
                    "successor-id",
                    state.successor.as_ref().map(|s| s.as_str()).unwrap_or(""),
                );
                ctx.write_double("training-progress", state.training_progress);
            }
            AgentKind::Family(state) => {
                ctx.write_string("family-name", &state.family_name);
                ctx.write_uint("generation", state.generation as u64);
                ctx.write_uint("founding-year", state.founding_year);
            }
            AgentKind::Cult(state) => {
                ctx.write_uint("followers", state.followers as u64);
            }
            AgentKind::Bound => {}
        }

        ctx.write_uint("assigned-count", self.assigned_investments.len() as u64);
        for (i, inv) in self.assigned_investments.iter().enumerate() {
            ctx.write_string(&format!("assigned-{}", i), inv.as_str());
        }
    }

    pub fn load_from(ctx: &mut SaveContext) -> Result<Agent> {
        let type_name = ctx.read_string("agent-type", "individual");
        let agent_type = AgentType::from_name(&type_name).unwrap_or(AgentType::Individual);

        let kind = match agent_type {
            AgentType::Family => AgentKind::Family(FamilyState {
                family_name: ctx.read_string("family-name", "Unknown Family"),
                generation: ctx.read_uint("generation", 1) as u32,
                founding_year: ctx.read_uint("founding-year", 0),
            }),
            AgentType::Cult => AgentKind::Cult(CultState {
                followers: (ctx.read_uint("followers", 1) as u32).max(1),
            }),
            AgentType::Bound => AgentKind::Bound,
            AgentType::Individual => {
                let successor = match ctx.read_string("successor-id", "") {
                    s if s.is_empty() => None,
                    s => Some(AgentId(s)),
                };
                AgentKind::Individual(IndividualState {
                    successor,
                    training_progress: ctx.read_double("training-progress", 0.0).clamp(0.0, 1.0),
                })
            }
        };

        let mut assigned = Vec::new();
        let count = ctx.read_uint("assigned-count", 0);
        for i in 0..count {
            let id = ctx.read_string(&format!("assigned-{}", i), "");
            if !id.is_empty() {
                assigned.push(InvestmentId(id));
            }
        }

        Ok(Agent {
            id: AgentId(ctx.read_string("id", "")),
            name: ctx.read_string("name", "Unknown Agent"),
            age: ctx.read_uint("age", 25) as u32,
            max_age: ctx.read_uint("max-age", 70) as u32,
            loyalty: (ctx.read_uint("loyalty", 50) as u32).min(100),
            competence: (ctx.read_uint("competence", 50) as u32).min(100),
            agent_type,
            cover_status: CoverStatus::from_name(&ctx.read_string("cover-status", "secure"))
                .unwrap_or(CoverStatus::Secure),
            knowledge_level: KnowledgeLevel::from_name(&ctx.read_string("knowledge-level", "none"))
                .unwrap_or(KnowledgeLevel::None),
            assigned_investments: assigned,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn steward() -> Agent {
        Agent::individual("agent-1", "Aldric the Steward", 30, 70, 80, 60)
    }

    #[test]
    fn test_stats_clamped_on_write() {
        let mut agent = steward();
        agent.set_loyalty(150);
        assert_eq!(agent.loyalty(), 100);
        agent.set_loyalty(-20);
        assert_eq!(agent.loyalty(), 0);
        agent.set_competence(101);
        assert_eq!(agent.competence(), 100);
    }

    #[test]
    fn test_aging_without_decay_in_comfort_years() {
        let mut agent = steward();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut signals = SignalLog::new();

        // 30 -> 31 of max 70: still comfortable, no decay
        agent.advance_year(&mut rng, &mut signals);
        assert_eq!(agent.age, 31);
        assert_eq!(agent.loyalty(), 80);
    }

    #[test]
    fn test_loyalty_decays_in_old_age() {
        let mut agent = Agent::individual("agent-2", "Old Marta", 62, 70, 80, 60);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut signals = SignalLog::new();

        // age 63 of 70: 10*63/70 = 9, decay 3
        agent.advance_year(&mut rng, &mut signals);
        assert_eq!(agent.loyalty(), 77);
        assert!(signals
            .iter()
            .any(|s| matches!(s, Signal::LoyaltyChanged { loyalty: 77, .. })));
    }

    #[test]
    fn test_death_at_max_age() {
        let mut agent = Agent::individual("agent-3", "Frail Tomas", 69, 70, 50, 50);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut signals = SignalLog::new();
        assert!(agent.advance_year(&mut rng, &mut signals));
        assert_eq!(agent.age, 70);
    }

    #[test]
    fn test_training_completes_and_emits() {
        let mut agent = steward();
        agent.individual_state_mut().unwrap().successor = Some(AgentId::from("agent-9"));
        let mut signals = SignalLog::new();

        // competence 60: 0.14 per year, 8 years to finish
        agent.train_successor(7, &mut signals);
        assert!(signals.is_empty());
        agent.train_successor(1, &mut signals);

        let state = agent.individual_state().unwrap();
        assert!((state.training_progress - 1.0).abs() < 1e-9);
        assert_eq!(signals.len(), 1);

        // further training is a no-op
        agent.train_successor(1, &mut signals);
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn test_skill_retention_scales_with_training() {
        let mut agent = steward();
        assert!((agent.individual_state().unwrap().skill_retention() - 0.25).abs() < 1e-9);

        let state = agent.individual_state_mut().unwrap();
        state.successor = Some(AgentId::from("agent-9"));
        state.training_progress = 1.0;
        assert!((agent.individual_state().unwrap().skill_retention() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_can_recruit_gates() {
        let mut agent = steward();
        assert!(agent.can_recruit());

        agent.individual_state_mut().unwrap().successor = Some(AgentId::from("agent-9"));
        assert!(!agent.can_recruit());

        agent.individual_state_mut().unwrap().successor = None;
        agent.set_loyalty(40);
        assert!(!agent.can_recruit());

        agent.set_loyalty(80);
        agent.cover_status = CoverStatus::Exposed;
        assert!(!agent.can_recruit());

        let family = Agent::family("fam-1", "Blackwood", 847, 80, 60);
        assert!(!family.can_recruit());
    }

    #[test]
    fn test_income_modifier_range() {
        let mut agent = steward();
        agent.set_competence(0);
        assert!((agent.income_modifier() - 0.5).abs() < 1e-9);
        agent.set_competence(100);
        assert!((agent.income_modifier() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_exposure_contribution() {
        let mut agent = steward();
        assert_eq!(agent.exposure_contribution(), 0);

        agent.cover_status = CoverStatus::Compromised;
        agent.knowledge_level = KnowledgeLevel::Aware;
        assert_eq!(agent.exposure_contribution(), 10);

        agent.cover_status = CoverStatus::Exposed;
        agent.knowledge_level = KnowledgeLevel::Full;
        assert_eq!(agent.exposure_contribution(), 30);

        agent.knowledge_level = KnowledgeLevel::Suspicious;
        assert_eq!(agent.exposure_contribution(), 15);
    }

    #[test]
    fn test_family_generation_advance() {
        let mut family = Agent::family("fam-1", "Blackwood", 847, 80, 60);
        family.age = 70;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut signals = SignalLog::new();

        // the head dies but the family does not
        let died = family.advance_year(&mut rng, &mut signals);
        assert!(!died);

        let state = family.family_state().unwrap();
        assert_eq!(state.generation, 2);
        assert!(family.age >= 18 && family.age < 25);
        assert!(family.name.contains("(Gen 2)"));
        assert!(signals
            .iter()
            .any(|s| matches!(s, Signal::GenerationAdvanced { generation: 2, .. })));
    }

    #[test]
    fn test_assignment_unique() {
        let mut agent = steward();
        agent.assign_investment(InvestmentId::from("farm-1"));
        agent.assign_investment(InvestmentId::from("farm-1"));
        assert_eq!(agent.assigned_investments().len(), 1);
        agent.unassign_investment(&InvestmentId::from("farm-1"));
        assert!(agent.assigned_investments().is_empty());
    }

    #[test]
    fn test_agent_save_load_round_trip() {
        let mut agent = steward();
        agent.knowledge_level = KnowledgeLevel::Aware;
        agent.cover_status = CoverStatus::Suspicious;
        agent.assign_investment(InvestmentId::from("farm-1"));
        agent.individual_state_mut().unwrap().successor = Some(AgentId::from("agent-9"));
        agent.individual_state_mut().unwrap().training_progress = 0.42;

        let mut ctx = SaveContext::new();
        agent.save(&mut ctx);
        let loaded = Agent::load_from(&mut ctx).unwrap();

        assert_eq!(loaded.id, agent.id);
        assert_eq!(loaded.loyalty(), 80);
        assert_eq!(loaded.knowledge_level, KnowledgeLevel::Aware);
        assert_eq!(loaded.assigned_investments().len(), 1);
        let state = loaded.individual_state().unwrap();
        assert_eq!(state.successor, Some(AgentId::from("agent-9")));
        assert!((state.training_progress - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_family_save_load_round_trip() {
        let family = Agent::family("fam-1", "Blackwood", 847, 70, 55);
        let mut ctx = SaveContext::new();
        family.save(&mut ctx);
        let loaded = Agent::load_from(&mut ctx).unwrap();

        assert_eq!(loaded.agent_type, AgentType::Family);
        let state = loaded.family_state().unwrap();
        assert_eq!(state.family_name, "Blackwood");
        assert_eq!(state.generation, 1);
        assert_eq!(state.founding_year, 847);
    }

    #[test]
    fn test_betrayal_blows_cover() {
        let mut agent = Agent::individual("agent-7", "Faithless Orin", 20, 90, 0, 50);
        agent.knowledge_level = KnowledgeLevel::Full;
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut signals = SignalLog::new();

        // Zero loyalty with full knowledge rolls at the 25% cap; sixty
        // years is more than enough for the seeded stream.
        for _ in 0..60 {
            if agent.advance_year(&mut rng, &mut signals) {
                break;
            }
        }
        assert_eq!(agent.cover_status, CoverStatus::Exposed);
        assert!(signals
            .iter()
            .any(|s| matches!(s, Signal::AgentBetrayed { exposure_spike: 30, .. })));
    }

    #[test]
    fn test_cult_followers_drift_but_never_vanish() {
        let mut cult = Agent::cult("cult-1", "Circle of the Pale Hand", 2, 80, 50);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut signals = SignalLog::new();
        for _ in 0..50 {
            cult.advance_year(&mut rng, &mut signals);
            assert!(cult.cult_state().unwrap().followers >= 1);
        }
    }

    #[test]
    fn test_cult_devotion_floor_catches_decay() {
        let mut cult = Agent::cult("cult-2", "Midnight Choir", 40, 31, 50);
        cult.age = 90;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut signals = SignalLog::new();

        // age 91 of 100: decay 3 would land at 28, the floor holds 30
        cult.advance_year(&mut rng, &mut signals);
        assert_eq!(cult.loyalty(), 30);
    }

    #[test]
    fn test_cult_floor_never_restores_loyalty() {
        let mut cult = Agent::cult("cult-3", "Ashen Flock", 10, 10, 50);
        cult.age = 90;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut signals = SignalLog::new();
        cult.advance_year(&mut rng, &mut signals);
        assert_eq!(cult.loyalty(), 10);
    }

    #[test]
    fn test_bound_never_betrays_and_stays_loyal() {
        let mut servant = Agent::bound("bound-1", "Skeletal Archivist", 70);
        servant.set_loyalty(10);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut signals = SignalLog::new();
        for _ in 0..30 {
            assert!(!servant.advance_year(&mut rng, &mut signals));
        }
        assert_eq!(servant.loyalty(), 100);
        assert!(!signals.iter().any(|s| matches!(s, Signal::AgentBetrayed { .. })));
    }

    #[test]
    fn test_bound_exposure_contribution_doubled() {
        let mut servant = Agent::bound("bound-2", "Wight Seneschal", 70);
        assert_eq!(servant.exposure_contribution(), 0);

        // 10 base * 3.0 full knowledge, doubled for the undead
        servant.cover_status = CoverStatus::Exposed;
        assert_eq!(servant.exposure_contribution(), 60);
    }

    #[test]
    fn test_cult_exposure_scales_with_followers() {
        let mut cult = Agent::cult("cult-4", "Gravesong Assembly", 500, 80, 50);
        cult.cover_status = CoverStatus::Compromised;
        cult.knowledge_level = KnowledgeLevel::Aware;
        // 5 * 2.0 = 10, times tier 4
        assert_eq!(cult.exposure_contribution(), 40);
    }

    #[test]
    fn test_cult_save_load_round_trip() {
        let mut cult = Agent::cult("cult-5", "Veiled Synod", 120, 75, 60);
        cult.knowledge_level = KnowledgeLevel::Suspicious;
        let mut ctx = SaveContext::new();
        cult.save(&mut ctx);
        let loaded = Agent::load_from(&mut ctx).unwrap();

        assert_eq!(loaded.agent_type, AgentType::Cult);
        assert_eq!(loaded.cult_state().unwrap().followers, 120);
        assert_eq!(loaded.knowledge_level, KnowledgeLevel::Suspicious);
    }

    #[test]
    fn test_bound_save_load_round_trip() {
        let servant = Agent::bound("bound-3", "Barrow Clerk", 45);
        let mut ctx = SaveContext::new();
        servant.save(&mut ctx);
        let loaded = Agent::load_from(&mut ctx).unwrap();

        assert_eq!(loaded.agent_type, AgentType::Bound);
        assert_eq!(loaded.loyalty(), 100);
        assert_eq!(loaded.knowledge_level, KnowledgeLevel::Full);
    }

    #[test]
    fn test_raise_as_bound_keeps_identity() {
        let mut agent = Agent::individual("agent-raised", "Old Hesper", 70, 72, 40, 55);
        agent.knowledge_level = KnowledgeLevel::Suspicious;
        agent.raise_as_bound();

        assert_eq!(agent.agent_type, AgentType::Bound);
        assert_eq!(agent.max_age, 0);
        assert_eq!(agent.loyalty(), 100);
        assert_eq!(agent.knowledge_level, KnowledgeLevel::Full);
        assert_eq!(agent.competence(), 55);
        assert_eq!(agent.name, "Old Hesper");

        // An undead servant no longer ages out.
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut signals = SignalLog::new();
        for _ in 0..20 {
            assert!(!agent.advance_year(&mut rng, &mut signals));
        }
    }
}
