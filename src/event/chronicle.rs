//! Permanent historical record of resolved events
//!
//! The chronicle is the one structure that outlives a prestige: every
//! event resolved during play is snapshotted into a [`ChronicleEntry`]
//! and kept forever, most recent first. Entries are immutable after
//! insertion. Alongside the event log runs a separate list of
//! [`Milestone`] markers for landmarks that are not events themselves,
//! such as era changes or a prestige.

use serde::{Deserialize, Serialize};

use crate::core::error::{LichError, Result};
use crate::core::types::{EventId, EventSeverity, EventType, KingdomId, RegionId};
use crate::event::event::Event;
use crate::save::context::{SaveContext, Saveable};

/// Immutable snapshot of one resolved event
///
/// Captures everything the player might later want to read back:
/// what happened, where, when it fired and when it resolved, and what
/// it cost in gold and exposure. `player_choice` is set only for
/// events that demanded a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChronicleEntry {
    pub event_id: EventId,
    pub event_name: String,
    pub event_type: EventType,
    pub severity: EventSeverity,
    pub year_occurred: u64,
    pub year_resolved: u64,
    pub description: String,
    pub outcome: Option<String>,
    pub affected_region: Option<RegionId>,
    pub affected_kingdom: Option<KingdomId>,
    pub player_choice: Option<String>,
    pub gold_impact: i64,
    pub exposure_impact: f64,
}

impl ChronicleEntry {
    /// Snapshots an event at the moment it resolves. Outcome, choice,
    /// and impact fields start empty; the recording call fills them.
    pub fn from_event(event: &Event, year_resolved: u64) -> Self {
        Self {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            event_type: event.event_type(),
            severity: event.severity,
            year_occurred: event.year_occurred,
            year_resolved,
            description: event.description.clone(),
            outcome: None,
            affected_region: event.affects_region.clone(),
            affected_kingdom: event.affects_kingdom.clone(),
            player_choice: None,
            gold_impact: 0,
            exposure_impact: 0.0,
        }
    }
}

/// Non-event landmark worth remembering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub year: u64,
    pub title: String,
    pub description: String,
}

/// Append-only log of everything that ever happened
///
/// Entries are ordered most recent first. The per-type counters are
/// kept in lockstep with the entry list and rebuilt from it on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventChronicle {
    entries: Vec<ChronicleEntry>,
    milestones: Vec<Milestone>,
    count_by_type: [u32; 4],
}

impl EventChronicle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resolved event that required no player decision.
    pub fn record(
        &mut self,
        event: &Event,
        year_resolved: u64,
        outcome: Option<String>,
        gold_impact: i64,
        exposure_impact: f64,
    ) {
        let mut entry = ChronicleEntry::from_event(event, year_resolved);
        entry.outcome = outcome;
        entry.gold_impact = gold_impact;
        entry.exposure_impact = exposure_impact;
        self.insert(entry);
    }

    /// Records a resolved event together with the choice the player made.
    pub fn record_with_choice(
        &mut self,
        event: &Event,
        year_resolved: u64,
        choice_id: &str,
        outcome: Option<String>,
        gold_impact: i64,
        exposure_impact: f64,
    ) {
        let mut entry = ChronicleEntry::from_event(event, year_resolved);
        entry.player_choice = Some(choice_id.to_string());
        entry.outcome = outcome;
        entry.gold_impact = gold_impact;
        entry.exposure_impact = exposure_impact;
        self.insert(entry);
    }

    fn insert(&mut self, entry: ChronicleEntry) {
        tracing::debug!(
            event = %entry.event_name,
            event_type = entry.event_type.name(),
            year = entry.year_occurred,
            "chronicled event"
        );
        self.count_by_type[entry.event_type.index()] += 1;
        // Most recent first
        self.entries.insert(0, entry);
    }

    /// All entries, most recent first.
    pub fn entries(&self) -> &[ChronicleEntry] {
        &self.entries
    }

    pub fn by_type(&self, event_type: EventType) -> Vec<ChronicleEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Entries whose occurrence year falls in `start_year..=end_year`.
    pub fn by_year_range(&self, start_year: u64, end_year: u64) -> Vec<ChronicleEntry> {
        self.entries
            .iter()
            .filter(|e| e.year_occurred >= start_year && e.year_occurred <= end_year)
            .cloned()
            .collect()
    }

    pub fn by_kingdom(&self, kingdom_id: &KingdomId) -> Vec<ChronicleEntry> {
        self.entries
            .iter()
            .filter(|e| e.affected_kingdom.as_ref() == Some(kingdom_id))
            .cloned()
            .collect()
    }

    /// Entries at or above the given severity.
    pub fn by_severity(&self, min_severity: EventSeverity) -> Vec<ChronicleEntry> {
        self.entries
            .iter()
            .filter(|e| e.severity >= min_severity)
            .cloned()
            .collect()
    }

    /// The `count` most recently recorded entries.
    pub fn recent(&self, count: usize) -> Vec<ChronicleEntry> {
        self.entries.iter().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_by_type(&self, event_type: EventType) -> u32 {
        self.count_by_type[event_type.index()]
    }

    pub fn add_milestone(&mut self, year: u64, title: &str, description: &str) {
        tracing::info!(title, year, "chronicle milestone");
        self.milestones.push(Milestone {
            year,
            title: title.to_string(),
            description: description.to_string(),
        });
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.milestones.clear();
        self.count_by_type = [0; 4];
        tracing::debug!("chronicle reset");
    }
}

impl Saveable for EventChronicle {
    fn save(&self, ctx: &mut SaveContext) {
        ctx.write_uint("entry-count", self.entries.len() as u64);
        ctx.begin_section("entries");
        for (i, entry) in self.entries.iter().enumerate() {
            ctx.begin_section(&format!("entry-{}", i));
            ctx.write_string("event-id", &entry.event_id.0);
            ctx.write_string("event-name", &entry.event_name);
            ctx.write_string("event-type", entry.event_type.name());
            ctx.write_string("severity", entry.severity.name());
            ctx.write_uint("year-occurred", entry.year_occurred);
            ctx.write_uint("year-resolved", entry.year_resolved);
            ctx.write_string("description", &entry.description);
            if let Some(outcome) = &entry.outcome {
                ctx.write_string("outcome", outcome);
            }
            if let Some(region) = &entry.affected_region {
                ctx.write_string("affected-region", &region.0);
            }
            if let Some(kingdom) = &entry.affected_kingdom {
                ctx.write_string("affected-kingdom", &kingdom.0);
            }
            if let Some(choice) = &entry.player_choice {
                ctx.write_string("player-choice", choice);
            }
            ctx.write_int("gold-impact", entry.gold_impact);
            ctx.write_double("exposure-impact", entry.exposure_impact);
            ctx.end_section();
        }
        ctx.end_section();

        ctx.write_uint("milestone-count", self.milestones.len() as u64);
        ctx.begin_section("milestones");
        for (i, milestone) in self.milestones.iter().enumerate() {
            ctx.begin_section(&format!("milestone-{}", i));
            ctx.write_uint("year", milestone.year);
            ctx.write_string("title", &milestone.title);
            ctx.write_string("description", &milestone.description);
            ctx.end_section();
        }
        ctx.end_section();
    }

    fn load(&mut self, ctx: &mut SaveContext) -> Result<()> {
        self.reset();

        let entry_count = ctx.read_uint("entry-count", 0);
        ctx.begin_section("entries");
        for i in 0..entry_count {
            ctx.begin_section(&format!("entry-{}", i));

            let type_name = ctx.read_string("event-type", "");
            let event_type = EventType::from_name(&type_name).ok_or_else(|| {
                LichError::Load(format!("unknown event type in chronicle: {}", type_name))
            })?;
            let severity_name = ctx.read_string("severity", "");
            let severity = EventSeverity::from_name(&severity_name).ok_or_else(|| {
                LichError::Load(format!("unknown severity in chronicle: {}", severity_name))
            })?;

            let entry = ChronicleEntry {
                event_id: EventId(ctx.read_string("event-id", "unknown")),
                event_name: ctx.read_string("event-name", "Unknown Event"),
                event_type,
                severity,
                year_occurred: ctx.read_uint("year-occurred", 847),
                year_resolved: ctx.read_uint("year-resolved", 847),
                description: ctx.read_string("description", ""),
                outcome: ctx
                    .has_key("outcome")
                    .then(|| ctx.read_string("outcome", "")),
                affected_region: ctx
                    .has_key("affected-region")
                    .then(|| RegionId(ctx.read_string("affected-region", ""))),
                affected_kingdom: ctx
                    .has_key("affected-kingdom")
                    .then(|| KingdomId(ctx.read_string("affected-kingdom", ""))),
                player_choice: ctx
                    .has_key("player-choice")
                    .then(|| ctx.read_string("player-choice", "")),
                gold_impact: ctx.read_int("gold-impact", 0),
                exposure_impact: ctx.read_double("exposure-impact", 0.0),
            };
            self.count_by_type[entry.event_type.index()] += 1;
            self.entries.push(entry);

            ctx.end_section();
        }
        ctx.end_section();

        let milestone_count = ctx.read_uint("milestone-count", 0);
        ctx.begin_section("milestones");
        for i in 0..milestone_count {
            ctx.begin_section(&format!("milestone-{}", i));
            self.milestones.push(Milestone {
                year: ctx.read_uint("year", 847),
                title: ctx.read_string("title", "Milestone"),
                description: ctx.read_string("description", ""),
            });
            ctx.end_section();
        }
        ctx.end_section();

        tracing::debug!(
            entries = self.entries.len(),
            milestones = self.milestones.len(),
            "loaded chronicle"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AssetClass;

    fn political_event(id: &str, year: u64, kingdom: &str) -> Event {
        let mut event =
            Event::political(id, "Succession Crisis", EventSeverity::Moderate, year, -20, false);
        event.affects_kingdom = Some(KingdomId::from(kingdom));
        event
    }

    fn economic_event(id: &str, year: u64) -> Event {
        let class = Some(AssetClass::Trade);
        Event::economic(id, "Trade Boom", EventSeverity::Minor, year, 1.15, class)
    }

    #[test]
    fn test_record_inserts_most_recent_first() {
        let mut chronicle = EventChronicle::new();
        chronicle.record(&economic_event("econ-848-1", 848), 848, None, 0, 0.0);
        chronicle.record(&political_event("poli-850-2", 850, "valdria"), 850, None, 0, 0.0);

        let entries = chronicle.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event_id.0, "poli-850-2");
        assert_eq!(entries[1].event_id.0, "econ-848-1");
    }

    #[test]
    fn test_record_snapshots_event_fields() {
        let mut chronicle = EventChronicle::new();
        let mut event = economic_event("econ-848-1", 848);
        event.description = "Caravans crowd the passes.".to_string();
        chronicle.record(&event, 849, Some("Profits taken".to_string()), 2500, -1.5);

        let entry = &chronicle.entries()[0];
        assert_eq!(entry.event_name, "Trade Boom");
        assert_eq!(entry.event_type, EventType::Economic);
        assert_eq!(entry.year_occurred, 848);
        assert_eq!(entry.year_resolved, 849);
        assert_eq!(entry.description, "Caravans crowd the passes.");
        assert_eq!(entry.outcome.as_deref(), Some("Profits taken"));
        assert_eq!(entry.gold_impact, 2500);
        assert!((entry.exposure_impact + 1.5).abs() < 1e-9);
        assert!(entry.player_choice.is_none());
    }

    #[test]
    fn test_record_with_choice_keeps_choice_id() {
        let mut chronicle = EventChronicle::new();
        let betrayal = Event::personal(
            "pers-855-1",
            "A Knife in the Dark",
            EventSeverity::Major,
            855,
            None,
            true,
            false,
        );
        chronicle.record_with_choice(
            &betrayal,
            855,
            "punish",
            Some("The traitor is destroyed.".to_string()),
            0,
            5.0,
        );

        let entry = &chronicle.entries()[0];
        assert_eq!(entry.player_choice.as_deref(), Some("punish"));
        assert_eq!(entry.outcome.as_deref(), Some("The traitor is destroyed."));
        assert_eq!(chronicle.count_by_type(EventType::Personal), 1);
    }

    #[test]
    fn test_type_counts_track_inserts() {
        let mut chronicle = EventChronicle::new();
        chronicle.record(&economic_event("econ-1", 848), 848, None, 0, 0.0);
        chronicle.record(&economic_event("econ-2", 849), 849, None, 0, 0.0);
        chronicle.record(&political_event("poli-1", 850, "morn"), 850, None, 0, 0.0);

        assert_eq!(chronicle.count_by_type(EventType::Economic), 2);
        assert_eq!(chronicle.count_by_type(EventType::Political), 1);
        assert_eq!(chronicle.count_by_type(EventType::Magical), 0);
        assert_eq!(chronicle.len(), 3);
    }

    #[test]
    fn test_query_by_type() {
        let mut chronicle = EventChronicle::new();
        chronicle.record(&economic_event("econ-1", 848), 848, None, 0, 0.0);
        chronicle.record(&political_event("poli-1", 849, "morn"), 849, None, 0, 0.0);
        chronicle.record(&economic_event("econ-2", 850), 850, None, 0, 0.0);

        let economic = chronicle.by_type(EventType::Economic);
        assert_eq!(economic.len(), 2);
        assert!(economic.iter().all(|e| e.event_type == EventType::Economic));
        assert!(chronicle.by_type(EventType::Magical).is_empty());
    }

    #[test]
    fn test_query_by_year_range_is_inclusive() {
        let mut chronicle = EventChronicle::new();
        for year in 848..=852 {
            chronicle.record(&economic_event(&format!("econ-{}", year), year), year, None, 0, 0.0);
        }

        let slice = chronicle.by_year_range(849, 851);
        assert_eq!(slice.len(), 3);
        assert!(slice.iter().all(|e| (849..=851).contains(&e.year_occurred)));
    }

    #[test]
    fn test_query_by_kingdom() {
        let mut chronicle = EventChronicle::new();
        chronicle.record(&political_event("poli-1", 848, "valdria"), 848, None, 0, 0.0);
        chronicle.record(&political_event("poli-2", 849, "morn"), 849, None, 0, 0.0);
        chronicle.record(&political_event("poli-3", 850, "valdria"), 850, None, 0, 0.0);
        chronicle.record(&economic_event("econ-1", 851), 851, None, 0, 0.0);

        let valdria = chronicle.by_kingdom(&KingdomId::from("valdria"));
        assert_eq!(valdria.len(), 2);
        assert!(chronicle.by_kingdom(&KingdomId::from("sareth")).is_empty());
    }

    #[test]
    fn test_query_by_minimum_severity() {
        let mut chronicle = EventChronicle::new();
        chronicle.record(&economic_event("econ-1", 848), 848, None, 0, 0.0);
        let major = Event::political("poli-1", "Civil War", EventSeverity::Major, 849, -50, true);
        chronicle.record(&major, 849, None, 0, 0.0);
        let cata = Event::magical(
            "magi-1",
            "Magical Catastrophe",
            EventSeverity::Catastrophic,
            850,
            60,
            true,
        );
        chronicle.record(&cata, 850, None, 0, 0.0);

        assert_eq!(chronicle.by_severity(EventSeverity::Minor).len(), 3);
        assert_eq!(chronicle.by_severity(EventSeverity::Major).len(), 2);
        assert_eq!(chronicle.by_severity(EventSeverity::Catastrophic).len(), 1);
    }

    #[test]
    fn test_recent_takes_from_the_front() {
        let mut chronicle = EventChronicle::new();
        for year in 848..858 {
            chronicle.record(&economic_event(&format!("econ-{}", year), year), year, None, 0, 0.0);
        }

        let recent = chronicle.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].year_occurred, 857);
        assert_eq!(recent[2].year_occurred, 855);

        // Asking for more than exists returns everything
        assert_eq!(chronicle.recent(100).len(), 10);
    }

    #[test]
    fn test_milestones_are_separate_from_entries() {
        let mut chronicle = EventChronicle::new();
        chronicle.add_milestone(900, "First Prestige", "The lich slumbers beyond death itself.");
        chronicle.record(&economic_event("econ-1", 901), 901, None, 0, 0.0);

        assert_eq!(chronicle.milestones().len(), 1);
        assert_eq!(chronicle.milestones()[0].title, "First Prestige");
        assert_eq!(chronicle.len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut chronicle = EventChronicle::new();
        chronicle.record(&economic_event("econ-1", 848), 848, None, 0, 0.0);
        chronicle.add_milestone(850, "Era of Ash", "A century turns.");
        chronicle.reset();

        assert!(chronicle.is_empty());
        assert!(chronicle.milestones().is_empty());
        assert_eq!(chronicle.count_by_type(EventType::Economic), 0);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut chronicle = EventChronicle::new();
        let mut crisis = political_event("poli-1", 849, "valdria");
        crisis.affects_region = Some(RegionId::from("midlands"));
        chronicle.record(&crisis, 850, Some("Weathered the storm".to_string()), -1200, 3.0);
        let death = Event::personal(
            "pers-1",
            "A Servant Falls",
            EventSeverity::Moderate,
            851,
            None,
            false,
            true,
        );
        chronicle.record_with_choice(&death, 851, "raise", None, -50_000, 15.0);
        chronicle.add_milestone(852, "The Vault Opens", "Dimensional storage secured.");

        let mut ctx = SaveContext::new();
        chronicle.save(&mut ctx);

        let mut restored = EventChronicle::new();
        restored.load(&mut ctx).unwrap();

        assert_eq!(restored.entries(), chronicle.entries());
        assert_eq!(restored.milestones(), chronicle.milestones());
        assert_eq!(restored.count_by_type(EventType::Political), 1);
        assert_eq!(restored.count_by_type(EventType::Personal), 1);

        // Optional fields absent from the save stay absent
        let choice_entry = &restored.entries()[0];
        assert_eq!(choice_entry.player_choice.as_deref(), Some("raise"));
        assert!(choice_entry.outcome.is_none());
        assert!(choice_entry.affected_region.is_none());
    }
}
