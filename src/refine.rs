//! Per-counterpart relationship ribbons from the master chronology.
//!
//! Each tracked person is identified by an alias set. Every row dated on or
//! before the subject's death whose text mentions an alias (or whose primary
//! figure is the person) becomes one ribbon event. Letters put the
//! counterpart in the reference city; anything else puts them beside the
//! subject.

use std::sync::LazyLock;

use chronicle_types::{TimelineEvent, Topic};
use regex::Regex;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use tracing::{debug, info};

use crate::authored::SUBJECT_DEATH;
use crate::config::RelationsConfig;
use crate::date::normalize_date;
use crate::table::{MasterRecord, MasterTable};

// 「…」, “…” or "…", each closed by its own mark; the leftmost span wins.
static RE_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"「(.*?)」|“(.*?)”|"(.*?)""#).expect("quote regex"));

/// First quoted span in `text`, without its delimiters; empty if none.
pub fn extract_quote(text: &str) -> String {
    RE_QUOTE
        .captures(text)
        .and_then(|c| c.iter().skip(1).flatten().next())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Whether a row describes correspondence rather than a meeting.
pub fn is_letter(relations: &RelationsConfig, record: &MasterRecord<'_>) -> bool {
    let text = format!("{}{}", record.subject_action, record.summary_text);
    relations.letter_keywords.any_in(&text)
}

/// Where the counterpart was: the reference city for letters, else with the subject.
pub fn friend_location(relations: &RelationsConfig, letter: bool, subject_loc: &str) -> String {
    if letter {
        relations.reference_city.clone()
    } else {
        subject_loc.to_string()
    }
}

/// Ascending by normalized date; rows sharing a date keep their order.
pub fn sort_timeline(events: &mut [TimelineEvent]) {
    events.sort_by(|a, b| a.norm_date.cmp(&b.norm_date));
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonTimeline {
    pub name: String,
    pub events: Vec<TimelineEvent>,
}

/// All ribbons, in configuration order. Serializes as a JSON object keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipTimelines {
    pub timelines: Vec<PersonTimeline>,
}

impl Serialize for RelationshipTimelines {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.timelines.len()))?;
        for t in &self.timelines {
            map.serialize_entry(&t.name, &t.events)?;
        }
        map.end()
    }
}

fn ribbon_event(
    relations: &RelationsConfig,
    record: &MasterRecord<'_>,
    norm_date: &str,
) -> TimelineEvent {
    let letter = is_letter(relations, record);
    let subject_loc = record.master_location.to_string();
    TimelineEvent {
        date: record.exact_date.to_string(),
        norm_date: norm_date.to_string(),
        friend_loc: friend_location(relations, letter, &subject_loc),
        subject_loc,
        topic: Topic::ArtisticExchange,
        is_echo: false,
        quote: extract_quote(record.details_evidence),
        summary: record.summary_text.to_string(),
        details: record.details_evidence.to_string(),
        artifact_refs: record.artifact_refs.to_string(),
        is_letter: letter,
    }
}

/// Build one sorted ribbon per tracked person, each closed by the subject's death.
pub fn ribbons(table: &MasterTable, relations: &RelationsConfig) -> RelationshipTimelines {
    let cutoff = normalize_date(&relations.death_cutoff);
    let mut timelines: Vec<PersonTimeline> = relations
        .tracked
        .iter()
        .map(|p| PersonTimeline {
            name: p.name.clone(),
            events: Vec::new(),
        })
        .collect();

    for record in table.records() {
        let norm_date = normalize_date(record.exact_date);
        if norm_date > cutoff {
            continue;
        }
        let text = record.match_text();
        for (person, timeline) in relations.tracked.iter().zip(timelines.iter_mut()) {
            if !person.matches(record.primary_figure, &text) {
                continue;
            }
            debug!("{} ↔ {}: {}", record.event_id, person.name, record.summary_text);
            timeline
                .events
                .push(ribbon_event(relations, &record, &norm_date));
        }
    }

    for timeline in &mut timelines {
        timeline.events.push(SUBJECT_DEATH.on(&relations.death_cutoff));
        sort_timeline(&mut timeline.events);
        info!("{}: {} events", timeline.name, timeline.events.len());
    }

    RelationshipTimelines { timelines }
}
