//! The richly annotated ribbon for one counterpart.
//!
//! Unlike [`crate::refine::ribbons`], the subject's location here is the
//! running residence across the whole table (every row moves the tracker,
//! matched or not), events are labelled with a topic, and the ribbon runs
//! past the subject's death up to the counterpart's own. Events after the
//! subject's death are echoes. Letters are recognized from the action
//! column alone, with a narrower keyword list than the basic ribbons.

use chronicle_types::TimelineEvent;
use tracing::{debug, info};

use crate::authored::{ECHO_EVENTS, SUBJECT_DEATH};
use crate::config::Config;
use crate::date::normalize_date;
use crate::ladder::SummaryText;
use crate::location::LocationTracker;
use crate::refine::{extract_quote, friend_location, sort_timeline};
use crate::table::MasterTable;

pub fn deep_timeline(table: &MasterTable, config: &Config) -> Vec<TimelineEvent> {
    let deep = &config.deep;
    let relations = &config.relations;
    let person = deep.person();
    let start = normalize_date(&config.window.start);
    let cutoff = normalize_date(&deep.cutoff);
    let death = normalize_date(&relations.death_cutoff);

    let (_, mut events) = table.records().fold(
        (LocationTracker::new(&config.window.seed_location), Vec::new()),
        |(tracker, mut events), record| {
            let norm_date = normalize_date(record.exact_date);
            if norm_date > cutoff {
                return (tracker, events);
            }
            let (tracker, _) = tracker.observe(record.master_location);
            if norm_date < start || !person.matches(record.primary_figure, &record.match_text()) {
                return (tracker, events);
            }

            let letter = deep.letter_keywords.any_in(record.subject_action);
            let subject_loc = tracker.current().to_string();
            let topic = *deep
                .topics
                .classify(&SummaryText::new(record.summary_text, record.details_evidence));
            debug!("{} {:?} letter={letter}", record.event_id, topic);

            events.push(TimelineEvent {
                date: record.exact_date.to_string(),
                is_echo: norm_date > death,
                norm_date,
                friend_loc: friend_location(relations, letter, &subject_loc),
                subject_loc,
                topic,
                quote: extract_quote(record.details_evidence),
                summary: record.summary_text.to_string(),
                details: if record.details_evidence.trim().is_empty() {
                    deep.details_placeholder.clone()
                } else {
                    record.details_evidence.to_string()
                },
                artifact_refs: record.artifact_refs.to_string(),
                is_letter: letter,
            });
            (tracker, events)
        },
    );

    let derived = events.len();
    events.push(SUBJECT_DEATH.on(&relations.death_cutoff));
    events.extend(ECHO_EVENTS.iter().map(|e| e.to_event()));
    sort_timeline(&mut events);

    info!(
        "{}: {} derived + {} authored events",
        deep.name,
        derived,
        events.len() - derived
    );
    events
}
