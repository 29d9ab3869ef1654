//! The subject's residence over time.
//!
//! [`LocationTracker`] is the running "where is the subject now" state. It is
//! threaded by value through folds over the master table, both here and in
//! the deep relationship timeline, so the two always agree on where the
//! subject was at any row.

use chronicle_types::LocationPoint;
use tracing::{debug, info};

use crate::config::WindowConfig;
use crate::date::normalize_date;
use crate::table::MasterTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTracker {
    current: String,
}

impl LocationTracker {
    pub fn new(seed: &str) -> Self {
        Self {
            current: seed.to_string(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Fold step: adopt `location` if it is present. The flag is true when the
    /// residence actually changed.
    pub fn observe(self, location: &str) -> (Self, bool) {
        let location = location.trim();
        if location.is_empty() || location == self.current {
            (self, false)
        } else {
            (Self::new(location), true)
        }
    }
}

/// Fold state for [`compress`].
struct Walk {
    tracker: LocationTracker,
    points: Vec<LocationPoint>,
    opened: bool,
}

impl Walk {
    fn open(&mut self, start: &str) {
        if !self.opened {
            self.points.push(LocationPoint {
                date: start.to_string(),
                loc: self.tracker.current().to_string(),
                summary: None,
            });
            self.opened = true;
        }
    }
}

/// Run-length compress the table's `Master_Location` column over the window.
///
/// Rows before the window only move the tracker. Rows inside it emit a
/// change point whenever the residence changes. The first row past the
/// window end stops the walk. The result always opens with an anchor at the
/// window start (carrying the residence at that moment) and closes with the
/// subject's death at the window end.
///
/// The opening anchor is the configured seed only while no earlier row has
/// moved the tracker; a pre-window `安徽` row opens the window in 安徽.
pub fn compress(table: &MasterTable, window: &WindowConfig, subject: &str) -> Vec<LocationPoint> {
    let start = normalize_date(&window.start);
    let end = normalize_date(&window.end);

    let mut walk = table
        .records()
        .map(|r| (normalize_date(r.exact_date), r.master_location))
        .take_while(|(date, _)| *date <= end)
        .fold(
            Walk {
                tracker: LocationTracker::new(&window.seed_location),
                points: Vec::new(),
                opened: false,
            },
            |mut walk, (date, location)| {
                if date < start {
                    walk.tracker = walk.tracker.observe(location).0;
                    return walk;
                }
                walk.open(&start);
                let (tracker, changed) = walk.tracker.observe(location);
                walk.tracker = tracker;
                if changed {
                    debug!("{date}: moved to {location}");
                    walk.points.push(LocationPoint {
                        date,
                        loc: walk.tracker.current().to_string(),
                        summary: Some(format!("{subject}移居{}", walk.tracker.current())),
                    });
                }
                walk
            },
        );

    walk.open(&start);
    walk.points.push(LocationPoint {
        date: end,
        loc: walk.tracker.current().to_string(),
        summary: Some(format!("{subject}辭世")),
    });

    info!("Location history: {} points", walk.points.len());
    walk.points
}
