//! The master chronology CSV.
//!
//! Rows are kept as raw `StringRecord`s so a rewrite preserves every column
//! (including ones this crate never reads) in the original order. Typed
//! access goes through [`MasterRecord`], a borrowed view over the columns
//! the pipeline needs.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::{PipelineError, Result};

pub const EVENT_ID: &str = "Event_ID";
pub const EXACT_DATE: &str = "Exact_Date";
pub const MASTER_LOCATION: &str = "Master_Location";
pub const SUMMARY_TEXT: &str = "Summary_Text";
pub const DETAILS_EVIDENCE: &str = "Details_Evidence";
pub const PRIMARY_FIGURE: &str = "Primary_Figure";
pub const SUBJECT_ACTION: &str = "Subject_Action";
pub const ARTIFACT_REFS: &str = "Artifact_Refs";

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    event_id: usize,
    exact_date: usize,
    master_location: usize,
    summary_text: usize,
    details_evidence: usize,
    primary_figure: usize,
    subject_action: usize,
    artifact_refs: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require =
            |column: &'static str| find(column).ok_or(PipelineError::MissingColumn { column });
        Ok(Self {
            event_id: require(EVENT_ID)?,
            exact_date: require(EXACT_DATE)?,
            master_location: require(MASTER_LOCATION)?,
            summary_text: require(SUMMARY_TEXT)?,
            details_evidence: require(DETAILS_EVIDENCE)?,
            primary_figure: require(PRIMARY_FIGURE)?,
            subject_action: require(SUBJECT_ACTION)?,
            artifact_refs: find(ARTIFACT_REFS),
        })
    }
}

/// Borrowed view of one master chronology row.
#[derive(Debug, Clone, Copy)]
pub struct MasterRecord<'a> {
    pub event_id: &'a str,
    pub exact_date: &'a str,
    pub master_location: &'a str,
    pub summary_text: &'a str,
    pub details_evidence: &'a str,
    pub primary_figure: &'a str,
    pub subject_action: &'a str,
    /// Empty when the column is absent.
    pub artifact_refs: &'a str,
}

impl MasterRecord<'_> {
    /// `Primary_Figure + Summary_Text + Details_Evidence`, the text aliases are matched in.
    pub fn match_text(&self) -> String {
        format!(
            "{}{}{}",
            self.primary_figure, self.summary_text, self.details_evidence
        )
    }
}

#[derive(Debug, Clone)]
pub struct MasterTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    columns: Columns,
}

impl MasterTable {
    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
        Self::from_reader(file)
    }

    /// Like [`MasterTable::read`], but a table that does not exist yet is `None`.
    pub fn read_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::read(path).map(Some)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let columns = Columns::resolve(&headers)?;
        let rows = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            headers,
            rows,
            columns,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| PipelineError::io(path, e))?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<MasterRecord<'_>> {
        self.rows.get(index).map(|row| self.view(row))
    }

    /// Rows in table order.
    pub fn records(&self) -> impl Iterator<Item = MasterRecord<'_>> {
        self.rows.iter().map(|row| self.view(row))
    }

    fn view<'a>(&self, row: &'a StringRecord) -> MasterRecord<'a> {
        let c = self.columns;
        let get = |i: usize| row.get(i).unwrap_or("");
        MasterRecord {
            event_id: get(c.event_id),
            exact_date: get(c.exact_date),
            master_location: get(c.master_location),
            summary_text: get(c.summary_text),
            details_evidence: get(c.details_evidence),
            primary_figure: get(c.primary_figure),
            subject_action: get(c.subject_action),
            artifact_refs: c.artifact_refs.and_then(|i| row.get(i)).unwrap_or(""),
        }
    }

    /// Overwrite one row's `Exact_Date`, leaving every other field untouched.
    pub fn set_exact_date(&mut self, index: usize, value: &str) {
        let col = self.columns.exact_date;
        if let Some(row) = self.rows.get_mut(index) {
            let rebuilt: StringRecord = row
                .iter()
                .enumerate()
                .map(|(i, field)| if i == col { value } else { field })
                .collect();
            *row = rebuilt;
        }
    }
}
