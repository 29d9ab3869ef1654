//! Raw chronicle scanning.
//!
//! The chronicle is a year-by-year narrative:
//!
//!   公元1935年 乙亥 七十二歲
//!   3月7日，傅雷來訪，同游西湖。
//!   寄畫與黄節……
//!
//! A single forward pass keeps the most recent year and month/day markers
//! in a [`ScanContext`] and attributes every tracked-name mention to it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chronicle_types::{InteractionRecord, InteractionType};
use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{PipelineError, Result};

// 公元1935年
static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"公元([0-9]{4})年").expect("year regex"));

// 11月19日 / 11月19號
static RE_MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})月([0-9]{1,2})[日號号]").expect("month_day regex"));

// ── Input discovery ──────────────────────────────────────────────────

/// Chronicle files under `root`: the file itself, or every `.txt` in a
/// directory tree, ordered by path so numbered volumes read in sequence.
pub fn discover_chronicles(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(PipelineError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such chronicle"),
        ));
    }

    let files = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("txt"))
        .collect();
    Ok(files)
}

/// All lines of all chronicle files, in reading order.
pub fn read_chronicle(root: &Path) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for path in discover_chronicles(root)? {
        let content = std::fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;
        debug!("{}: {} lines", path.display(), content.lines().count());
        lines.extend(content.lines().map(String::from));
    }
    Ok(lines)
}

// ── Running date context ─────────────────────────────────────────────

/// What a line contributed to the date context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Year,
    MonthDay,
    Plain,
}

/// The date in force at a given line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanContext {
    pub current_year: u16,
    /// `M.D` as written; persists until the next month/day marker.
    pub current_month_day: Option<String>,
}

impl ScanContext {
    pub fn new(initial_year: u16) -> Self {
        Self {
            current_year: initial_year,
            current_month_day: None,
        }
    }

    /// Fold step over one line. A year marker replaces only the year.
    pub fn advance(self, line: &str) -> (Self, Marker) {
        if let Some(year) = RE_YEAR
            .captures(line)
            .and_then(|c| c[1].parse::<u16>().ok())
        {
            return (
                Self {
                    current_year: year,
                    ..self
                },
                Marker::Year,
            );
        }
        if let Some(c) = RE_MONTH_DAY.captures(line) {
            return (
                Self {
                    current_month_day: Some(format!("{}.{}", &c[1], &c[2])),
                    ..self
                },
                Marker::MonthDay,
            );
        }
        (self, Marker::Plain)
    }

    pub fn date(&self) -> String {
        match &self.current_month_day {
            Some(md) => format!("{}.{md}", self.current_year),
            None => self.current_year.to_string(),
        }
    }
}

// ── Scanner ──────────────────────────────────────────────────────────

pub struct ChronicleScanner<'a> {
    config: &'a ScanConfig,
}

impl<'a> ChronicleScanner<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self { config }
    }

    /// Scan lines in order. Year lines only move the context; every other
    /// line is searched for at most one tracked name.
    pub fn scan_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<InteractionRecord> {
        let (_, records) = lines.iter().enumerate().fold(
            (ScanContext::new(self.config.initial_year), Vec::<InteractionRecord>::new()),
            |(ctx, mut records), (i, line)| {
                let line: &str = line.as_ref();
                let (ctx, marker) = ctx.advance(line);
                if marker != Marker::Year {
                    let next: Option<&str> = lines.get(i + 1).map(|n| n.as_ref());
                    records.extend(self.detect(&ctx, line, next));
                }
                (ctx, records)
            },
        );
        info!("Scanned {} lines, {} interactions", lines.len(), records.len());
        records
    }

    fn detect(&self, ctx: &ScanContext, line: &str, next: Option<&str>) -> Option<InteractionRecord> {
        let target = self
            .config
            .targets
            .iter()
            .find(|t| line.contains(t.as_str()))?;

        let snippet = self.snippet(line, next);
        let third_parties = self
            .config
            .peers
            .iter()
            .filter(|p| *p != target && snippet.contains(p.as_str()))
            .cloned()
            .collect();
        let interaction_type = *self.config.interaction.classify(snippet.as_str());

        Some(InteractionRecord {
            date: ctx.date(),
            location_hint: self.config.location_for_year(ctx.current_year).to_string(),
            target_name: target.clone(),
            interaction_type,
            third_parties,
            context_snippet: snippet,
        })
    }

    /// Current line plus the next, trimmed, joined by a space, bounded in characters.
    fn snippet(&self, line: &str, next: Option<&str>) -> String {
        let mut text = line.trim().to_string();
        if let Some(next) = next {
            text.push(' ');
            text.push_str(next.trim());
        }
        text.chars().take(self.config.snippet_chars).collect()
    }
}

/// Record count per interaction type.
pub fn type_counts(records: &[InteractionRecord]) -> BTreeMap<InteractionType, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.interaction_type).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(lines: &[&str]) -> Vec<InteractionRecord> {
        let config = ScanConfig::default();
        ChronicleScanner::new(&config).scan_lines(lines)
    }

    #[test]
    fn test_year_marker_sets_context_and_emits_nothing() {
        let (ctx, marker) = ScanContext::new(1865).advance("公元1935年 傅雷來訪");
        assert_eq!(marker, Marker::Year);
        assert_eq!(ctx.current_year, 1935);

        let records = scan(&["公元1935年 傅雷來訪"]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_year_marker_keeps_month_day() {
        let ctx = ScanContext::new(1865);
        let (ctx, _) = ctx.advance("3月7日，遊西湖");
        let (ctx, _) = ctx.advance("公元1936年");
        assert_eq!(ctx.current_month_day.as_deref(), Some("3.7"));
        assert_eq!(ctx.date(), "1936.3.7");
    }

    #[test]
    fn test_date_line_still_searched() {
        let records = scan(&["公元1935年", "11月19日，傅雷来访"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "1935.11.19");
        assert_eq!(records[0].target_name, "傅雷");
        assert_eq!(records[0].interaction_type, InteractionType::Meeting);
        assert_eq!(records[0].location_hint, "上海");
    }

    #[test]
    fn test_initial_year_before_any_marker() {
        let records = scan(&["傅雷寄书"]);
        assert_eq!(records[0].date, "1865");
        assert_eq!(records[0].location_hint, "安徽/金华");
    }

    #[test]
    fn test_month_day_persists_across_lines() {
        let records = scan(&["公元1940年", "5月2日 至琉璃厂", "与郑振铎论画"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "1940.5.2");
        assert_eq!(records[0].location_hint, "北平");
    }

    #[test]
    fn test_first_target_wins_per_line() {
        let records = scan(&["黄節与傅雷同游"]);
        assert_eq!(records.len(), 1);
        // 傅雷 precedes 黄節 in the roster.
        assert_eq!(records[0].target_name, "傅雷");
    }

    #[test]
    fn test_third_parties_exclude_target_and_span_next_line() {
        let records = scan(&["陈柱与张大千论画", "徐悲鸿亦至"]);
        assert_eq!(records[0].third_parties, vec!["张大千", "徐悲鸿"]);
        assert_eq!(records[0].context_snippet, "陈柱与张大千论画 徐悲鸿亦至");
    }

    #[test]
    fn test_interaction_priority() {
        let kind = |line: &str| scan(&[line])[0].interaction_type;
        assert_eq!(kind("寄画与傅雷"), InteractionType::Gift);
        // Meeting outranks gift regardless of position.
        assert_eq!(kind("寄画与傅雷，后往访"), InteractionType::Meeting);
        assert_eq!(kind("与陆丹林筹办画展，寄赠"), InteractionType::Collaboration);
        assert_eq!(kind("闻陈柱病逝"), InteractionType::Obituary);
        assert_eq!(kind("复傅雷书"), InteractionType::Correspondence);
    }

    #[test]
    fn test_snippet_truncated_by_chars() {
        let long = format!("傅雷{}", "字".repeat(300));
        let records = scan(&[long.as_str()]);
        assert_eq!(records[0].context_snippet.chars().count(), 200);
    }

    #[test]
    fn test_type_counts() {
        // Blank separators keep each snippet to its own line.
        let records = scan(&["寄画与傅雷", "", "访陈柱", "", "寄书黄節"]);
        let counts = type_counts(&records);
        assert_eq!(counts[&InteractionType::Gift], 2);
        assert_eq!(counts[&InteractionType::Meeting], 1);
    }

    #[test]
    fn test_directory_read_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("02_下.txt"), "傅雷来访\n").unwrap();
        std::fs::write(dir.path().join("01_上.txt"), "公元1930年\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "傅雷\n").unwrap();

        let lines = read_chronicle(dir.path()).unwrap();
        assert_eq!(lines, vec!["公元1930年", "傅雷来访"]);

        let config = ScanConfig::default();
        let records = ChronicleScanner::new(&config).scan_lines(&lines[..]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "1930");
    }

    #[test]
    fn test_missing_chronicle_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.txt");
        assert!(matches!(
            read_chronicle(&missing),
            Err(PipelineError::Io { .. })
        ));
    }
}
