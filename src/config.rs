//! Pipeline constants, overridable from a TOML file.
//!
//! Every section is `#[serde(default)]`: an empty file yields the built-in
//! values for the 黃賓虹 chronology.

use std::collections::BTreeSet;
use std::path::Path;

use chronicle_types::{InteractionType, Topic};
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::ladder::{KeywordLadder, KeywordSet, Rule, Scope};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name used in generated summaries ("{subject}移居上海").
    pub subject: String,
    pub scan: ScanConfig,
    pub window: WindowConfig,
    pub relations: RelationsConfig,
    pub deep: DeepConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subject: "黃賓虹".to_string(),
            scan: ScanConfig::default(),
            window: WindowConfig::default(),
            relations: RelationsConfig::default(),
            deep: DeepConfig::default(),
        }
    }
}

impl Config {
    /// Read a TOML file, or fall back to built-in defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        toml::from_str(&text).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── Raw chronicle scan ───────────────────────────────────────────────

/// Residence before a given year.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationEra {
    pub before: u16,
    pub place: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Year assumed until the first `公元NNNN年` marker.
    pub initial_year: u16,
    pub snippet_chars: usize,
    /// Tracked names, tested in order; first hit on a line wins.
    pub targets: Vec<String>,
    pub peers: Vec<String>,
    /// Ascending by `before`.
    pub location_eras: Vec<LocationEra>,
    /// Residence after the last era.
    pub late_location: String,
    pub interaction: KeywordLadder<InteractionType>,
}

impl ScanConfig {
    pub fn location_for_year(&self, year: u16) -> &str {
        self.location_eras
            .iter()
            .find(|e| year < e.before)
            .map(|e| e.place.as_str())
            .unwrap_or(&self.late_location)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            initial_year: 1865,
            snippet_chars: 200,
            targets: strings(&[
                "傅雷", "黄節", "黄节", "蔡守", "胡韞玉", "胡韫玉", "狄平子", "潘飛聲", "潘飞声",
                "宣古愚", "陈叔通", "马公愚", "郑振铎", "陈柱", "陆丹林",
            ]),
            peers: strings(&[
                "齐白石", "溥心畬", "张大千", "徐悲鸿", "庞薰琹", "夏丏尊", "柳亚子", "李叔同",
                "邓实", "宣愚公", "朱砚英",
            ]),
            location_eras: vec![
                LocationEra {
                    before: 1907,
                    place: "安徽/金华".to_string(),
                },
                LocationEra {
                    before: 1937,
                    place: "上海".to_string(),
                },
                LocationEra {
                    before: 1948,
                    place: "北平".to_string(),
                },
            ],
            late_location: "杭州".to_string(),
            interaction: KeywordLadder::new(
                vec![
                    Rule::new(InteractionType::Meeting, &["访", "晤", "面", "同游"]),
                    Rule::new(InteractionType::Collaboration, &["画展", "筹办"]),
                    Rule::new(InteractionType::Gift, &["寄", "赠"]),
                    Rule::new(InteractionType::Obituary, &["病逝", "噩耗", "挽"]),
                ],
                InteractionType::Correspondence,
            ),
        }
    }
}

// ── Location window ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start: String,
    /// The subject's death.
    pub end: String,
    /// Residence assumed at the window start when no earlier row says otherwise.
    pub seed_location: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: "1930.01.01".to_string(),
            end: "1955.03.25".to_string(),
            seed_location: "上海".to_string(),
        }
    }
}

// ── Relationship ribbons ─────────────────────────────────────────────

/// One counterpart and every name the sources use for them.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackedPerson {
    pub name: String,
    pub aliases: BTreeSet<String>,
}

impl TrackedPerson {
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Any alias occurs in `text`, or the row's primary figure is this person.
    pub fn matches(&self, primary_figure: &str, text: &str) -> bool {
        primary_figure == self.name || self.aliases.iter().any(|a| text.contains(a.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelationsConfig {
    /// Rows after this date are dropped before matching.
    pub death_cutoff: String,
    /// Where a correspondent is assumed to be when writing.
    pub reference_city: String,
    pub letter_keywords: KeywordSet,
    pub tracked: Vec<TrackedPerson>,
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            death_cutoff: "1955.03.25".to_string(),
            reference_city: "上海".to_string(),
            letter_keywords: KeywordSet::new(&[
                "書信", "函", "寄", "致", "來信", "信", "札", "柬", "復", "報", "答", "寄書",
                "致書", "手教", "手札",
            ]),
            tracked: vec![
                TrackedPerson::new("許承堯", &["許承堯", "許疑庵", "疑庵"]),
                TrackedPerson::new("陳柱", &["陳柱", "陳柱尊", "柱尊"]),
                TrackedPerson::new("黃節", &["黃節", "黃晦聞", "晦聞"]),
            ],
        }
    }
}

// ── Single-figure deep timeline ──────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeepConfig {
    pub name: String,
    pub aliases: BTreeSet<String>,
    /// The counterpart's own death; rows after it are ignored.
    pub cutoff: String,
    pub details_placeholder: String,
    /// Tested against `Subject_Action` alone.
    pub letter_keywords: KeywordSet,
    pub topics: KeywordLadder<Topic>,
}

impl DeepConfig {
    pub fn person(&self) -> TrackedPerson {
        TrackedPerson {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
        }
    }
}

impl Default for DeepConfig {
    fn default() -> Self {
        Self {
            name: "傅雷".to_string(),
            aliases: ["傅雷", "傅怒安", "怒安"].iter().map(|a| a.to_string()).collect(),
            cutoff: "1966.12.31".to_string(),
            details_placeholder: "（暫無詳細考證資料）".to_string(),
            letter_keywords: KeywordSet::new(&[
                "書信", "函", "寄", "致", "來信", "信", "札", "柬", "復",
            ]),
            topics: KeywordLadder::new(
                vec![
                    Rule::new(Topic::Reminiscence, &["二十年前", "往事", "曾記", "回憶"]),
                    Rule::new(Topic::LivingHardship, &["米", "匯", "三仟", "萬元"])
                        .scoped(Scope::Summary),
                    Rule::new(Topic::ExhibitionPlanning, &["展"]).scoped(Scope::Summary),
                    Rule::new(Topic::SoulResonance, &["知言", "答客問"]),
                ],
                Topic::ArtisticExchange,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_for_year_boundaries() {
        let scan = ScanConfig::default();
        assert_eq!(scan.location_for_year(1865), "安徽/金华");
        assert_eq!(scan.location_for_year(1906), "安徽/金华");
        assert_eq!(scan.location_for_year(1907), "上海");
        assert_eq!(scan.location_for_year(1937), "北平");
        assert_eq!(scan.location_for_year(1948), "杭州");
    }

    #[test]
    fn test_tracked_person_alias_match() {
        let p = TrackedPerson::new("黃節", &["黃節", "黃晦聞", "晦聞"]);
        assert!(p.matches("", "與晦聞論詩"));
        assert!(p.matches("黃節", "無關"));
        assert!(!p.matches("陳柱", "論畫"));
    }

    #[test]
    fn test_load_without_path_gives_defaults() {
        let c = Config::load(None).unwrap();
        assert_eq!(c.subject, "黃賓虹");
        assert_eq!(c.relations.tracked.len(), 3);
        assert_eq!(c.window.end, "1955.03.25");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(
            &path,
            r#"
            subject = "某公"
            [window]
            seed_location = "北平"
            [[relations.tracked]]
            name = "甲"
            aliases = ["甲", "甲翁"]
            "#,
        )
        .unwrap();

        let c = Config::load(Some(&path)).unwrap();
        assert_eq!(c.subject, "某公");
        assert_eq!(c.window.seed_location, "北平");
        assert_eq!(c.window.start, "1930.01.01");
        assert_eq!(c.relations.tracked.len(), 1);
        assert_eq!(c.relations.reference_city, "上海");
        assert_eq!(c.deep.name, "傅雷");
    }

    #[test]
    fn test_custom_interaction_ladder() {
        let c: Config = toml::from_str(
            r#"
            [scan.interaction]
            fallback = "书信"
            [[scan.interaction.rules]]
            label = "讣告"
            keywords = ["逝"]
            "#,
        )
        .unwrap();
        assert_eq!(
            *c.scan.interaction.classify("病逝于沪"),
            InteractionType::Obituary
        );
        assert_eq!(
            *c.scan.interaction.classify("访之"),
            InteractionType::Correspondence
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "subject = [").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(PipelineError::Config { .. })
        ));
    }
}
