use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Interaction type ─────────────────────────────────────────────────────

/// How a chronicle line relates the subject to a tracked person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionType {
    /// 访/晤/面/同游
    #[serde(rename = "见面")]
    Meeting,
    /// 画展/筹办
    #[serde(rename = "合作")]
    Collaboration,
    /// 寄/赠
    #[serde(rename = "寄赠")]
    Gift,
    /// 病逝/噩耗/挽
    #[serde(rename = "讣告")]
    Obituary,
    /// Anything else defaults to letters.
    #[serde(rename = "书信")]
    Correspondence,
}

impl InteractionType {
    pub fn as_chinese(&self) -> &'static str {
        match self {
            Self::Meeting => "见面",
            Self::Collaboration => "合作",
            Self::Gift => "寄赠",
            Self::Obituary => "讣告",
            Self::Correspondence => "书信",
        }
    }
}

// ── Raw chronicle interaction ────────────────────────────────────────────

/// One tracked-person mention found while scanning the freeform chronicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// `YEAR` or `YEAR.M.D`, as known when the line was read.
    #[serde(rename = "Date")]
    pub date: String,
    /// Where the subject lived that year.
    #[serde(rename = "Subject_Loc")]
    pub location_hint: String,
    #[serde(rename = "Target_Name")]
    pub target_name: String,
    #[serde(rename = "Interaction_Type")]
    pub interaction_type: InteractionType,
    /// Peers co-occurring in the snippet, written as `A / B`.
    #[serde(
        rename = "Third_Party",
        serialize_with = "join_names",
        deserialize_with = "split_names"
    )]
    pub third_parties: Vec<String>,
    #[serde(rename = "Context_Snippet")]
    pub context_snippet: String,
}

impl InteractionRecord {
    /// CSV column names, in field order.
    pub const HEADER: [&'static str; 6] = [
        "Date",
        "Subject_Loc",
        "Target_Name",
        "Interaction_Type",
        "Third_Party",
        "Context_Snippet",
    ];
}

const NAME_SEPARATOR: &str = " / ";

fn join_names<S: Serializer>(names: &[String], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&names.join(NAME_SEPARATOR))
}

fn split_names<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw
        .split(NAME_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

// ── Location history ─────────────────────────────────────────────────────

/// A point where the subject's residence changed (or a window anchor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub date: String,
    pub loc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// ── Relationship timelines ───────────────────────────────────────────────

/// Thematic label attached to a relationship event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "回憶往事")]
    Reminiscence,
    #[serde(rename = "生活冷暖")]
    LivingHardship,
    #[serde(rename = "籌辦畫展")]
    ExhibitionPlanning,
    #[serde(rename = "靈魂共鳴")]
    SoulResonance,
    #[serde(rename = "藝術交流")]
    ArtisticExchange,
    /// The subject's own death, closing every ribbon.
    #[serde(rename = "物理終點")]
    PhysicalEnd,
    /// The counterpart's death, long after the subject's.
    #[serde(rename = "終成永訣")]
    FinalFarewell,
}

/// One event on a subject↔counterpart ribbon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Date exactly as recorded in the master table.
    pub date: String,
    /// Sort key, `YYYY.MM.DD`.
    pub norm_date: String,
    #[serde(rename = "hbh_loc")]
    pub subject_loc: String,
    pub friend_loc: String,
    pub topic: Topic,
    pub is_echo: bool,
    #[serde(default)]
    pub quote: String,
    pub summary: String,
    pub details: String,
    #[serde(rename = "Artifact_Refs", default)]
    pub artifact_refs: String,
    pub is_letter: bool,
}

// ── Master table repair log ──────────────────────────────────────────────

/// A single rewritten `Exact_Date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateChange {
    pub id: String,
    pub old: String,
    pub new: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixReport {
    pub status: String,
    pub total_processed: usize,
    pub total_fixed: usize,
    pub sample_changes: Vec<DateChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> TimelineEvent {
        TimelineEvent {
            date: "1943.秋".into(),
            norm_date: "1943.01.01".into(),
            subject_loc: "北平".into(),
            friend_loc: "上海".into(),
            topic: Topic::ExhibitionPlanning,
            is_echo: false,
            quote: String::new(),
            summary: "籌辦畫展".into(),
            details: "見信".into(),
            artifact_refs: "《書簡》".into(),
            is_letter: true,
        }
    }

    #[test]
    fn test_timeline_event_field_names() {
        let v = serde_json::to_value(event()).unwrap();
        let obj = v.as_object().unwrap();
        for key in [
            "date",
            "norm_date",
            "hbh_loc",
            "friend_loc",
            "topic",
            "is_echo",
            "quote",
            "summary",
            "details",
            "Artifact_Refs",
            "is_letter",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["topic"], "籌辦畫展");
    }

    #[test]
    fn test_location_point_omits_empty_summary() {
        let p = LocationPoint {
            date: "1930.01.01".into(),
            loc: "上海".into(),
            summary: None,
        };
        assert_eq!(
            serde_json::to_string(&p).unwrap(),
            r#"{"date":"1930.01.01","loc":"上海"}"#
        );
    }

    #[test]
    fn test_third_parties_joined_and_split() {
        let r = InteractionRecord {
            date: "1935".into(),
            location_hint: "上海".into(),
            target_name: "傅雷".into(),
            interaction_type: InteractionType::Meeting,
            third_parties: vec!["张大千".into(), "徐悲鸿".into()],
            context_snippet: "…".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["Third_Party"], "张大千 / 徐悲鸿");
        assert_eq!(json["Interaction_Type"], "见面");

        let back: InteractionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.third_parties, r.third_parties);
    }

    #[test]
    fn test_interaction_header_matches_field_names() {
        let r = InteractionRecord {
            date: "1935".into(),
            location_hint: "上海".into(),
            target_name: "傅雷".into(),
            interaction_type: InteractionType::Gift,
            third_parties: vec![],
            context_snippet: "".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        let mut header = InteractionRecord::HEADER.to_vec();
        keys.sort();
        header.sort();
        assert_eq!(keys, header);
    }

    #[test]
    fn test_empty_third_party_deserializes_to_empty_vec() {
        let json = serde_json::json!({
            "Date": "1935",
            "Subject_Loc": "上海",
            "Target_Name": "傅雷",
            "Interaction_Type": "书信",
            "Third_Party": "",
            "Context_Snippet": "",
        });
        let r: InteractionRecord = serde_json::from_value(json).unwrap();
        assert!(r.third_parties.is_empty());
    }
}
