//! Hand-written timeline entries.
//!
//! These are not derived from the master table and never pass through
//! classification; refiners append them after deriving their own events.

use chronicle_types::{TimelineEvent, Topic};

use crate::date::normalize_date;

#[derive(Debug, Clone, Copy)]
pub struct AuthoredEvent {
    pub date: &'static str,
    pub subject_loc: &'static str,
    pub friend_loc: &'static str,
    pub topic: Topic,
    pub is_echo: bool,
    pub is_letter: bool,
    pub quote: &'static str,
    pub summary: &'static str,
    pub details: &'static str,
    pub artifact_refs: &'static str,
}

impl AuthoredEvent {
    pub fn to_event(&self) -> TimelineEvent {
        self.on(self.date)
    }

    /// Same entry, re-dated.
    pub fn on(&self, date: &str) -> TimelineEvent {
        TimelineEvent {
            date: date.to_string(),
            norm_date: normalize_date(date),
            subject_loc: self.subject_loc.to_string(),
            friend_loc: self.friend_loc.to_string(),
            topic: self.topic,
            is_echo: self.is_echo,
            quote: self.quote.to_string(),
            summary: self.summary.to_string(),
            details: self.details.to_string(),
            artifact_refs: self.artifact_refs.to_string(),
            is_letter: self.is_letter,
        }
    }
}

/// Closes every ribbon; dated at the configured death cutoff.
pub const SUBJECT_DEATH: AuthoredEvent = AuthoredEvent {
    date: "1955.03.25",
    subject_loc: "杭州",
    friend_loc: "杭州",
    topic: Topic::PhysicalEnd,
    is_echo: false,
    is_letter: false,
    quote: "",
    summary: "黃賓虹於杭州逝世。",
    details: "哲人萎謝，知音永隔。",
    artifact_refs: "",
};

/// Posthumous reflections on the 傅雷 ribbon, one either side of 1962.
pub const ECHO_EVENTS: [AuthoredEvent; 2] = [
    AuthoredEvent {
        date: "1961.02.03",
        subject_loc: "杭州",
        friend_loc: "上海",
        topic: Topic::SoulResonance,
        is_echo: true,
        is_letter: true,
        quote: "以藝術家而論，我們希望他活到一百歲呢。賓翁病中還在記掛我，稱我為一生最大的知己。",
        summary: "傅雷致傅聰信（1961年2月3日），詳述黃賓虹晚年筆墨境界，引為生平第一知音。",
        details: "見《傅雷家書》1961年2月3日致傅聰函：“……黃賓虹先生於本月25日在杭患胃癌逝世，享壽九十二歲。以藝術家而論，我們希望他活到一百歲呢。去冬我身體不好，中間摔了一跤，很少和他通信；祇是在11月初到杭州去，連續在他家看了二天畫，還替他拍了照，不料竟成永訣。聽説他病中還在記掛我，跟不認識我的人提到我。我聽了非常難過，得信之日，一夜没睡好。”",
        artifact_refs: "《傅雷家書》",
    },
    AuthoredEvent {
        date: "1966.09.03",
        subject_loc: "杭州",
        friend_loc: "上海",
        topic: Topic::FinalFarewell,
        is_echo: true,
        is_letter: false,
        quote: "赤子孤獨了，會創造一個世界。",
        summary: "1966年9月3日，傅雷夫婦於上海寓所辭世。書齋所懸，唯賓翁墨跡而已。",
        details: "1966年9月3日凌晨，傅雷夫婦因不堪凌辱，在上海江蘇路安定坊寓所自盡。傅雷一生剛正不阿，其審美格調始終與黃賓虹晚年的黑密厚重相契合。死後，其遺物中仍保留著多幅賓翁贈畫，見證了這段跨越年齡與生死的莫逆之交。",
        artifact_refs: "《傅雷傳》",
    },
];
