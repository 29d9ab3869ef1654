//! Keyword classification as data.
//!
//! A ladder is an ordered list of rules; the first rule with any keyword
//! present in its text wins, otherwise the fallback label applies.

use std::collections::BTreeSet;

use serde::Deserialize;

/// Which slice of a record a rule inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Full,
    Summary,
}

/// Text a ladder can be evaluated against.
pub trait Haystack {
    fn within(&self, scope: Scope) -> &str;
}

impl Haystack for str {
    fn within(&self, _scope: Scope) -> &str {
        self
    }
}

/// A summary line plus the combined summary+details text.
pub struct SummaryText<'a> {
    pub summary: &'a str,
    pub full: String,
}

impl<'a> SummaryText<'a> {
    pub fn new(summary: &'a str, details: &str) -> Self {
        Self {
            summary,
            full: format!("{summary}{details}"),
        }
    }
}

impl Haystack for SummaryText<'_> {
    fn within(&self, scope: Scope) -> &str {
        match scope {
            Scope::Full => &self.full,
            Scope::Summary => self.summary,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule<L> {
    pub label: L,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub scope: Scope,
}

impl<L> Rule<L> {
    pub fn new(label: L, keywords: &[&str]) -> Self {
        Self {
            label,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            scope: Scope::Full,
        }
    }

    pub fn scoped(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    fn matches<H: Haystack + ?Sized>(&self, text: &H) -> bool {
        let hay = text.within(self.scope);
        self.keywords.iter().any(|k| hay.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordLadder<L> {
    pub rules: Vec<Rule<L>>,
    pub fallback: L,
}

impl<L> KeywordLadder<L> {
    pub fn new(rules: Vec<Rule<L>>, fallback: L) -> Self {
        Self { rules, fallback }
    }

    /// Top-down, first match wins.
    pub fn classify<H: Haystack + ?Sized>(&self, text: &H) -> &L {
        self.rules
            .iter()
            .find(|r| r.matches(text))
            .map(|r| &r.label)
            .unwrap_or(&self.fallback)
    }
}

/// Unordered "any of these substrings" test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn new(words: &[&str]) -> Self {
        Self(words.iter().map(|w| w.to_string()).collect())
    }

    pub fn any_in(&self, text: &str) -> bool {
        self.0.iter().any(|w| text.contains(w.as_str()))
    }
}
