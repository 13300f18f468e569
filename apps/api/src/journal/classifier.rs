//! Input Classifier — decides which journal sections are worth sending to the model.
//!
//! A section is trivial when its trimmed text is at most two characters long
//! (empty answers, a single emoji, "ok", "。"). Length is counted in Unicode
//! scalar values so that Japanese text counts one per character.

use serde::{Deserialize, Deserializer, Serialize};

/// Trimmed length a section needs to reach to be sent to the model.
pub const MIN_SUBSTANTIVE_CHARS: usize = 3;

/// The three fixed journal prompts, in display and prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Mood,
    WhatIDid,
    ThoughtsPlans,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Mood,
        SectionKind::WhatIDid,
        SectionKind::ThoughtsPlans,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Mood => "mood",
            SectionKind::WhatIDid => "what_i_did",
            SectionKind::ThoughtsPlans => "thoughts_plans",
        }
    }

    pub fn label_en(self) -> &'static str {
        match self {
            SectionKind::Mood => "Mood",
            SectionKind::WhatIDid => "What I did",
            SectionKind::ThoughtsPlans => "Thoughts & Plans",
        }
    }

    pub fn label_ja(self) -> &'static str {
        match self {
            SectionKind::Mood => "気分",
            SectionKind::WhatIDid => "今日やったこと",
            SectionKind::ThoughtsPlans => "考えたこと・これからのこと",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// One answered journal prompt, exactly as submitted by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSection {
    pub name: String,
    pub label_en: String,
    #[serde(default)]
    pub label_ja: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

/// The entry form sends `null` for untouched sections.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl JournalSection {
    pub fn new(kind: SectionKind, text: impl Into<String>) -> Self {
        Self {
            name: kind.name().to_string(),
            label_en: kind.label_en().to_string(),
            label_ja: kind.label_ja().to_string(),
            text: text.into(),
        }
    }

    pub fn is_substantive(&self) -> bool {
        is_substantive_text(&self.text)
    }
}

pub fn is_substantive_text(text: &str) -> bool {
    text.trim().chars().count() >= MIN_SUBSTANTIVE_CHARS
}

/// Returns the sections worth sending to the model, in their original order,
/// with surrounding whitespace trimmed. Trivial sections are omitted entirely.
pub fn classify_sections(sections: &[JournalSection]) -> Vec<JournalSection> {
    sections
        .iter()
        .filter(|s| s.is_substantive())
        .map(|s| JournalSection {
            text: s.text.trim().to_string(),
            ..s.clone()
        })
        .collect()
}

/// True iff at least one section has more than two characters of content.
pub fn has_substantive_content(sections: &[JournalSection]) -> bool {
    sections.iter().any(JournalSection::is_substantive)
}
