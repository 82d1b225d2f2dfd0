//! Guide document model: languages, the closed section key set, and the
//! heading-driven parser that splits one markdown document into sections.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 2] = [Language::En, Language::Zh];

    /// The `lang` query-parameter value for this language.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    /// Parses a `lang` query-parameter value. Unknown values are `None`.
    pub fn from_param(value: &str) -> Option<Language> {
        match value {
            "en" => Some(Language::En),
            "zh" => Some(Language::Zh),
            _ => None,
        }
    }

    /// The other supported language.
    pub fn toggled(self) -> Language {
        match self {
            Language::En => Language::Zh,
            Language::Zh => Language::En,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed, fixed set of section identifiers.
///
/// Order of [`SectionKey::ALL`] defines both sidebar order and
/// previous/next pagination order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    /// What the product is for.
    Scenarios,
    /// Supported service providers.
    Providers,
    /// Basic usage.
    Basic,
    /// Advanced features.
    Advanced,
    /// Privacy and security.
    Privacy,
    /// Subscription and billing.
    Subscription,
    /// Help and support.
    Support,
}

impl SectionKey {
    /// All section keys in navigation order.
    pub const ALL: [SectionKey; 7] = [
        SectionKey::Scenarios,
        SectionKey::Providers,
        SectionKey::Basic,
        SectionKey::Advanced,
        SectionKey::Privacy,
        SectionKey::Subscription,
        SectionKey::Support,
    ];

    /// The URL hash value for this section.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Scenarios => "scenarios",
            SectionKey::Providers => "providers",
            SectionKey::Basic => "basic",
            SectionKey::Advanced => "advanced",
            SectionKey::Privacy => "privacy",
            SectionKey::Subscription => "subscription",
            SectionKey::Support => "support",
        }
    }

    /// Parses a URL hash fragment, with or without the leading `#`.
    pub fn from_hash(hash: &str) -> Option<SectionKey> {
        let key = hash.strip_prefix('#').unwrap_or(hash);
        SectionKey::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKey::from_hash(s).ok_or(())
    }
}

/// One named slice of the guide: the heading text and the raw markdown for
/// that section only, including its own heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading text with the leading `##` marker stripped.
    pub title: String,
    /// Raw markdown for the section.
    pub content: String,
}

/// A parsed guide for one language: section key to section content.
///
/// A document need not contain all seven keys; a missing key is an error
/// state at display time, never a crash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideDocument {
    sections: HashMap<SectionKey, Section>,
}

impl GuideDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up one section.
    pub fn section(&self, key: SectionKey) -> Option<&Section> {
        self.sections.get(&key)
    }

    /// Whether the document holds content for `key`.
    pub fn contains(&self, key: SectionKey) -> bool {
        self.sections.contains_key(&key)
    }

    /// Number of populated sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the document holds no sections at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Inserts or replaces one section.
    pub fn insert(&mut self, key: SectionKey, section: Section) {
        self.sections.insert(key, section);
    }

    /// Populated keys in navigation order.
    pub fn keys(&self) -> impl Iterator<Item = SectionKey> + '_ {
        SectionKey::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

/// Heading trigger phrases, per key. A `##` heading containing any listed
/// phrase (either language) opens that section.
const TRIGGERS: [(SectionKey, [&str; 2]); 7] = [
    (SectionKey::Scenarios, ["Application Scenarios", "应用场景"]),
    (SectionKey::Providers, ["Supported Providers", "支持的服务商"]),
    (SectionKey::Basic, ["Basic Usage", "基础使用"]),
    (SectionKey::Advanced, ["Advanced Features", "高级功能"]),
    (SectionKey::Privacy, ["Privacy & Security", "隐私与安全"]),
    (
        SectionKey::Subscription,
        ["Subscription & Billing", "订阅与计费"],
    ),
    (SectionKey::Support, ["Help & Support", "帮助与支持"]),
];

/// Matches a line against the trigger table. Returns the section key and the
/// heading text (marker stripped) when the line opens a known section.
fn match_heading(line: &str) -> Option<(SectionKey, &str)> {
    let rest = line.strip_prefix("## ")?;
    // `###` and deeper stay inside the current section.
    if rest.starts_with('#') {
        return None;
    }
    let text = rest.trim();
    for (key, phrases) in TRIGGERS {
        if phrases.iter().any(|phrase| text.contains(phrase)) {
            return Some((key, text));
        }
    }
    None
}

/// Splits one raw markdown document into sections on recognized `##`
/// headings.
///
/// Lines before the first recognized heading are discarded. A `##` heading
/// whose text matches none of the seven trigger phrases does not open a
/// section; inside an open section it is kept as ordinary content. The last
/// open section is finalized at end of input. Re-encountering a key replaces
/// the earlier occurrence (last one wins).
pub fn parse_guide(raw: &str) -> GuideDocument {
    let mut document = GuideDocument::new();
    let mut open: Option<(SectionKey, Section)> = None;

    for line in raw.lines() {
        if let Some((key, title)) = match_heading(line) {
            if let Some((prev_key, section)) = open.take() {
                document.insert(prev_key, section);
            }
            open = Some((
                key,
                Section {
                    title: title.to_string(),
                    content: format!("{line}\n"),
                },
            ));
            continue;
        }

        match open.as_mut() {
            Some((_, section)) => {
                section.content.push_str(line);
                section.content.push('\n');
            }
            // Untracked prefix text: discarded until the first heading.
            None => {
                if line.starts_with("## ") {
                    log::debug!("skipping unrecognized guide heading: {line}");
                }
            }
        }
    }

    if let Some((key, section)) = open.take() {
        document.insert(key, section);
    }

    document
}
