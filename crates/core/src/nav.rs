//! Sidebar/pagination navigation: the fixed section order with per-language
//! display titles and icons.

use crate::section::{Language, SectionKey};
use serde::Serialize;

/// One navigation entry, localized for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Section this entry navigates to.
    pub key: SectionKey,
    /// Decorative icon shown next to the title.
    pub icon: &'static str,
    /// Localized display title.
    pub title: &'static str,
}

fn icon(key: SectionKey) -> &'static str {
    match key {
        SectionKey::Scenarios => "💡",
        SectionKey::Providers => "🔌",
        SectionKey::Basic => "📘",
        SectionKey::Advanced => "🚀",
        SectionKey::Privacy => "🔒",
        SectionKey::Subscription => "💳",
        SectionKey::Support => "🛟",
    }
}

fn title(key: SectionKey, language: Language) -> &'static str {
    match (key, language) {
        (SectionKey::Scenarios, Language::En) => "Application Scenarios",
        (SectionKey::Scenarios, Language::Zh) => "应用场景",
        (SectionKey::Providers, Language::En) => "Supported Providers",
        (SectionKey::Providers, Language::Zh) => "支持的服务商",
        (SectionKey::Basic, Language::En) => "Basic Usage",
        (SectionKey::Basic, Language::Zh) => "基础使用",
        (SectionKey::Advanced, Language::En) => "Advanced Features",
        (SectionKey::Advanced, Language::Zh) => "高级功能",
        (SectionKey::Privacy, Language::En) => "Privacy & Security",
        (SectionKey::Privacy, Language::Zh) => "隐私与安全",
        (SectionKey::Subscription, Language::En) => "Subscription & Billing",
        (SectionKey::Subscription, Language::Zh) => "订阅与计费",
        (SectionKey::Support, Language::En) => "Help & Support",
        (SectionKey::Support, Language::Zh) => "帮助与支持",
    }
}

/// The fixed 7-entry navigation list for one language.
///
/// The order is the pagination order; it is identical for every call.
pub fn sections_in_order(language: Language) -> Vec<NavEntry> {
    SectionKey::ALL
        .into_iter()
        .map(|key| NavEntry {
            key,
            icon: icon(key),
            title: title(key, language),
        })
        .collect()
}

/// Localized title of the guide itself, used for breadcrumbs.
pub fn guide_title(language: Language) -> &'static str {
    match language {
        Language::En => "User Guide",
        Language::Zh => "用户指南",
    }
}

/// The entry after `key` in navigation order, if any.
pub fn next_section(key: SectionKey) -> Option<SectionKey> {
    let pos = SectionKey::ALL.iter().position(|k| *k == key)?;
    SectionKey::ALL.get(pos + 1).copied()
}

/// The entry before `key` in navigation order, if any.
pub fn previous_section(key: SectionKey) -> Option<SectionKey> {
    let pos = SectionKey::ALL.iter().position(|k| *k == key)?;
    pos.checked_sub(1).and_then(|p| SectionKey::ALL.get(p)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_stable_and_has_seven_entries() {
        for language in Language::ALL {
            let first = sections_in_order(language);
            let second = sections_in_order(language);
            assert_eq!(first.len(), 7);
            assert_eq!(first, second);
            let keys: Vec<_> = first.iter().map(|e| e.key).collect();
            assert_eq!(keys, SectionKey::ALL.to_vec());
        }
    }

    #[test]
    fn titles_follow_language() {
        let en = sections_in_order(Language::En);
        let zh = sections_in_order(Language::Zh);
        assert_eq!(en[0].title, "Application Scenarios");
        assert_eq!(zh[0].title, "应用场景");
        // Icons are language-independent.
        assert_eq!(en[0].icon, zh[0].icon);
    }

    #[test]
    fn pagination_stops_at_both_ends() {
        assert_eq!(previous_section(SectionKey::Scenarios), None);
        assert_eq!(next_section(SectionKey::Support), None);
        assert_eq!(next_section(SectionKey::Scenarios), Some(SectionKey::Providers));
        assert_eq!(previous_section(SectionKey::Support), Some(SectionKey::Subscription));
    }

    #[test]
    fn walking_next_visits_every_section_once() {
        let mut seen = vec![SectionKey::Scenarios];
        while let Some(next) = next_section(*seen.last().unwrap()) {
            seen.push(next);
        }
        assert_eq!(seen, SectionKey::ALL.to_vec());
    }
}
