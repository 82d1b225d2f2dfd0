//! Viewer state machine over `{ section, language }`.
//!
//! One explicit state object is constructed per page load from the URL and
//! lives as long as the page; every handler receives it rather than reaching
//! for ambient globals. Transitions return a [`RenderPlan`] describing, in
//! order, everything the page must apply: article HTML, breadcrumb, sidebar,
//! pagination, the canonical URL (applied via a history replace, never a
//! push), and a scroll reset.

use crate::content::embedded_document;
use crate::debounce::Debouncer;
use crate::error::GuideError;
use crate::markdown::to_html;
use crate::nav::{guide_title, next_section, previous_section, sections_in_order};
use crate::query::{parse_query, query_param};
use crate::search::{SEARCH_DEBOUNCE_MS, SearchIndex};
use crate::section::{GuideDocument, Language, SectionKey, parse_guide};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Local-storage key holding `"dark"` or `"light"`.
///
/// The theme is the only piece of state that outlives the page view.
pub const THEME_STORAGE_KEY: &str = "guide-theme";

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light mode, the default for first-time visitors.
    #[default]
    Light,
    /// Dark mode.
    Dark,
}

impl Theme {
    /// The value stored in local storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Interprets a stored value; anything unrecognized means the default.
    pub fn from_stored(stored: Option<&str>) -> Theme {
        match stored {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    /// The other theme.
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Seam over the page's key-value preference storage (local storage in the
/// browser, a map in tests).
pub trait PreferenceStore {
    /// Reads one stored value.
    fn get(&self, key: &str) -> Option<String>;
    /// Writes one value, last writer wins.
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory preference store for tests and headless embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefs(HashMap<String, String>);

impl PreferenceStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}

/// Viewer construction options. Parsed leniently; anything absent falls back
/// to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewerOptions {
    /// Section shown when the URL hash names none.
    #[serde(default, alias = "defaultSection")]
    pub default_section: Option<SectionKey>,
    /// Language used when the URL names none.
    #[serde(default, alias = "defaultLanguage")]
    pub default_language: Option<Language>,
    /// Override for the search input debounce delay.
    #[serde(default, alias = "searchDebounceMs")]
    pub search_debounce_ms: Option<u64>,
}

/// One sidebar entry as the page should render it.
#[derive(Debug, Clone, Serialize)]
pub struct NavItemView {
    /// Section this entry navigates to.
    pub key: SectionKey,
    /// Decorative icon.
    pub icon: &'static str,
    /// Localized title.
    pub title: &'static str,
    /// Whether this is the active section.
    pub active: bool,
}

/// Everything the page applies after a transition, in this order.
#[derive(Debug, Clone, Serialize)]
pub struct RenderPlan {
    /// Converted article HTML for the active section.
    pub html: String,
    /// Breadcrumb text, `guide title / section title`.
    pub breadcrumb: String,
    /// Sidebar entries with the active flag set.
    pub nav: Vec<NavItemView>,
    /// Pagination target, `None` disables the previous control.
    pub previous: Option<SectionKey>,
    /// Pagination target, `None` disables the next control.
    pub next: Option<SectionKey>,
    /// Canonical URL suffix (`?lang=..#section`), applied via history
    /// replace so no new entry and no reload happen.
    pub url: String,
    /// The content area scrolls back to the top on every transition.
    pub scroll_to_top: bool,
}

/// A transition result the page can apply without exception handling:
/// either a render plan or the fixed error panel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ViewOutcome {
    /// The section rendered.
    Rendered {
        /// The plan to apply.
        plan: RenderPlan,
    },
    /// The transition failed; show the panel in the content area.
    Failed {
        /// Localized message and retry label.
        panel: crate::error::ErrorPanel,
    },
}

/// The page-wide viewer state.
pub struct ViewState {
    language: Language,
    section: SectionKey,
    theme: Theme,
    documents: HashMap<Language, GuideDocument>,
    search: SearchIndex,
    search_debounce: Debouncer,
    prefs: Box<dyn PreferenceStore>,
}

impl ViewState {
    /// Builds the initial state from the page URL parts: `?lang=` from the
    /// query string and the section key from the hash, with defaults
    /// `scenarios`/`en`. The theme comes from the preference store.
    pub fn from_url(
        query: &str,
        hash: &str,
        prefs: Box<dyn PreferenceStore>,
        options: &ViewerOptions,
    ) -> Self {
        let pairs = parse_query(query);
        let language = query_param(&pairs, "lang")
            .and_then(Language::from_param)
            .or(options.default_language)
            .unwrap_or_default();
        let section = SectionKey::from_hash(hash)
            .or(options.default_section)
            .unwrap_or(SectionKey::Scenarios);
        let theme = Theme::from_stored(prefs.get(THEME_STORAGE_KEY).as_deref());
        Self {
            language,
            section,
            theme,
            documents: HashMap::new(),
            search: SearchIndex::new(),
            search_debounce: Debouncer::new(
                options.search_debounce_ms.unwrap_or(SEARCH_DEBOUNCE_MS),
            ),
            prefs,
        }
    }

    /// Current language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Current section.
    pub fn section(&self) -> SectionKey {
        self.section
    }

    /// Current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// The preference store backing theme persistence.
    pub fn prefs(&self) -> &dyn PreferenceStore {
        self.prefs.as_ref()
    }

    /// Parses and installs fetched markdown for one language. A document
    /// with no recognized sections is a load failure, surfaced the same way
    /// as a network error.
    ///
    /// Overlapping loads are not sequenced: the last installed document for
    /// a language wins, which is acceptable for idempotent content.
    pub fn load_markdown(&mut self, language: Language, raw: &str) -> Result<(), GuideError> {
        let document = parse_guide(raw);
        if document.is_empty() {
            return Err(GuideError::LoadFailed {
                language,
                reason: "no recognized sections in document".to_string(),
            });
        }
        self.install_document(language, document);
        Ok(())
    }

    /// Installs the compiled-in guide for both languages.
    pub fn load_embedded(&mut self) {
        for language in Language::ALL {
            self.install_document(language, embedded_document(language));
        }
    }

    /// Wraps a fetch failure reported by the embedding page.
    pub fn load_error(&self, reason: impl Into<String>) -> GuideError {
        GuideError::LoadFailed {
            language: self.language,
            reason: reason.into(),
        }
    }

    fn install_document(&mut self, language: Language, document: GuideDocument) {
        self.search.index_document(language, &document);
        self.documents.insert(language, document);
    }

    /// Transition: show `key` in the current language.
    ///
    /// On success the state moves to `key` and the returned plan carries the
    /// rendered HTML, breadcrumb, sidebar, pagination, and URL. On failure
    /// the state does not move.
    pub fn show_section(&mut self, key: SectionKey) -> Result<RenderPlan, GuideError> {
        let (html, title) = {
            let document =
                self.documents
                    .get(&self.language)
                    .ok_or_else(|| GuideError::LoadFailed {
                        language: self.language,
                        reason: "content not loaded".to_string(),
                    })?;
            let section = document
                .section(key)
                .ok_or(GuideError::MissingSection {
                    section: key,
                    language: self.language,
                })?;
            (to_html(&section.content), section.title.clone())
        };

        self.section = key;
        Ok(self.build_plan(html, &title))
    }

    /// Re-renders the current section, e.g. after a load completes.
    pub fn render_current(&mut self) -> Result<RenderPlan, GuideError> {
        self.show_section(self.section)
    }

    /// Like [`ViewState::show_section`] but absorbs the error into the fixed
    /// error panel, so the caller never has to handle an exception path.
    pub fn render_or_panel(&mut self, key: SectionKey) -> ViewOutcome {
        match self.show_section(key) {
            Ok(plan) => ViewOutcome::Rendered { plan },
            Err(err) => {
                log::warn!("section render failed: {err}");
                ViewOutcome::Failed { panel: err.panel() }
            }
        }
    }

    /// Transition: toggle `en`/`zh` and re-render the current section in the
    /// new language. The section key is kept; only labels and content change.
    pub fn switch_language(&mut self) -> Result<RenderPlan, GuideError> {
        self.language = self.language.toggled();
        self.render_current()
    }

    /// Transition: flip the theme and persist it under the fixed key.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.prefs.set(THEME_STORAGE_KEY, self.theme.as_str());
        self.theme
    }

    /// Sections of the current language matching `query`, capped at five.
    /// A blank query returns nothing and thereby clears highlighting.
    pub fn search(&self, query: &str) -> Vec<SectionKey> {
        self.search.query(self.language, query)
    }

    /// Records a keystroke in the search box at `now_ms`.
    pub fn note_search_input(&mut self, now_ms: u64) {
        self.search_debounce.note_event(now_ms);
    }

    /// True (once) when the debounced search should run at `now_ms`.
    pub fn search_due(&mut self, now_ms: u64) -> bool {
        self.search_debounce.fire_ready(now_ms)
    }

    /// The canonical URL suffix for the current state.
    pub fn page_url(&self) -> String {
        format!("?lang={}#{}", self.language, self.section)
    }

    fn build_plan(&self, html: String, title: &str) -> RenderPlan {
        let nav = sections_in_order(self.language)
            .into_iter()
            .map(|entry| NavItemView {
                key: entry.key,
                icon: entry.icon,
                title: entry.title,
                active: entry.key == self.section,
            })
            .collect();

        RenderPlan {
            html,
            breadcrumb: format!("{} / {}", guide_title(self.language), title),
            nav,
            previous: previous_section(self.section),
            next: next_section(self.section),
            url: self.page_url(),
            scroll_to_top: true,
        }
    }
}
