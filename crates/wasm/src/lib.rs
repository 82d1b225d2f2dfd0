//! Browser bindings for the guide viewer and the link propagator.
//!
//! The DOM, `fetch`, `localStorage`, timers, and the mutation observer stay
//! in the embedding page script; this layer exchanges strings and
//! serde-serialized plans with it. Both objects are constructed once per
//! page load from `location.search`/`location.hash` and live for the page.

use guidekit_core::{
    AttributionParams, Language, LinkRewriter, MemoryPrefs, PreferenceStore, SectionKey,
    THEME_STORAGE_KEY, ViewOutcome, ViewState, ViewerOptions,
};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

// ============================================================================
// Options
// ============================================================================

fn parse_options(config: JsValue) -> ViewerOptions {
    if config.is_undefined() || config.is_null() {
        return ViewerOptions::default();
    }
    serde_wasm_bindgen::from_value(config).unwrap_or_default()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("serialization error: {e}")))
}

// ============================================================================
// Guide viewer
// ============================================================================

/// The page-wide guide viewer.
///
/// Construct it from the page URL parts, load content (fetched markdown or
/// the embedded guide), then drive it from event handlers. Transition
/// methods return a plan object the page applies to the DOM: `html`,
/// `breadcrumb`, `nav`, `previous`/`next`, `url` (for a history replace),
/// and `scroll_to_top`. On failure the same object carries the error panel
/// instead; nothing here throws on user actions.
#[wasm_bindgen]
pub struct GuideViewer {
    state: ViewState,
}

#[wasm_bindgen]
impl GuideViewer {
    /// Builds the viewer from `location.search`, `location.hash`, the theme
    /// value previously persisted to local storage (if any), and an optional
    /// options object. Malformed options fall back to defaults rather than
    /// throwing.
    #[wasm_bindgen(constructor)]
    pub fn new(search: &str, hash: &str, stored_theme: Option<String>, config: JsValue) -> Self {
        let options = parse_options(config);
        let mut prefs = MemoryPrefs::default();
        if let Some(theme) = stored_theme {
            prefs.set(THEME_STORAGE_KEY, &theme);
        }
        Self {
            state: ViewState::from_url(search, hash, Box::new(prefs), &options),
        }
    }

    /// Installs fetched markdown for one language (`"en"` or `"zh"`).
    /// Errors here feed the page's error panel via `render_current`.
    pub fn load_markdown(&mut self, lang: &str, source: &str) -> Result<(), JsError> {
        let language = Language::from_param(lang)
            .ok_or_else(|| JsError::new(&format!("unknown language: {lang}")))?;
        self.state
            .load_markdown(language, source)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Installs the compiled-in guide for both languages.
    pub fn load_embedded(&mut self) {
        self.state.load_embedded();
    }

    /// Shows a section. `key` must be one of the seven section keys; the
    /// navigation the viewer itself renders only ever supplies those.
    pub fn show_section(&mut self, key: &str) -> Result<JsValue, JsError> {
        let key = SectionKey::from_hash(key)
            .ok_or_else(|| JsError::new(&format!("unknown section key: {key}")))?;
        to_js(&self.state.render_or_panel(key))
    }

    /// Re-renders the current section, e.g. after content finishes loading.
    pub fn render_current(&mut self) -> Result<JsValue, JsError> {
        let current = self.state.section();
        to_js(&self.state.render_or_panel(current))
    }

    /// Toggles `en`/`zh` and re-renders the current section.
    pub fn switch_language(&mut self) -> Result<JsValue, JsError> {
        let outcome = match self.state.switch_language() {
            Ok(plan) => ViewOutcome::Rendered { plan },
            Err(err) => ViewOutcome::Failed { panel: err.panel() },
        };
        to_js(&outcome)
    }

    /// Flips the theme and returns the value the page should persist under
    /// [`theme_storage_key`].
    pub fn toggle_theme(&mut self) -> String {
        self.state.toggle_theme().as_str().to_string()
    }

    /// Current theme, `"light"` or `"dark"`.
    pub fn theme(&self) -> String {
        self.state.theme().as_str().to_string()
    }

    /// Current language parameter value.
    pub fn language(&self) -> String {
        self.state.language().as_str().to_string()
    }

    /// Current section key.
    pub fn section(&self) -> String {
        self.state.section().as_str().to_string()
    }

    /// Canonical URL suffix (`?lang=..#section`) for a history replace.
    pub fn page_url(&self) -> String {
        self.state.page_url()
    }

    /// Section keys of the current language matching `query` (at most 5),
    /// for sidebar highlighting. A blank query returns an empty array.
    pub fn search(&self, query: &str) -> Result<JsValue, JsError> {
        let keys: Vec<&str> = self
            .state
            .search(query)
            .into_iter()
            .map(SectionKey::as_str)
            .collect();
        to_js(&keys)
    }

    /// Records a search-box keystroke at `now_ms` (e.g. `performance.now()`).
    pub fn note_search_input(&mut self, now_ms: f64) {
        self.state.note_search_input(clamp_clock(now_ms));
    }

    /// True once the debounced search should run at `now_ms`.
    pub fn search_due(&mut self, now_ms: f64) -> bool {
        self.state.search_due(clamp_clock(now_ms))
    }
}

// ============================================================================
// Link propagator
// ============================================================================

/// Keeps same-site anchors carrying the attribution parameters found in the
/// page URL.
///
/// The page walks its anchors (once after load, and again when
/// `mutation_due` fires after observed DOM insertions) and applies
/// `rewrite_href` to each; `None` means leave the anchor alone.
#[wasm_bindgen]
pub struct LinkPropagator {
    rewriter: LinkRewriter,
}

#[wasm_bindgen]
impl LinkPropagator {
    /// Reads the attribution snapshot from `location.search`.
    #[wasm_bindgen(constructor)]
    pub fn new(search: &str) -> Self {
        Self {
            rewriter: LinkRewriter::from_query(search),
        }
    }

    /// Whether any rewriting will happen at all (non-blank email present).
    pub fn has_user_info(&self) -> bool {
        self.rewriter.has_user_info()
    }

    /// Appends the present attribution parameters to `base`. Fail-open:
    /// always returns a usable URL, at worst `base` unchanged.
    pub fn build_url(&self, base: &str) -> String {
        self.rewriter.params().build_url(base, &[])
    }

    /// Replacement href for one anchor, or `undefined` to skip the write.
    pub fn rewrite_href(&self, href: &str) -> Option<String> {
        self.rewriter.rewrite_href(href)
    }

    /// Merges explicit parameter updates (an object with any of `email`,
    /// `userName`, `userSub`, `source`, `plan`, `flowId`); the page re-walks
    /// its anchors afterwards. Malformed input is ignored.
    pub fn merge_params(&mut self, updates: JsValue) {
        let updates: AttributionParams =
            serde_wasm_bindgen::from_value(updates).unwrap_or_default();
        self.rewriter.merge(&updates);
    }

    /// Records an observed DOM mutation at `now_ms`.
    pub fn note_mutation(&mut self, now_ms: f64) {
        self.rewriter.note_mutation(clamp_clock(now_ms));
    }

    /// True once the debounced anchor re-walk is due at `now_ms`.
    pub fn mutation_due(&mut self, now_ms: f64) -> bool {
        self.rewriter.mutation_due(clamp_clock(now_ms))
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Converts a markdown fragment to HTML. Never throws; malformed input
/// under-renders.
#[wasm_bindgen]
pub fn render_markdown(input: &str) -> String {
    guidekit_core::to_html(input)
}

/// The local-storage key the page should persist the theme under.
#[wasm_bindgen]
pub fn theme_storage_key() -> String {
    THEME_STORAGE_KEY.to_string()
}

/// The same-site page names whose anchors are rewritten, as a JS array.
#[wasm_bindgen]
pub fn known_pages() -> js_sys::Array {
    guidekit_core::linkprop::KNOWN_PAGES
        .iter()
        .map(|page| JsValue::from_str(page))
        .collect()
}

fn clamp_clock(now_ms: f64) -> u64 {
    if now_ms.is_finite() && now_ms > 0.0 {
        now_ms as u64
    } else {
        0
    }
}
