#![deny(missing_docs)]
//! Guidekit core: guide section model, markdown-to-HTML conversion, search,
//! viewer state transitions, and attribution link propagation.

/// Compiled-in bilingual guide content.
pub mod content;
/// Clock-driven debounce bookkeeping.
pub mod debounce;
/// Core error types and the user-facing error panel.
pub mod error;
/// Attribution parameter extraction and link rewriting.
pub mod linkprop;
/// Markdown-to-HTML conversion pipeline.
pub mod markdown;
/// Navigation order, icons, and localized titles.
pub mod nav;
/// URL query-string helpers.
pub mod query;
/// Full-text section search.
pub mod search;
/// Guide document model and section parsing.
pub mod section;
/// Viewer state machine and render plans.
pub mod viewer;

pub use debounce::Debouncer;
pub use error::{ErrorPanel, GuideError};
pub use linkprop::{AttributionParams, LINK_DEBOUNCE_MS, LinkRewriter};
pub use markdown::{plain_text, to_html};
pub use nav::{NavEntry, next_section, previous_section, sections_in_order};
pub use search::{SEARCH_DEBOUNCE_MS, SearchIndex};
pub use section::{GuideDocument, Language, Section, SectionKey, parse_guide};
pub use viewer::{
    MemoryPrefs, NavItemView, PreferenceStore, RenderPlan, THEME_STORAGE_KEY, Theme, ViewOutcome,
    ViewState, ViewerOptions,
};
