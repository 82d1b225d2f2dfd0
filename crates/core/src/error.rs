use crate::section::{Language, SectionKey};
use serde::Serialize;
use thiserror::Error;

/// Errors that surface as the viewer's error panel.
///
/// Nothing here is fatal to the page: every variant is recoverable by a
/// manual reload, and the markdown converter and URL builder never produce
/// errors at all (they degrade instead).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuideError {
    /// Guide content for a language failed to load or produced no sections.
    #[error("failed to load guide content for '{language}': {reason}")]
    LoadFailed {
        /// Language whose content was being loaded.
        language: Language,
        /// Short human-readable cause (network error, empty document, ...).
        reason: String,
    },
    /// A section key has no content in the loaded document.
    #[error("no content for section '{section}' in language '{language}'")]
    MissingSection {
        /// The requested section.
        section: SectionKey,
        /// Language whose document was consulted.
        language: Language,
    },
}

/// Fixed error panel shown in place of the article content.
///
/// Retries are always a manual re-trigger; the panel carries the label for
/// the reload action but never schedules one itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPanel {
    /// User-visible message, localized.
    pub message: String,
    /// Label for the manual reload action, localized.
    pub retry_label: String,
}

impl GuideError {
    /// The language the failing operation was working in.
    pub fn language(&self) -> Language {
        match self {
            GuideError::LoadFailed { language, .. } => *language,
            GuideError::MissingSection { language, .. } => *language,
        }
    }

    /// Builds the fixed, localized panel for this error.
    pub fn panel(&self) -> ErrorPanel {
        match self.language() {
            Language::En => ErrorPanel {
                message: "This section could not be loaded. Please reload the page and try again."
                    .to_string(),
                retry_label: "Reload".to_string(),
            },
            Language::Zh => ErrorPanel {
                message: "无法加载该部分内容，请刷新页面后重试。".to_string(),
                retry_label: "重新加载".to_string(),
            },
        }
    }
}
