//! Cross-page attribution parameter propagation.
//!
//! Marketing pages have no server session; identity and attribution context
//! ride along as query parameters instead. This module reads the six known
//! parameters from the current page's URL once and rewrites same-site
//! anchors so that navigating keeps the context. Everything here fails open:
//! any internal problem returns the input unchanged and logs.

use crate::debounce::Debouncer;
use crate::query::{append_pair, decode_component, parse_query, query_param};
use serde::{Deserialize, Serialize};

/// Trailing delay after an observed DOM mutation before links are re-walked.
pub const LINK_DEBOUNCE_MS: u64 = 100;

/// Query-string names of the six attribution parameters, in append order.
const WIRE_NAMES: [&str; 6] = ["email", "userName", "userSub", "source", "plan", "flowId"];

/// Same-site pages whose anchors receive propagated parameters.
pub const KNOWN_PAGES: [&str; 5] = [
    "index.html",
    "guide.html",
    "pricing.html",
    "download.html",
    "faq.html",
];

/// Snapshot of the six attribution parameters, read once at page load.
///
/// All fields are plain strings with no validation beyond presence.
/// Propagation of everything is gated on [`AttributionParams::has_user_info`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionParams {
    /// Signed-in user's email; the gate for all propagation.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default, alias = "userName")]
    pub user_name: String,
    /// Opaque subject identifier.
    #[serde(default, alias = "userSub")]
    pub user_sub: String,
    /// Acquisition source tag.
    #[serde(default)]
    pub source: String,
    /// Plan the user is on or considering.
    #[serde(default)]
    pub plan: String,
    /// Identifier of the flow that brought the user here.
    #[serde(default, alias = "flowId")]
    pub flow_id: String,
}

impl AttributionParams {
    /// Reads the six parameters from a query string; absent ones stay empty.
    pub fn from_query(query: &str) -> Self {
        let pairs = parse_query(query);
        let get = |name: &str| query_param(&pairs, name).unwrap_or_default().to_string();
        Self {
            email: get("email"),
            user_name: get("userName"),
            user_sub: get("userSub"),
            source: get("source"),
            plan: get("plan"),
            flow_id: get("flowId"),
        }
    }

    /// True iff `email` is present and non-blank. All link rewriting is
    /// gated on this, so anonymous visitors never get parameters appended.
    pub fn has_user_info(&self) -> bool {
        !self.email.trim().is_empty()
    }

    /// Merges explicit updates into the snapshot: non-empty fields of
    /// `updates` win, empty ones leave the current value alone.
    pub fn merge(&mut self, updates: &AttributionParams) {
        let take = |current: &mut String, update: &str| {
            if !update.trim().is_empty() {
                *current = update.to_string();
            }
        };
        take(&mut self.email, &updates.email);
        take(&mut self.user_name, &updates.user_name);
        take(&mut self.user_sub, &updates.user_sub);
        take(&mut self.source, &updates.source);
        take(&mut self.plan, &updates.plan);
        take(&mut self.flow_id, &updates.flow_id);
    }

    /// Present parameters as wire-name/value pairs, in a fixed order.
    fn present_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("email", self.email.as_str()),
            ("userName", self.user_name.as_str()),
            ("userSub", self.user_sub.as_str()),
            ("source", self.source.as_str()),
            ("plan", self.plan.as_str()),
            ("flowId", self.flow_id.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }

    /// Appends the present attribution parameters plus `extra` pairs to
    /// `base`, merging with `&` when the base already has a query string.
    ///
    /// With no user info and no extras the base comes back verbatim, so
    /// anonymous visitors' URLs stay clean. Never fails: any internal
    /// problem returns the base unchanged.
    pub fn build_url(&self, base: &str, extra: &[(String, String)]) -> String {
        match self.try_build_url(base, extra) {
            Some(url) => url,
            None => {
                log::warn!("link rewrite failed open for '{base}'");
                base.to_string()
            }
        }
    }

    fn try_build_url(&self, base: &str, extra: &[(String, String)]) -> Option<String> {
        if base.is_empty() {
            return None;
        }
        if !self.has_user_info() && extra.is_empty() {
            return Some(base.to_string());
        }

        let mut url = base.to_string();
        if self.has_user_info() {
            for (name, value) in self.present_pairs() {
                append_pair(&mut url, name, value);
            }
        }
        for (name, value) in extra {
            append_pair(&mut url, name, value);
        }
        Some(url)
    }
}

/// Keeps known same-site anchors carrying the current attribution snapshot.
///
/// The page wires this to its anchors and to a mutation-observer callback;
/// the rewriter owns only the decision logic and its debounce timer.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    params: AttributionParams,
    debounce: Debouncer,
}

impl LinkRewriter {
    /// Builds a rewriter from the page's query string.
    pub fn from_query(query: &str) -> Self {
        Self {
            params: AttributionParams::from_query(query),
            debounce: Debouncer::new(LINK_DEBOUNCE_MS),
        }
    }

    /// The current snapshot.
    pub fn params(&self) -> &AttributionParams {
        &self.params
    }

    /// Whether any rewriting will happen at all.
    pub fn has_user_info(&self) -> bool {
        self.params.has_user_info()
    }

    /// Merges explicit parameter updates; callers re-run their link walk
    /// afterwards.
    pub fn merge(&mut self, updates: &AttributionParams) {
        self.params.merge(updates);
    }

    /// Computes the replacement href for one anchor, or `None` when the
    /// anchor should be left alone: no user info, not a known page, or the
    /// rewrite would not change anything (avoids redundant DOM writes).
    ///
    /// Attribution pairs already present in the href are replaced, not
    /// duplicated, so re-walking the same anchors is a no-op.
    pub fn rewrite_href(&self, href: &str) -> Option<String> {
        if !self.params.has_user_info() {
            return None;
        }
        if !is_known_page(href) {
            return None;
        }

        let (without_fragment, fragment) = match href.split_once('#') {
            Some((head, tail)) => (head, Some(tail)),
            None => (href, None),
        };
        let (path, existing_query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };

        // Rebuild the base without stale attribution pairs. Other pairs are
        // carried through byte for byte so their encoding is untouched.
        let mut base = path.to_string();
        for segment in existing_query.split('&').filter(|s| !s.is_empty()) {
            let raw_key = segment.split_once('=').map_or(segment, |(key, _)| key);
            if !WIRE_NAMES.contains(&decode_component(raw_key).as_str()) {
                base.push(if base.contains('?') { '&' } else { '?' });
                base.push_str(segment);
            }
        }

        let mut updated = self.params.build_url(&base, &[]);
        if let Some(fragment) = fragment {
            updated.push('#');
            updated.push_str(fragment);
        }
        if updated == href { None } else { Some(updated) }
    }

    /// Records an observed DOM mutation at `now_ms`.
    pub fn note_mutation(&mut self, now_ms: u64) {
        self.debounce.note_event(now_ms);
    }

    /// True (once) when the debounced re-walk is due at `now_ms`.
    pub fn mutation_due(&mut self, now_ms: u64) -> bool {
        self.debounce.fire_ready(now_ms)
    }
}

/// Whether an href targets one of the known same-site pages. Absolute and
/// protocol-relative URLs are never same-site, whatever their filename; of
/// the rest, only the trailing path component counts, with query and
/// fragment ignored.
fn is_known_page(href: &str) -> bool {
    if href.starts_with("//") {
        return false;
    }
    let head = href.split(['/', '?', '#']).next().unwrap_or("");
    if head.contains(':') {
        return false;
    }
    let path = href.split(['?', '#']).next().unwrap_or("");
    let file = path.rsplit('/').next().unwrap_or("");
    KNOWN_PAGES.contains(&file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_defaults_absent_params_to_empty() {
        let params = AttributionParams::from_query("?email=a%40b.com&plan=pro");
        assert_eq!(params.email, "a@b.com");
        assert_eq!(params.plan, "pro");
        assert_eq!(params.user_name, "");
        assert!(params.has_user_info());
    }

    #[test]
    fn anonymous_base_comes_back_verbatim() {
        let params = AttributionParams::default();
        assert_eq!(params.build_url("pricing.html", &[]), "pricing.html");
        assert!(!params.has_user_info());
    }

    #[test]
    fn email_is_percent_encoded() {
        let params = AttributionParams {
            email: "a@b.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            params.build_url("pricing.html", &[]),
            "pricing.html?email=a%40b.com"
        );
    }

    #[test]
    fn existing_query_merges_with_ampersand() {
        let params = AttributionParams {
            email: "a@b.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            params.build_url("pricing.html?x=1", &[]),
            "pricing.html?x=1&email=a%40b.com"
        );
    }

    #[test]
    fn blank_email_gates_every_other_parameter() {
        let params = AttributionParams {
            email: "   ".to_string(),
            source: "ad-campaign".to_string(),
            plan: "pro".to_string(),
            ..Default::default()
        };
        assert!(!params.has_user_info());
        assert_eq!(params.build_url("faq.html", &[]), "faq.html");
    }

    #[test]
    fn extras_apply_even_without_user_info() {
        let params = AttributionParams::default();
        let extra = vec![("ref".to_string(), "footer".to_string())];
        assert_eq!(params.build_url("faq.html", &extra), "faq.html?ref=footer");
    }

    #[test]
    fn parameters_keep_a_fixed_order() {
        let params = AttributionParams {
            email: "a@b.com".to_string(),
            user_name: "Ada".to_string(),
            flow_id: "f1".to_string(),
            ..Default::default()
        };
        assert_eq!(
            params.build_url("index.html", &[]),
            "index.html?email=a%40b.com&userName=Ada&flowId=f1"
        );
    }

    #[test]
    fn empty_base_fails_open() {
        let params = AttributionParams {
            email: "a@b.com".to_string(),
            ..Default::default()
        };
        assert_eq!(params.build_url("", &[]), "");
    }

    #[test]
    fn merge_keeps_current_values_for_blank_updates() {
        let mut params = AttributionParams {
            email: "a@b.com".to_string(),
            plan: "free".to_string(),
            ..Default::default()
        };
        params.merge(&AttributionParams {
            plan: "pro".to_string(),
            ..Default::default()
        });
        assert_eq!(params.email, "a@b.com");
        assert_eq!(params.plan, "pro");
    }

    #[test]
    fn rewrite_targets_only_known_pages() {
        let rewriter = LinkRewriter::from_query("?email=a%40b.com");
        assert!(rewriter.rewrite_href("pricing.html").is_some());
        assert!(rewriter.rewrite_href("/site/pricing.html").is_some());
        assert!(rewriter.rewrite_href("https://elsewhere.example/").is_none());
        assert!(rewriter.rewrite_href("blog.html").is_none());
    }

    #[test]
    fn cross_origin_hrefs_never_receive_parameters() {
        let rewriter = LinkRewriter::from_query("?email=a%40b.com&userSub=u123");
        // A matching filename on another origin is still another origin.
        assert_eq!(
            rewriter.rewrite_href("https://partner.example/pricing.html"),
            None
        );
        assert_eq!(
            rewriter.rewrite_href("http://partner.example/guide.html"),
            None
        );
        assert_eq!(rewriter.rewrite_href("//partner.example/faq.html"), None);
    }

    #[test]
    fn rewrite_carries_existing_pairs_through_unchanged() {
        let rewriter = LinkRewriter::from_query("?email=a%40b.com");
        let updated = rewriter.rewrite_href("guide.html?a%2Fb=x+y").unwrap();
        assert_eq!(updated, "guide.html?a%2Fb=x+y&email=a%40b.com");
        // Stale attribution pairs are still replaced, not duplicated.
        assert_eq!(rewriter.rewrite_href(&updated), None);
    }

    #[test]
    fn rewrite_skips_no_op_updates() {
        let rewriter = LinkRewriter::from_query("?email=a%40b.com");
        let updated = rewriter.rewrite_href("pricing.html").unwrap();
        // Feeding the rewritten href back produces no further change.
        assert_eq!(rewriter.rewrite_href(&updated), None);
    }

    #[test]
    fn anonymous_rewriter_touches_nothing() {
        let rewriter = LinkRewriter::from_query("?source=ad");
        assert_eq!(rewriter.rewrite_href("pricing.html"), None);
    }

    #[test]
    fn mutation_debounce_coalesces_bursts() {
        let mut rewriter = LinkRewriter::from_query("?email=a%40b.com");
        rewriter.note_mutation(0);
        rewriter.note_mutation(50);
        assert!(!rewriter.mutation_due(100));
        assert!(rewriter.mutation_due(150));
        assert!(!rewriter.mutation_due(200));
    }

    #[test]
    fn known_page_matching_ignores_query_and_fragment() {
        assert!(is_known_page("guide.html?lang=zh#privacy"));
        assert!(is_known_page("./guide.html"));
        assert!(!is_known_page("guide.htm"));
        assert!(!is_known_page("https://partner.example/pricing.html"));
        assert!(!is_known_page("//partner.example/pricing.html"));
        assert!(!is_known_page("mailto:sales@partner.example"));
    }
}
