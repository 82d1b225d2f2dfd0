//! URL query-string helpers shared by the viewer and the link propagator.
//!
//! Intentionally small: parse `?a=1&b=2` into pairs and encode components
//! the way `encodeURIComponent` does. No full URL parsing happens here; the
//! inputs are the page's own `location.search` and relative hrefs.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters percent-encoded in query components. Matches
/// `encodeURIComponent`: unreserved marks stay literal, everything else
/// (including `@`, `=`, `&`) is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// Percent-encodes one query component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Decodes one query component, treating `+` as a space. Invalid percent
/// sequences decode lossily rather than failing.
pub fn decode_component(value: &str) -> String {
    let plus_as_space = value.replace('+', " ");
    percent_decode_str(&plus_as_space)
        .decode_utf8_lossy()
        .into_owned()
}

/// Parses a query string (with or without the leading `?`) into ordered
/// key/value pairs. Empty segments are skipped; a segment without `=` is a
/// key with an empty value.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(segment), String::new()),
        })
        .collect()
}

/// First value for `name` among parsed pairs.
pub fn query_param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Appends `key=value` to `url`, choosing `?` or `&` based on whether the
/// URL already carries a query string. The value is encoded; the key is
/// expected to be a plain identifier.
pub fn append_pair(url: &mut String, key: &str, value: &str) {
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(key);
    url.push('=');
    url.push_str(&encode_component(value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_component("a@b.com"), "a%40b.com");
        assert_eq!(encode_component("hello world"), "hello%20world");
        assert_eq!(encode_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_component("plain-name_1.2~"), "plain-name_1.2~");
    }

    #[test]
    fn parse_round_trips_encoded_values() {
        let pairs = parse_query("?email=a%40b.com&plan=pro&empty");
        assert_eq!(query_param(&pairs, "email"), Some("a@b.com"));
        assert_eq!(query_param(&pairs, "plan"), Some("pro"));
        assert_eq!(query_param(&pairs, "empty"), Some(""));
        assert_eq!(query_param(&pairs, "missing"), None);
    }

    #[test]
    fn plus_decodes_as_space() {
        let pairs = parse_query("q=hello+there");
        assert_eq!(query_param(&pairs, "q"), Some("hello there"));
    }

    #[test]
    fn append_pair_picks_separator() {
        let mut bare = String::from("pricing.html");
        append_pair(&mut bare, "email", "a@b.com");
        assert_eq!(bare, "pricing.html?email=a%40b.com");

        let mut with_query = String::from("pricing.html?x=1");
        append_pair(&mut with_query, "email", "a@b.com");
        assert_eq!(with_query, "pricing.html?x=1&email=a%40b.com");
    }

    #[test]
    fn malformed_percent_sequences_do_not_fail() {
        let pairs = parse_query("k=%zz%");
        assert_eq!(pairs.len(), 1);
    }
}
