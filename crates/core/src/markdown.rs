//! Markdown-to-HTML conversion as an ordered pipeline of pure stages.
//!
//! The converter covers the bounded subset used by the guide documents:
//! headings, bold/italic, links, inline and fenced code, pipe tables,
//! unordered and ordered lists (with one level of nesting), and raw HTML
//! passthrough. It is not a general markdown parser.
//!
//! Stage order is significant: headings run before emphasis so `#` prefixes
//! are consumed whole, bold runs before italic so `**` is never matched as
//! two italics, fenced code runs before inline code so backtick pairs inside
//! a fence never open an inline span, and block assembly runs last so it can
//! pass already-produced tags through untouched.
//!
//! Malformed constructs never fail: the converter under-renders and moves on.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*$").unwrap());
static H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^##[ \t]+(.+?)[ \t]*$").unwrap());
static H3: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^###[ \t]+(.+?)[ \t]*$").unwrap());
static H4: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^####[ \t]+(.+?)[ \t]*$").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static FENCED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*\d+\.[ \t]+(.+)$").unwrap());
static EMPTY_P: Lazy<Regex> = Lazy::new(|| Regex::new(r"<p>\s*</p>").unwrap());
static TAG_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r">[ \t]*\n\s*<").unwrap());

/// Converts one section's markdown into a displayable HTML fragment.
///
/// Pure function of its input; never fails. Worst case on malformed input is
/// visually incorrect but non-crashing output.
pub fn to_html(input: &str) -> String {
    let out = convert_headings(input);
    let out = convert_emphasis(&out);
    let out = convert_links(&out);
    let out = convert_code(&out);
    let out = convert_tables(&out);
    let out = assemble_blocks(&out);
    cleanup_html(&out)
}

/// Stage 1: line-anchored `#`..`####` prefixes, longest prefix first.
pub fn convert_headings(input: &str) -> String {
    let out = H4.replace_all(input, "<h4>$1</h4>");
    let out = H3.replace_all(&out, "<h3>$1</h3>");
    let out = H2.replace_all(&out, "<h2>$1</h2>");
    let out = H1.replace_all(&out, "<h1>$1</h1>");
    out.into_owned()
}

/// Stage 2: bold before italic, so `**` never converts as two italics.
pub fn convert_emphasis(input: &str) -> String {
    let out = BOLD.replace_all(input, "<strong>$1</strong>");
    ITALIC.replace_all(&out, "<em>$1</em>").into_owned()
}

/// Stage 3: `[text](url)` to anchors opening in a new tab.
pub fn convert_links(input: &str) -> String {
    LINK.replace_all(input, r#"<a href="$2" target="_blank">$1</a>"#)
        .into_owned()
}

/// Stage 4: fenced code blocks, then inline code in the remaining gaps only,
/// so inline matching never fires inside a fence.
pub fn convert_code(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in FENCED.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&convert_inline_code(&input[last..whole.start()]));
        let body = caps.get(1).map_or("", |m| m.as_str()).trim_end_matches('\n');
        out.push_str("<pre><code>");
        out.push_str(&html_escape::encode_text(body));
        out.push_str("</code></pre>");
        last = whole.end();
    }
    out.push_str(&convert_inline_code(&input[last..]));
    out
}

fn convert_inline_code(input: &str) -> String {
    INLINE_CODE
        .replace_all(input, |caps: &Captures<'_>| {
            format!("<code>{}</code>", html_escape::encode_text(&caps[1]))
        })
        .into_owned()
}

/// Stage 5: GitHub-style pipe tables.
///
/// A run of contiguous `| ... |` lines whose second line is a separator row
/// becomes a table with the first row as header and the rest as body. A run
/// that does not qualify is left untouched (malformed table fallback).
pub fn convert_tables(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if !is_table_row(lines[i]) {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let mut end = i;
        while end < lines.len() && is_table_row(lines[end]) {
            end += 1;
        }

        if end - i >= 2 && is_separator_row(lines[i + 1]) {
            out.push(render_table(&lines[i..end]));
        } else {
            for line in &lines[i..end] {
                out.push(line.to_string());
            }
        }
        i = end;
    }

    out.join("\n")
}

fn is_table_row(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 2 && t.starts_with('|') && t.ends_with('|')
}

fn is_separator_row(line: &str) -> bool {
    is_table_row(line)
        && split_cells(line)
            .iter()
            .all(|cell| !cell.is_empty() && cell.chars().all(|c| matches!(c, '-' | ':')))
}

fn split_cells(line: &str) -> Vec<&str> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(str::trim)
        .collect()
}

/// Emits the whole table on one line so block assembly passes it through.
fn render_table(rows: &[&str]) -> String {
    let mut html = String::from("<table><thead><tr>");
    for cell in split_cells(rows[0]) {
        html.push_str("<th>");
        html.push_str(cell);
        html.push_str("</th>");
    }
    html.push_str("</tr></thead><tbody>");
    for row in &rows[2..] {
        html.push_str("<tr>");
        for cell in split_cells(row) {
            html.push_str("<td>");
            html.push_str(cell);
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

/// Stage 6: blank-line segmentation into paragraph, list, and raw blocks.
///
/// Lines already starting with `<` pass through unmodified, which preserves
/// the output of earlier stages and any literal HTML embedded in the source.
/// `<pre>` spans are kept whole across blank lines.
pub fn assemble_blocks(input: &str) -> String {
    let mut html: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut pre: Vec<&str> = Vec::new();
    let mut in_pre = false;

    for line in input.lines() {
        if in_pre {
            pre.push(line);
            if line.contains("</pre>") {
                html.push(pre.join("\n"));
                pre.clear();
                in_pre = false;
            }
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with("<pre") && !line.contains("</pre>") {
            if !current.is_empty() {
                html.push(render_block(&current));
                current.clear();
            }
            pre.push(line);
            in_pre = true;
            continue;
        }

        if trimmed.is_empty() {
            if !current.is_empty() {
                html.push(render_block(&current));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }

    if in_pre {
        // Unterminated pre: emit what we have rather than dropping it.
        html.push(pre.join("\n"));
    }
    if !current.is_empty() {
        html.push(render_block(&current));
    }

    html.join("\n")
}

fn render_block(lines: &[&str]) -> String {
    if ORDERED_ITEM.is_match(lines[0]) {
        return render_ordered(lines);
    }

    let has_list = lines.iter().any(|l| l.trim_start().starts_with("- "));
    let has_raw = lines.iter().any(|l| l.trim_start().starts_with('<'));
    if has_list || has_raw {
        return render_mixed(lines);
    }

    format!("<p>{}</p>", lines.join("\n").trim())
}

/// A block of unordered list items, possibly interleaved with raw lines and
/// plain paragraphs. The list closes before and reopens after non-list lines.
fn render_mixed(lines: &[&str]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut ul_open = false;

    for line in lines {
        let trimmed = line.trim_start();
        if let Some(item) = trimmed.strip_prefix("- ") {
            if !ul_open {
                parts.push("<ul>".to_string());
                ul_open = true;
            }
            parts.push(format!("<li>{}</li>", item.trim()));
        } else if trimmed.starts_with('<') {
            if ul_open {
                parts.push("</ul>".to_string());
                ul_open = false;
            }
            parts.push((*line).to_string());
        } else {
            if ul_open {
                parts.push("</ul>".to_string());
                ul_open = false;
            }
            parts.push(format!("<p>{}</p>", trimmed.trim_end()));
        }
    }

    if ul_open {
        parts.push("</ul>".to_string());
    }
    parts.join("\n")
}

/// A block opened by a `N. ` line. Each numbered line opens a new `<li>`;
/// indented `- ` lines immediately after become a nested `<ul>` inside it,
/// closed on the next numbered item or non-list line. Stray text joins the
/// open item rather than escaping the list.
fn render_ordered(lines: &[&str]) -> String {
    let mut out = String::from("<ol>");
    let mut li_open = false;
    let mut ul_open = false;

    for line in lines {
        if let Some(caps) = ORDERED_ITEM.captures(line) {
            if ul_open {
                out.push_str("</ul>");
                ul_open = false;
            }
            if li_open {
                out.push_str("</li>");
            }
            out.push_str("<li>");
            out.push_str(caps.get(1).map_or("", |m| m.as_str()).trim_end());
            li_open = true;
        } else if let Some(item) = line.trim_start().strip_prefix("- ") {
            if !ul_open {
                out.push_str("<ul>");
                ul_open = true;
            }
            out.push_str("<li>");
            out.push_str(item.trim());
            out.push_str("</li>");
        } else {
            if ul_open {
                out.push_str("</ul>");
                ul_open = false;
            }
            if li_open {
                out.push(' ');
                out.push_str(line.trim());
            }
        }
    }

    if ul_open {
        out.push_str("</ul>");
    }
    if li_open {
        out.push_str("</li>");
    }
    out.push_str("</ol>");
    out
}

/// Stage 7: drops empty `<p></p>` artifacts and collapses redundant
/// whitespace between adjacent tags.
pub fn cleanup_html(input: &str) -> String {
    let out = EMPTY_P.replace_all(input, "");
    let out = TAG_GAP.replace_all(&out, ">\n<");
    out.trim().to_string()
}

/// Strips markdown markers for search indexing: link URLs, emphasis and code
/// markers, heading prefixes, fence lines, and table plumbing all go; the
/// visible text stays.
pub fn plain_text(input: &str) -> String {
    let no_links = LINK.replace_all(input, "$1");
    let mut out = String::with_capacity(no_links.len());

    for line in no_links.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || is_separator_row(trimmed) {
            continue;
        }
        let trimmed = trimmed.trim_start_matches('#').trim_start();
        for c in trimmed.chars() {
            match c {
                '*' | '`' => {}
                '|' => out.push(' '),
                _ => out.push(c),
            }
        }
        out.push(' ');
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_use_longest_prefix_first() {
        let out = convert_headings("# One\n## Two\n### Three\n#### Four\n");
        assert!(out.contains("<h1>One</h1>"));
        assert!(out.contains("<h2>Two</h2>"));
        assert!(out.contains("<h3>Three</h3>"));
        assert!(out.contains("<h4>Four</h4>"));
        assert!(!out.contains("<h1>#"));
    }

    #[test]
    fn heading_without_space_is_left_alone() {
        assert_eq!(convert_headings("#nospace"), "#nospace");
    }

    #[test]
    fn bold_converts_before_italic() {
        let out = convert_emphasis("**bold** and *italic*");
        assert_eq!(out, "<strong>bold</strong> and <em>italic</em>");
    }

    #[test]
    fn double_star_never_becomes_two_italics() {
        let out = convert_emphasis("**x**");
        assert_eq!(out, "<strong>x</strong>");
    }

    #[test]
    fn links_open_in_new_tab() {
        let out = convert_links("[docs](https://example.com/docs)");
        assert_eq!(
            out,
            r#"<a href="https://example.com/docs" target="_blank">docs</a>"#
        );
    }

    #[test]
    fn fenced_code_is_escaped_and_shields_inline_backticks() {
        let out = convert_code("```\nlet a = `x` < 2;\n```\nand `tick`");
        assert!(out.contains("<pre><code>let a = `x` &lt; 2;</code></pre>"));
        assert!(out.contains("<code>tick</code>"));
        // The pair inside the fence must not have become an inline span.
        assert!(!out.contains("<code>x</code>"));
    }

    #[test]
    fn unterminated_fence_degrades_to_text() {
        let out = convert_code("```\nnever closed");
        assert!(!out.contains("<pre>"));
        assert!(out.contains("never closed"));
    }

    #[test]
    fn table_converts_header_and_body() {
        let out = convert_tables("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(out.contains("<th>A</th><th>B</th>"));
        assert!(out.contains("<td>1</td><td>2</td>"));
        assert_eq!(out.matches("<tr>").count(), 2);
    }

    #[test]
    fn table_without_separator_is_left_as_text() {
        let out = convert_tables("| A | B |\n| 1 | 2 |");
        assert!(!out.contains("<table>"));
        assert!(out.contains("| A | B |"));
    }

    #[test]
    fn single_table_row_is_left_as_text() {
        let out = convert_tables("| lonely |");
        assert!(!out.contains("<table>"));
    }

    #[test]
    fn separator_row_accepts_alignment_colons() {
        assert!(is_separator_row("|:---|---:|"));
        assert!(!is_separator_row("| a |---|"));
    }

    #[test]
    fn blocks_pass_raw_html_through() {
        let out = assemble_blocks("<h2>Title</h2>\n\n<div>embedded</div>");
        assert_eq!(out, "<h2>Title</h2>\n<div>embedded</div>");
    }

    #[test]
    fn list_block_closes_around_plain_lines() {
        let out = assemble_blocks("- one\nplain\n- two");
        assert_eq!(
            out,
            "<ul>\n<li>one</li>\n</ul>\n<p>plain</p>\n<ul>\n<li>two</li>\n</ul>"
        );
    }

    #[test]
    fn ordered_list_nests_indented_dashes() {
        let out = assemble_blocks("1. first\n   - sub a\n   - sub b\n2. second");
        assert_eq!(
            out,
            "<ol><li>first<ul><li>sub a</li><li>sub b</li></ul></li><li>second</li></ol>"
        );
    }

    #[test]
    fn plain_block_becomes_one_paragraph() {
        let out = assemble_blocks("line one\nline two");
        assert_eq!(out, "<p>line one\nline two</p>");
    }

    #[test]
    fn pre_spans_survive_blank_lines() {
        let input = "<pre><code>a\n\nb</code></pre>";
        let out = assemble_blocks(input);
        assert_eq!(out, input);
    }

    #[test]
    fn cleanup_removes_empty_paragraphs() {
        let out = cleanup_html("<p></p>\n<h2>t</h2>\n<p>  </p>");
        assert!(!out.contains("<p>"));
        assert!(out.contains("<h2>t</h2>"));
    }

    #[test]
    fn heading_then_list_round_trip() {
        let out = to_html("## Title\n\n- a\n- b\n");
        let h2 = out.find("<h2>Title</h2>").expect("h2 present");
        let ul = out.find("<ul>").expect("ul present");
        assert!(h2 < ul);
        assert_eq!(out.matches("<li>").count(), 2);
        assert!(out.contains("<li>a</li>"));
        assert!(out.contains("<li>b</li>"));
        assert!(!out.contains("<p></p>"));
    }

    #[test]
    fn full_pipeline_table() {
        let out = to_html("| A | B |\n|---|---|\n| 1 | 2 |\n");
        assert!(out.contains("<table><thead><tr><th>A</th><th>B</th></tr></thead>"));
        assert!(out.contains("<tbody><tr><td>1</td><td>2</td></tr></tbody></table>"));
    }

    #[test]
    fn full_pipeline_mixed_section() {
        let input = "## Advanced Features\n\nUse **bold** moves and [the docs](https://example.com).\n\n```\ncargo run\n```\n";
        let out = to_html(input);
        assert!(out.contains("<h2>Advanced Features</h2>"));
        assert!(out.contains("<strong>bold</strong>"));
        assert!(out.contains(r#"<a href="https://example.com" target="_blank">the docs</a>"#));
        assert!(out.contains("<pre><code>cargo run</code></pre>"));
    }

    #[test]
    fn converter_never_fails_on_garbage() {
        for garbage in ["***", "[x](", "```", "| | |", "1.", "****a****"] {
            let out = to_html(garbage);
            // Whatever came out, it came out without panicking.
            assert!(out.len() <= garbage.len() + 64);
        }
    }

    #[test]
    fn plain_text_strips_markup_but_keeps_words() {
        let input = "## Supported Providers\n\n| Provider | Status |\n|---|---|\n| **Acme** | `ready` |\n\nSee [the list](https://example.com/list).";
        let out = plain_text(input);
        assert!(out.contains("Supported Providers"));
        assert!(out.contains("Acme"));
        assert!(out.contains("ready"));
        assert!(out.contains("the list"));
        assert!(!out.contains("**"));
        assert!(!out.contains("https://example.com"));
        assert!(!out.contains('|'));
    }
}
