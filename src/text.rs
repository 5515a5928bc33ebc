//! Word and character statistics for rich-text note bodies.
//!
//! Note content is HTML produced by the editor; tags never count.

const WORDS_PER_MINUTE: usize = 200;

/// Removes `<...>` tags, putting `replacement` in their place.
fn strip_tags(html: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        match rest[start..].find('>') {
            Some(end) => {
                out.push_str(&rest[..start]);
                out.push_str(replacement);
                rest = &rest[start + end + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Readable text of an HTML fragment with whitespace collapsed.
pub fn plain_text(html: &str) -> String {
    strip_tags(html, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Counts whitespace-separated tokens containing at least one letter or digit.
pub fn word_count(html: &str) -> usize {
    strip_tags(html, " ")
        .split_whitespace()
        .filter(|word| word.chars().any(|c| c.is_ascii_alphanumeric()))
        .count()
}

/// Counts visible characters, tags excluded.
pub fn char_count(html: &str) -> usize {
    strip_tags(html, "").chars().count()
}

/// Estimated reading time at 200 words per minute.
pub fn reading_time(html: &str) -> String {
    let minutes = word_count(html).div_ceil(WORDS_PER_MINUTE);
    match minutes {
        0 => "Less than 1 min".to_string(),
        1 => "1 min".to_string(),
        n => format!("{n} mins"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ignore_markup() {
        let html = "<p>milk, eggs</p>";
        assert_eq!(word_count(html), 2);
        assert_eq!(char_count(html), 10);
        assert_eq!(plain_text(html), "milk, eggs");
    }

    #[test]
    fn adjacent_tags_separate_words() {
        assert_eq!(word_count("<b>one</b><i>two</i>"), 2);
    }

    #[test]
    fn punctuation_only_tokens_are_not_words() {
        assert_eq!(word_count("a - b -- c"), 3);
    }

    #[test]
    fn empty_content() {
        assert_eq!(word_count(""), 0);
        assert_eq!(char_count(""), 0);
        assert_eq!(word_count(" "), 0);
        assert_eq!(reading_time(""), "Less than 1 min");
    }

    #[test]
    fn unclosed_tag_is_kept_as_text() {
        assert_eq!(char_count("a < b"), 5);
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time(&"word ".repeat(200)), "1 min");
        assert_eq!(reading_time(&"word ".repeat(201)), "2 mins");
    }
}
