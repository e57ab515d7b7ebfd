//! Text helpers shared by the detector, the assessor and every pattern
//!
//! All functions are pure. Keyword lists are expected in lowercase and are
//! matched against lowercased text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on items in an injected section
pub const MAX_SECTION_ITEMS: usize = 12;

/// Lower bound on items in an injected section
pub const MIN_SECTION_ITEMS: usize = 3;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(```|~~~)").expect("valid regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").expect("valid regex"));
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([a-z]+_[a-z0-9_]+|[a-z]+[A-Z][A-Za-z0-9]*|[A-Za-z_][A-Za-z0-9_]*\(\)|[a-z_]+\.[a-z_]+\()",
    )
    .expect("valid regex")
});
static FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[\w\-/]+\.(rs|ts|tsx|js|jsx|py|go|java|rb|cs|cpp|c|h|json|ya?ml|toml|sql|md|html|css)\b")
        .expect("valid regex")
});
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+\S").expect("valid regex"));
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*([-*+]|\d+[.)]|- \[[ xX]\])\s+\S").expect("valid regex"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+(\.\d+)?\s*(%|ms|s|kb|mb|gb|px)?\b").expect("valid regex"));
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"\n]{2,}"|'[^'\n]{2,}'"#).expect("valid regex"));

// ==================== Words & Sentences ====================

/// Split text into whitespace-delimited words
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

pub fn word_count(text: &str) -> usize {
    words(text).count()
}

/// Split text into trimmed, non-empty sentences
///
/// Sentence boundaries are `.`, `!`, `?` followed by whitespace, and line
/// breaks. Code fences are not treated specially.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        let boundary = match b {
            b'\n' => true,
            b'.' | b'!' | b'?' => bytes.get(i + 1).map_or(true, |n| n.is_ascii_whitespace()),
            _ => false,
        };
        if boundary {
            let piece = text[start..=i].trim();
            if !piece.is_empty() && piece.chars().any(char::is_alphanumeric) {
                out.push(piece);
            }
            start = i + 1;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() && tail.chars().any(char::is_alphanumeric) {
        out.push(tail);
    }
    out
}

/// Average number of words per sentence (0.0 for empty text)
pub fn average_sentence_length(text: &str) -> f64 {
    let sentences = sentences(text);
    if sentences.is_empty() {
        return 0.0;
    }
    let total: usize = sentences.iter().map(|s| word_count(s)).sum();
    total as f64 / sentences.len() as f64
}

/// Share of repeated words among words longer than three characters
pub fn repetition_ratio(text: &str) -> f64 {
    use std::collections::HashSet;

    let lower = text.to_lowercase();
    let significant: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .collect();
    if significant.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = significant.iter().copied().collect();
    1.0 - unique.len() as f64 / significant.len() as f64
}

// ==================== Keyword Matching ====================

/// Whole-word (or whole-phrase) match of a lowercase term in lowercase text
pub fn contains_word(lower: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut from = 0;
    while let Some(pos) = lower[from..].find(term) {
        let begin = from + pos;
        let end = begin + term.len();
        let before_ok = lower[..begin].chars().next_back().map_or(true, |c| !is_word(c));
        let after_ok = lower[end..].chars().next().map_or(true, |c| !is_word(c));
        if before_ok && after_ok {
            return true;
        }
        from = begin + lower[begin..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// True when any of the terms occurs as a whole word or phrase
pub fn contains_any(lower: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| contains_word(lower, t))
}

/// Number of distinct terms that occur in the text
pub fn count_matches(lower: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|t| contains_word(lower, t)).count()
}

/// The terms that occur in the text, in table order
pub fn matched_terms<'a>(lower: &str, terms: &[&'a str]) -> Vec<&'a str> {
    terms.iter().copied().filter(|t| contains_word(lower, t)).collect()
}

/// First word of the text, lowercased and stripped of punctuation
pub fn leading_word(text: &str) -> Option<String> {
    words(text)
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
}

// ==================== Structure Detection ====================

pub fn has_code_fence(text: &str) -> bool {
    CODE_FENCE.is_match(text)
}

pub fn has_inline_code(text: &str) -> bool {
    INLINE_CODE.is_match(text)
}

/// Identifier shapes: snake_case, camelCase, `call()` or `mod.call(`
pub fn has_identifier(text: &str) -> bool {
    IDENTIFIER.is_match(text)
}

pub fn has_file_reference(text: &str) -> bool {
    FILE_NAME.is_match(text)
}

pub fn count_headings(text: &str) -> usize {
    HEADING.find_iter(text).count()
}

pub fn count_list_items(text: &str) -> usize {
    LIST_ITEM.find_iter(text).count()
}

pub fn count_numbers(text: &str) -> usize {
    NUMBER.find_iter(text).count()
}

pub fn count_quoted(text: &str) -> usize {
    QUOTED.find_iter(text).count()
}

/// Paragraphs separated by blank lines
pub fn count_paragraphs(text: &str) -> usize {
    text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}

/// True when the text already carries a markdown heading containing one of the terms
pub fn has_heading_about(text: &str, terms: &[&str]) -> bool {
    text.lines()
        .map(str::trim_start)
        .filter(|l| l.starts_with('#'))
        .any(|l| contains_any(&l.to_lowercase(), terms))
}

// ==================== Section Rendering ====================

/// How the items of an injected section are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Bullet,
    Numbered,
    Checkbox,
}

/// A delimited block appended to a prompt: heading plus a capped list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub items: Vec<String>,
    pub style: ListStyle,
}

impl Section {
    pub fn new(heading: &str, style: ListStyle) -> Self {
        Self {
            heading: heading.to_string(),
            items: Vec::new(),
            style,
        }
    }

    /// Add an item; items past the cap are dropped
    pub fn item(mut self, item: impl Into<String>) -> Self {
        if self.items.len() < MAX_SECTION_ITEMS {
            self.items.push(item.into());
        }
        self
    }

    pub fn items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self = self.item(item);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render as markdown
    pub fn render(&self) -> String {
        let mut out = format!("## {}\n", self.heading);
        for (i, item) in self.items.iter().enumerate() {
            let line = match self.style {
                ListStyle::Bullet => format!("- {}\n", item),
                ListStyle::Numbered => format!("{}. {}\n", i + 1, item),
                ListStyle::Checkbox => format!("- [ ] {}\n", item),
            };
            out.push_str(&line);
        }
        out
    }
}

/// Append a rendered section, keeping `text` as an unmodified prefix
pub fn append_section(text: &str, section: &Section) -> String {
    let rendered = section.render();
    if text.is_empty() {
        return rendered;
    }
    let separator = if text.ends_with("\n\n") {
        ""
    } else if text.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };
    format!("{}{}{}", text, separator, rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sentences() {
        let s = sentences("Build an API. It must be fast!\nAdd tests? v1.2 ships");
        assert_eq!(s, vec!["Build an API.", "It must be fast!", "Add tests?", "v1.2 ships"]);
    }

    #[test]
    fn test_sentences_empty() {
        assert!(sentences("").is_empty());
        assert!(sentences("  \n ... ").is_empty());
    }

    #[test]
    fn test_contains_word_boundaries() {
        assert!(contains_word("fix the bug", "bug"));
        assert!(!contains_word("debugging it", "bug"));
        assert!(contains_word("write a unit test.", "unit test"));
        assert!(!contains_word("latest", "test"));
        assert!(contains_word("test", "test"));
    }

    #[test]
    fn test_matched_terms_keeps_table_order() {
        let found = matched_terms("use redis and react", &["react", "vue", "redis"]);
        assert_eq!(found, vec!["react", "redis"]);
    }

    #[test]
    fn test_structure_detection() {
        let text = "# Title\n\n- one\n- two\n1. three\n- [ ] four\n";
        assert_eq!(count_headings(text), 1);
        assert_eq!(count_list_items(text), 4);
        assert!(has_heading_about(text, &["title"]));
    }

    #[test]
    fn test_code_detection() {
        assert!(has_code_fence("see\n```rust\nfn main() {}\n```"));
        assert!(has_inline_code("call `foo` now"));
        assert!(has_identifier("rename user_id"));
        assert!(has_identifier("the getUser helper"));
        assert!(has_identifier("call parse() twice"));
        assert!(has_file_reference("edit src/main.rs"));
        assert!(!has_identifier("create a login page"));
    }

    #[test]
    fn test_section_caps_items() {
        let section = Section::new("Many", ListStyle::Bullet).items((0..20).map(|i| i.to_string()));
        assert_eq!(section.len(), MAX_SECTION_ITEMS);
    }

    #[test]
    fn test_section_render_styles() {
        let section = Section::new("Checks", ListStyle::Checkbox).items(["a", "b"]);
        assert_eq!(section.render(), "## Checks\n- [ ] a\n- [ ] b\n");
        let section = Section::new("Steps", ListStyle::Numbered).items(["a", "b"]);
        assert_eq!(section.render(), "## Steps\n1. a\n2. b\n");
    }

    #[test]
    fn test_append_section_preserves_prefix() {
        let section = Section::new("X", ListStyle::Bullet).items(["a", "b", "c"]);
        for text in ["", "hello", "hello\n", "hello\n\n"] {
            let out = append_section(text, &section);
            assert!(out.starts_with(text));
            assert!(out.ends_with("- c\n"));
        }
        assert_eq!(append_section("hi", &section), "hi\n\n## X\n- a\n- b\n- c\n");
    }

    #[test]
    fn test_repetition_ratio() {
        assert_eq!(repetition_ratio(""), 0.0);
        assert!(repetition_ratio("data data data data") > 0.7);
        assert_eq!(repetition_ratio("alpha beta gamma delta"), 0.0);
    }
}
