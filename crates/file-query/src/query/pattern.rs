//! Glob matching against file base names.
//!
//! Patterns follow `fnmatch(3)` without flags: `\` escapes the next
//! character, a `[` without a closing `]` is literal, `[^...]` negates like
//! `[!...]`, and `**` means the same as `*`. The text is rewritten into
//! `glob` syntax before compiling.

use std::fmt;

use glob::{MatchOptions, Pattern};

use crate::error::{FileQueryError, Result};

/// Base names are matched case-sensitively, and a leading `.` must be
/// spelled out in the pattern (`*` does not match `.hidden`).
const NAME_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A compiled shell-glob pattern (`*`, `?`, `[...]`, `[!...]`, `\` escapes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    raw: String,
    pattern: Pattern,
}

impl NamePattern {
    pub fn new(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(FileQueryError::QueryParse(
                "name pattern must not be empty".to_string(),
            ));
        }
        let translated = translate_fnmatch(raw);
        let pattern = Pattern::new(&translated).map_err(|error| {
            FileQueryError::QueryParse(format!("invalid name pattern {raw:?}: {error}"))
        })?;
        Ok(Self {
            raw: raw.to_string(),
            pattern,
        })
    }

    /// Returns the pattern text as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches_with(name, NAME_MATCH_OPTIONS)
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// fnmatch -> glob translation
// ---------------------------------------------------------------------------

fn translate_fnmatch(raw: &str) -> String {
    let chars = raw.chars().collect::<Vec<_>>();
    let mut translated = String::with_capacity(raw.len());
    let mut index = 0usize;

    while index < chars.len() {
        match chars[index] {
            '\\' => match chars.get(index + 1) {
                Some(&escaped) => {
                    push_literal(&mut translated, escaped);
                    index += 2;
                }
                None => {
                    translated.push('\\');
                    index += 1;
                }
            },
            '*' => {
                translated.push('*');
                while chars.get(index + 1) == Some(&'*') {
                    index += 1;
                }
                index += 1;
            }
            '[' => match bracket_class_end(&chars, index) {
                Some(end) => {
                    push_bracket_class(&mut translated, &chars[index + 1..end]);
                    index = end + 1;
                }
                None => {
                    push_literal(&mut translated, '[');
                    index += 1;
                }
            },
            other => {
                translated.push(other);
                index += 1;
            }
        }
    }

    translated
}

fn push_literal(translated: &mut String, ch: char) {
    let mut buffer = [0u8; 4];
    translated.push_str(&Pattern::escape(ch.encode_utf8(&mut buffer)));
}

/// Finds the `]` closing the class opened at `start`. A `]` right after
/// `[` or `[!` belongs to the class.
fn bracket_class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut index = start + 1;
    if matches!(chars.get(index), Some('!' | '^')) {
        index += 1;
    }
    if chars.get(index) == Some(&']') {
        index += 1;
    }
    while index < chars.len() {
        match chars[index] {
            '\\' => index += 2,
            ']' => return Some(index),
            _ => index += 1,
        }
    }
    None
}

fn push_bracket_class(translated: &mut String, body: &[char]) {
    translated.push('[');
    let mut index = 0usize;
    if matches!(body.first(), Some('!' | '^')) {
        translated.push('!');
        index = 1;
    }
    while index < body.len() {
        // Inside a class an escape just means the next character.
        if body[index] == '\\' && index + 1 < body.len() {
            index += 1;
        }
        translated.push(body[index]);
        index += 1;
    }
    translated.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_suffix() {
        let pattern = NamePattern::new("*.txt").unwrap();
        assert!(pattern.matches("foo.txt"));
        assert!(!pattern.matches("foo.txt.bak"));
        assert!(!pattern.matches("bar.log"));
    }

    #[test]
    fn question_mark_matches_single_char() {
        let pattern = NamePattern::new("a?c").unwrap();
        assert!(pattern.matches("abc"));
        assert!(!pattern.matches("ac"));
        assert!(!pattern.matches("abbc"));
    }

    #[test]
    fn bracket_classes() {
        let pattern = NamePattern::new("[ab]*.rs").unwrap();
        assert!(pattern.matches("alpha.rs"));
        assert!(pattern.matches("beta.rs"));
        assert!(!pattern.matches("gamma.rs"));

        let negated = NamePattern::new("[!ab]*.rs").unwrap();
        assert!(negated.matches("gamma.rs"));
        assert!(!negated.matches("alpha.rs"));

        let caret = NamePattern::new("[^ab]*.rs").unwrap();
        assert!(caret.matches("gamma.rs"));
        assert!(!caret.matches("beta.rs"));
    }

    #[test]
    fn backslash_escapes_wildcards() {
        let star = NamePattern::new("a\\*b").unwrap();
        assert!(star.matches("a*b"));
        assert!(!star.matches("aXb"));

        let question = NamePattern::new("what\\?").unwrap();
        assert!(question.matches("what?"));
        assert!(!question.matches("whats"));

        let bracket = NamePattern::new("\\[draft\\].md").unwrap();
        assert!(bracket.matches("[draft].md"));
        assert!(!bracket.matches("d.md"));

        let plain = NamePattern::new("\\a").unwrap();
        assert!(plain.matches("a"));
    }

    #[test]
    fn trailing_backslash_is_literal() {
        let pattern = NamePattern::new("odd\\").unwrap();
        assert!(pattern.matches("odd\\"));
    }

    #[test]
    fn escape_inside_class() {
        let pattern = NamePattern::new("[\\*x]").unwrap();
        assert!(pattern.matches("*"));
        assert!(pattern.matches("x"));
        assert!(!pattern.matches("\\"));
    }

    #[test]
    fn unmatched_bracket_is_literal() {
        let lone = NamePattern::new("[").unwrap();
        assert!(lone.matches("["));
        assert!(!lone.matches("a"));

        let open = NamePattern::new("[abc").unwrap();
        assert!(open.matches("[abc"));
        assert!(!open.matches("a"));
    }

    #[test]
    fn double_star_is_single_star() {
        let pattern = NamePattern::new("a**b").unwrap();
        assert!(pattern.matches("ab"));
        assert!(pattern.matches("axyzb"));
    }

    #[test]
    fn leading_dot_must_be_literal() {
        let star = NamePattern::new("*").unwrap();
        assert!(!star.matches(".hidden"));

        let dotted = NamePattern::new(".*").unwrap();
        assert!(dotted.matches(".hidden"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let pattern = NamePattern::new("*.TXT").unwrap();
        assert!(pattern.matches("A.TXT"));
        assert!(!pattern.matches("a.txt"));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let error = NamePattern::new("").unwrap_err();
        assert!(matches!(error, FileQueryError::QueryParse(_)));
    }

    #[test]
    fn display_keeps_raw_text() {
        let pattern = NamePattern::new("[!.]*.md").unwrap();
        assert_eq!(pattern.to_string(), "[!.]*.md");

        let escaped = NamePattern::new("a\\*b").unwrap();
        assert_eq!(escaped.as_str(), "a\\*b");
    }
}
