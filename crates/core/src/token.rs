//! Tokens, whitespace tokenization, and sentence spans
//!
//! A token is a word together with its surrounding whitespace: optional
//! leading whitespace (first token only, in practice), one non-whitespace
//! run, and the trailing whitespace up to the next word. Concatenating the
//! token texts of a sequence reconstructs the text they were split from.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A minimal text unit: word content plus trailing whitespace, and a
/// globally unique id. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub id: String,
}

impl Token {
    pub fn new(text: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            id: id.into(),
        }
    }
}

/// Concatenated text of a token sequence.
pub fn text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// The individual token texts.
pub fn texts(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text.clone()).collect()
}

/// Splits text on whitespace, preferring trailing whitespace.
///
/// Each produced piece is optional leading whitespace, one non-whitespace
/// run, and any trailing whitespace. Whitespace-only input produces nothing:
///
/// ```
/// use ladder_core::token::tokenize;
///
/// assert_eq!(tokenize("apa bepa cepa"), vec!["apa ", "bepa ", "cepa"]);
/// assert_eq!(tokenize("  apa bepa  "), vec!["  apa ", "bepa  "]);
/// assert!(tokenize("    ").is_empty());
/// ```
pub fn tokenize(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = s;
    loop {
        let Some(word_start) = rest.find(|c: char| !c.is_whitespace()) else {
            // only whitespace left: it belongs to no word
            break;
        };
        let after_ws = &rest[word_start..];
        let word_len = after_ws
            .find(char::is_whitespace)
            .unwrap_or(after_ws.len());
        let after_word = &after_ws[word_len..];
        let trail_len = after_word
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(after_word.len());
        let total = word_start + word_len + trail_len;
        out.push(rest[..total].to_string());
        rest = &rest[total..];
    }
    out
}

/// Attach ids `prefix + index` to a sequence of token texts.
pub fn identify(texts: &[String], prefix: &str) -> Vec<Token> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Token::new(t.clone(), format!("{prefix}{i}")))
        .collect()
}

/// Is this the text of a punctuation token? True iff the trimmed text is a
/// non-empty run of `.`, `!`, `?`.
pub fn is_punctuation(s: &str) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| matches!(c, '.' | '!' | '?'))
}

/// Nearest punctuation token at or before `i`.
pub fn prev_punctuation(tokens: &[String], i: usize) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .take(i.saturating_add(1).min(tokens.len()))
        .rev()
        .find(|(_, t)| is_punctuation(t))
        .map(|(j, _)| j)
}

/// Nearest punctuation token at or after `i`.
pub fn next_punctuation(tokens: &[String], i: usize) -> Option<usize> {
    (i..tokens.len()).find(|&j| is_punctuation(&tokens[j]))
}

/// An inclusive token-offset range on one side of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// The smallest span containing both spans.
    pub fn merge(self, other: Span) -> Span {
        Span {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }

    /// Inclusive membership on both ends.
    pub fn contains(self, i: usize) -> bool {
        self.begin <= i && i <= self.end
    }
}

/// The sentence around token offset `i`: from just past the previous
/// punctuation token up to and including the next one (or the last token).
/// Sentences so computed tile the sequence without gaps or overlaps.
pub fn sentence(tokens: &[String], i: usize) -> Span {
    let begin = if i == 0 {
        0
    } else {
        prev_punctuation(tokens, i - 1).map_or(0, |j| j + 1)
    };
    let end =
        next_punctuation(tokens, i).unwrap_or_else(|| tokens.len().saturating_sub(1));
    Span { begin, end }
}

/// A character offset resolved to a token and an offset within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAt {
    pub token: usize,
    pub offset: usize,
}

/// Locate the token containing a character offset by cumulative-length scan.
/// Offsets are in characters, not bytes.
pub fn token_at(texts: &[String], char_offset: usize) -> Result<TokenAt, CoreError> {
    let mut passed = 0;
    for (i, text) in texts.iter().enumerate() {
        let w = text.chars().count();
        passed += w;
        if passed > char_offset {
            return Ok(TokenAt {
                token: i,
                offset: char_offset + w - passed,
            });
        }
    }
    Err(CoreError::out_of_bounds(format!(
        "character offset {char_offset} beyond end of token stream (length {passed})"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("    "), Vec::<String>::new());
        assert_eq!(tokenize("apa bepa cepa"), vec!["apa ", "bepa ", "cepa"]);
        assert_eq!(tokenize("  apa bepa cepa"), vec!["  apa ", "bepa ", "cepa"]);
        assert_eq!(
            tokenize("  apa bepa cepa  "),
            vec!["  apa ", "bepa ", "cepa  "]
        );
    }

    #[test]
    fn test_tokenize_reconstructs() {
        let s = "  apa bepa\tcepa  ";
        assert_eq!(tokenize(s).concat(), s);
    }

    #[test]
    fn test_identify() {
        let toks = identify(&["apa".to_string(), "bepa".to_string()], "#");
        assert_eq!(
            toks,
            vec![Token::new("apa", "#0"), Token::new("bepa", "#1")]
        );
        assert_eq!(text(&toks), "apabepa");
    }

    #[test]
    fn test_is_punctuation() {
        assert!(is_punctuation(". "));
        assert!(is_punctuation("... "));
        assert!(is_punctuation(" !"));
        assert!(is_punctuation("!?"));
        assert!(!is_punctuation(", "));
        assert!(!is_punctuation("apa. "));
        assert!(!is_punctuation("?.., "));
        assert!(!is_punctuation("   "));
    }

    #[test]
    fn test_prev_next_punctuation() {
        let s = tokenize("apa bepa . Cepa depa");
        assert_eq!(prev_punctuation(&s, 1), None);
        assert_eq!(prev_punctuation(&s, 2), Some(2));
        assert_eq!(prev_punctuation(&s, 3), Some(2));
        assert_eq!(next_punctuation(&s, 1), Some(2));
        assert_eq!(next_punctuation(&s, 2), Some(2));
        assert_eq!(next_punctuation(&s, 3), None);
    }

    #[test]
    fn test_span_merge_contains() {
        assert_eq!(Span::new(1, 2).merge(Span::new(3, 4)), Span::new(1, 4));
        assert_eq!(Span::new(2, 4).merge(Span::new(1, 3)), Span::new(1, 4));
        assert!(!Span::new(1, 2).contains(0));
        assert!(Span::new(1, 2).contains(1));
        assert!(Span::new(1, 2).contains(2));
        assert!(!Span::new(1, 2).contains(3));
    }

    #[test]
    fn test_sentence() {
        let s = tokenize("apa bepa . Cepa depa . epa");
        assert_eq!(sentence(&s, 0), Span::new(0, 2));
        assert_eq!(sentence(&s, 1), Span::new(0, 2));
        assert_eq!(sentence(&s, 2), Span::new(0, 2));
        assert_eq!(sentence(&s, 3), Span::new(3, 5));
        assert_eq!(sentence(&s, 4), Span::new(3, 5));
        assert_eq!(sentence(&s, 5), Span::new(3, 5));
        assert_eq!(sentence(&s, 6), Span::new(6, 6));
    }

    #[test]
    fn test_sentences_tile_the_sequence() {
        let s = tokenize("a b . c ! d e f ? g");
        let mut covered = vec![false; s.len()];
        for i in 0..s.len() {
            let span = sentence(&s, i);
            for j in span.begin..=span.end {
                covered[j] = true;
            }
            // every index inside the span maps back to the same sentence
            assert_eq!(sentence(&s, span.begin), span);
            assert_eq!(sentence(&s, span.end), span);
        }
        assert!(covered.iter().all(|&c| c));
    }

    #[test]
    fn test_token_at() {
        let abc: Vec<String> = vec!["012".into(), "3456".into(), "789".into()];
        assert_eq!(token_at(&abc, 0).unwrap(), TokenAt { token: 0, offset: 0 });
        assert_eq!(token_at(&abc, 2).unwrap(), TokenAt { token: 0, offset: 2 });
        assert_eq!(token_at(&abc, 3).unwrap(), TokenAt { token: 1, offset: 0 });
        assert_eq!(token_at(&abc, 6).unwrap(), TokenAt { token: 1, offset: 3 });
        assert_eq!(token_at(&abc, 7).unwrap(), TokenAt { token: 2, offset: 0 });
        assert_eq!(token_at(&abc, 9).unwrap(), TokenAt { token: 2, offset: 2 });
        assert!(token_at(&abc, 10).is_err());
    }
}
