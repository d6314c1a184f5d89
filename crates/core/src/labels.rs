//! Pipe-separated label list codec
//!
//! Label lists travel as a single string in a pipe-delimited shape: the
//! empty list is `|` and a non-empty list is `|a|b|`. Inside a label, `\`
//! escapes to `\b` and `|` to `\|`, so every label string round-trips.

use crate::error::CoreError;

/// Escape a label for embedding between pipes. Backslashes are rewritten
/// before pipes so the two escapes cannot collide.
pub fn escape_pipe(s: &str) -> String {
    s.replace('\\', "\\b").replace('|', "\\|")
}

/// Undo [`escape_pipe`] on a single already-isolated label.
pub fn unescape_pipe(s: &str) -> String {
    s.replace("\\|", "|").replace("\\b", "\\")
}

/// Encode a label list. The empty list is a lone `|`.
pub fn encode_labels(labels: &[String]) -> String {
    if labels.is_empty() {
        "|".to_string()
    } else {
        let escaped: Vec<String> = labels.iter().map(|l| escape_pipe(l)).collect();
        format!("|{}|", escaped.join("|"))
    }
}

fn malformed(input: &str, reason: &str) -> CoreError {
    CoreError::MalformedEncoding(format!("{reason} in pipe-separated list: {input:?}"))
}

/// Decode a pipe-separated label list.
///
/// Rejects input that does not start with `|`, ends inside a label, or
/// carries an escape other than `\b` and `\|`.
pub fn decode_labels(s: &str) -> Result<Vec<String>, CoreError> {
    let mut chars = s.chars();
    if chars.next() != Some('|') {
        return Err(malformed(s, "missing leading pipe"));
    }
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut closed = true;
    while let Some(c) = chars.next() {
        match c {
            '|' => {
                out.push(std::mem::take(&mut cur));
                closed = true;
                continue;
            }
            '\\' => match chars.next() {
                Some('|') => cur.push('|'),
                Some('b') => cur.push('\\'),
                Some(other) => return Err(malformed(s, &format!("unknown escape \\{other}"))),
                None => return Err(malformed(s, "dangling escape")),
            },
            other => cur.push(other),
        }
        closed = false;
    }
    if !closed {
        return Err(malformed(s, "unterminated label"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(labels: &[&str]) {
        let owned: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        assert_eq!(decode_labels(&encode_labels(&owned)).unwrap(), owned);
    }

    #[test]
    fn test_encode_shapes() {
        assert_eq!(encode_labels(&[]), "|");
        assert_eq!(encode_labels(&["a".into()]), "|a|");
        assert_eq!(encode_labels(&["a".into(), "b".into()]), "|a|b|");
        assert_eq!(encode_labels(&["".into()]), "||");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_pipe("a|b"), "a\\|b");
        assert_eq!(escape_pipe("a\\b"), "a\\bb");
        assert_eq!(unescape_pipe("a\\|b"), "a|b");
        assert_eq!(unescape_pipe("a\\bb"), "a\\b");
        assert_eq!(encode_labels(&["a|b".into()]), "|a\\|b|");
    }

    #[test]
    fn test_round_trips() {
        round_trip(&[]);
        round_trip(&[""]);
        round_trip(&["OBS!", "WO"]);
        round_trip(&["pipe | inside", "back \\ slash"]);
        round_trip(&["\\|", "|\\", "\\b"]);
        round_trip(&["", "", ""]);
    }

    #[test]
    fn test_decode_plain() {
        assert_eq!(decode_labels("|").unwrap(), Vec::<String>::new());
        assert_eq!(decode_labels("||").unwrap(), vec![""]);
        assert_eq!(decode_labels("|a|b|").unwrap(), vec!["a", "b"]);
        assert_eq!(decode_labels("|a\\|b|").unwrap(), vec!["a|b"]);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_labels("").is_err());
        assert!(decode_labels("a|b|").is_err());
        assert!(decode_labels("|a").is_err());
        assert!(decode_labels("|a\\").is_err());
        assert!(decode_labels("|a\\x|").is_err());
    }
}
