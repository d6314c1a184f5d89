//! Generic sequence diffing
//!
//! `hdiff` diffs two sequences of *different* element types through a shared
//! class-key projection: elements compare equal exactly when their keys do.
//! Distinct keys are interned to integers in first-seen order (across the
//! first sequence, then the second) and a longest-common-subsequence diff
//! runs directly over the integer key sequences, so there is no ceiling on
//! the number of distinct keys. Original elements are then re-attached to
//! the key-level operations FIFO per key and per side: an `equal` only
//! certifies key equality, so positional correspondence within a key class
//! is what callers get to rely on.
//!
//! `char_diff` and `multi_char_diff` specialize this to character-level
//! diffs of token texts.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// One element-level change produced by [`hdiff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<A, B> {
    /// Present only in the first sequence.
    Deleted { a: A },
    /// Present in both sequences (equal class keys).
    Constant { a: A, b: B },
    /// Present only in the second sequence.
    Inserted { b: B },
}

/// Heterogeneous diff between `xs` and `ys` under class-key projections.
///
/// Empty inputs yield an empty diff; fully disjoint key sets yield all the
/// deletions followed by all the insertions.
pub fn hdiff<'a, 'b, A, B, K, FA, FB>(
    xs: &'a [A],
    ys: &'b [B],
    a_key: FA,
    b_key: FB,
) -> Vec<Change<&'a A, &'b B>>
where
    K: Eq + Hash,
    FA: Fn(&A) -> K,
    FB: Fn(&B) -> K,
{
    let mut symbols: HashMap<K, usize> = HashMap::new();
    let mut intern = |k: K| {
        let next = symbols.len();
        *symbols.entry(k).or_insert(next)
    };
    let a_syms: Vec<usize> = xs.iter().map(|a| intern(a_key(a))).collect();
    let b_syms: Vec<usize> = ys.iter().map(|b| intern(b_key(b))).collect();

    // FIFO queues of the original elements, per key and per side
    let mut a_from: HashMap<usize, VecDeque<&A>> = HashMap::new();
    for (sym, a) in a_syms.iter().zip(xs) {
        a_from.entry(*sym).or_default().push_back(a);
    }
    let mut b_from: HashMap<usize, VecDeque<&B>> = HashMap::new();
    for (sym, b) in b_syms.iter().zip(ys) {
        b_from.entry(*sym).or_default().push_back(b);
    }

    let mut out = Vec::with_capacity(xs.len().max(ys.len()));
    for op in key_operations(&a_syms, &b_syms) {
        match op {
            KeyOp::Delete(sym) => {
                if let Some(a) = a_from.get_mut(&sym).and_then(VecDeque::pop_front) {
                    out.push(Change::Deleted { a });
                }
            }
            KeyOp::Equal(sym) => {
                let a = a_from.get_mut(&sym).and_then(VecDeque::pop_front);
                let b = b_from.get_mut(&sym).and_then(VecDeque::pop_front);
                if let (Some(a), Some(b)) = (a, b) {
                    out.push(Change::Constant { a, b });
                }
            }
            KeyOp::Insert(sym) => {
                if let Some(b) = b_from.get_mut(&sym).and_then(VecDeque::pop_front) {
                    out.push(Change::Inserted { b });
                }
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOp {
    Delete(usize),
    Equal(usize),
    Insert(usize),
}

/// Key-level diff operations from an LCS over the interned key sequences.
fn key_operations(a: &[usize], b: &[usize]) -> Vec<KeyOp> {
    let lcs = longest_common_subsequence(a, b);
    let mut ops = Vec::with_capacity(a.len() + b.len());
    let mut ai = 0;
    let mut bi = 0;
    for &(la, lb) in &lcs {
        while ai < la {
            ops.push(KeyOp::Delete(a[ai]));
            ai += 1;
        }
        while bi < lb {
            ops.push(KeyOp::Insert(b[bi]));
            bi += 1;
        }
        ops.push(KeyOp::Equal(a[la]));
        ai += 1;
        bi += 1;
    }
    while ai < a.len() {
        ops.push(KeyOp::Delete(a[ai]));
        ai += 1;
    }
    while bi < b.len() {
        ops.push(KeyOp::Insert(b[bi]));
        bi += 1;
    }
    ops
}

fn longest_common_subsequence(a: &[usize], b: &[usize]) -> Vec<(usize, usize)> {
    let n = a.len();
    let m = b.len();
    if n == 0 || m == 0 {
        return vec![];
    }

    // DP table
    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            if a[i - 1] == b[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    // Backtrack to find LCS
    let mut lcs = Vec::new();
    let mut i = n;
    let mut j = m;
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            lcs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] > dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    lcs.reverse();
    lcs
}

/// One run of a character-level diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "text")]
pub enum CharOp {
    Delete(String),
    Equal(String),
    Insert(String),
}

impl CharOp {
    pub fn text(&self) -> &str {
        match self {
            CharOp::Delete(s) | CharOp::Equal(s) | CharOp::Insert(s) => s,
        }
    }

    fn same_kind(&self, other: &CharOp) -> bool {
        matches!(
            (self, other),
            (CharOp::Delete(_), CharOp::Delete(_))
                | (CharOp::Equal(_), CharOp::Equal(_))
                | (CharOp::Insert(_), CharOp::Insert(_))
        )
    }

    fn push_str(&mut self, s: &str) {
        match self {
            CharOp::Delete(t) | CharOp::Equal(t) | CharOp::Insert(t) => t.push_str(s),
        }
    }
}

/// A character-level diff of one token's text against the other side of its
/// edge, as a sequence of coalesced runs.
pub type TokenDiff = Vec<CharOp>;

/// Character-level diff of two strings, runs coalesced.
pub fn char_diff(a: &str, b: &str) -> TokenDiff {
    let ac: Vec<char> = a.chars().collect();
    let bc: Vec<char> = b.chars().collect();
    let mut out: TokenDiff = Vec::new();
    for change in hdiff(&ac, &bc, |c| *c, |c| *c) {
        let op = match change {
            Change::Deleted { a } => CharOp::Delete(a.to_string()),
            Change::Constant { a, .. } => CharOp::Equal(a.to_string()),
            Change::Inserted { b } => CharOp::Insert(b.to_string()),
        };
        match out.last_mut() {
            Some(last) if last.same_kind(&op) => last.push_str(op.text()),
            _ => out.push(op),
        }
    }
    out
}

/// Swap the direction of a character-level diff.
pub fn invert(diff: &[CharOp]) -> TokenDiff {
    diff.iter()
        .map(|op| match op {
            CharOp::Delete(s) => CharOp::Insert(s.clone()),
            CharOp::Equal(s) => CharOp::Equal(s.clone()),
            CharOp::Insert(s) => CharOp::Delete(s.clone()),
        })
        .collect()
}

/// Diff the concatenation of `parts` against `other`, then split the result
/// back at part boundaries so each part gets its own slice of the diff.
/// Inserted runs stay with the part that was open when they appeared.
pub fn multi_char_diff(parts: &[String], other: &str) -> Vec<TokenDiff> {
    let joined: String = parts.concat();
    let mut lengths: VecDeque<usize> = parts.iter().map(|p| p.chars().count()).collect();
    let mut out: Vec<TokenDiff> = vec![Vec::new()];
    for op in char_diff(&joined, other) {
        match op {
            CharOp::Insert(s) => {
                if let Some(cur) = out.last_mut() {
                    cur.push(CharOp::Insert(s));
                }
            }
            CharOp::Equal(s) => split_into_parts(&mut out, &mut lengths, s, CharOp::Equal),
            CharOp::Delete(s) => split_into_parts(&mut out, &mut lengths, s, CharOp::Delete),
        }
    }
    // a trailing part never reached by the scan still gets an entry
    while out.len() < parts.len() {
        out.push(Vec::new());
    }
    out
}

/// Feed an equal/delete run into the current part, starting a new part every
/// time the run crosses a part boundary.
fn split_into_parts(
    out: &mut Vec<TokenDiff>,
    lengths: &mut VecDeque<usize>,
    run: String,
    make: fn(String) -> CharOp,
) {
    let mut chars: VecDeque<char> = run.chars().collect();
    loop {
        let Some(&remaining) = lengths.front() else {
            if !chars.is_empty() {
                if let Some(cur) = out.last_mut() {
                    cur.push(make(chars.drain(..).collect()));
                }
            }
            return;
        };
        if chars.len() > remaining {
            lengths.pop_front();
            let head: String = chars.drain(..remaining).collect();
            if let Some(cur) = out.last_mut() {
                cur.push(make(head));
            }
            out.push(Vec::new());
        } else {
            if !chars.is_empty() {
                let taken = chars.len();
                if let Some(cur) = out.last_mut() {
                    cur.push(make(chars.drain(..).collect()));
                }
                if let Some(front) = lengths.front_mut() {
                    *front -= taken;
                }
            }
            return;
        }
    }
}
