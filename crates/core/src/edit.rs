//! Pure rewrite operations on the target side of a graph
//!
//! Every operation here consumes a graph by reference and returns a new
//! graph value. The source sequence is never touched; edits splice target
//! tokens and fold every edge they touch into one merged edge, carrying the
//! labels along.

use std::collections::{BTreeMap, HashSet};

use crate::error::CoreError;
use crate::graph::{Edge, Graph};
use crate::token::{self, Token};

/// The next free numeric id suffix: one past the largest decimal run found
/// in any of the given ids. Deterministic in the id set, so repeated edits
/// never collide.
///
/// ```
/// use ladder_core::edit::next_id;
///
/// assert_eq!(next_id([].into_iter()), 0);
/// assert_eq!(next_id(["t1", "t2", "t3"].into_iter()), 4);
/// assert_eq!(next_id(["u2v5k1", "b3", "a0"].into_iter()), 6);
/// assert_eq!(next_id(["77j66"].into_iter()), 78);
/// ```
pub fn next_id<'a>(ids: impl Iterator<Item = &'a str>) -> usize {
    let mut max: Option<usize> = None;
    for id in ids {
        for run in id.split(|c: char| !c.is_ascii_digit()) {
            if run.is_empty() {
                continue;
            }
            if let Ok(n) = run.parse::<usize>() {
                max = Some(max.map_or(n, |m| m.max(n)));
            }
        }
    }
    max.map_or(0, |m| m + 1)
}

/// Replace the characters `[from, to)` of the target text, merging every
/// edge the edit touches.
///
/// Character offsets are resolved to the touched tokens by cumulative-length
/// scan; the untouched prefix of the first touched token and suffix of the
/// last are kept, and the rest is handed to [`modify_tokens`].
pub fn modify(g: &Graph, from: usize, to: usize, text: &str) -> Result<Graph, CoreError> {
    if from > to {
        return Err(CoreError::out_of_bounds(format!(
            "modify range {from}..{to} is inverted"
        )));
    }
    let texts = g.target_texts();
    let from_at = token::token_at(&texts, from)?;
    let to_at = token::token_at(&texts, to)?;
    let pre: String = g.target[from_at.token]
        .text
        .chars()
        .take(from_at.offset)
        .collect();
    let post: String = g.target[to_at.token].text.chars().skip(to_at.offset).collect();
    modify_tokens(
        g,
        from_at.token,
        to_at.token + 1,
        &format!("{pre}{text}{post}"),
    )
}

/// Replace the target tokens `[from, to)` with the re-tokenization of
/// `text`, merging every edge the edit touches.
///
/// Two guards widen the edit before it is applied:
///
/// - whitespace-only replacement text cannot stand as a token of its own, so
///   the edit absorbs the preceding token, or failing that the following
///   one; replacing the whole target with whitespace drops the whitespace;
/// - replacement text that does not end in whitespace absorbs the following
///   token, so only the final token of the target may lack trailing
///   whitespace.
///
/// The fresh tokens get ids numbered past every id currently in the target.
/// Every edge touching a removed token is deleted, and one new edge is
/// formed from the fresh token ids, the surviving member ids of the deleted
/// edges, and the union of their labels.
pub fn modify_tokens(
    g: &Graph,
    from: usize,
    to: usize,
    text: &str,
) -> Result<Graph, CoreError> {
    if from > to || to > g.target.len() {
        return Err(CoreError::out_of_bounds(format!(
            "token range {from}..{to} in a target of {} tokens",
            g.target.len()
        )));
    }

    if !text.is_empty() && text.chars().all(char::is_whitespace) {
        // whitespace needs a word to attach to
        if from > 0 {
            let widened = format!("{}{}", g.target[from - 1].text, text);
            return modify_tokens(g, from - 1, to, &widened);
        } else if to < g.target.len() {
            let widened = format!("{}{}", text, g.target[to].text);
            return modify_tokens(g, from, to + 1, &widened);
        }
        tracing::warn!("whitespace-only replacement of the whole target; dropping it");
    }
    if text.chars().last().is_some_and(|c| !c.is_whitespace()) && to < g.target.len() {
        // keep the missing-trailing-whitespace shape for the last token only
        let widened = format!("{}{}", text, g.target[to].text);
        return modify_tokens(g, from, to + 1, &widened);
    }

    let id_offset = next_id(g.target.iter().map(|t| t.id.as_str()));
    let fresh: Vec<Token> = token::tokenize(text)
        .into_iter()
        .enumerate()
        .map(|(i, t)| Token::new(t, format!("t{}", id_offset + i)))
        .collect();

    let mut target = g.target.clone();
    let removed: Vec<Token> = target.splice(from..to, fresh.iter().cloned()).collect();
    let removed_ids: HashSet<&str> = removed.iter().map(|t| t.id.as_str()).collect();

    let mut merged_ids: Vec<String> = fresh.iter().map(|t| t.id.clone()).collect();
    let mut merged_labels: Vec<String> = Vec::new();
    let mut edges = BTreeMap::new();
    for (key, e) in &g.edges {
        if e.ids.iter().any(|id| removed_ids.contains(id.as_str())) {
            for id in &e.ids {
                if !removed_ids.contains(id.as_str()) && !merged_ids.contains(id) {
                    merged_ids.push(id.clone());
                }
            }
            for label in &e.labels {
                if !merged_labels.contains(label) {
                    merged_labels.push(label.clone());
                }
            }
        } else {
            edges.insert(key.clone(), e.clone());
        }
    }
    if !merged_ids.is_empty() {
        let e = Edge::new(merged_ids, merged_labels);
        edges.insert(e.id.clone(), e);
    }

    Ok(Graph {
        source: g.source.clone(),
        target,
        edges,
    })
}

/// Move the inclusive target-token block `[begin, end]` so it starts at
/// `dest`, expressed in the original indexing. Token identity and edges are
/// untouched; a destination inside the block leaves the order unchanged.
pub fn rearrange(
    g: &Graph,
    begin: usize,
    end: usize,
    dest: usize,
) -> Result<Graph, CoreError> {
    if begin > end || end >= g.target.len() || dest > g.target.len() {
        return Err(CoreError::out_of_bounds(format!(
            "rearrange of [{begin}, {end}] to {dest} in a target of {} tokens",
            g.target.len()
        )));
    }
    Ok(Graph {
        target: rearrange_block(&g.target, begin, end, dest),
        ..g.clone()
    })
}

fn rearrange_block<T: Clone>(xs: &[T], begin: usize, end: usize, dest: usize) -> Vec<T> {
    let block = &xs[begin..=end];
    let mut rest: Vec<T> = xs[..begin].to_vec();
    rest.extend_from_slice(&xs[end + 1..]);
    let mut dest = dest;
    if dest > begin {
        dest -= end - begin;
    }
    let dest = dest.min(rest.len());
    let mut out = rest[..dest].to_vec();
    out.extend_from_slice(block);
    out.extend_from_slice(&rest[dest..]);
    out
}
