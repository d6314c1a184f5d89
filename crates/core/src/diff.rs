//! Renderable diff between the two sides of a graph
//!
//! The diff is a flat, position-ordered sequence of entries. Tokens whose
//! edge sits in one contiguous run collapse into a single `Edited` entry;
//! an edge whose tokens are split apart (a moved block) stays as separate
//! `Dragged`/`Dropped` entries at their original positions, which is what
//! lets a relocation render as drag-at-old-position / drop-at-new-position
//! instead of merging across the move.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::algorithm::{self, Change, TokenDiff};
use crate::graph::Graph;
use crate::token::Token;

/// One entry of a rendered diff. A closed set: renderers match on it
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit")]
pub enum DiffEntry {
    /// A 1:1-aligned token pair with identical text on both sides.
    Unchanged {
        source: Token,
        target: Token,
        id: String,
    },
    /// One edge whose tokens form a single contiguous run: both sides of
    /// the alignment unit, with per-token character diffs.
    Edited {
        source: Vec<Token>,
        target: Vec<Token>,
        id: String,
        source_diffs: Vec<TokenDiff>,
        target_diffs: Vec<TokenDiff>,
    },
    /// A source token of an edge rendered elsewhere.
    Dragged {
        source: Token,
        id: String,
        source_diff: TokenDiff,
    },
    /// A target token of an edge rendered elsewhere.
    Dropped {
        target: Token,
        id: String,
        target_diff: TokenDiff,
    },
    /// A source token owned by no edge.
    Deleted { source: Token },
    /// A target token owned by no edge.
    Inserted { target: Token },
}

impl DiffEntry {
    /// The edge id this entry belongs to, when it has one.
    pub fn edge_id(&self) -> Option<&str> {
        match self {
            DiffEntry::Unchanged { id, .. }
            | DiffEntry::Edited { id, .. }
            | DiffEntry::Dragged { id, .. }
            | DiffEntry::Dropped { id, .. } => Some(id),
            DiffEntry::Deleted { .. } | DiffEntry::Inserted { .. } => None,
        }
    }

    /// The source tokens this entry carries, in order.
    pub fn source_tokens(&self) -> Vec<&Token> {
        match self {
            DiffEntry::Unchanged { source, .. }
            | DiffEntry::Dragged { source, .. }
            | DiffEntry::Deleted { source } => vec![source],
            DiffEntry::Edited { source, .. } => source.iter().collect(),
            DiffEntry::Dropped { .. } | DiffEntry::Inserted { .. } => vec![],
        }
    }

    /// The target tokens this entry carries, in order.
    pub fn target_tokens(&self) -> Vec<&Token> {
        match self {
            DiffEntry::Unchanged { target, .. }
            | DiffEntry::Dropped { target, .. }
            | DiffEntry::Inserted { target } => vec![target],
            DiffEntry::Edited { target, .. } => target.iter().collect(),
            DiffEntry::Dragged { .. } | DiffEntry::Deleted { .. } => vec![],
        }
    }
}

/// Per-edge texts and character diffs, handed out FIFO as the flat diff is
/// emitted.
struct EdgeDiffs {
    source_diffs: HashMap<String, Vec<TokenDiff>>,
    target_diffs: HashMap<String, Vec<TokenDiff>>,
    next_source: HashMap<String, usize>,
    next_target: HashMap<String, usize>,
}

impl EdgeDiffs {
    fn new(g: &Graph) -> Self {
        let em = g.edge_map();
        let mut source_texts: HashMap<String, Vec<String>> = HashMap::new();
        for t in &g.source {
            if let Some(e) = em.get(t.id.as_str()) {
                source_texts
                    .entry(e.id.clone())
                    .or_default()
                    .push(t.text.clone());
            }
        }
        let mut target_texts: HashMap<String, Vec<String>> = HashMap::new();
        for t in &g.target {
            if let Some(e) = em.get(t.id.as_str()) {
                target_texts
                    .entry(e.id.clone())
                    .or_default()
                    .push(t.text.clone());
            }
        }

        let mut source_diffs = HashMap::new();
        let mut target_diffs = HashMap::new();
        for e in g.edges.values() {
            let sides = source_texts.get(&e.id);
            let tides = target_texts.get(&e.id);
            let target_concat = tides.map(|v| v.concat()).unwrap_or_default();
            let source_concat = sides.map(|v| v.concat()).unwrap_or_default();
            if let Some(parts) = sides {
                source_diffs.insert(
                    e.id.clone(),
                    algorithm::multi_char_diff(parts, &target_concat),
                );
            }
            if let Some(parts) = tides {
                let inverted = algorithm::multi_char_diff(parts, &source_concat)
                    .iter()
                    .map(|d| algorithm::invert(d))
                    .collect();
                target_diffs.insert(e.id.clone(), inverted);
            }
        }
        EdgeDiffs {
            source_diffs,
            target_diffs,
            next_source: HashMap::new(),
            next_target: HashMap::new(),
        }
    }

    fn next_source_diff(&mut self, edge_id: &str) -> TokenDiff {
        let i = self.next_source.entry(edge_id.to_string()).or_insert(0);
        let diff = self
            .source_diffs
            .get(edge_id)
            .and_then(|v| v.get(*i))
            .cloned()
            .unwrap_or_default();
        *i += 1;
        diff
    }

    fn next_target_diff(&mut self, edge_id: &str) -> TokenDiff {
        let i = self.next_target.entry(edge_id.to_string()).or_insert(0);
        let diff = self
            .target_diffs
            .get(edge_id)
            .and_then(|v| v.get(*i))
            .cloned()
            .unwrap_or_default();
        *i += 1;
        diff
    }
}

/// The flat diff, before contiguous edits are merged: one entry per token,
/// in diff order. The class key of a token is the id of its owning edge, so
/// "equal" means "same alignment unit", not "same text"; a token no edge
/// owns diffs under its own id and comes out as `Deleted`/`Inserted`.
pub fn calculate_raw_diff(g: &Graph) -> Vec<DiffEntry> {
    let em = g.edge_map();
    let class_key = |t: &Token| -> String {
        em.get(t.id.as_str())
            .map(|e| e.id.clone())
            .unwrap_or_else(|| t.id.clone())
    };
    let changes = algorithm::hdiff(&g.source, &g.target, class_key, class_key);

    let mut edge_diffs = EdgeDiffs::new(g);
    let mut out = Vec::with_capacity(changes.len() * 2);
    for change in changes {
        match change {
            Change::Constant { a, b } => {
                match (em.get(a.id.as_str()), em.get(b.id.as_str())) {
                    (Some(ea), Some(eb)) => {
                        out.push(DiffEntry::Dragged {
                            source: a.clone(),
                            id: ea.id.clone(),
                            source_diff: edge_diffs.next_source_diff(&ea.id),
                        });
                        out.push(DiffEntry::Dropped {
                            target: b.clone(),
                            id: eb.id.clone(),
                            target_diff: edge_diffs.next_target_diff(&eb.id),
                        });
                    }
                    // un-edged tokens never share a class key, so a
                    // Constant always has edges on both sides
                    _ => unreachable!("constant change between un-edged tokens"),
                }
            }
            Change::Deleted { a } => match em.get(a.id.as_str()) {
                Some(e) => out.push(DiffEntry::Dragged {
                    source: a.clone(),
                    id: e.id.clone(),
                    source_diff: edge_diffs.next_source_diff(&e.id),
                }),
                None => out.push(DiffEntry::Deleted { source: a.clone() }),
            },
            Change::Inserted { b } => match em.get(b.id.as_str()) {
                Some(e) => out.push(DiffEntry::Dropped {
                    target: b.clone(),
                    id: e.id.clone(),
                    target_diff: edge_diffs.next_target_diff(&e.id),
                }),
                None => out.push(DiffEntry::Inserted { target: b.clone() }),
            },
        }
    }
    out
}

fn contiguous(xs: &[usize]) -> bool {
    xs.windows(2).all(|w| w[0] + 1 == w[1])
}

/// Collapse every maximal contiguous run of one edge id into a single
/// `Edited` entry; entries of an edge split across the sequence stay where
/// they are.
pub fn merge_diff(raw: &[DiffEntry]) -> Vec<DiffEntry> {
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, d) in raw.iter().enumerate() {
        if let Some(id) = d.edge_id() {
            positions.entry(id).or_default().push(i);
        }
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let run_len = raw[i].edge_id().and_then(|id| {
            let m = &positions[id];
            contiguous(m).then_some(m.len())
        });
        match run_len {
            Some(len) => {
                let id = raw[i].edge_id().map(str::to_owned).unwrap_or_default();
                let mut source = Vec::new();
                let mut target = Vec::new();
                let mut source_diffs = Vec::new();
                let mut target_diffs = Vec::new();
                for d in &raw[i..i + len] {
                    match d {
                        DiffEntry::Dragged {
                            source: s,
                            source_diff,
                            ..
                        } => {
                            source.push(s.clone());
                            source_diffs.push(source_diff.clone());
                        }
                        DiffEntry::Dropped {
                            target: t,
                            target_diff,
                            ..
                        } => {
                            target.push(t.clone());
                            target_diffs.push(target_diff.clone());
                        }
                        other => out.push(other.clone()),
                    }
                }
                out.push(DiffEntry::Edited {
                    source,
                    target,
                    id,
                    source_diffs,
                    target_diffs,
                });
                i += len;
            }
            None => {
                out.push(raw[i].clone());
                i += 1;
            }
        }
    }
    out
}

/// Calculate the renderable diff of a graph.
///
/// ```
/// use ladder_core::{calculate_diff, Graph};
/// use ladder_core::diff::DiffEntry;
/// use ladder_core::edit::rearrange;
///
/// let g = rearrange(&Graph::init("apa bepa cepa "), 1, 2, 0).unwrap();
/// let d = calculate_diff(&g);
/// assert!(matches!(d[0], DiffEntry::Dragged { .. }));
/// assert!(matches!(d[1], DiffEntry::Edited { .. }));
/// assert!(matches!(d[2], DiffEntry::Edited { .. }));
/// assert!(matches!(d[3], DiffEntry::Dropped { .. }));
/// ```
pub fn calculate_diff(g: &Graph) -> Vec<DiffEntry> {
    merge_diff(&calculate_raw_diff(g))
}

/// Renderer convenience: rewrite every `Edited` holding exactly one token
/// with identical text on each side into `Unchanged`.
pub fn collapse_unchanged(diff: Vec<DiffEntry>) -> Vec<DiffEntry> {
    diff.into_iter()
        .map(|d| match d {
            DiffEntry::Edited {
                source, target, id, ..
            } if source.len() == 1 && target.len() == 1 && source[0].text == target[0].text => {
                DiffEntry::Unchanged {
                    source: source.into_iter().next().unwrap(),
                    target: target.into_iter().next().unwrap(),
                    id,
                }
            }
            other => other,
        })
        .collect()
}
