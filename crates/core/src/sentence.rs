//! Sentence extraction on the target side of a graph
//!
//! A sentence starts as a punctuation-delimited span of target tokens and is
//! then grown edge-wise until it is closed under alignment: every edge that
//! touches the span has all of its target tokens inside it. The closed span,
//! together with the source tokens its edges reach, cuts a self-contained
//! subgraph out of the full graph.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::graph::{edge_record, Graph};
use crate::token::{self, Span, Token};

/// A source span and a target span forming one sentence unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subspans {
    pub source: Span,
    pub target: Span,
}

/// The punctuation-delimited sentence around target offset `i`, ignoring
/// edges entirely.
pub fn proto_target_sentence(g: &Graph, i: usize) -> Span {
    token::sentence(&g.target_texts(), i)
}

/// The sentence around target offset `i`, grown to a fixpoint: whenever an
/// edge inside the span also owns a target token outside it, that token's
/// own proto sentence is merged in and the scan restarts.
pub fn target_sentence(g: &Graph, i: usize) -> Result<Span, CoreError> {
    if i >= g.target.len() {
        return Err(CoreError::out_of_bounds(format!(
            "target offset {i} in a graph of {} target tokens",
            g.target.len()
        )));
    }
    let mut target = proto_target_sentence(g, i);
    let em = g.edge_map();
    let tm = g.target_map();
    loop {
        let mut stable = true;
        for k in target.begin..=target.end {
            let Some(edge) = em.get(g.target[k].id.as_str()) else {
                continue;
            };
            for id in &edge.ids {
                if let Some(&j) = tm.get(id.as_str()) {
                    if !target.contains(j) {
                        target = target.merge(proto_target_sentence(g, j));
                        stable = false;
                    }
                }
            }
        }
        if stable {
            return Ok(target);
        }
    }
}

/// The sentence around target offset `i`, with the source tokens reached by
/// its edges.
///
/// When no edge in the span touches the source side at all, the source span
/// comes back inverted (`begin > end`, for a source of two or more tokens)
/// and denotes the empty slice.
///
/// ```
/// use ladder_core::sentence::sentence;
/// use ladder_core::token::Span;
/// use ladder_core::Graph;
///
/// let g = Graph::init("apa bepa . Cepa depa . epa");
/// let s = sentence(&g, 1).unwrap();
/// assert_eq!(s.source, Span::new(0, 2));
/// assert_eq!(s.target, Span::new(0, 2));
/// ```
pub fn sentence(g: &Graph, i: usize) -> Result<Subspans, CoreError> {
    let target = target_sentence(g, i)?;
    let em = g.edge_map();
    let sm = g.source_map();
    let mut source = Span::new(g.source.len().saturating_sub(1), 0);
    for k in target.begin..=target.end {
        let Some(edge) = em.get(g.target[k].id.as_str()) else {
            continue;
        };
        for id in &edge.ids {
            if let Some(&j) = sm.get(id.as_str()) {
                source = source.merge(Span::new(j, j));
            }
        }
    }
    Ok(Subspans { source, target })
}

fn slice_tokens(tokens: &[Token], span: Span) -> Vec<Token> {
    tokens
        .get(span.begin..=span.end.min(tokens.len().saturating_sub(1)))
        .map(<[Token]>::to_vec)
        .unwrap_or_default()
}

/// Cut the subgraph covered by a pair of spans: the sliced token sequences
/// plus every edge touching at least one sliced token. Out-of-range and
/// inverted spans slice to nothing.
///
/// ```
/// use ladder_core::sentence::{sentence, subgraph};
/// use ladder_core::Graph;
///
/// let g = Graph::init("apa bepa . cepa depa . epa");
/// let s = sentence(&g, 3).unwrap();
/// assert_eq!(subgraph(&g, &s).target_text(), "cepa depa . ");
/// ```
pub fn subgraph(g: &Graph, s: &Subspans) -> Graph {
    let source = slice_tokens(&g.source, s.source);
    let target = slice_tokens(&g.target, s.target);
    let keep: HashSet<&str> = source
        .iter()
        .chain(target.iter())
        .map(|t| t.id.as_str())
        .collect();
    let edges = edge_record(
        g.edges
            .values()
            .filter(|e| e.ids.iter().any(|id| keep.contains(id.as_str())))
            .cloned(),
    );
    Graph {
        source,
        target,
        edges,
    }
}
