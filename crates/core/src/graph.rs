//! The alignment graph: source tokens, target tokens, and edges
//!
//! A graph is a parallel corpus snapshot: the `source` sequence is fixed at
//! construction, the `target` sequence is what editing rewrites, and each
//! edge groups token ids from either side into one alignment unit together
//! with free-text labels. Everything here is a value type; operations take a
//! graph by reference and hand back a new one.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::token::{self, Token};

/// One alignment unit: a set of token ids drawn from either side, plus
/// annotation labels. The `id` field is a pure projection of the sorted
/// member ids, recomputed on every construction, so identity can never
/// drift from content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub ids: Vec<String>,
    pub labels: Vec<String>,
}

impl Edge {
    /// Build an edge from member ids and labels. Member ids are sorted and
    /// deduplicated; the edge id is derived from them.
    pub fn new(ids: impl IntoIterator<Item = String>, labels: Vec<String>) -> Self {
        let mut ids: Vec<String> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        let id = derive_edge_id(&ids);
        Edge { id, ids, labels }
    }
}

/// The derived id of an edge with these (sorted) member ids.
pub fn derive_edge_id(sorted_ids: &[String]) -> String {
    format!("e-{}", sorted_ids.join("-"))
}

/// Key a collection of edges by their derived ids.
pub fn edge_record(edges: impl IntoIterator<Item = Edge>) -> BTreeMap<String, Edge> {
    edges.into_iter().map(|e| (e.id.clone(), e)).collect()
}

/// The full alignment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub source: Vec<Token>,
    pub target: Vec<Token>,
    pub edges: BTreeMap<String, Edge>,
}

impl Graph {
    /// Tokenize raw text and build a graph where every source token is
    /// 1:1-linked to an identical target token.
    ///
    /// ```
    /// use ladder_core::Graph;
    ///
    /// let g = Graph::init("w1 w2");
    /// assert_eq!(g.target_text(), "w1 w2");
    /// assert_eq!(g.source[0].id, "s0");
    /// assert_eq!(g.target[0].id, "t0");
    /// assert!(g.edges.contains_key("e-s0-t0"));
    /// ```
    pub fn init(s: &str) -> Graph {
        Graph::from_tokens(token::tokenize(s))
    }

    /// Build a graph from already-tokenized text, 1:1 alignment.
    pub fn from_tokens(tokens: Vec<String>) -> Graph {
        let edges = edge_record(
            (0..tokens.len()).map(|i| Edge::new([format!("s{i}"), format!("t{i}")], vec![])),
        );
        Graph {
            source: token::identify(&tokens, "s"),
            target: token::identify(&tokens, "t"),
            edges,
        }
    }

    /// The full target text.
    pub fn target_text(&self) -> String {
        token::text(&self.target)
    }

    /// The full source text.
    pub fn source_text(&self) -> String {
        token::text(&self.source)
    }

    /// The target token texts.
    pub fn target_texts(&self) -> Vec<String> {
        token::texts(&self.target)
    }

    /// The source token texts.
    pub fn source_texts(&self) -> Vec<String> {
        token::texts(&self.source)
    }

    /// Map from token id to the edge owning it.
    pub fn edge_map(&self) -> HashMap<&str, &Edge> {
        let mut m = HashMap::new();
        for e in self.edges.values() {
            for id in &e.ids {
                m.insert(id.as_str(), e);
            }
        }
        m
    }

    /// Map from source token id to its offset.
    pub fn source_map(&self) -> HashMap<&str, usize> {
        self.source
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect()
    }

    /// Map from target token id to its offset.
    pub fn target_map(&self) -> HashMap<&str, usize> {
        self.target
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect()
    }

    /// The edge at a target-token offset.
    pub fn edge_at(&self, index: usize) -> Result<&Edge, CoreError> {
        let tok = self.target.get(index).ok_or_else(|| {
            CoreError::out_of_bounds(format!(
                "target index {index} in a graph of {} target tokens",
                self.target.len()
            ))
        })?;
        self.edge_map().get(tok.id.as_str()).copied().ok_or_else(|| {
            CoreError::out_of_bounds(format!("target token {} belongs to no edge", tok.id))
        })
    }

    /// The ids related (through its edge) to the target token at an offset.
    pub fn related(&self, index: usize) -> Result<Vec<String>, CoreError> {
        Ok(self.edge_at(index)?.ids.clone())
    }

    /// Split an edge's members into the source and target tokens it touches,
    /// each in sequence order.
    pub fn partition_ids(&self, edge: &Edge) -> (Vec<Token>, Vec<Token>) {
        let members: HashSet<&str> = edge.ids.iter().map(|id| id.as_str()).collect();
        let source = self
            .source
            .iter()
            .filter(|t| members.contains(t.id.as_str()))
            .cloned()
            .collect();
        let target = self
            .target
            .iter()
            .filter(|t| members.contains(t.id.as_str()))
            .cloned()
            .collect();
        (source, target)
    }

    /// Read the labels of an edge; empty for an unknown edge id.
    pub fn labels(&self, edge_id: &str) -> &[String] {
        self.edges.get(edge_id).map_or(&[], |e| e.labels.as_slice())
    }

    /// Checks that the graph invariant holds.
    ///
    /// Advisory and side-effect free: mutators do not call this themselves,
    /// the caller decides when to pay for validation. Edges connected to
    /// tokens from only one side are fine.
    pub fn check_invariant(&self) -> Result<(), CoreError> {
        self.check().map_err(|message| CoreError::InvariantViolation {
            message,
            graph: Box::new(self.clone()),
        })
    }

    fn check(&self) -> Result<(), String> {
        let mut unique_token_id = HashSet::new();
        for t in self.source.iter().chain(self.target.iter()) {
            if !unique_token_id.insert(t.id.as_str()) {
                return Err(format!("duplicate token id: {}", t.id));
            }
        }
        check_token_texts(&self.target_texts(), "target")?;
        check_token_texts(&self.source_texts(), "source")?;
        let mut unique_in_edges = HashSet::new();
        for e in self.edges.values() {
            let mut within_edge = HashSet::new();
            for id in &e.ids {
                if !within_edge.insert(id.as_str()) {
                    return Err(format!("duplicate id in edge id list: {id}"));
                }
                if !unique_token_id.contains(id.as_str()) {
                    return Err(format!("edge references unknown id: {id}"));
                }
                if !unique_in_edges.insert(id.as_str()) {
                    return Err(format!("id claimed by more than one edge: {id}"));
                }
            }
        }
        for (key, e) in &self.edges {
            if !unique_in_edges.insert(e.id.as_str()) {
                return Err(format!("edge id collides with a member id: {}", e.id));
            }
            if *key != e.id {
                return Err(format!("edge stored under {key} but carries id {}", e.id));
            }
            if e.id != derive_edge_id(&e.ids) {
                return Err(format!("edge id {} does not match its member ids", e.id));
            }
        }
        for e in self.edges.values() {
            if e.ids.is_empty() {
                return Err(format!("edge {} has no member ids", e.id));
            }
        }
        Ok(())
    }
}

/// Every non-final token: optional leading whitespace, a non-whitespace run,
/// at least one trailing whitespace character. The final token may omit the
/// trailing whitespace.
fn well_formed_token_text(text: &str, is_last: bool) -> bool {
    let after_leading = text.trim_start();
    match after_leading.find(char::is_whitespace) {
        None => is_last && !after_leading.is_empty(),
        Some(word_len) => {
            word_len > 0 && after_leading[word_len..].chars().all(char::is_whitespace)
        }
    }
}

fn check_token_texts(texts: &[String], side: &str) -> Result<(), String> {
    for (i, t) in texts.iter().enumerate() {
        if !well_formed_token_text(t, i == texts.len() - 1) {
            return Err(format!("bad {side} token text: {t:?}"));
        }
    }
    Ok(())
}

/// Apply `f` to the label list of the edge with the given derived id.
///
/// An unknown edge id leaves the graph unchanged (the closure still sees an
/// empty label list): attaching labels to an edge that does not exist would
/// create a dangling edge with no member ids.
pub fn modify_labels<F>(g: &Graph, edge_id: &str, f: F) -> Graph
where
    F: FnOnce(&[String]) -> Vec<String>,
{
    let mut out = g.clone();
    match out.edges.get_mut(edge_id) {
        Some(e) => e.labels = f(&e.labels),
        None => {
            let _ = f(&[]);
            tracing::debug!(edge_id, "label edit on unknown edge ignored");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_shape() {
        let g = Graph::init("w1 w2");
        assert_eq!(
            g.source,
            vec![Token::new("w1 ", "s0"), Token::new("w2", "s1")]
        );
        assert_eq!(
            g.target,
            vec![Token::new("w1 ", "t0"), Token::new("w2", "t1")]
        );
        let expected = edge_record([
            Edge::new(["s0".into(), "t0".into()], vec![]),
            Edge::new(["s1".into(), "t1".into()], vec![]),
        ]);
        assert_eq!(g.edges, expected);
    }

    #[test]
    fn test_invariant_on_init() {
        assert!(Graph::init("apa bepa cepa").check_invariant().is_ok());
        assert!(Graph::init("").check_invariant().is_ok());
        assert!(Graph::init("  apa bepa  ").check_invariant().is_ok());
    }

    #[test]
    fn test_invariant_detects_duplicate_token_id() {
        let mut g = Graph::init("a b");
        g.target[1].id = "t0".into();
        let err = g.check_invariant().unwrap_err();
        match err {
            CoreError::InvariantViolation { message, .. } => {
                assert!(message.contains("duplicate token id"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invariant_detects_bad_token_text() {
        let mut g = Graph::init("a b");
        // non-final token without trailing whitespace
        g.target[0].text = "a".into();
        assert!(g.check_invariant().is_err());
    }

    #[test]
    fn test_invariant_detects_unknown_edge_reference() {
        let mut g = Graph::init("a b");
        let e = Edge::new(["s0".into(), "t9".into()], vec![]);
        g.edges.remove("e-s0-t0");
        g.edges.insert(e.id.clone(), e);
        assert!(g.check_invariant().is_err());
    }

    #[test]
    fn test_invariant_detects_empty_edge() {
        let mut g = Graph::init("a");
        g.edges
            .insert("e-".into(), Edge { id: "e-".into(), ids: vec![], labels: vec![] });
        assert!(g.check_invariant().is_err());
    }

    #[test]
    fn test_invariant_detects_drifted_edge_id() {
        let mut g = Graph::init("a");
        let e = g.edges.get_mut("e-s0-t0").unwrap();
        e.id = "e-bogus".into();
        assert!(g.check_invariant().is_err());
    }

    #[test]
    fn test_edge_map_and_offsets() {
        let g = Graph::init("a b c");
        let em = g.edge_map();
        assert_eq!(em.get("s1").unwrap().id, "e-s1-t1");
        assert_eq!(em.get("t1").unwrap().id, "e-s1-t1");
        let sm = g.source_map();
        assert_eq!(sm.get("s0"), Some(&0));
        assert_eq!(sm.get("s1"), Some(&1));
        assert!(!sm.contains_key("t0"));
        let tm = g.target_map();
        assert_eq!(tm.get("t1"), Some(&1));
        assert!(!tm.contains_key("s0"));
    }

    #[test]
    fn test_edge_at_and_related() {
        let g = Graph::init("apa bepa cepa");
        assert_eq!(g.edge_at(1).unwrap().ids, vec!["s1", "t1"]);
        assert_eq!(g.related(1).unwrap(), vec!["s1", "t1"]);
        assert!(g.edge_at(3).is_err());
    }

    #[test]
    fn test_partition_ids() {
        let g = Graph::init("a b c");
        let e = g.edges.get("e-s1-t1").unwrap();
        let (source, target) = g.partition_ids(e);
        assert_eq!(source, vec![g.source[1].clone()]);
        assert_eq!(target, vec![g.target[1].clone()]);
    }

    #[test]
    fn test_modify_labels_push_order() {
        let g = Graph::init("word");
        let g2 = modify_labels(&g, "e-s0-t0", |labels| {
            let mut l = labels.to_vec();
            l.push("ABC".into());
            l
        });
        let g3 = modify_labels(&g2, "e-s0-t0", |labels| {
            let mut l = labels.to_vec();
            l.push("DEF".into());
            l
        });
        assert_eq!(g3.labels("e-s0-t0"), ["ABC", "DEF"]);
        assert!(g3.check_invariant().is_ok());
    }

    #[test]
    fn test_modify_labels_unknown_edge_is_noop() {
        let g = Graph::init("word");
        let g2 = modify_labels(&g, "e-nope", |labels| {
            assert!(labels.is_empty());
            vec!["X".into()]
        });
        assert_eq!(g2, g);
        assert!(g2.check_invariant().is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let g = Graph::init("apa bepa cepa ");
        let json = serde_json::to_string(&g).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
        // edges serialize as a nested edge-id -> edge mapping
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["edges"]["e-s0-t0"]["ids"].is_array());
    }
}
