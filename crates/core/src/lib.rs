//! # Ladder Core
//!
//! The data model of a parallel-corpus annotation editor: an alignment
//! graph between an immutable source text and an editable target text,
//! with labelled edges linking tokens across the two sides.
//!
//! ## Core Concepts
//!
//! - **Tokens**: words with their trailing whitespace, each carrying a
//!   stable id; concatenating token texts reconstructs the text
//! - **Graph**: the source sequence, the target sequence, and the edges
//!   grouping token ids from either side into alignment units
//! - **Edits**: pure operations that splice the target and fold the
//!   touched edges into one merged edge
//! - **Diff**: a position-ordered rendering of the graph as unchanged,
//!   edited, moved, and inserted/deleted pieces with character-level
//!   sub-diffs
//!
//! ## Example
//!
//! ```rust
//! use ladder_core::{calculate_diff, modify_tokens, Graph};
//!
//! let g = Graph::init("the quick fox ");
//! let g2 = modify_tokens(&g, 1, 2, "slow red ").unwrap();
//! assert_eq!(g2.target_text(), "the slow red fox ");
//! assert_eq!(g2.source_text(), "the quick fox ");
//!
//! let diff = calculate_diff(&g2);
//! assert_eq!(diff.len(), 3);
//! ```

pub mod algorithm;
pub mod diff;
pub mod edit;
pub mod error;
pub mod graph;
pub mod labels;
pub mod sentence;
pub mod token;

// Re-export the main types and operations
pub use algorithm::{CharOp, TokenDiff};
pub use diff::{calculate_diff, DiffEntry};
pub use edit::{modify, modify_tokens, rearrange};
pub use error::CoreError;
pub use graph::{modify_labels, Edge, Graph};
pub use sentence::{sentence, subgraph, Subspans};
pub use token::{Span, Token};
