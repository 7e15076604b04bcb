//! Semantic resolution over the descriptor graph
//!
//! These modules derive code-generation-ready facts from the raw graph:
//! wire-format tags, target-namespace type names, and structural patterns
//! (map entries, oneof groups). Everything here is a pure function of the
//! graph; nothing is cached across generation passes.

pub mod classify;
pub mod names;
pub mod tag;
