//! Ancestor normalization applied to candidate parents before connecting.

use categorier_core::Direction;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::edge_set::{Closure, EdgeLookup, FinalMembers};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FlatMode {
    /// Candidates are used as given.
    #[default]
    None,
    /// Each candidate is replaced by its root ancestors.
    Flat,
    /// Each candidate is kept and joined by its whole ancestor closure.
    AllFlat,
}

impl fmt::Display for FlatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Flat => write!(f, "flat"),
            Self::AllFlat => write!(f, "all-flat"),
        }
    }
}

/// Expand `candidates` according to `mode`, de-duplicated in first-seen order.
///
/// In `AllFlat` the candidates themselves come first, followed by their
/// closures. A candidate with no parents is its own root in `Flat`.
/// Names that do not resolve pass through unchanged.
pub fn normalize_flat<L>(graph: &L, candidates: &[&str], mode: FlatMode) -> Vec<String>
where
    L: EdgeLookup + ?Sized,
{
    let mut out: IndexSet<String> = IndexSet::new();
    match mode {
        FlatMode::None => {
            out.extend(candidates.iter().map(|c| c.to_string()));
        }
        FlatMode::Flat => {
            for candidate in candidates {
                match graph.edges(candidate, Direction::Parents) {
                    Some(parents) if !parents.is_empty() => {
                        let roots = FinalMembers::new(graph, Direction::Parents, parents);
                        out.extend(roots.map(str::to_string));
                    }
                    _ => {
                        out.insert(candidate.to_string());
                    }
                }
            }
        }
        FlatMode::AllFlat => {
            out.extend(candidates.iter().map(|c| c.to_string()));
            for candidate in candidates {
                if let Some(parents) = graph.edges(candidate, Direction::Parents) {
                    let closure = Closure::new(graph, Direction::Parents, parents);
                    out.extend(closure.map(str::to_string));
                }
            }
        }
    }
    out.into_iter().collect()
}
