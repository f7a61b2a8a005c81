//! categorier-graph: taxonomy graph engine
//!
//! Named nodes linked by mirrored parent/child edges, kept acyclic, with
//! flat/all-flat ancestor normalization and delete-with-reconnect.
//! `GraphManager` is the entry point; nothing else mutates edges.

pub mod cache;
pub mod edge_set;
pub mod manager;
pub mod node;
pub mod normalize;
pub mod search;
pub mod store;

pub use cache::NodeCache;
pub use edge_set::{Closure, EdgeLookup, EdgeSet, FinalMembers};
pub use manager::GraphManager;
pub use node::{Node, ValueSelector};
pub use normalize::{normalize_flat, FlatMode};
pub use search::{accepts, Combine, Criterion};
pub use store::GraphStore;
