//! Node cache: live `Node`s materialized from store records on first access.

use indexmap::map::Entry;
use indexmap::IndexMap;

use categorier_core::Result;

use crate::node::Node;
use crate::store::GraphStore;

#[derive(Clone, Debug, Default)]
pub struct NodeCache {
    active: IndexMap<String, Node>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.active.get(name)
    }

    /// The active node for `name`, building it from the store on a miss.
    pub fn materialize(&mut self, store: &GraphStore, name: &str) -> Result<&mut Node> {
        match self.active.entry(name.to_string()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let record = store.get_raw(name)?.clone();
                tracing::trace!(node = %name, "materialized");
                Ok(e.insert(Node::from_record(name, record)))
            }
        }
    }

    pub fn insert(&mut self, node: Node) {
        self.active.insert(node.name().to_string(), node);
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.active.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.active.values()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use categorier_core::NodeRecord;

    #[test]
    fn materializes_once() {
        let mut store = GraphStore::new();
        store.put_raw("a", NodeRecord::default());
        let mut cache = NodeCache::new();

        assert!(!cache.contains("a"));
        cache.materialize(&store, "a").unwrap().edges_mut(categorier_core::Direction::Parents).add("x");
        // second access sees the live node, not the store record
        let node = cache.materialize(&store, "a").unwrap();
        assert!(node.parents().contains("x"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn miss_on_both_is_not_found() {
        let store = GraphStore::new();
        let mut cache = NodeCache::new();
        assert!(cache.materialize(&store, "ghost").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let mut cache = NodeCache::new();
        cache.insert(Node::new("a"));
        cache.insert(Node::new("b"));
        assert!(cache.remove("a").is_some());
        assert!(cache.remove("a").is_none());
        cache.clear();
        assert!(cache.is_empty());
    }
}
