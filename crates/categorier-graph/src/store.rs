//! Graph store: the persisted snapshot, held as name-keyed records.
//!
//! Writes are whole-snapshot only: `write_file` always emits every record.

use categorier_core::{Direction, Error, NodeRecord, Result, Snapshot};
use indexmap::{IndexMap, IndexSet};
use std::path::Path;

use crate::edge_set::EdgeLookup;

#[derive(Clone, Debug, Default)]
pub struct GraphStore {
    records: IndexMap<String, NodeRecord>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole backing map.
    pub fn load(&mut self, snapshot: Snapshot) {
        self.records = snapshot.nodes;
    }

    pub fn save(&self) -> Snapshot {
        Snapshot {
            nodes: self.records.clone(),
        }
    }

    pub fn get_raw(&self, name: &str) -> Result<&NodeRecord> {
        self.records
            .get(name)
            .ok_or_else(|| Error::node_not_found(name))
    }

    /// Insert or overwrite. An existing name keeps its position.
    pub fn put_raw(&mut self, name: impl Into<String>, record: NodeRecord) {
        self.records.insert(name.into(), record);
    }

    pub fn remove_raw(&mut self, name: &str) -> Result<NodeRecord> {
        self.records
            .shift_remove(name)
            .ok_or_else(|| Error::node_not_found(name))
    }

    /// Re-key `old` as `new` at the same position.
    pub fn rename_raw(&mut self, old: &str, new: &str) -> Result<()> {
        if !self.records.contains_key(old) {
            return Err(Error::node_not_found(old));
        }
        if self.records.contains_key(new) {
            return Err(Error::already_exists(new));
        }
        self.records = self
            .records
            .drain(..)
            .map(|(k, v)| if k == old { (new.to_string(), v) } else { (k, v) })
            .collect();
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn all_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read a YAML snapshot. A missing file is an empty graph.
    pub fn read_file(path: &Path) -> Result<Snapshot> {
        if !path.exists() {
            tracing::info!("No data at {}, starting empty", path.display());
            return Ok(Snapshot::default());
        }
        let text = std::fs::read_to_string(path)?;
        let snapshot = Snapshot::from_yaml(&text)?;
        tracing::info!("Loaded {} nodes from {}", snapshot.len(), path.display());
        Ok(snapshot)
    }

    /// Write the full snapshot as YAML, creating parent directories.
    pub fn write_file(path: &Path, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, snapshot.to_yaml()?)?;
        tracing::info!("Saved {} nodes to {}", snapshot.len(), path.display());
        Ok(())
    }
}

impl EdgeLookup for GraphStore {
    fn edges(&self, name: &str, direction: Direction) -> Option<&IndexSet<String>> {
        self.records.get(name).map(|r| r.edges(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use categorier_core::AttributeValue;
    use tempfile::TempDir;

    fn record(parents: &[&str], children: &[&str]) -> NodeRecord {
        NodeRecord {
            parents: parents.iter().map(|s| s.to_string()).collect(),
            children: children.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample() -> GraphStore {
        let mut store = GraphStore::new();
        store.put_raw("g", record(&[], &["p"]));
        store.put_raw("p", record(&["g"], &["c"]));
        store.put_raw("c", record(&["p"], &[]));
        store
    }

    #[test]
    fn raw_access() {
        let mut store = sample();
        assert!(store.contains("p"));
        assert_eq!(store.get_raw("c").unwrap().parents.len(), 1);
        assert!(store.get_raw("nope").is_err());
        store.remove_raw("c").unwrap();
        assert!(!store.contains("c"));
        assert!(store.remove_raw("c").is_err());
    }

    #[test]
    fn put_keeps_position() {
        let mut store = sample();
        store.put_raw("g", record(&[], &[]));
        assert_eq!(store.all_names().collect::<Vec<_>>(), vec!["g", "p", "c"]);
    }

    #[test]
    fn rename_keeps_position() {
        let mut store = sample();
        store.rename_raw("p", "q").unwrap();
        assert_eq!(store.all_names().collect::<Vec<_>>(), vec!["g", "q", "c"]);
        assert!(store.rename_raw("q", "g").is_err());
        assert!(store.rename_raw("zz", "y").is_err());
    }

    #[test]
    fn load_replaces_everything() {
        let mut store = sample();
        store.load(Snapshot::default());
        assert!(store.is_empty());
    }

    #[test]
    fn lookup_reads_records() {
        let store = sample();
        let parents = store.edges("c", Direction::Parents).unwrap();
        assert!(parents.contains("p"));
        assert!(store.edges("nope", Direction::Parents).is_none());
    }

    #[test]
    fn file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data.yml");

        let mut store = sample();
        let mut rec = record(&[], &[]);
        rec.attributes.insert("names".into(), AttributeValue::list(["b", "a"]));
        store.put_raw("attrs", rec);

        GraphStore::write_file(&path, &store.save()).unwrap();
        let back = GraphStore::read_file(&path).unwrap();
        assert_eq!(back, store.save());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let snap = GraphStore::read_file(&dir.path().join("absent.yml")).unwrap();
        assert!(snap.is_empty());
    }
}
