//! Graph manager: owns the store and the live node cache, and is the only
//! place edges are changed.
//!
//! Every edge is written on both endpoints in the same call, and every
//! operation checks its preconditions before touching either side. Batch
//! operations over several names are not transactions: names processed
//! before a failure keep their effect.

use categorier_core::{
    AttributeValue, Direction, Error, Result, Snapshot, DESCRIPTIONS_KEY,
};
use indexmap::{IndexMap, IndexSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cache::NodeCache;
use crate::edge_set::{Closure, EdgeLookup, FinalMembers};
use crate::node::{Node, ValueSelector};
use crate::normalize::{normalize_flat, FlatMode};
use crate::search::{accepts, Combine, Criterion};
use crate::store::GraphStore;

/// What counts as "already connected" when linking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reach {
    /// Anywhere in the closure on that side.
    Closure,
    /// Only a direct member.
    Direct,
}

#[derive(Debug, Default)]
pub struct GraphManager {
    store: GraphStore,
    cache: NodeCache,
    path: Option<PathBuf>,
}

impl EdgeLookup for GraphManager {
    fn edges(&self, name: &str, direction: Direction) -> Option<&IndexSet<String>> {
        match self.cache.get(name) {
            Some(node) => Some(node.edges(direction).members()),
            None => self.store.edges(name, direction),
        }
    }
}

impl GraphManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the YAML snapshot at `path`, remembering it for [`save`](Self::save).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut graph = Self::new();
        graph.load_file(path)?;
        Ok(graph)
    }

    // ─── lifecycle ───

    /// Replace the whole graph. Every node becomes unmaterialized.
    pub fn load(&mut self, snapshot: Snapshot) {
        self.cache.clear();
        self.store.load(snapshot);
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = GraphStore::read_file(path)?;
        self.load(snapshot);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Full snapshot with every active node written back first.
    pub fn snapshot(&mut self) -> Snapshot {
        for node in self.cache.nodes() {
            self.store.put_raw(node.name(), node.to_record());
        }
        self.store.save()
    }

    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::Config("no data file loaded".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = self.snapshot();
        GraphStore::write_file(path.as_ref(), &snapshot)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ─── queries ───

    pub fn contains(&self, name: &str) -> bool {
        self.cache.contains(name) || self.store.contains(name)
    }

    pub fn all_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.store.all_names()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The live node for `name`, materialized from the store on first access.
    pub fn get(&mut self, name: &str) -> Result<&Node> {
        self.cache.materialize(&self.store, name).map(|node| &*node)
    }

    pub fn parents(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.require_edges(name, Direction::Parents)?.iter().cloned().collect())
    }

    pub fn children(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.require_edges(name, Direction::Children)?.iter().cloned().collect())
    }

    pub fn ancestors(&self, name: &str) -> Result<Vec<String>> {
        self.closure_of(name, Direction::Parents)
    }

    pub fn descendants(&self, name: &str) -> Result<Vec<String>> {
        self.closure_of(name, Direction::Children)
    }

    pub fn final_ancestors(&self, name: &str) -> Result<Vec<String>> {
        let start = self.require_edges(name, Direction::Parents)?;
        Ok(FinalMembers::new(self, Direction::Parents, start)
            .map(str::to_string)
            .collect())
    }

    pub fn final_descendants(&self, name: &str) -> Result<Vec<String>> {
        let start = self.require_edges(name, Direction::Children)?;
        Ok(FinalMembers::new(self, Direction::Children, start)
            .map(str::to_string)
            .collect())
    }

    pub fn attributes(&self, name: &str) -> Result<&IndexMap<String, AttributeValue>> {
        match self.cache.get(name) {
            Some(node) => Ok(node.attributes()),
            None => Ok(&self.store.get_raw(name)?.attributes),
        }
    }

    /// Names accepted by `criteria`, in store order.
    pub fn search(&self, criteria: &[Criterion], combine: Combine) -> Vec<String> {
        self.store
            .all_names()
            .filter(|name| {
                self.attributes(name)
                    .map(|attrs| accepts(criteria, combine, name, attrs))
                    .unwrap_or(false)
            })
            .map(str::to_string)
            .collect()
    }

    /// Expand candidate parents per `mode`. Every candidate must exist.
    pub fn normalize_flat(&self, candidates: &[&str], mode: FlatMode) -> Result<Vec<String>> {
        for candidate in candidates {
            self.require(candidate)?;
        }
        Ok(normalize_flat(self, candidates, mode))
    }

    // ─── nodes ───

    pub fn create(&mut self, name: &str, parents: &[&str], children: &[&str]) -> Result<&Node> {
        self.create_with(name, parents, children, FlatMode::None)
    }

    /// Create `name` and connect it. On any failure the new node is removed
    /// again and the graph is left as it was.
    pub fn create_with(
        &mut self,
        name: &str,
        parents: &[&str],
        children: &[&str],
        mode: FlatMode,
    ) -> Result<&Node> {
        if name.trim().is_empty() {
            return Err(Error::validation("node name must not be empty"));
        }
        if self.contains(name) {
            return Err(Error::already_exists(name));
        }
        for candidate in parents.iter().chain(children) {
            if *candidate == name {
                return Err(Error::validation(format!("{} cannot be connected to itself", name)));
            }
            self.require(candidate)?;
        }

        let node = Node::new(name);
        self.store.put_raw(name, node.to_record());
        self.cache.insert(node);

        let linked = self
            .connect(name, Direction::Parents, parents, mode)
            .and_then(|_| self.connect(name, Direction::Children, children, FlatMode::None));
        if let Err(e) = linked {
            self.detach(name)?;
            return Err(e);
        }

        debug!(node = %name, parents = parents.len(), children = children.len(), "created");
        self.get(name)
    }

    /// Create several nodes with already-aligned per-name edge lists. An
    /// empty outer list means "no edges" for every name.
    pub fn create_many(
        &mut self,
        names: &[&str],
        parents: &[Vec<&str>],
        children: &[Vec<&str>],
    ) -> Result<Vec<String>> {
        let aligned = |lists: usize| lists == 0 || lists == names.len();
        if !aligned(parents.len()) || !aligned(children.len()) {
            return Err(Error::validation(format!(
                "expected one edge list per name ({} names, {} parent lists, {} child lists)",
                names.len(),
                parents.len(),
                children.len()
            )));
        }

        let mut created = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let p = parents.get(i).map(Vec::as_slice).unwrap_or(&[]);
            let c = children.get(i).map(Vec::as_slice).unwrap_or(&[]);
            self.create(name, p, c)?;
            created.push(name.to_string());
        }
        Ok(created)
    }

    /// Unlink `name` from every neighbour, then forget it.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.require(name)?;
        self.detach(name)?;
        debug!(node = %name, "deleted");
        Ok(())
    }

    /// Rename a node, rewriting every neighbour's edge in place.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if new.trim().is_empty() || old == new {
            return Err(Error::validation(format!("cannot rename {} to '{}'", old, new)));
        }
        self.require(old)?;
        if self.contains(new) {
            return Err(Error::already_exists(new));
        }

        // dangling names have no mirror to rewrite
        let node = self.node_mut(old)?;
        let (parents, children) = (node.parents().to_vec(), node.children().to_vec());
        let parents: Vec<String> = parents.into_iter().filter(|p| self.contains(p)).collect();
        let children: Vec<String> = children.into_iter().filter(|c| self.contains(c)).collect();
        for parent in &parents {
            self.node_mut(parent)?.edges_mut(Direction::Children).rename(old, new);
            self.persist(parent);
        }
        for child in &children {
            self.node_mut(child)?.edges_mut(Direction::Parents).rename(old, new);
            self.persist(child);
        }

        self.store.rename_raw(old, new)?;
        if let Some(mut node) = self.cache.remove(old) {
            node.set_name(new);
            self.cache.insert(node);
        }
        self.persist(new);
        debug!(from = %old, to = %new, "renamed");
        Ok(())
    }

    // ─── edges ───

    pub fn add_parents(&mut self, name: &str, parents: &[&str]) -> Result<()> {
        self.add_parents_with(name, parents, FlatMode::None)
    }

    pub fn add_parents_with(&mut self, name: &str, parents: &[&str], mode: FlatMode) -> Result<()> {
        self.require(name)?;
        self.connect(name, Direction::Parents, parents, mode)
    }

    pub fn add_children(&mut self, name: &str, children: &[&str]) -> Result<()> {
        self.require(name)?;
        self.connect(name, Direction::Children, children, FlatMode::None)
    }

    pub fn remove_parents(&mut self, name: &str, parents: &[&str]) -> Result<()> {
        self.disconnect(name, Direction::Parents, parents)
    }

    pub fn remove_children(&mut self, name: &str, children: &[&str]) -> Result<()> {
        self.disconnect(name, Direction::Children, children)
    }

    /// Cut intermediate ancestors out of `name`'s ancestry while keeping
    /// whatever sat above them.
    ///
    /// The between-set is `cut` plus every ancestor of `name` that descends
    /// from a cut node. Direct parents in the between-set are unlinked, and
    /// the parents of between-set nodes that lie outside it become direct
    /// parents unless `name` still reaches them.
    pub fn delete_with_reconnect(&mut self, name: &str, cut: &[&str]) -> Result<()> {
        self.require(name)?;
        let ancestors: IndexSet<String> = self.ancestors(name)?.into_iter().collect();
        for c in cut {
            self.require(c)?;
            if !ancestors.contains(*c) {
                return Err(Error::validation(format!("{} is not an ancestor of {}", c, name)));
            }
        }

        let mut between: IndexSet<String> = cut.iter().map(|c| c.to_string()).collect();
        for c in cut {
            for below in self.descendants(c)? {
                if ancestors.contains(&below) {
                    between.insert(below);
                }
            }
        }

        let severed: Vec<String> = self
            .require_edges(name, Direction::Parents)?
            .iter()
            .filter(|p| between.contains(*p))
            .cloned()
            .collect();

        let mut exterior: IndexSet<String> = IndexSet::new();
        for node in &between {
            if let Some(above) = self.edges(node, Direction::Parents) {
                exterior.extend(above.iter().filter(|p| !between.contains(*p)).cloned());
            }
        }

        for parent in &severed {
            self.unlink(name, Direction::Parents, parent)?;
        }
        for parent in &exterior {
            self.link(name, Direction::Parents, parent, Reach::Closure)?;
        }

        debug!(
            node = %name,
            severed = severed.len(),
            reconnected = exterior.len(),
            "deleted intermediate ancestors"
        );
        Ok(())
    }

    // ─── attributes ───

    /// One value stores a scalar; none or several store a list.
    /// Descriptions are always a list.
    pub fn set_attribute(&mut self, name: &str, key: &str, values: &[&str]) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::validation("attribute key must not be empty"));
        }
        let value = match values {
            [single] if key != DESCRIPTIONS_KEY => AttributeValue::scalar(*single),
            _ => AttributeValue::list(values.iter().copied()),
        };
        self.node_mut(name)?.set(key, value);
        self.persist(name);
        debug!(node = %name, key = %key, "attribute set");
        Ok(())
    }

    /// With no selectors the whole key goes; otherwise only the selected entries.
    pub fn unset_attribute(&mut self, name: &str, key: &str, selectors: &[ValueSelector]) -> Result<()> {
        let node = self.node_mut(name)?;
        if selectors.is_empty() {
            node.unset(key)?;
        } else {
            node.remove_values(key, selectors)?;
        }
        self.persist(name);
        debug!(node = %name, key = %key, selected = selectors.len(), "attribute unset");
        Ok(())
    }

    /// Append to the list under `key`, creating or promoting it as needed.
    pub fn add_values(&mut self, name: &str, key: &str, values: &[&str]) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::validation("attribute key must not be empty"));
        }
        self.node_mut(name)?.extend_list(key, values.iter().copied());
        self.persist(name);
        Ok(())
    }

    pub fn change_value(
        &mut self,
        name: &str,
        key: &str,
        selector: &ValueSelector,
        new_value: &str,
    ) -> Result<()> {
        self.node_mut(name)?.change_value(key, selector, new_value)?;
        self.persist(name);
        Ok(())
    }

    pub fn rename_attribute(&mut self, name: &str, old: &str, new: &str) -> Result<()> {
        if new.trim().is_empty() {
            return Err(Error::validation("attribute key must not be empty"));
        }
        self.node_mut(name)?.rename_attribute(old, new)?;
        self.persist(name);
        Ok(())
    }

    pub fn add_descriptions(&mut self, name: &str, texts: &[&str]) -> Result<()> {
        self.add_values(name, DESCRIPTIONS_KEY, texts)
    }

    /// Remove descriptions by 1-based position.
    pub fn remove_descriptions(&mut self, name: &str, positions: &[usize]) -> Result<()> {
        let selectors: Vec<ValueSelector> =
            positions.iter().map(|p| ValueSelector::Position(*p)).collect();
        self.unset_attribute(name, DESCRIPTIONS_KEY, &selectors)
    }

    // ─── internals ───

    fn require(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(Error::node_not_found(name))
        }
    }

    fn require_edges(&self, name: &str, direction: Direction) -> Result<&IndexSet<String>> {
        self.edges(name, direction)
            .ok_or_else(|| Error::node_not_found(name))
    }

    fn closure_of(&self, name: &str, direction: Direction) -> Result<Vec<String>> {
        let start = self.require_edges(name, direction)?;
        Ok(Closure::new(self, direction, start).map(str::to_string).collect())
    }

    fn reaches(&self, name: &str, direction: Direction, target: &str) -> bool {
        self.edges(name, direction)
            .map(|start| Closure::new(self, direction, start).any(|n| n == target))
            .unwrap_or(false)
    }

    fn node_mut(&mut self, name: &str) -> Result<&mut Node> {
        self.cache.materialize(&self.store, name)
    }

    /// Write-through of one active node.
    fn persist(&mut self, name: &str) {
        if let Some(node) = self.cache.get(name) {
            self.store.put_raw(name, node.to_record());
        }
    }

    fn connect(&mut self, name: &str, direction: Direction, candidates: &[&str], mode: FlatMode) -> Result<()> {
        let (targets, reach) = match (direction, mode) {
            (Direction::Parents, FlatMode::Flat) => {
                (self.normalize_flat(candidates, FlatMode::Flat)?, Reach::Closure)
            }
            // every ancestor is meant to end up as a direct parent
            (Direction::Parents, FlatMode::AllFlat) => {
                (self.normalize_flat(candidates, FlatMode::AllFlat)?, Reach::Direct)
            }
            _ => (candidates.iter().map(|c| c.to_string()).collect(), Reach::Closure),
        };
        for target in &targets {
            self.link(name, direction, target, reach)?;
        }
        Ok(())
    }

    /// Add `candidate` on the `direction` side of `name`, mirrored.
    /// Returns `false` when it was already connected.
    fn link(&mut self, name: &str, direction: Direction, candidate: &str, reach: Reach) -> Result<bool> {
        if candidate == name {
            return Err(Error::validation(format!(
                "{} cannot be its own {}",
                name,
                direction.member_noun()
            )));
        }
        self.require(candidate)?;

        let connected = match reach {
            Reach::Closure => self.reaches(name, direction, candidate),
            Reach::Direct => self
                .edges(name, direction)
                .is_some_and(|e| e.contains(candidate)),
        };
        if connected {
            debug!(node = %name, other = %candidate, side = %direction, "already connected, skipped");
            return Ok(false);
        }
        if self.reaches(name, direction.opposite(), candidate) {
            return Err(Error::cycle(name, candidate));
        }

        self.node_mut(name)?;
        self.node_mut(candidate)?;
        self.node_mut(name)?.edges_mut(direction).add(candidate);
        self.node_mut(candidate)?.edges_mut(direction.opposite()).add(name);
        self.persist(name);
        self.persist(candidate);
        debug!(node = %name, other = %candidate, side = %direction, "linked");
        Ok(true)
    }

    /// Remove each named edge, mirrored. All edges are checked first.
    fn disconnect(&mut self, name: &str, direction: Direction, others: &[&str]) -> Result<()> {
        let current = self.require_edges(name, direction)?;
        if let Some(missing) = others.iter().find(|o| !current.contains(**o)) {
            return Err(Error::not_found(direction.member_noun(), *missing));
        }
        for other in others {
            self.unlink(name, direction, other)?;
        }
        Ok(())
    }

    fn unlink(&mut self, name: &str, direction: Direction, other: &str) -> Result<()> {
        if !self.edges(name, direction).is_some_and(|e| e.contains(other)) {
            return Err(Error::not_found(direction.member_noun(), other));
        }
        self.node_mut(name)?.edges_mut(direction).remove(other)?;
        self.persist(name);

        // a dangling name has no mirror to clean up
        if self.contains(other) {
            let peer = self.node_mut(other)?.edges_mut(direction.opposite());
            if peer.contains(name) {
                peer.remove(name)?;
            }
            self.persist(other);
        }
        debug!(node = %name, other = %other, side = %direction, "unlinked");
        Ok(())
    }

    /// Sever every edge of `name` and drop it from cache and store.
    fn detach(&mut self, name: &str) -> Result<()> {
        let node = self.node_mut(name)?;
        let parents = node.parents().to_vec();
        let children = node.children().to_vec();
        for parent in &parents {
            self.unlink(name, Direction::Parents, parent)?;
        }
        for child in &children {
            self.unlink(name, Direction::Children, child)?;
        }
        self.cache.remove(name);
        self.store.remove_raw(name)?;
        Ok(())
    }
}
