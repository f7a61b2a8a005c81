//! Edge sets: one direction of a node's neighbourhood, plus graph-wide walks.
//!
//! An `EdgeSet` only knows neighbour names. Walking past the direct members
//! needs something that can resolve a name to that node's edges in the same
//! direction; that is the `EdgeLookup` seam, implemented by the store (raw
//! records) and by the manager (active nodes first, then records).

use categorier_core::{Direction, Error, Result};
use indexmap::IndexSet;
use std::collections::{HashSet, VecDeque};

/// Resolves a node name to its direct neighbours in one direction.
pub trait EdgeLookup {
    /// `None` when the name does not resolve to a node.
    fn edges(&self, name: &str, direction: Direction) -> Option<&IndexSet<String>>;
}

/// Ordered, duplicate-free neighbour names for one side of one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeSet {
    direction: Direction,
    names: IndexSet<String>,
}

impl EdgeSet {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            names: IndexSet::new(),
        }
    }

    pub fn from_names<I, S>(direction: Direction, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            direction,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Direct members in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn members(&self) -> &IndexSet<String> {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns `false` if the name was already present.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        if self.names.shift_remove(name) {
            Ok(())
        } else {
            Err(Error::not_found(self.direction.member_noun(), name))
        }
    }

    /// Swap `old` for `new` at the same position.
    pub(crate) fn rename(&mut self, old: &str, new: &str) -> bool {
        if !self.names.contains(old) {
            return false;
        }
        self.names = self
            .names
            .drain(..)
            .map(|n| if n == old { new.to_string() } else { n })
            .collect();
        true
    }

    /// Every node reachable through this direction, each exactly once.
    pub fn flatten<'g, L>(&'g self, graph: &'g L) -> Closure<'g, L>
    where
        L: EdgeLookup + ?Sized,
    {
        Closure::new(graph, self.direction, &self.names)
    }

    /// Reachable nodes with no further edges in this direction
    /// (roots for parents, leaves for children).
    pub fn final_members<'g, L>(&'g self, graph: &'g L) -> FinalMembers<'g, L>
    where
        L: EdgeLookup + ?Sized,
    {
        FinalMembers::new(graph, self.direction, &self.names)
    }
}

/// Lazy breadth-first transitive closure. Not restartable.
pub struct Closure<'g, L: ?Sized> {
    graph: &'g L,
    direction: Direction,
    queue: VecDeque<&'g str>,
    seen: HashSet<&'g str>,
}

impl<'g, L> Closure<'g, L>
where
    L: EdgeLookup + ?Sized,
{
    pub fn new(graph: &'g L, direction: Direction, start: &'g IndexSet<String>) -> Self {
        Self {
            graph,
            direction,
            queue: start.iter().map(String::as_str).collect(),
            seen: HashSet::new(),
        }
    }
}

impl<'g, L> Iterator for Closure<'g, L>
where
    L: EdgeLookup + ?Sized,
{
    type Item = &'g str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(name) = self.queue.pop_front() {
            if !self.seen.insert(name) {
                continue;
            }
            if let Some(further) = self.graph.edges(name, self.direction) {
                self.queue.extend(further.iter().map(String::as_str));
            }
            return Some(name);
        }
        None
    }
}

/// Lazy walk to the terminal members of a closure. Each terminal is yielded once.
pub struct FinalMembers<'g, L: ?Sized> {
    graph: &'g L,
    direction: Direction,
    queue: VecDeque<&'g str>,
    seen: HashSet<&'g str>,
}

impl<'g, L> FinalMembers<'g, L>
where
    L: EdgeLookup + ?Sized,
{
    pub fn new(graph: &'g L, direction: Direction, start: &'g IndexSet<String>) -> Self {
        Self {
            graph,
            direction,
            queue: start.iter().map(String::as_str).collect(),
            seen: HashSet::new(),
        }
    }
}

impl<'g, L> Iterator for FinalMembers<'g, L>
where
    L: EdgeLookup + ?Sized,
{
    type Item = &'g str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(name) = self.queue.pop_front() {
            if !self.seen.insert(name) {
                continue;
            }
            match self.graph.edges(name, self.direction) {
                Some(further) if !further.is_empty() => {
                    self.queue.extend(further.iter().map(String::as_str));
                }
                // unresolvable names count as terminal
                _ => return Some(name),
            }
        }
        None
    }
}
